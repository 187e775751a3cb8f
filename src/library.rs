use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// License information attached to a library.
///
/// `defined_name` is the lookup key (dashes normalized to underscores),
/// `license_name` the human-facing alternate key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct License {
    pub defined_name: String,
    pub license_name: String,
    pub license_website: String,
    pub license_short_description: String,
    pub license_description: String,
}

/// A bundled library as shown on an "about" screen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Library {
    pub defined_name: String,
    pub author: String,
    pub author_website: String,
    pub library_name: String,
    pub library_description: String,
    pub library_version: String,
    pub library_website: String,
    /// Owned copy; never aliases the catalog's shared license template.
    pub license: Option<License>,
    pub is_open_source: bool,
    pub repository_link: String,
    pub class_path: String,
    pub is_internal: bool,
}

impl License {
    /// Matches either the display name or the defined name, ignoring case.
    pub fn is_named(&self, name: &str) -> bool {
        self.license_name.to_lowercase() == name.to_lowercase()
            || self.defined_name.to_lowercase() == name.to_lowercase()
    }
}

impl Library {
    /// Natural display order: lexicographic by `library_name`.
    pub fn name_order(&self, other: &Library) -> Ordering {
        self.library_name.cmp(&other.library_name)
    }

    pub fn is_named(&self, name: &str) -> bool {
        self.library_name.to_lowercase() == name.to_lowercase()
            || self.defined_name.to_lowercase() == name.to_lowercase()
    }

    /// Returns the license, creating an empty one first if none is attached.
    pub fn license_mut(&mut self) -> &mut License {
        self.license.get_or_insert_with(License::default)
    }
}

/// Stable sort by the natural display order.
pub fn sort_by_name(libraries: &mut [Library]) {
    libraries.sort_by(|a, b| a.name_order(b));
}

//! Field overrides applied on top of resolved libraries.
//!
//! Modifications map a library key to a set of `FIELD_NAME -> value`
//! patches, for example:
//!
//! ```json
//! { "okhttp": { "library_version": "4.12.0", "license_name": "Apache 2.0" } }
//! ```
//!
//! The key is matched as a substring of the defined name, external libraries
//! first. A patch is only applied when exactly one library matches.

use crate::builder::parse_flag;
use crate::library::Library;
use crate::registry::{matching_positions, Libs};
use anyhow::Context;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use strum::{Display, EnumIter, EnumString};

/// Library key -> (field name -> new value).
pub type Modifications = BTreeMap<String, BTreeMap<String, String>>;

/// Enough matches to tell a unique candidate from an ambiguous one.
const AMBIGUITY_PROBE: i32 = 2;

/// Overridable library fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumString, Display)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum LibraryField {
    AuthorName,
    AuthorWebsite,
    LibraryName,
    LibraryDescription,
    LibraryVersion,
    LibraryWebsite,
    LibraryOpenSource,
    LibraryRepositoryLink,
    LibraryClasspath,
    LicenseName,
    LicenseShortDescription,
    LicenseDescription,
    LicenseWebsite,
    /// Any key that names no known field; applying it does nothing.
    #[strum(serialize = "")]
    Unrecognized,
}

impl LibraryField {
    pub fn from_key(key: &str) -> Self {
        Self::from_str(&key.to_uppercase()).unwrap_or(Self::Unrecognized)
    }

    /// Writes `value` into the field. License fields create an empty
    /// license first when the library has none.
    pub fn apply(self, lib: &mut Library, value: &str) {
        let value = value.to_string();
        match self {
            Self::AuthorName => lib.author = value,
            Self::AuthorWebsite => lib.author_website = value,
            Self::LibraryName => lib.library_name = value,
            Self::LibraryDescription => lib.library_description = value,
            Self::LibraryVersion => lib.library_version = value,
            Self::LibraryWebsite => lib.library_website = value,
            Self::LibraryOpenSource => lib.is_open_source = parse_flag(&value),
            Self::LibraryRepositoryLink => lib.repository_link = value,
            // Not used again for detection once set here
            Self::LibraryClasspath => lib.class_path = value,
            Self::LicenseName => lib.license_mut().license_name = value,
            Self::LicenseShortDescription => lib.license_mut().license_short_description = value,
            Self::LicenseDescription => lib.license_mut().license_description = value,
            Self::LicenseWebsite => lib.license_mut().license_website = value,
            Self::Unrecognized => {}
        }
    }
}

/// Applies `patch` to `lib`, ignoring unknown field names.
pub fn apply_patch(lib: &mut Library, patch: &BTreeMap<String, String>) {
    for (key, value) in patch {
        let field = LibraryField::from_key(key);
        if field == LibraryField::Unrecognized {
            tracing::debug!("Ignoring unknown override field '{}' for '{}'", key, lib.defined_name);
        }
        field.apply(lib, value);
    }
}

impl Libs {
    /// Applies every modification whose key identifies exactly one library.
    pub fn modify_libraries(&mut self, modifications: &Modifications) {
        let (external, internal) = self.pools_mut();

        for (key, patch) in modifications {
            let mut found = matching_positions(external.as_slice(), key, true, AMBIGUITY_PROBE);
            let pool: &mut Vec<Library> = if found.is_empty() {
                found = matching_positions(internal.as_slice(), key, true, AMBIGUITY_PROBE);
                &mut *internal
            } else {
                &mut *external
            };

            match found.as_slice() {
                [pos] => apply_patch(&mut pool[*pos], patch),
                [] => tracing::debug!("No library matches override key '{}'", key),
                _ => tracing::debug!("Override key '{}' is ambiguous, skipping", key),
            }
        }
    }
}

pub fn modifications_from_json_str(content: &str) -> serde_json::Result<Modifications> {
    serde_json::from_str(content)
}

pub fn load_modifications(path: &Path) -> anyhow::Result<Modifications> {
    let content = fs::read_to_string(path)
        .context(format!("Failed to read modifications file: {:?}", path))?;
    modifications_from_json_str(&content)
        .context(format!("Failed to parse modifications file: {:?}", path))
}

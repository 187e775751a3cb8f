//! Builds `License` and `Library` records from string resources.
//!
//! Both builders fail closed: a provider error is logged and the record is
//! skipped. A library with neither a name nor a description is also skipped.

use crate::error::Result;
use crate::library::{Library, License};
use crate::resources::ResourceProvider;
use crate::variables::{collect_custom_variables, substitute};

/// Normalizes an identifier into its defined name.
pub fn defined_name(id: &str) -> String {
    id.replace('-', "_")
}

/// Builds the license declared as `define_license_{id}`.
///
/// All four fields may come back empty; the record is still returned.
pub fn build_license(resources: &dyn ResourceProvider, id: &str) -> Option<License> {
    let id = defined_name(id);
    match try_build_license(resources, &id) {
        Ok(license) => Some(license),
        Err(e) => {
            tracing::error!("Failed to build license '{}': {}", id, e);
            None
        }
    }
}

fn try_build_license(resources: &dyn ResourceProvider, id: &str) -> Result<License> {
    let field = |name: &str| resources.string(&format!("license_{}_{}", id, name));

    Ok(License {
        defined_name: id.to_string(),
        license_name: field("licenseName")?,
        license_website: field("licenseWebsite")?,
        license_short_description: field("licenseShortDescription")?,
        license_description: field("licenseDescription")?,
    })
}

/// Builds the library declared as `define_{id}` or `define_int_{id}`.
///
/// `licenses` are the already-built shared licenses, looked up when the
/// library references one through `library_{id}_licenseId`. The matched
/// license is copied before its text is specialized for this library.
pub fn build_library(
    resources: &dyn ResourceProvider,
    licenses: &[License],
    id: &str,
    internal: bool,
) -> Option<Library> {
    let id = defined_name(id);
    match try_build_library(resources, licenses, &id, internal) {
        Ok(Some(library)) => Some(library),
        Ok(None) => {
            tracing::debug!("Skipping library '{}': no name and no description", id);
            None
        }
        Err(e) => {
            tracing::error!("Failed to build library '{}': {}", id, e);
            None
        }
    }
}

fn try_build_library(
    resources: &dyn ResourceProvider,
    licenses: &[License],
    id: &str,
    internal: bool,
) -> Result<Option<Library>> {
    let variables = collect_custom_variables(resources, id)?;
    let field = |name: &str| resources.string(&format!("library_{}_{}", id, name));

    let license_id = field("licenseId")?;
    let license = if license_id.is_empty() {
        Some(License {
            license_name: field("licenseVersion")?,
            license_website: field("licenseLink")?,
            license_short_description: substitute(&field("licenseContent")?, &variables),
            ..License::default()
        })
    } else {
        licenses
            .iter()
            .find(|l| l.is_named(&license_id))
            .map(|shared| {
                let mut license = shared.clone();
                license.license_short_description =
                    substitute(&license.license_short_description, &variables);
                license.license_description = substitute(&license.license_description, &variables);
                license
            })
    };

    let library = Library {
        defined_name: id.to_string(),
        author: field("author")?,
        author_website: field("authorWebsite")?,
        library_name: field("libraryName")?,
        library_description: substitute(&field("libraryDescription")?, &variables),
        library_version: field("libraryVersion")?,
        library_website: field("libraryWebsite")?,
        license,
        is_open_source: parse_flag(&field("isOpenSource")?),
        repository_link: field("repositoryLink")?,
        class_path: field("classPath")?,
        is_internal: internal,
    };

    if library.library_name.is_empty() && library.library_description.is_empty() {
        return Ok(None);
    }

    Ok(Some(library))
}

/// Only a case-insensitive "true" is true.
pub fn parse_flag(value: &str) -> bool {
    value.eq_ignore_ascii_case("true")
}

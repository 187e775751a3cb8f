//! Options controlling a resolution pass, loadable from JSON.

use crate::error::{LibsError, Result};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Options for one resolution pass over the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrepareOptions {
    /// Catalog libraries to add by name. Only honored when an exclusion
    /// list is present.
    pub internal_libraries: Vec<String>,
    /// Defined names to drop from the result. `None` means no exclusion set.
    pub exclude_libraries: Option<Vec<String>>,
    pub auto_detect: bool,
    pub check_cached_detection: bool,
    pub sort: bool,
}

impl Default for PrepareOptions {
    fn default() -> Self {
        Self {
            internal_libraries: Vec::new(),
            exclude_libraries: None,
            auto_detect: true,
            check_cached_detection: true,
            sort: true,
        }
    }
}

impl PrepareOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_internal_libraries<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.internal_libraries = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_exclude_libraries<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.exclude_libraries = Some(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_auto_detect(mut self, auto_detect: bool) -> Self {
        self.auto_detect = auto_detect;
        self
    }

    pub fn with_check_cached_detection(mut self, check: bool) -> Self {
        self.check_cached_detection = check;
        self
    }

    pub fn with_sort(mut self, sort: bool) -> Self {
        self.sort = sort;
        self
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| LibsError::Options(e.to_string()))
    }

    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .context(format!("Failed to read options file: {:?}", path))?;
        Ok(Self::from_json_str(&content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let opts = PrepareOptions::default();
        assert!(opts.auto_detect);
        assert!(opts.check_cached_detection);
        assert!(opts.sort);
        assert!(opts.exclude_libraries.is_none());
        assert!(opts.internal_libraries.is_empty());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let opts = PrepareOptions::from_json_str(r#"{"sort": false, "exclude_libraries": ["gson"]}"#).unwrap();
        assert!(!opts.sort);
        assert!(opts.auto_detect);
        assert_eq!(opts.exclude_libraries, Some(vec!["gson".to_string()]));
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            PrepareOptions::from_json_str(r#"{"sort": "yes"}"#),
            Err(LibsError::Options(_))
        ));
    }

    #[test]
    fn test_builder_setters() {
        let opts = PrepareOptions::new()
            .with_auto_detect(false)
            .with_check_cached_detection(false)
            .with_sort(false)
            .with_internal_libraries(["okhttp"])
            .with_exclude_libraries(Vec::<String>::new());

        assert!(!opts.auto_detect);
        assert_eq!(opts.internal_libraries, vec!["okhttp"]);
        assert_eq!(opts.exclude_libraries, Some(Vec::new()));
    }
}

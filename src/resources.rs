//! String resource providers.
//!
//! The engine only ever asks for a flat key and expects an empty string when
//! the key is absent. Providers return `Err` only when the lookup itself
//! fails; the builder treats that as a failed record, not a missing value.

use crate::error::{LibsError, Result};
use anyhow::Context;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

pub trait ResourceProvider {
    /// Returns the value stored under `key`, or an empty string if absent.
    fn string(&self, key: &str) -> Result<String>;
}

impl<F> ResourceProvider for F
where
    F: Fn(&str) -> Result<String>,
{
    fn string(&self, key: &str) -> Result<String> {
        self(key)
    }
}

/// In-memory key/value resources.
#[derive(Debug, Clone, Default)]
pub struct MapResources {
    values: HashMap<String, String>,
}

impl MapResources {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// All keys, sorted. Useful as the candidate list for key classification.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.values.keys().cloned().collect();
        keys.sort();
        keys
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MapResources {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

impl ResourceProvider for MapResources {
    fn string(&self, key: &str) -> Result<String> {
        Ok(self.values.get(key).cloned().unwrap_or_default())
    }
}

/// Resources loaded from a flat JSON object, e.g. `{"library_x_author": "Jane"}`.
#[derive(Debug, Clone, Default)]
pub struct JsonResources {
    inner: MapResources,
}

impl JsonResources {
    pub fn from_json_str(content: &str) -> Result<Self> {
        let value: serde_json::Value =
            serde_json::from_str(content).map_err(|e| LibsError::MalformedBundle(e.to_string()))?;

        let object = value
            .as_object()
            .ok_or_else(|| LibsError::MalformedBundle("top-level value is not an object".to_string()))?;

        let mut inner = MapResources::new();
        for (key, value) in object {
            match value {
                serde_json::Value::String(s) => {
                    inner.insert(key.as_str(), s.as_str());
                }
                // Generated bundles sometimes carry booleans and numbers unquoted
                serde_json::Value::Bool(_) | serde_json::Value::Number(_) => {
                    inner.insert(key.as_str(), value.to_string());
                }
                _ => {
                    return Err(LibsError::MalformedBundle(format!(
                        "value of '{}' is not a string",
                        key
                    )))
                }
            }
        }

        Ok(Self { inner })
    }

    pub fn from_path(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .context(format!("Failed to read resource bundle: {:?}", path))?;
        let resources = Self::from_json_str(&content)
            .context(format!("Failed to parse resource bundle: {:?}", path))?;
        Ok(resources)
    }

    pub fn keys(&self) -> Vec<String> {
        self.inner.keys()
    }
}

impl ResourceProvider for JsonResources {
    fn string(&self, key: &str) -> Result<String> {
        self.inner.string(key)
    }
}

//! Persistent cache of auto-detected library names, keyed by app version.
//!
//! Detection can be slow, so the names it found are stored together with the
//! application version code. As long as the version matches, later passes
//! resolve those names instead of detecting again.
//!
//! # Storage
//!
//! - [`MemoryCache`]: process-local, mainly for tests and embedding
//! - [`FileCache`]: one small JSON file per application identity in the
//!   platform cache directory

use crate::error::{LibsError, Result};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};

/// Delimiter joining the cached defined names.
pub const NAME_DELIMITER: &str = ";";

/// Version value reported when nothing has been cached yet.
pub const NO_VERSION: i32 = -1;

pub trait DetectionCache {
    fn version(&self) -> Result<i32>;
    fn cached_names(&self) -> Result<String>;
    fn store(&self, version: i32, names: &str) -> Result<()>;
}

/// Supplies the running application's version code, if known.
pub trait AppVersion {
    fn current_version_code(&self) -> Option<i32>;
}

impl AppVersion for Option<i32> {
    fn current_version_code(&self) -> Option<i32> {
        *self
    }
}

impl<F> AppVersion for F
where
    F: Fn() -> Option<i32>,
{
    fn current_version_code(&self) -> Option<i32> {
        self()
    }
}

/// Joins defined names into the cached representation.
pub fn join_names<S: AsRef<str>>(names: &[S]) -> String {
    names
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(NAME_DELIMITER)
}

/// Splits the cached representation, skipping empty segments.
pub fn split_names(joined: &str) -> Vec<&str> {
    joined.split(NAME_DELIMITER).filter(|n| !n.is_empty()).collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct CacheRecord {
    version_code: i32,
    auto_detected_libraries: String,
}

impl Default for CacheRecord {
    fn default() -> Self {
        Self {
            version_code: NO_VERSION,
            auto_detected_libraries: String::new(),
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoryCache {
    record: RefCell<CacheRecord>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DetectionCache for MemoryCache {
    fn version(&self) -> Result<i32> {
        Ok(self.record.borrow().version_code)
    }

    fn cached_names(&self) -> Result<String> {
        Ok(self.record.borrow().auto_detected_libraries.clone())
    }

    fn store(&self, version: i32, names: &str) -> Result<()> {
        *self.record.borrow_mut() = CacheRecord {
            version_code: version,
            auto_detected_libraries: names.to_string(),
        };
        Ok(())
    }
}

/// File-backed cache scoped by application identity.
#[derive(Debug, Clone)]
pub struct FileCache {
    path: PathBuf,
}

impl FileCache {
    /// Cache file for `app_id` inside `dir`.
    pub fn in_dir(dir: &Path, app_id: &str) -> Self {
        Self {
            path: dir.join(cache_file_name(app_id)),
        }
    }

    /// Cache file for `app_id` in the platform cache directory.
    pub fn for_app(app_id: &str) -> Result<Self> {
        Ok(Self::in_dir(&default_cache_dir()?, app_id))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<CacheRecord> {
        if !self.path.exists() {
            return Ok(CacheRecord::default());
        }

        let content = fs::read_to_string(&self.path).map_err(|source| LibsError::CacheIo {
            path: self.path.clone(),
            source,
        })?;
        Ok(serde_json::from_str(&content)?)
    }
}

impl DetectionCache for FileCache {
    fn version(&self) -> Result<i32> {
        Ok(self.read()?.version_code)
    }

    fn cached_names(&self) -> Result<String> {
        Ok(self.read()?.auto_detected_libraries)
    }

    fn store(&self, version: i32, names: &str) -> Result<()> {
        let io_err = |source: std::io::Error| LibsError::CacheIo {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }

        let record = CacheRecord {
            version_code: version,
            auto_detected_libraries: names.to_string(),
        };
        let content = serde_json::to_string_pretty(&record)?;
        fs::write(&self.path, content).map_err(io_err)?;

        Ok(())
    }
}

/// Platform cache directory for detection results.
fn default_cache_dir() -> Result<PathBuf> {
    let missing = |var: &'static str| LibsError::NoCacheDir { var };

    #[cfg(target_os = "macos")]
    {
        let home = std::env::var("HOME").map_err(|_| missing("HOME"))?;
        Ok(PathBuf::from(format!("{}/Library/Caches/AboutLibs", home)))
    }

    #[cfg(target_os = "windows")]
    {
        let appdata = std::env::var("LOCALAPPDATA").map_err(|_| missing("LOCALAPPDATA"))?;
        Ok(PathBuf::from(format!("{}\\AboutLibs", appdata)))
    }

    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        if let Ok(xdg) = std::env::var("XDG_CACHE_HOME") {
            if !xdg.is_empty() {
                return Ok(PathBuf::from(xdg).join("aboutlibs"));
            }
        }
        let home = std::env::var("HOME").map_err(|_| missing("HOME"))?;
        Ok(PathBuf::from(format!("{}/.cache/aboutlibs", home)))
    }
}

/// Hash-based file name so any application identity is a safe file name.
fn cache_file_name(app_id: &str) -> String {
    format!("{:x}.json", md5::compute(app_id.as_bytes()))
}

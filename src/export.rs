//! JSON export of a resolved library list for display frontends.

use crate::error::{LibsError, Result};
use crate::library::Library;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const EXPORT_FILE_NAME: &str = "libraries.json";

#[derive(Debug, Serialize)]
struct ExportManifest<'a> {
    export_date: String,
    count: usize,
    libraries: &'a [Library],
}

/// Serializes `libraries` with an export timestamp.
pub fn to_json(libraries: &[Library]) -> Result<String> {
    let manifest = ExportManifest {
        export_date: chrono::Local::now().to_rfc3339(),
        count: libraries.len(),
        libraries,
    };
    Ok(serde_json::to_string_pretty(&manifest)?)
}

/// Writes `libraries.json` into `export_dir`, creating the directory.
pub fn export_libraries(libraries: &[Library], export_dir: &Path) -> Result<PathBuf> {
    let io_err = |path: &Path| {
        let path = path.to_path_buf();
        move |source: std::io::Error| LibsError::Export { path, source }
    };

    fs::create_dir_all(export_dir).map_err(io_err(export_dir))?;

    let export_path = export_dir.join(EXPORT_FILE_NAME);
    let content = to_json(libraries)?;
    fs::write(&export_path, content).map_err(io_err(&export_path))?;

    tracing::debug!("Exported {} libraries to {:?}", libraries.len(), export_path);
    Ok(export_path)
}

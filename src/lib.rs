//! AboutLibs Core Library
//!
//! Aggregates metadata about the libraries bundled into an application
//! (name, author, version, license, website) from generated string
//! resources, for display on an "about" or "open source licenses" screen.
//!
//! # Architecture
//!
//! This library is designed to be consumed directly from Rust or via FFI by
//! native UI frontends:
//! - **macOS**: SwiftUI app using static lib via Swift ↔ Rust FFI
//! - **Windows**: WPF app using DLL via C# ↔ Rust P/Invoke
//!
//! # Resource Layout
//!
//! Resources are a flat key/value namespace:
//! - `define_license_{id}`, `define_int_{id}`, `define_{id}` declare a
//!   license, an internal library or an external library
//! - `license_{id}_licenseName` and friends hold license fields
//! - `library_{id}_libraryName` and friends hold library fields
//!
//! # Modules
//!
//! ## Catalog (`registry` module)
//! - `Libs::new()` - Build licenses and libraries from resource names
//! - `Libs::prepare_libraries()` - Merge detected, external and manual entries
//! - `Libs::library()` / `search()` - Name lookup and substring search
//!
//! ## Record Building (`keys`, `variables`, `builder` modules)
//! - `classify()` - Bucket resource names by definition prefix
//! - `substitute()` - Fill `<<<NAME>>>` placeholders
//! - `build_license()` / `build_library()` - Resolve records, failing closed
//!
//! ## Collaborators (`resources`, `detect`, `cache` modules)
//! - `ResourceProvider` - Key to string lookup
//! - `Detector` - Runtime detection of libraries in use
//! - `DetectionCache` / `AppVersion` - Per-version cache of detection results
//!
//! ## Overrides (`overrides` module)
//! - `Libs::modify_libraries()` - Patch fields of uniquely matched libraries

pub mod builder;
pub mod cache;
pub mod config;
pub mod detect;
pub mod error;
pub mod export;
pub mod ffi;
pub mod keys;
pub mod library;
pub mod overrides;
pub mod registry;
pub mod resources;
pub mod variables;

pub use cache::{AppVersion, DetectionCache, FileCache, MemoryCache};
pub use config::PrepareOptions;
pub use detect::{ClassPathDetector, Detector, NoDetection};
pub use error::{LibsError, Result};
pub use library::{Library, License};
pub use overrides::{LibraryField, Modifications};
pub use registry::{search, Libs, UNLIMITED};
pub use resources::{JsonResources, MapResources, ResourceProvider};

//! FFI (Foreign Function Interface) bindings for native display frontends.
//!
//! # Memory Management
//!
//! - Rust allocates memory and returns pointers to Swift/C#
//! - The calling code MUST call the corresponding `_free` functions to prevent leaks
//! - Strings are null-terminated UTF-8
//!
//! # Usage from Swift (macOS)
//!
//! ```swift
//! let libs = aboutlibs_open("/path/to/strings.json")
//! defer { aboutlibs_free(libs) }
//!
//! let list = aboutlibs_prepare(libs, nil)
//! defer { aboutlibs_free_library_list(list) }
//!
//! for i in 0..<aboutlibs_library_list_count(list) {
//!     let lib = aboutlibs_library_list_get(list, i)
//!     // Use library data...
//!     aboutlibs_free_library(lib)
//! }
//! ```
//!
//! # Usage from C# (Windows)
//!
//! ```csharp
//! [DllImport("aboutlibs_core.dll")]
//! private static extern IntPtr aboutlibs_open(string resourcesPath);
//!
//! [DllImport("aboutlibs_core.dll")]
//! private static extern void aboutlibs_free(IntPtr libs);
//! ```

use crate::config::PrepareOptions;
use crate::export::to_json;
use crate::library::Library;
use crate::resources::JsonResources;
use crate::Libs;
use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_int};
use std::path::PathBuf;
use std::ptr;

// ============================================================================
// C-Compatible Types
// ============================================================================

/// Opaque handle to a library catalog
pub struct CLibs {
    libs: Libs,
}

/// Opaque handle to a resolved list of libraries
pub struct CLibraryList {
    libraries: Vec<Library>,
}

/// C-compatible library information
#[repr(C)]
pub struct CLibrary {
    pub defined_name: *mut c_char,
    pub author: *mut c_char,
    pub author_website: *mut c_char,
    pub library_name: *mut c_char,
    pub library_description: *mut c_char,
    pub library_version: *mut c_char,
    pub library_website: *mut c_char,
    pub repository_link: *mut c_char,
    /// License name (null if the library has no license)
    pub license_name: *mut c_char,
    /// License website (null if the library has no license)
    pub license_website: *mut c_char,
    /// Short license text (null if the library has no license)
    pub license_short_description: *mut c_char,
    /// Full license text (null if the library has no license)
    pub license_description: *mut c_char,
    pub is_open_source: c_int,
    pub is_internal: c_int,
}

// ============================================================================
// Catalog
// ============================================================================

/// Load a catalog from a flat JSON resource bundle.
/// Returns null if the bundle cannot be read.
/// Caller MUST call aboutlibs_free() when done.
#[no_mangle]
pub extern "C" fn aboutlibs_open(resources_path: *const c_char) -> *mut CLibs {
    let path = match c_char_to_str(resources_path) {
        Some(p) => PathBuf::from(p),
        None => return ptr::null_mut(),
    };

    match JsonResources::from_path(&path) {
        Ok(resources) => {
            let libs = Libs::new(&resources, &resources.keys());
            Box::into_raw(Box::new(CLibs { libs }))
        }
        Err(e) => {
            tracing::error!("Error opening resource bundle: {:#}", e);
            ptr::null_mut()
        }
    }
}

/// Free a catalog returned by aboutlibs_open().
#[no_mangle]
pub extern "C" fn aboutlibs_free(libs: *mut CLibs) {
    if !libs.is_null() {
        unsafe {
            let _ = Box::from_raw(libs);
        }
    }
}

// ============================================================================
// Resolution and Search
// ============================================================================

/// Run a resolution pass. `options_json` may be null for the default options.
/// Returns null on invalid input.
/// Caller MUST call aboutlibs_free_library_list() when done.
#[no_mangle]
pub extern "C" fn aboutlibs_prepare(libs: *const CLibs, options_json: *const c_char) -> *mut CLibraryList {
    if libs.is_null() {
        return ptr::null_mut();
    }

    let options = if options_json.is_null() {
        PrepareOptions::default()
    } else {
        let parsed = c_char_to_str(options_json)
            .ok_or_else(|| "options are not valid UTF-8".to_string())
            .and_then(|json| PrepareOptions::from_json_str(json).map_err(|e| e.to_string()));
        match parsed {
            Ok(options) => options,
            Err(e) => {
                tracing::error!("Error parsing options: {}", e);
                return ptr::null_mut();
            }
        }
    };

    unsafe {
        let libraries = (*libs).libs.prepare_libraries(&options);
        Box::into_raw(Box::new(CLibraryList { libraries }))
    }
}

/// Search libraries by name or defined name. `limit` of -1 means unlimited.
/// Caller MUST call aboutlibs_free_library_list() when done.
#[no_mangle]
pub extern "C" fn aboutlibs_find(libs: *const CLibs, term: *const c_char, limit: c_int) -> *mut CLibraryList {
    if libs.is_null() {
        return ptr::null_mut();
    }

    let term = match c_char_to_str(term) {
        Some(t) => t,
        None => return ptr::null_mut(),
    };

    unsafe {
        let libraries = (*libs).libs.find_library(term, limit);
        Box::into_raw(Box::new(CLibraryList { libraries }))
    }
}

/// Get the number of libraries in a list.
#[no_mangle]
pub extern "C" fn aboutlibs_library_list_count(list: *const CLibraryList) -> c_int {
    if list.is_null() {
        return 0;
    }
    unsafe { (*list).libraries.len() as c_int }
}

/// Get library information at a specific index.
/// Caller MUST call aboutlibs_free_library() when done.
#[no_mangle]
pub extern "C" fn aboutlibs_library_list_get(list: *const CLibraryList, index: c_int) -> *mut CLibrary {
    if list.is_null() || index < 0 {
        return ptr::null_mut();
    }

    unsafe {
        let libraries = &(*list).libraries;
        match libraries.get(index as usize) {
            Some(lib) => Box::into_raw(Box::new(to_c_library(lib))),
            None => ptr::null_mut(),
        }
    }
}

/// Serialize a list to JSON.
/// Caller MUST call aboutlibs_free_string() when done.
#[no_mangle]
pub extern "C" fn aboutlibs_library_list_json(list: *const CLibraryList) -> *mut c_char {
    if list.is_null() {
        return ptr::null_mut();
    }

    unsafe {
        match to_json(&(*list).libraries) {
            Ok(json) => string_to_c_char(&json),
            Err(e) => {
                tracing::error!("Error serializing libraries: {}", e);
                ptr::null_mut()
            }
        }
    }
}

/// Free a list returned by aboutlibs_prepare() or aboutlibs_find().
#[no_mangle]
pub extern "C" fn aboutlibs_free_library_list(list: *mut CLibraryList) {
    if !list.is_null() {
        unsafe {
            let _ = Box::from_raw(list);
        }
    }
}

/// Free a CLibrary struct returned by aboutlibs_library_list_get().
#[no_mangle]
pub extern "C" fn aboutlibs_free_library(library: *mut CLibrary) {
    if !library.is_null() {
        unsafe {
            let l = Box::from_raw(library);
            free_c_char(l.defined_name);
            free_c_char(l.author);
            free_c_char(l.author_website);
            free_c_char(l.library_name);
            free_c_char(l.library_description);
            free_c_char(l.library_version);
            free_c_char(l.library_website);
            free_c_char(l.repository_link);
            free_c_char(l.license_name);
            free_c_char(l.license_website);
            free_c_char(l.license_short_description);
            free_c_char(l.license_description);
        }
    }
}

// ============================================================================
// String Management
// ============================================================================

/// Free a string returned by FFI functions.
#[no_mangle]
pub extern "C" fn aboutlibs_free_string(s: *mut c_char) {
    free_c_char(s);
}

// ============================================================================
// Helper Functions
// ============================================================================

fn to_c_library(lib: &Library) -> CLibrary {
    let license_field = |get: fn(&crate::License) -> &str| {
        lib.license
            .as_ref()
            .map(|l| string_to_c_char(get(l)))
            .unwrap_or(ptr::null_mut())
    };

    CLibrary {
        defined_name: string_to_c_char(&lib.defined_name),
        author: string_to_c_char(&lib.author),
        author_website: string_to_c_char(&lib.author_website),
        library_name: string_to_c_char(&lib.library_name),
        library_description: string_to_c_char(&lib.library_description),
        library_version: string_to_c_char(&lib.library_version),
        library_website: string_to_c_char(&lib.library_website),
        repository_link: string_to_c_char(&lib.repository_link),
        license_name: license_field(|l| l.license_name.as_str()),
        license_website: license_field(|l| l.license_website.as_str()),
        license_short_description: license_field(|l| l.license_short_description.as_str()),
        license_description: license_field(|l| l.license_description.as_str()),
        is_open_source: lib.is_open_source as c_int,
        is_internal: lib.is_internal as c_int,
    }
}

fn c_char_to_str<'a>(s: *const c_char) -> Option<&'a str> {
    if s.is_null() {
        return None;
    }
    unsafe { CStr::from_ptr(s).to_str().ok() }
}

fn string_to_c_char(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(c_str) => c_str.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

fn free_c_char(s: *mut c_char) {
    if !s.is_null() {
        unsafe {
            let _ = CString::from_raw(s);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn read_and_free(s: *mut c_char) -> String {
        let value = c_char_to_str(s).unwrap_or_default().to_string();
        aboutlibs_free_string(s);
        value
    }

    #[test]
    fn test_open_prepare_and_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("strings.json");
        fs::write(
            &path,
            r#"{
                "define_okhttp": "",
                "library_okhttp_libraryName": "OkHttp",
                "library_okhttp_licenseVersion": "Apache 2.0",
                "library_okhttp_isOpenSource": "true",
                "define_gson": "",
                "library_gson_libraryName": "Gson"
            }"#,
        )
        .unwrap();
        let c_path = CString::new(path.to_string_lossy().to_string()).unwrap();

        let libs = aboutlibs_open(c_path.as_ptr());
        assert!(!libs.is_null());

        let list = aboutlibs_prepare(libs, ptr::null());
        assert_eq!(aboutlibs_library_list_count(list), 2);

        let lib = aboutlibs_library_list_get(list, 1);
        assert!(!lib.is_null());
        unsafe {
            assert_eq!(c_char_to_str((*lib).library_name), Some("OkHttp"));
            assert_eq!(c_char_to_str((*lib).license_name), Some("Apache 2.0"));
            assert_eq!((*lib).is_open_source, 1);
        }
        aboutlibs_free_library(lib);
        assert!(aboutlibs_library_list_get(list, 2).is_null());
        assert!(aboutlibs_library_list_get(list, -1).is_null());

        let json = read_and_free(aboutlibs_library_list_json(list));
        assert!(json.contains("\"okhttp\""));
        aboutlibs_free_library_list(list);

        let term = CString::new("gs").unwrap();
        let found = aboutlibs_find(libs, term.as_ptr(), -1);
        assert_eq!(aboutlibs_library_list_count(found), 1);
        aboutlibs_free_library_list(found);

        let bad = CString::new("{not json").unwrap();
        assert!(aboutlibs_prepare(libs, bad.as_ptr()).is_null());

        aboutlibs_free(libs);
    }

    #[test]
    fn test_null_handles() {
        assert!(aboutlibs_open(ptr::null()).is_null());
        assert!(aboutlibs_prepare(ptr::null(), ptr::null()).is_null());
        assert_eq!(aboutlibs_library_list_count(ptr::null()), 0);
        aboutlibs_free(ptr::null_mut());
        aboutlibs_free_library_list(ptr::null_mut());
        aboutlibs_free_library(ptr::null_mut());
    }
}

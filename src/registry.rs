//! Library catalog and resolution.
//!
//! [`Libs`] is built once from a resource provider and a list of candidate
//! resource names. It owns the resolved licenses plus the internal and
//! external libraries, and answers the lookups a display layer needs.
//!
//! # Resolution pass
//!
//! [`Libs::prepare_libraries`] merges, in order:
//! 1. auto-detected libraries (cached per app version when allowed)
//! 2. every external library
//! 3. manually named catalog libraries, only when an exclusion list is set
//!
//! then drops excluded defined names and optionally sorts by library name.
//! Overlapping sources are not deduplicated.

use crate::builder::{build_library, build_license};
use crate::cache::{join_names, split_names, AppVersion, DetectionCache, MemoryCache, NO_VERSION};
use crate::config::PrepareOptions;
use crate::detect::{Detector, NoDetection};
use crate::keys::classify;
use crate::library::{sort_by_name, Library, License};
use crate::resources::ResourceProvider;
use std::collections::HashMap;

/// `limit` value meaning "no limit" for searches.
pub const UNLIMITED: i32 = -1;

pub struct Libs {
    licenses: Vec<License>,
    internal: Vec<Library>,
    external: Vec<Library>,
    detector: Box<dyn Detector>,
    cache: Box<dyn DetectionCache>,
    app_version: Box<dyn AppVersion>,
}

impl std::fmt::Debug for Libs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Libs")
            .field("licenses", &self.licenses.len())
            .field("internal", &self.internal.len())
            .field("external", &self.external.len())
            .finish()
    }
}

impl Libs {
    /// Builds the catalog from the resource names in `fields`.
    ///
    /// Licenses are built first since libraries reference them by id.
    /// Entries that fail to build are logged and skipped.
    pub fn new<S: AsRef<str>>(resources: &dyn ResourceProvider, fields: &[S]) -> Self {
        let buckets = classify(fields);

        let licenses: Vec<License> = buckets
            .licenses
            .iter()
            .filter_map(|id| build_license(resources, id))
            .collect();

        let internal: Vec<Library> = buckets
            .internal
            .iter()
            .filter_map(|id| build_library(resources, &licenses, id, true))
            .collect();

        let external: Vec<Library> = buckets
            .external
            .iter()
            .filter_map(|id| build_library(resources, &licenses, id, false))
            .collect();

        tracing::debug!(
            "Catalog built: {} licenses, {} internal, {} external",
            licenses.len(),
            internal.len(),
            external.len()
        );

        Self {
            licenses,
            internal,
            external,
            detector: Box::new(NoDetection),
            cache: Box::new(MemoryCache::new()),
            app_version: Box::new(None::<i32>),
        }
    }

    pub fn with_detector(mut self, detector: impl Detector + 'static) -> Self {
        self.detector = Box::new(detector);
        self
    }

    pub fn with_cache(mut self, cache: impl DetectionCache + 'static) -> Self {
        self.cache = Box::new(cache);
        self
    }

    pub fn with_app_version(mut self, app_version: impl AppVersion + 'static) -> Self {
        self.app_version = Box::new(app_version);
        self
    }

    pub fn internal_libraries(&self) -> Vec<Library> {
        self.internal.clone()
    }

    pub fn external_libraries(&self) -> Vec<Library> {
        self.external.clone()
    }

    pub fn licenses(&self) -> Vec<License> {
        self.licenses.clone()
    }

    /// Internal libraries followed by external ones.
    pub fn libraries(&self) -> Vec<Library> {
        self.all().cloned().collect()
    }

    fn all(&self) -> impl Iterator<Item = &Library> {
        self.internal.iter().chain(self.external.iter())
    }

    /// Case-insensitive exact match on library name or defined name.
    pub fn library(&self, name: &str) -> Option<Library> {
        self.all().find(|lib| lib.is_named(name)).cloned()
    }

    /// Case-insensitive exact match on license name or defined name.
    pub fn license(&self, name: &str) -> Option<License> {
        self.licenses.iter().find(|l| l.is_named(name)).cloned()
    }

    /// Searches all libraries by name or defined name.
    pub fn find_library(&self, term: &str, limit: i32) -> Vec<Library> {
        let all: Vec<Library> = self.libraries();
        search(&all, term, false, limit).into_iter().cloned().collect()
    }

    pub fn find_in_internal_library(&self, term: &str, id_only: bool, limit: i32) -> Vec<Library> {
        search(&self.internal, term, id_only, limit).into_iter().cloned().collect()
    }

    pub fn find_in_external_library(&self, term: &str, id_only: bool, limit: i32) -> Vec<Library> {
        search(&self.external, term, id_only, limit).into_iter().cloned().collect()
    }

    pub(crate) fn pools_mut(&mut self) -> (&mut Vec<Library>, &mut Vec<Library>) {
        (&mut self.external, &mut self.internal)
    }

    /// Runs one resolution pass and returns the libraries to display.
    pub fn prepare_libraries(&self, options: &PrepareOptions) -> Vec<Library> {
        let excluding = options.exclude_libraries.is_some();
        let mut by_name: HashMap<String, Library> = HashMap::new();
        let mut result: Vec<Library> = Vec::new();

        if options.auto_detect {
            let detected = self.auto_detected_libraries(options.check_cached_detection);
            if excluding {
                for lib in &detected {
                    by_name.insert(lib.defined_name.clone(), lib.clone());
                }
            }
            result.extend(detected);
        }

        for lib in &self.external {
            if excluding {
                by_name.insert(lib.defined_name.clone(), lib.clone());
            }
            result.push(lib.clone());
        }

        // Manual additions are only applied together with an exclusion list.
        for name in &options.internal_libraries {
            if let Some(lib) = self.library(name) {
                if excluding {
                    by_name.insert(lib.defined_name.clone(), lib.clone());
                    result.push(lib);
                }
            }
        }

        if let Some(excludes) = &options.exclude_libraries {
            for excluded in excludes {
                if let Some(lib) = by_name.get(excluded) {
                    if let Some(pos) = result.iter().position(|l| l == lib) {
                        result.remove(pos);
                    }
                }
            }
        }

        if options.sort {
            sort_by_name(&mut result);
        }

        result
    }

    /// Libraries found by the detector, served from the cache when the
    /// cached version matches the running one.
    pub fn auto_detected_libraries(&self, check_cached_detection: bool) -> Vec<Library> {
        let current = self.app_version.current_version_code();
        let cached_version = self.cache.version().unwrap_or_else(|e| {
            tracing::warn!("Failed to read detection cache: {}", e);
            NO_VERSION
        });
        let up_to_date = current == Some(cached_version);

        if check_cached_detection && up_to_date {
            match self.cache.cached_names() {
                Ok(joined) => {
                    let names = split_names(&joined);
                    if !names.is_empty() {
                        return names.into_iter().filter_map(|name| self.library(name)).collect();
                    }
                }
                Err(e) => tracing::warn!("Failed to read cached detection results: {}", e),
            }
        }

        let known = self.libraries();
        let detected = self.detector.detect(&known);

        if let Some(version) = current {
            if !up_to_date && !detected.is_empty() {
                let names: Vec<&str> = detected.iter().map(|l| l.defined_name.as_str()).collect();
                if let Err(e) = self.cache.store(version, &join_names(&names)) {
                    tracing::warn!("Failed to update detection cache: {}", e);
                }
            }
        }

        detected
    }
}

/// Case-insensitive substring search, in pool order.
///
/// Matches the defined name only when `id_only`, otherwise the defined name
/// or the library name. `limit` of [`UNLIMITED`] collects every match; any
/// other value stops once that many are held, so zero or a negative limit
/// yields nothing.
pub fn search<'a>(pool: &'a [Library], term: &str, id_only: bool, limit: i32) -> Vec<&'a Library> {
    matching_positions(pool, term, id_only, limit)
        .into_iter()
        .map(|pos| &pool[pos])
        .collect()
}

pub(crate) fn matching_positions(pool: &[Library], term: &str, id_only: bool, limit: i32) -> Vec<usize> {
    let term = term.to_lowercase();
    let mut found = Vec::new();

    for (pos, lib) in pool.iter().enumerate() {
        if limit != UNLIMITED && found.len() as i64 >= i64::from(limit) {
            break;
        }

        let id_match = lib.defined_name.to_lowercase().contains(&term);
        let is_match = if id_only {
            id_match
        } else {
            id_match || lib.library_name.to_lowercase().contains(&term)
        };

        if is_match {
            found.push(pos);
        }
    }

    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::MapResources;
    use std::cell::Cell;
    use std::rc::Rc;

    fn catalog() -> (MapResources, Vec<String>) {
        let res: MapResources = [
            ("define_license_mit", ""),
            ("license_mit_licenseName", "MIT License"),
            ("define_int_okhttp", ""),
            ("library_okhttp_libraryName", "OkHttp"),
            ("library_okhttp_classPath", "okhttp3.OkHttpClient"),
            ("library_okhttp_licenseId", "mit"),
            ("define_int_okio", ""),
            ("library_okio_libraryName", "Okio"),
            ("define_gson", ""),
            ("library_gson_libraryName", "Gson"),
            ("library_gson_classPath", "com.google.gson.Gson"),
            ("define_broken", ""),
        ]
        .into_iter()
        .collect();
        let keys = res.keys();
        (res, keys)
    }

    fn pool(entries: &[(&str, &str)]) -> Vec<Library> {
        entries
            .iter()
            .map(|(id, name)| Library {
                defined_name: id.to_string(),
                library_name: name.to_string(),
                ..Library::default()
            })
            .collect()
    }

    fn ids(libs: &[Library]) -> Vec<&str> {
        libs.iter().map(|l| l.defined_name.as_str()).collect()
    }

    #[test]
    fn test_catalog_construction() {
        let (res, keys) = catalog();
        let libs = Libs::new(&res, &keys);

        assert_eq!(libs.licenses().len(), 1);
        assert_eq!(ids(&libs.internal_libraries()), vec!["okhttp", "okio"]);
        assert_eq!(ids(&libs.external_libraries()), vec!["gson"]);
        assert_eq!(ids(&libs.libraries()), vec!["okhttp", "okio", "gson"]);
        assert!(libs.internal_libraries().iter().all(|l| l.is_internal));
        assert!(!libs.external_libraries()[0].is_internal);
        assert_eq!(
            libs.library("okhttp").and_then(|l| l.license).map(|l| l.license_name),
            Some("MIT License".to_string())
        );
    }

    #[test]
    fn test_library_lookup() {
        let (res, keys) = catalog();
        let libs = Libs::new(&res, &keys);

        assert_eq!(libs.library("OKHTTP").map(|l| l.defined_name), Some("okhttp".to_string()));
        assert_eq!(libs.library("Gson").map(|l| l.defined_name), Some("gson".to_string()));
        assert!(libs.library("ok").is_none());
        assert_eq!(libs.license("mit license").map(|l| l.defined_name), Some("mit".to_string()));
        assert!(libs.license("gpl").is_none());
    }

    #[test]
    fn test_search_unbounded_matches_name_or_id() {
        let p = pool(&[("okhttp", "OkHttp"), ("gson", "Gson"), ("retro", "BrOKen"), ("okio", "Okio")]);
        let found = search(&p, "ok", false, UNLIMITED);
        let found: Vec<&str> = found.iter().map(|l| l.defined_name.as_str()).collect();
        assert_eq!(found, vec!["okhttp", "retro", "okio"]);
    }

    #[test]
    fn test_search_id_only_with_limit() {
        let p = pool(&[("x", "a-lib"), ("alpha", "Alpha"), ("beta", "Beta")]);
        let found = search(&p, "a", true, 1);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].defined_name, "alpha");

        assert_eq!(search(&p, "a", true, 2).len(), 2);
    }

    #[test]
    fn test_search_non_sentinel_limits_stop_immediately() {
        let p = pool(&[("alpha", "Alpha"), ("beta", "Beta")]);
        assert!(search(&p, "a", false, 0).is_empty());
        assert!(search(&p, "a", false, -2).is_empty());
        assert_eq!(search(&p, "a", false, UNLIMITED).len(), 2);
    }

    #[test]
    fn test_find_wrappers() {
        let (res, keys) = catalog();
        let libs = Libs::new(&res, &keys);

        assert_eq!(ids(&libs.find_library("o", UNLIMITED)), vec!["okhttp", "okio", "gson"]);
        assert_eq!(ids(&libs.find_in_internal_library("okio", true, UNLIMITED)), vec!["okio"]);
        assert!(libs.find_in_external_library("okio", true, UNLIMITED).is_empty());
    }

    #[test]
    fn test_prepare_without_detection_sorts_external() {
        let (res, keys) = catalog();
        let libs = Libs::new(&res, &keys);

        let opts = PrepareOptions::new().with_auto_detect(false);
        assert_eq!(ids(&libs.prepare_libraries(&opts)), vec!["gson"]);
    }

    #[test]
    fn test_manual_internal_needs_exclusion_list() {
        let (res, keys) = catalog();
        let libs = Libs::new(&res, &keys);

        let opts = PrepareOptions::new()
            .with_auto_detect(false)
            .with_internal_libraries(["okio", "missing"]);
        assert_eq!(ids(&libs.prepare_libraries(&opts)), vec!["gson"]);

        let opts = opts.with_exclude_libraries(Vec::<String>::new());
        assert_eq!(ids(&libs.prepare_libraries(&opts)), vec!["gson", "okio"]);
    }

    #[test]
    fn test_exclusion_is_exact_and_case_sensitive() {
        let (res, keys) = catalog();
        let libs = Libs::new(&res, &keys);

        let opts = PrepareOptions::new()
            .with_auto_detect(false)
            .with_internal_libraries(["okio"])
            .with_exclude_libraries(["gson", "OKIO"]);
        assert_eq!(ids(&libs.prepare_libraries(&opts)), vec!["okio"]);
    }

    #[test]
    fn test_duplicates_across_sources_are_kept() {
        let (res, keys) = catalog();
        let detector = |known: &[Library]| known.iter().filter(|l| l.defined_name == "gson").cloned().collect::<Vec<_>>();
        let libs = Libs::new(&res, &keys).with_detector(detector);

        let opts = PrepareOptions::new().with_check_cached_detection(false);
        assert_eq!(ids(&libs.prepare_libraries(&opts)), vec!["gson", "gson"]);

        let opts = opts.with_exclude_libraries(["gson"]);
        assert_eq!(ids(&libs.prepare_libraries(&opts)), vec!["gson"]);
    }

    #[test]
    fn test_unsorted_keeps_source_order() {
        let (res, keys) = catalog();
        let detector = crate::detect::ClassPathDetector::new(["okhttp3.OkHttpClient"]);
        let libs = Libs::new(&res, &keys).with_detector(detector);

        let opts = PrepareOptions::new().with_sort(false).with_check_cached_detection(false);
        assert_eq!(ids(&libs.prepare_libraries(&opts)), vec!["okhttp", "gson"]);
    }

    struct CountingDetector {
        calls: Rc<Cell<usize>>,
    }

    impl Detector for CountingDetector {
        fn detect(&self, known: &[Library]) -> Vec<Library> {
            self.calls.set(self.calls.get() + 1);
            known.iter().filter(|l| !l.class_path.is_empty()).cloned().collect()
        }
    }

    #[test]
    fn test_detection_cached_per_version() {
        let (res, keys) = catalog();
        let calls = Rc::new(Cell::new(0));
        let libs = Libs::new(&res, &keys)
            .with_detector(CountingDetector { calls: calls.clone() })
            .with_app_version(Some(3));

        assert_eq!(ids(&libs.auto_detected_libraries(true)), vec!["okhttp", "gson"]);
        assert_eq!(calls.get(), 1);

        assert_eq!(ids(&libs.auto_detected_libraries(true)), vec!["okhttp", "gson"]);
        assert_eq!(calls.get(), 1);

        // Bypassing the cache always detects
        libs.auto_detected_libraries(false);
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_stale_cache_is_refreshed() {
        let (res, keys) = catalog();
        let cache = MemoryCache::new();
        cache.store(1, "okio").unwrap();

        let calls = Rc::new(Cell::new(0));
        let libs = Libs::new(&res, &keys)
            .with_detector(CountingDetector { calls: calls.clone() })
            .with_cache(cache)
            .with_app_version(Some(2));

        assert_eq!(ids(&libs.auto_detected_libraries(true)), vec!["okhttp", "gson"]);
        assert_eq!(calls.get(), 1);
        assert_eq!(ids(&libs.auto_detected_libraries(true)), vec!["okhttp", "gson"]);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_cached_names_that_no_longer_resolve_are_dropped() {
        let (res, keys) = catalog();
        let cache = MemoryCache::new();
        cache.store(5, ";okio;removed_lib").unwrap();

        let calls = Rc::new(Cell::new(0));
        let libs = Libs::new(&res, &keys)
            .with_detector(CountingDetector { calls: calls.clone() })
            .with_cache(cache)
            .with_app_version(Some(5));

        assert_eq!(ids(&libs.auto_detected_libraries(true)), vec!["okio"]);
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_no_version_skips_cache() {
        let (res, keys) = catalog();
        let calls = Rc::new(Cell::new(0));
        let libs = Libs::new(&res, &keys).with_detector(CountingDetector { calls: calls.clone() });

        libs.auto_detected_libraries(true);
        libs.auto_detected_libraries(true);
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_failing_cache_does_not_block_detection() {
        struct BrokenCache;

        impl DetectionCache for BrokenCache {
            fn version(&self) -> crate::error::Result<i32> {
                Err(crate::error::LibsError::Options("unreadable".to_string()))
            }
            fn cached_names(&self) -> crate::error::Result<String> {
                Err(crate::error::LibsError::Options("unreadable".to_string()))
            }
            fn store(&self, _version: i32, _names: &str) -> crate::error::Result<()> {
                Err(crate::error::LibsError::Options("read-only".to_string()))
            }
        }

        let (res, keys) = catalog();
        let libs = Libs::new(&res, &keys)
            .with_detector(crate::detect::ClassPathDetector::new(["com.google.gson.Gson"]))
            .with_cache(BrokenCache)
            .with_app_version(Some(1));

        assert_eq!(ids(&libs.auto_detected_libraries(true)), vec!["gson"]);
    }
}

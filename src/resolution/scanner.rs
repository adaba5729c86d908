//! Candidate scanning and matching.
//!
//! Enumeration is delegated to a [`NamespaceScanner`]; this module only
//! applies the partition-name rule to what comes back, optionally memoizing
//! the enumeration per `(scope, base type)`.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use tracing::{debug, trace, warn};

use crate::entity::{matches, EntityType};
use crate::error::ScanError;
use crate::path::{Namespace, TypePath};
use crate::registry::NamespaceScanner;

fn lock_err(context: &'static str) -> ScanError {
    ScanError::Backend(format!("poisoned lock: {context}"))
}

type CacheKey = (Namespace, TypePath);

/// Default number of `(scope, base)` entries kept before the cache is reset.
pub const SCAN_CACHE_MAX: usize = 1024;

/// Memoized scan results, shared by every clone of a resolver.
///
/// Bounded: once `max_entries` keys are held, the next insert clears it.
#[derive(Debug)]
pub struct ScanCache {
    entries: RwLock<HashMap<CacheKey, Vec<Arc<EntityType>>>>,
    max_entries: usize,
}

impl Default for ScanCache {
    fn default() -> Self {
        Self::with_max_entries(SCAN_CACHE_MAX)
    }
}

impl ScanCache {
    /// Creates an empty cache holding at most [`SCAN_CACHE_MAX`] entries.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty cache holding at most `max_entries` entries.
    #[must_use]
    pub fn with_max_entries(max_entries: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            max_entries: max_entries.max(1),
        }
    }

    /// Upper bound on cached entries.
    #[must_use]
    pub const fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// Number of cached `(scope, base)` entries.
    ///
    /// # Errors
    /// Fails if the cache lock is poisoned.
    pub fn len(&self) -> Result<usize, ScanError> {
        Ok(self.entries.read().map_err(|_| lock_err("scan_cache.len"))?.len())
    }

    /// Returns true if nothing is cached.
    ///
    /// # Errors
    /// Fails if the cache lock is poisoned.
    pub fn is_empty(&self) -> Result<bool, ScanError> {
        Ok(self.len()? == 0)
    }

    fn get(&self, key: &CacheKey) -> Result<Option<Vec<Arc<EntityType>>>, ScanError> {
        let guard = self.entries.read().map_err(|_| lock_err("scan_cache.get"))?;
        Ok(guard.get(key).cloned())
    }

    fn insert(&self, key: CacheKey, found: Vec<Arc<EntityType>>) -> Result<(), ScanError> {
        let mut guard = self.entries.write().map_err(|_| lock_err("scan_cache.insert"))?;
        if guard.len() >= self.max_entries && !guard.contains_key(&key) {
            debug!(entries = guard.len(), "scan cache full, clearing");
            guard.clear();
        }
        // Another thread may have scanned the same key meanwhile; results are identical.
        guard.entry(key).or_insert(found);
        Ok(())
    }
}

/// Finds the entity type persisted into a partition within a scope.
#[derive(Clone)]
pub struct CandidateScanner {
    scanner: Arc<dyn NamespaceScanner>,
    cache: Option<Arc<ScanCache>>,
}

impl CandidateScanner {
    /// Wraps `scanner`, memoizing its results when `cache` is set.
    #[must_use]
    pub fn new(scanner: Arc<dyn NamespaceScanner>, cache: Option<Arc<ScanCache>>) -> Self {
        Self { scanner, cache }
    }

    /// The cache in use, if any.
    #[must_use]
    pub fn cache(&self) -> Option<&Arc<ScanCache>> {
        self.cache.as_ref()
    }

    /// Enumerates entities under `scope` assignable to `base`.
    ///
    /// # Errors
    /// Propagates scanner failures unchanged.
    pub fn scan(&self, scope: &Namespace, base: &TypePath) -> Result<Vec<Arc<EntityType>>, ScanError> {
        let Some(cache) = self.cache.as_ref() else {
            return self.scan_uncached(scope, base);
        };

        let key = (scope.clone(), base.clone());
        if let Some(hit) = cache.get(&key)? {
            trace!(%scope, %base, "scan cache hit");
            return Ok(hit);
        }
        let found = self.scan_uncached(scope, base)?;
        cache.insert(key, found.clone())?;
        Ok(found)
    }

    fn scan_uncached(
        &self,
        scope: &Namespace,
        base: &TypePath,
    ) -> Result<Vec<Arc<EntityType>>, ScanError> {
        self.scanner
            .scan_for_entities(scope, base)
            .inspect_err(|err| warn!(%scope, %base, error = %err, "namespace scan failed"))
    }

    /// Returns the first entity under `scope` that is assignable to `base`
    /// and persisted into `partition`.
    ///
    /// Candidates must be assignable to `base` even if the scanner is lenient.
    ///
    /// # Errors
    /// Propagates scanner failures unchanged.
    pub fn find_match(
        &self,
        scope: &Namespace,
        partition: &str,
        base: &TypePath,
    ) -> Result<Option<Arc<EntityType>>, ScanError> {
        Ok(self
            .scan(scope, base)?
            .into_iter()
            .find(|candidate| candidate.is_assignable_to(base) && matches(candidate, partition)))
    }
}

impl std::fmt::Debug for CandidateScanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CandidateScanner")
            .field("cached", &self.cache.is_some())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::registry::TypeCatalog;

    fn ty(raw: &str) -> TypePath {
        TypePath::parse(raw).unwrap()
    }

    fn ns(raw: &str) -> Namespace {
        Namespace::parse(raw).unwrap()
    }

    struct Counting {
        inner: TypeCatalog,
        calls: AtomicUsize,
    }

    impl NamespaceScanner for Counting {
        fn scan_for_entities(
            &self,
            scope: &Namespace,
            base: &TypePath,
        ) -> Result<Vec<Arc<EntityType>>, ScanError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.scan_for_entities(scope, base)
        }
    }

    struct Lenient;

    impl NamespaceScanner for Lenient {
        fn scan_for_entities(
            &self,
            _scope: &Namespace,
            _base: &TypePath,
        ) -> Result<Vec<Arc<EntityType>>, ScanError> {
            Ok(vec![Arc::new(EntityType::entity(ty("other::Developer")))])
        }
    }

    fn counting() -> Arc<Counting> {
        let catalog = TypeCatalog::builder()
            .declare(EntityType::entity(ty("app::Employee")))
            .declare(EntityType::entity(ty("app::Developer")).extends(ty("app::Employee")))
            .declare(EntityType::named_entity(ty("app::Manager"), "bosses").extends(ty("app::Employee")))
            .build()
            .unwrap();
        Arc::new(Counting {
            inner: catalog,
            calls: AtomicUsize::new(0),
        })
    }

    #[test]
    fn test_find_match_by_default_and_explicit_name() {
        let scanner = CandidateScanner::new(counting(), None);
        let base = ty("app::Employee");

        let dev = scanner.find_match(&ns("app"), "developer", &base).unwrap().unwrap();
        assert_eq!(dev.path(), &ty("app::Developer"));

        let boss = scanner.find_match(&ns("app"), "bosses", &base).unwrap().unwrap();
        assert_eq!(boss.path(), &ty("app::Manager"));

        assert!(scanner.find_match(&ns("app"), "manager", &base).unwrap().is_none());
    }

    #[test]
    fn test_find_match_rechecks_assignability() {
        let scanner = CandidateScanner::new(Arc::new(Lenient), None);
        let found = scanner
            .find_match(&ns("other"), "developer", &ty("app::Employee"))
            .unwrap();
        assert!(found.is_none());
    }

    #[test]
    fn test_uncached_scans_every_time() {
        let inner = counting();
        let scanner = CandidateScanner::new(inner.clone(), None);
        for _ in 0..3 {
            scanner.find_match(&ns("app"), "developer", &ty("app::Employee")).unwrap();
        }
        assert_eq!(inner.calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_cache_memoizes_per_scope_and_base() {
        let inner = counting();
        let cache = Arc::new(ScanCache::new());
        let scanner = CandidateScanner::new(inner.clone(), Some(Arc::clone(&cache)));

        for _ in 0..3 {
            scanner.find_match(&ns("app"), "developer", &ty("app::Employee")).unwrap();
        }
        scanner.find_match(&ns("app"), "developer", &ty("app::Developer")).unwrap();

        assert_eq!(inner.calls.load(Ordering::SeqCst), 2);
        assert_eq!(cache.len().unwrap(), 2);
    }

    #[test]
    fn test_cache_stays_bounded() {
        let inner = counting();
        let cache = Arc::new(ScanCache::with_max_entries(2));
        let scanner = CandidateScanner::new(inner.clone(), Some(Arc::clone(&cache)));
        let bases = [ty("app::Employee"), ty("app::Developer"), ty("app::Manager")];

        for base in &bases {
            scanner.find_match(&ns("app"), "developer", base).unwrap();
            assert!(cache.len().unwrap() <= cache.max_entries());
        }
        // The third key reset the cache before being stored.
        assert_eq!(cache.len().unwrap(), 1);

        scanner.find_match(&ns("app"), "developer", &bases[2]).unwrap();
        assert_eq!(inner.calls.load(Ordering::SeqCst), 3);
        scanner.find_match(&ns("app"), "developer", &bases[0]).unwrap();
        assert_eq!(inner.calls.load(Ordering::SeqCst), 4);
    }

    #[test]
    fn test_default_cache_limit() {
        assert_eq!(ScanCache::new().max_entries(), SCAN_CACHE_MAX);
        assert_eq!(ScanCache::with_max_entries(0).max_entries(), 1);
    }
}

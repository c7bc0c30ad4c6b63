//! Cache of resolved sanitizers
//!
//! Building a `Config` from options hashes every allow-list entry; callers
//! that pass the same options document on every call hit this cache instead.
//! Keys are the flavor plus the raw options JSON.

use crate::error::Result;
use crate::options::SanitizeOptions;
use crate::sanitizer::{Flavor, Sanitizer};
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::trace;

/// Default number of option sets kept
pub const DEFAULT_CAPACITY: usize = 64;

type Key = (Flavor, String);

/// Thread-safe LRU cache of sanitizers keyed by flavor and options
pub struct SanitizerCache {
    inner: Mutex<LruCache<Key, Arc<Sanitizer>>>,
}

impl Default for SanitizerCache {
    fn default() -> Self {
        SanitizerCache::new(DEFAULT_CAPACITY)
    }
}

impl std::fmt::Debug for SanitizerCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let cache = self.lock();
        f.debug_struct("SanitizerCache")
            .field("len", &cache.len())
            .field("capacity", &cache.cap())
            .finish()
    }
}

impl SanitizerCache {
    /// Create a cache holding at most `capacity` entries (at least one)
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        SanitizerCache {
            inner: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// A poisoned lock still guards a consistent cache; entries are only
    /// inserted whole
    fn lock(&self) -> MutexGuard<'_, LruCache<Key, Arc<Sanitizer>>> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Get the sanitizer for these options, building it on a miss.
    ///
    /// Invalid options are reported every time and never cached.
    pub fn get_or_build(&self, flavor: Flavor, options_json: &str) -> Result<Arc<Sanitizer>> {
        let key = (flavor, options_json.to_string());
        if let Some(hit) = self.lock().get(&key) {
            trace!(?flavor, "sanitizer cache hit");
            return Ok(Arc::clone(hit));
        }

        // Built outside the lock; a concurrent miss on the same key builds twice
        let options = SanitizeOptions::from_json(options_json)?;
        let sanitizer = Arc::new(Sanitizer::from_options(flavor, &options)?);
        self.lock().put(key, Arc::clone(&sanitizer));
        Ok(sanitizer)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;

    #[test]
    fn test_hit_returns_same_instance() {
        let cache = SanitizerCache::new(4);
        let a = cache.get_or_build(Flavor::AllowList, "{}").unwrap();
        let b = cache.get_or_build(Flavor::AllowList, "{}").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 1);

        let c = cache.get_or_build(Flavor::NoLinks, "{}").unwrap();
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(c.flavor(), Flavor::NoLinks);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_evicts_least_recent() {
        let cache = SanitizerCache::new(2);
        let first = cache.get_or_build(Flavor::AllowList, r#"{"tags":["a"]}"#).unwrap();
        cache.get_or_build(Flavor::AllowList, r#"{"tags":["b"]}"#).unwrap();
        cache.get_or_build(Flavor::AllowList, r#"{"tags":["i"]}"#).unwrap();
        assert_eq!(cache.len(), 2);

        let again = cache.get_or_build(Flavor::AllowList, r#"{"tags":["a"]}"#).unwrap();
        assert!(!Arc::ptr_eq(&first, &again));
    }

    #[test]
    fn test_errors_are_not_cached() {
        let cache = SanitizerCache::default();
        let err = cache
            .get_or_build(Flavor::AllowList, r#"{"tags":"foo"}"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::NotEnumerable("tags")));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_zero_capacity_holds_one() {
        let cache = SanitizerCache::new(0);
        cache.get_or_build(Flavor::StripAll, "{}").unwrap();
        assert_eq!(cache.len(), 1);
        cache.clear();
        assert!(cache.is_empty());
    }
}

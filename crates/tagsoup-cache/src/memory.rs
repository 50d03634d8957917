//! In-process cache implementation.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::{Cache, CacheBucket};

type Buckets = HashMap<String, HashMap<String, Vec<u8>>>;

/// In-memory [`Cache`].
///
/// All buckets handed out by one `MemoryCache` (and its clones) share the
/// same storage, so a value stored through one handle is visible through any
/// other handle for the same bucket name.
#[derive(Clone, Default)]
pub struct MemoryCache {
    inner: Arc<RwLock<Buckets>>,
}

impl MemoryCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries stored in `bucket`.
    #[must_use]
    pub fn len(&self, bucket: &str) -> usize {
        self.inner
            .read()
            .map(|buckets| buckets.get(bucket).map_or(0, HashMap::len))
            .unwrap_or(0)
    }

    /// Whether `bucket` holds no entries.
    #[must_use]
    pub fn is_empty(&self, bucket: &str) -> bool {
        self.len(bucket) == 0
    }
}

impl Cache for MemoryCache {
    fn bucket(&self, name: &str) -> Box<dyn CacheBucket> {
        Box::new(MemoryCacheBucket {
            inner: Arc::clone(&self.inner),
            name: name.to_owned(),
        })
    }
}

struct MemoryCacheBucket {
    inner: Arc<RwLock<Buckets>>,
    name: String,
}

impl CacheBucket for MemoryCacheBucket {
    fn get(&self, key: &str) -> Option<Vec<u8>> {
        let buckets = self.inner.read().ok()?;
        buckets.get(&self.name)?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &[u8]) {
        let Ok(mut buckets) = self.inner.write() else {
            tracing::debug!(bucket = %self.name, "memory cache lock poisoned, dropping write");
            return;
        };
        buckets
            .entry(self.name.clone())
            .or_default()
            .insert(key.to_owned(), value.to_vec());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_and_get() {
        let cache = MemoryCache::new();
        let bucket = cache.bucket("formula");

        bucket.set("hash", b"1");
        assert_eq!(bucket.get("hash"), Some(b"1".to_vec()));
        assert_eq!(bucket.get("other"), None);
    }

    #[test]
    fn test_handles_share_storage() {
        let cache = MemoryCache::new();
        cache.bucket("formula").set("hash", b"1");

        let clone = cache.clone();
        assert_eq!(clone.bucket("formula").get("hash"), Some(b"1".to_vec()));
        assert_eq!(cache.len("formula"), 1);
    }

    #[test]
    fn test_buckets_are_isolated() {
        let cache = MemoryCache::new();
        cache.bucket("alpha").set("key", b"a");
        cache.bucket("beta").set("key", b"b");

        assert_eq!(cache.bucket("alpha").get("key"), Some(b"a".to_vec()));
        assert_eq!(cache.bucket("beta").get("key"), Some(b"b".to_vec()));
        assert!(cache.is_empty("gamma"));
    }

    #[test]
    fn test_overwrite() {
        let cache = MemoryCache::new();
        let bucket = cache.bucket("formula");
        bucket.set("key", b"first");
        bucket.set("key", b"second");
        assert_eq!(bucket.get("key"), Some(b"second".to_vec()));
    }
}

//! Extension trait for [`CacheBucket`] with typed convenience methods.

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::CacheBucket;

/// Typed convenience methods for [`CacheBucket`].
///
/// [`CacheBucket`] stays object-safe and byte-oriented; callers get
/// `get_json`/`set_json` and `get_string`/`set_string` via a blanket impl.
///
/// # Example
///
/// ```
/// use tagsoup_cache::{Cache, CacheBucketExt, MemoryCache};
///
/// let cache = MemoryCache::new();
/// let bucket = cache.bucket("video-weibo-url");
///
/// bucket.set_json("mix-id", &("12345".to_owned(), "678".to_owned()));
/// let ids: Option<(String, String)> = bucket.get_json("mix-id");
/// assert_eq!(ids, Some(("12345".to_owned(), "678".to_owned())));
/// ```
pub trait CacheBucketExt: CacheBucket {
    /// Retrieve a JSON-deserialized value from the cache.
    ///
    /// Returns `None` on cache miss or deserialization failure.
    fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let bytes = self.get(key)?;
        serde_json::from_slice(&bytes).ok()
    }

    /// Store a value as JSON in the cache.
    ///
    /// Silently does nothing if serialization fails.
    fn set_json<T: Serialize>(&self, key: &str, value: &T) {
        if let Ok(bytes) = serde_json::to_vec(value) {
            self.set(key, &bytes);
        }
    }

    /// Retrieve a cached UTF-8 string.
    ///
    /// Returns `None` on cache miss or invalid UTF-8.
    fn get_string(&self, key: &str) -> Option<String> {
        let bytes = self.get(key)?;
        String::from_utf8(bytes).ok()
    }

    /// Store a string value in the cache.
    fn set_string(&self, key: &str, value: &str) {
        self.set(key, value.as_bytes());
    }
}

impl<B: CacheBucket + ?Sized> CacheBucketExt for B {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Cache, MemoryCache, NullCache};

    #[test]
    fn test_json_round_trip_through_memory() {
        let cache = MemoryCache::new();
        let bucket = cache.bucket("video-weibo-url");
        bucket.set_json("abc", &vec!["1".to_owned(), "2".to_owned()]);

        let back: Option<Vec<String>> = bucket.get_json("abc");
        assert_eq!(back, Some(vec!["1".to_owned(), "2".to_owned()]));
    }

    #[test]
    fn test_get_json_wrong_shape_is_miss() {
        let cache = MemoryCache::new();
        let bucket = cache.bucket("video-weibo-url");
        bucket.set_string("abc", "not json");

        let back: Option<Vec<String>> = bucket.get_json("abc");
        assert_eq!(back, None);
    }

    #[test]
    fn test_get_string_invalid_utf8_is_miss() {
        let cache = MemoryCache::new();
        let bucket = cache.bucket("formula");
        bucket.set("bad", &[0xFF, 0xFE]);
        assert_eq!(bucket.get_string("bad"), None);
    }

    #[test]
    fn test_null_bucket_ext_misses() {
        let bucket = NullCache.bucket("formula");
        bucket.set_string("k", "v");
        assert_eq!(bucket.get_string("k"), None);
    }
}

//! Key/value cache collaborators for tagsoup.
//!
//! Markup rendering occasionally needs to remember the result of an external
//! lookup: the embeddable id behind an opaque video link, or whether a formula
//! image was already generated. This crate provides the storage side of that:
//!
//! - [`Cache`]: Factory for named cache buckets
//! - [`CacheBucket`]: Hash-style key/value store (one bucket per lookup kind)
//!
//! # Implementations
//!
//! - [`NullCache`] / [`NullCacheBucket`]: No-op implementations (always miss)
//! - [`MemoryCache`]: Process-local map shared by all buckets it hands out
//! - [`FileCache`]: File-based implementation with version validation
//!
//! # Example
//!
//! ```
//! use tagsoup_cache::{Cache, CacheBucketExt, MemoryCache};
//!
//! let cache = MemoryCache::new();
//! let bucket = cache.bucket("video-sohu-url");
//! bucket.set_string("http://tv.sohu.com/20130101/n1.shtml", "1234567");
//! assert_eq!(
//!     bucket.get_string("http://tv.sohu.com/20130101/n1.shtml").as_deref(),
//!     Some("1234567")
//! );
//! ```

mod ext;
mod file;
mod memory;

pub use ext::CacheBucketExt;
pub use file::FileCache;
pub use memory::MemoryCache;

/// A named partition within a [`Cache`].
///
/// Keys are arbitrary strings (often whole URLs). A bucket behaves like a
/// single hash in a key/value server: `set` overwrites, `get` returns the last
/// stored value.
pub trait CacheBucket: Send + Sync {
    /// Retrieve a cached value, or `None` on a miss.
    fn get(&self, key: &str) -> Option<Vec<u8>>;

    /// Store a value, overwriting any existing entry for the same key.
    ///
    /// Failures are swallowed: the cache is an optimization, never a source
    /// of truth.
    fn set(&self, key: &str, value: &[u8]);
}

/// Factory for named cache [`CacheBucket`]s.
///
/// Buckets with different names are logically isolated from each other.
pub trait Cache: Send + Sync {
    /// Open or create a named bucket.
    ///
    /// Calling `bucket` multiple times with the same name returns handles
    /// that share the same underlying storage.
    fn bucket(&self, name: &str) -> Box<dyn CacheBucket>;
}

/// No-op [`CacheBucket`] that never stores or retrieves data.
pub struct NullCacheBucket;

impl CacheBucket for NullCacheBucket {
    fn get(&self, _key: &str) -> Option<Vec<u8>> {
        None
    }

    fn set(&self, _key: &str, _value: &[u8]) {}
}

/// No-op [`Cache`] that always returns [`NullCacheBucket`]s.
///
/// Use when caching is disabled.
pub struct NullCache;

impl Cache for NullCache {
    fn bucket(&self, _name: &str) -> Box<dyn CacheBucket> {
        Box::new(NullCacheBucket)
    }
}

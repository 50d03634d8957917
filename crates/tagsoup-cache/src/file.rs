//! On-disk cache shared between runs.
//!
//! Every bucket is a directory under the cache root. An entry lives at
//! `{bucket}/{h[..2]}/{h[2..]}` where `h` is the hex SHA-256 of the key, so
//! URL keys never become nested paths and no directory grows too large.
//!
//! An entry file starts with the key on its own line, followed by the raw
//! value. A lookup whose first line differs from the requested key is a
//! miss. Keys containing a newline are never stored.
//!
//! The root holds a `VERSION` stamp. Opening a cache with a different
//! version discards everything under the root.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

use crate::{Cache, CacheBucket};

const VERSION_FILE: &str = "VERSION";

/// [`Cache`] persisted in a directory.
///
/// ```text
/// {root}/
/// +-- VERSION
/// +-- video-sohu-url/
/// |   +-- 3f/
/// |       +-- 2a...e9
/// +-- formula/
/// ```
#[derive(Debug, Clone)]
pub struct FileCache {
    root: PathBuf,
}

impl FileCache {
    /// Open the cache at `root`, discarding entries stamped with another
    /// `version`.
    ///
    /// Never fails: an unusable directory only means every lookup misses.
    #[must_use]
    pub fn new(root: PathBuf, version: &str) -> Self {
        stamp_version(&root, version);
        Self { root }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Cache for FileCache {
    fn bucket(&self, name: &str) -> Box<dyn CacheBucket> {
        Box::new(DirBucket {
            dir: self.root.join(name),
        })
    }
}

struct DirBucket {
    dir: PathBuf,
}

impl DirBucket {
    fn entry_path(&self, key: &str) -> PathBuf {
        let hash = hex::encode(Sha256::digest(key.as_bytes()));
        let (fan, rest) = hash.split_at(2);
        self.dir.join(fan).join(rest)
    }
}

impl CacheBucket for DirBucket {
    fn get(&self, key: &str) -> Option<Vec<u8>> {
        let mut contents = fs::read(self.entry_path(key)).ok()?;
        let header_end = contents.iter().position(|&b| b == b'\n')?;
        if &contents[..header_end] != key.as_bytes() {
            debug!(bucket = %self.dir.display(), "Cache entry belongs to another key");
            return None;
        }
        Some(contents.split_off(header_end + 1))
    }

    fn set(&self, key: &str, value: &[u8]) {
        if key.contains('\n') {
            debug!(bucket = %self.dir.display(), "Refusing to cache multi-line key");
            return;
        }
        let path = self.entry_path(key);
        if let Err(e) = write_entry(&path, key, value) {
            debug!(path = %path.display(), error = %e, "Failed to write cache entry");
        }
    }
}

/// Write through a temporary sibling so readers never see a partial entry.
fn write_entry(path: &Path, key: &str, value: &[u8]) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension(format!("tmp{}", std::process::id()));
    {
        let mut file = fs::File::create(&tmp)?;
        file.write_all(key.as_bytes())?;
        file.write_all(b"\n")?;
        file.write_all(value)?;
    }
    fs::rename(&tmp, path)
}

fn stamp_version(root: &Path, version: &str) {
    let stamp = root.join(VERSION_FILE);
    match fs::read_to_string(&stamp) {
        Ok(stored) if stored.trim() == version => return,
        Ok(stored) => info!(stored = stored.trim(), version, "Cache version changed, clearing"),
        Err(_) => debug!(root = %root.display(), "Initializing cache"),
    }

    if root.exists()
        && let Err(e) = fs::remove_dir_all(root)
    {
        warn!(root = %root.display(), error = %e, "Failed to clear cache");
    }
    if let Err(e) = fs::create_dir_all(root).and_then(|()| fs::write(&stamp, version)) {
        warn!(root = %root.display(), error = %e, "Failed to initialize cache");
    }
}

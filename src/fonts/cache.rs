//! Persistent font cache.
//!
//! Google Fonts downloads are the only network traffic of a normal build,
//! and they never change for a given family and weight. The cache stores
//! each downloaded TTF once and serves it to every later build.
//!
//! ## Keys
//!
//! One entry per `(family, weight)` pair, named `family-weight` with spaces
//! in the family replaced by dashes:
//!
//! ```text
//! .ogcard-cache/fonts/
//! ├── Schibsted-Grotesk-700
//! └── Source-Sans-Pro-400
//! ```
//!
//! Entries are never invalidated. To pick up a re-released face, delete
//! the file (or the whole directory).
//!
//! ## Concurrency
//!
//! The directory is append-only. Two builds that miss on the same key both
//! download it and both write identical bytes; each write goes through a
//! uniquely named temporary file and a rename, so readers never observe a partial file.

use std::collections::HashMap;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Subdirectory of the cache root holding font files.
const FONTS_DIR: &str = "fonts";

/// Cache key for a family and weight, e.g. `Source-Sans-Pro-400`.
pub fn cache_key(family: &str, weight: u16) -> String {
    format!("{}-{}", family.replace(' ', "-"), weight)
}

/// Storage for downloaded font files.
pub trait FontCache: Sync {
    /// Cached bytes for `key`, if present.
    fn get(&self, key: &str) -> Option<Vec<u8>>;

    /// Store bytes under `key`.
    fn put(&self, key: &str, data: &[u8]) -> io::Result<()>;
}

/// Font cache in a directory on disk.
#[derive(Debug, Clone)]
pub struct DiskFontCache {
    dir: PathBuf,
}

impl DiskFontCache {
    /// Cache under `<cache_root>/fonts`.
    pub fn new(cache_root: &Path) -> Self {
        Self {
            dir: cache_root.join(FONTS_DIR),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}

impl FontCache for DiskFontCache {
    fn get(&self, key: &str) -> Option<Vec<u8>> {
        std::fs::read(self.entry_path(key))
            .ok()
            .filter(|data| !data.is_empty())
    }

    fn put(&self, key: &str, data: &[u8]) -> io::Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(data)?;
        tmp.persist(self.entry_path(key)).map_err(|e| e.error)?;
        Ok(())
    }
}

/// Process-local cache, used for `--no-cache` runs and tests.
#[derive(Debug, Default)]
pub struct MemoryFontCache {
    entries: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryFontCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FontCache for MemoryFontCache {
    fn get(&self, key: &str) -> Option<Vec<u8>> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    fn put(&self, key: &str, data: &[u8]) -> io::Result<()> {
        self.entries
            .lock()
            .map_err(|_| io::Error::other("font cache lock poisoned"))?
            .insert(key.to_string(), data.to_vec());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn key_replaces_spaces() {
        assert_eq!(cache_key("Source Sans Pro", 400), "Source-Sans-Pro-400");
        assert_eq!(cache_key("Inter", 700), "Inter-700");
    }

    #[test]
    fn disk_cache_miss_then_hit() {
        let tmp = TempDir::new().unwrap();
        let cache = DiskFontCache::new(tmp.path());
        assert_eq!(cache.get("Inter-700"), None);

        cache.put("Inter-700", b"ttf bytes").unwrap();
        assert_eq!(cache.get("Inter-700"), Some(b"ttf bytes".to_vec()));
        assert!(tmp.path().join("fonts/Inter-700").exists());
    }

    #[test]
    fn disk_cache_creates_nested_root() {
        let tmp = TempDir::new().unwrap();
        let cache = DiskFontCache::new(&tmp.path().join("deep/cache"));
        cache.put("Inter-400", b"x").unwrap();
        assert!(cache.entry_path("Inter-400").exists());
    }

    #[test]
    fn disk_cache_leaves_no_temp_files() {
        let tmp = TempDir::new().unwrap();
        let cache = DiskFontCache::new(tmp.path());
        cache.put("Inter-400", b"x").unwrap();
        cache.put("Inter-400", b"x").unwrap();
        let names: Vec<String> = fs::read_dir(cache.dir())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["Inter-400".to_string()]);
    }

    #[test]
    fn concurrent_puts_of_one_key_all_succeed() {
        let tmp = TempDir::new().unwrap();
        let cache = DiskFontCache::new(tmp.path());
        std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| s.spawn(|| cache.put("Inter-700", b"inter bold")))
                .collect();
            for handle in handles {
                handle.join().unwrap().unwrap();
            }
        });
        assert_eq!(cache.get("Inter-700"), Some(b"inter bold".to_vec()));
        assert_eq!(fs::read_dir(cache.dir()).unwrap().count(), 1);
    }

    #[test]
    fn empty_file_is_a_miss() {
        let tmp = TempDir::new().unwrap();
        let cache = DiskFontCache::new(tmp.path());
        fs::create_dir_all(cache.dir()).unwrap();
        fs::write(cache.entry_path("Inter-400"), b"").unwrap();
        assert_eq!(cache.get("Inter-400"), None);
    }

    #[test]
    fn memory_cache_roundtrip() {
        let cache = MemoryFontCache::new();
        assert!(cache.is_empty());
        cache.put("k", b"v").unwrap();
        assert_eq!(cache.get("k"), Some(b"v".to_vec()));
        assert_eq!(cache.len(), 1);
    }
}

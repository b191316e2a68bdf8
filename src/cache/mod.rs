//! Durable key-value caches backing geocoding and climatology lookups.
//!
//! Every `put` is written through to disk before it returns, using a
//! temp-file-and-rename so a crash never leaves a half-written entry.
//! Entries are never evicted within a run; `reset` is the only way to
//! forget them.

pub mod directory;
pub mod json_file;

pub use directory::DirectoryCache;
pub use json_file::JsonFileCache;

use std::io::Write;
use std::path::Path;

use crate::error::{ProcessingError, Result};

pub trait PersistentCache<V> {
    /// Look up a key. A missing entry is `Ok(None)`, not an error.
    fn get(&self, key: &str) -> Result<Option<V>>;

    /// Insert or overwrite a key and persist it before returning
    fn put(&mut self, key: &str, value: V) -> Result<()>;

    /// Remove every entry, on disk included
    fn reset(&mut self) -> Result<()>;

    fn len(&self) -> Result<usize>;

    fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

/// Write `bytes` to `path` atomically: temp file in the same directory,
/// fsync, then rename over the target.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;

    let mut temp = tempfile::NamedTempFile::new_in(dir)?;
    temp.write_all(bytes)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| ProcessingError::Cache {
        path: path.to_path_buf(),
        message: e.error.to_string(),
    })?;

    Ok(())
}

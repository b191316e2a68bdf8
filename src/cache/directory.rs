use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use crate::cache::{write_atomic, PersistentCache};
use crate::error::{ProcessingError, Result};

const ENTRY_EXTENSION: &str = "json";

/// A cache stored as one JSON file per key inside a directory.
///
/// Entries are read lazily on `get` and written once per new key.
pub struct DirectoryCache<V> {
    dir: PathBuf,
    _value: PhantomData<V>,
}

impl<V> DirectoryCache<V>
where
    V: Serialize + DeserializeOwned,
{
    pub fn open(dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
            _value: PhantomData,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty() || key.contains(['/', '\\']) || key.contains("..") {
            return Err(ProcessingError::InvalidInput(format!(
                "Cache key '{}' cannot be used as a file name",
                key
            )));
        }
        Ok(self.dir.join(format!("{}.{}", key, ENTRY_EXTENSION)))
    }

    fn entry_files(&self) -> Result<Vec<PathBuf>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.is_file() && path.extension().and_then(|e| e.to_str()) == Some(ENTRY_EXTENSION) {
                files.push(path);
            }
        }
        Ok(files)
    }
}

impl<V> PersistentCache<V> for DirectoryCache<V>
where
    V: Serialize + DeserializeOwned,
{
    fn get(&self, key: &str) -> Result<Option<V>> {
        let path = self.entry_path(key)?;
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(&path)?;
        let value = serde_json::from_str(&content).map_err(|e| ProcessingError::Cache {
            path: path.clone(),
            message: format!("unreadable cache entry: {}", e),
        })?;
        Ok(Some(value))
    }

    fn put(&mut self, key: &str, value: V) -> Result<()> {
        let path = self.entry_path(key)?;
        let json = serde_json::to_vec_pretty(&value)?;
        write_atomic(&path, &json)
    }

    fn reset(&mut self) -> Result<()> {
        let files = self.entry_files()?;
        for path in &files {
            std::fs::remove_file(path)?;
        }
        tracing::debug!("Removed {} entries from {}", files.len(), self.dir.display());
        Ok(())
    }

    fn len(&self) -> Result<usize> {
        Ok(self.entry_files()?.len())
    }
}

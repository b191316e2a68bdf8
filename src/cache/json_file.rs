use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::cache::{write_atomic, PersistentCache};
use crate::error::{ProcessingError, Result};

/// A whole cache held in memory and mirrored to a single JSON object file.
///
/// The file is read once at open and rewritten in full after every `put`.
/// Keys are kept sorted so the file is stable across runs.
pub struct JsonFileCache<V> {
    path: PathBuf,
    entries: BTreeMap<String, V>,
}

impl<V> JsonFileCache<V>
where
    V: Serialize + DeserializeOwned + Clone,
{
    /// Open the cache file. A missing or empty file is an empty cache.
    pub fn open(path: &Path) -> Result<Self> {
        let entries = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            if content.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&content).map_err(|e| ProcessingError::Cache {
                    path: path.to_path_buf(),
                    message: format!("unreadable cache file: {}", e),
                })?
            }
        } else {
            BTreeMap::new()
        };

        tracing::debug!("Opened {} with {} entries", path.display(), entries.len());

        Ok(Self {
            path: path.to_path_buf(),
            entries,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    fn flush(&self) -> Result<()> {
        let json = serde_json::to_vec_pretty(&self.entries)?;
        write_atomic(&self.path, &json)
    }
}

impl<V> PersistentCache<V> for JsonFileCache<V>
where
    V: Serialize + DeserializeOwned + Clone,
{
    fn get(&self, key: &str) -> Result<Option<V>> {
        Ok(self.entries.get(key).cloned())
    }

    fn put(&mut self, key: &str, value: V) -> Result<()> {
        self.entries.insert(key.to_string(), value);
        self.flush()
    }

    fn reset(&mut self) -> Result<()> {
        self.entries.clear();
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
        }
        Ok(())
    }

    fn len(&self) -> Result<usize> {
        Ok(self.entries.len())
    }
}

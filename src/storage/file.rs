use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use serde_json::{Map, Value};
use tempfile::NamedTempFile;
use tracing::{info, warn};

use super::Storage;
use crate::error::{LogbookError, Result};

/// Single JSON object on disk, one member per key.
///
/// The whole object is rewritten on every `set`, atomically: a temp file in
/// the same directory is written and then renamed over the target.
pub struct JsonFileStorage {
    path: PathBuf,
    entries: Mutex<Map<String, Value>>,
}

impl JsonFileStorage {
    /// Open the store at `path`, creating parent directories as needed.
    /// A missing file starts empty. A file that is not a JSON object is
    /// treated as empty and replaced on the next write.
    pub fn open(path: &Path) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                LogbookError::Storage(format!("Failed to create data dir {:?}: {}", parent, e))
            })?;
        }

        let entries = match std::fs::read_to_string(path) {
            Ok(raw) => match serde_json::from_str::<Value>(&raw) {
                Ok(Value::Object(map)) => map,
                Ok(_) | Err(_) => {
                    warn!("Ignoring malformed store file at {:?}", path);
                    Map::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Map::new(),
            Err(e) => {
                return Err(LogbookError::Storage(format!(
                    "Failed to read store file {:?}: {}",
                    path, e
                )))
            }
        };

        info!("Opened JSON store at {:?} ({} keys)", path, entries.len());
        Ok(Self {
            path: path.to_path_buf(),
            entries: Mutex::new(entries),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Storage for JsonFileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let map = self
            .entries
            .lock()
            .map_err(|e| LogbookError::Storage(format!("Store lock poisoned: {}", e)))?;
        Ok(map.get(key).and_then(|v| v.as_str().map(|s| s.to_string())))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut map = self
            .entries
            .lock()
            .map_err(|e| LogbookError::Storage(format!("Store lock poisoned: {}", e)))?;
        let mut next = map.clone();
        next.insert(key.to_string(), Value::String(value.to_string()));

        let json = serde_json::to_string_pretty(&next)?;
        write_atomic(&self.path, json.as_bytes()).map_err(|e| {
            warn!("Failed to save store {:?}: {}", self.path, e);
            LogbookError::Storage(e.to_string())
        })?;

        // Only visible to readers once it is on disk
        *map = next;
        Ok(())
    }
}

fn write_atomic(target: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    let parent = target
        .parent()
        .ok_or_else(|| anyhow::anyhow!("Store path has no parent directory: {:?}", target))?;

    // Temp file in the same directory so the rename stays on one filesystem
    let mut temp = NamedTempFile::new_in(parent)?;
    temp.write_all(bytes)?;
    temp.flush()?;

    // Atomic rename
    temp.persist(target)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_set_then_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("site.json");

        let store = JsonFileStorage::open(&path).unwrap();
        store.set("headline", "Hello\nthere").unwrap();
        drop(store);

        let reopened = JsonFileStorage::open(&path).unwrap();
        assert_eq!(
            reopened.get("headline").unwrap().as_deref(),
            Some("Hello\nthere")
        );
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStorage::open(&dir.path().join("nested/none.json")).unwrap();
        assert_eq!(store.get("anything").unwrap(), None);
    }

    #[test]
    fn test_malformed_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "[1, 2, 3").unwrap();

        let store = JsonFileStorage::open(&path).unwrap();
        assert_eq!(store.get("anything").unwrap(), None);

        store.set("k", "v").unwrap();
        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"k\""));
    }

    #[test]
    fn test_failed_write_is_not_visible() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data").join("site.json");
        let store = JsonFileStorage::open(&path).unwrap();
        store.set("headline", "first").unwrap();

        // Removing the directory makes the next temp file creation fail
        std::fs::remove_dir_all(dir.path().join("data")).unwrap();
        assert!(store.set("headline", "second").is_err());
        assert_eq!(store.get("headline").unwrap().as_deref(), Some("first"));
    }
}

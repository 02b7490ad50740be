//! String key/value substrates behind the preference store.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use tracing::{debug, warn};

use crate::error::{Result, StorageError};

/// Default quota, matching the usual browser local-storage limit.
pub const DEFAULT_QUOTA_BYTES: usize = 5 * 1024 * 1024;

/// Synchronous string key/value storage.
pub trait StorageBackend: Send + Sync + fmt::Debug {
    /// Raw value stored under `key`.
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    fn set_item(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`. Removing a missing key is not an error.
    fn remove_item(&self, key: &str) -> Result<()>;

    /// All stored keys.
    fn keys(&self) -> Result<Vec<String>>;
}

fn used_bytes(items: &BTreeMap<String, String>) -> usize {
    items.iter().map(|(k, v)| k.len() + v.len()).sum()
}

/// Fail if replacing `key` with `value` would exceed `quota`.
fn check_quota(
    items: &BTreeMap<String, String>,
    key: &str,
    value: &str,
    quota: Option<usize>,
) -> Result<()> {
    let Some(quota) = quota else {
        return Ok(());
    };

    let current = items.get(key).map(|old| key.len() + old.len()).unwrap_or(0);
    let needed = used_bytes(items) - current + key.len() + value.len();
    if needed > quota {
        return Err(StorageError::QuotaExceeded { needed, quota });
    }
    Ok(())
}

fn lock(items: &Mutex<BTreeMap<String, String>>) -> MutexGuard<'_, BTreeMap<String, String>> {
    items.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Process-local storage, lost on exit.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    items: Mutex<BTreeMap<String, String>>,
    quota: Option<usize>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Limit the total size of keys plus values.
    pub fn with_quota(quota: usize) -> Self {
        Self {
            items: Mutex::default(),
            quota: Some(quota),
        }
    }
}

impl StorageBackend for MemoryBackend {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(lock(&self.items).get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let mut items = lock(&self.items);
        check_quota(&items, key, value, self.quota)?;
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        lock(&self.items).remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(lock(&self.items).keys().cloned().collect())
    }
}

/// Storage persisted as a single JSON object file.
///
/// The file is read on open and again before every change, so a write only
/// replaces its own key and keeps keys written by other processes sharing
/// the file. Writes go through a temporary file and rename. Two processes
/// writing at the same instant can still race; the later rename wins.
#[derive(Debug)]
pub struct FileBackend {
    path: PathBuf,
    items: Mutex<BTreeMap<String, String>>,
    quota: Option<usize>,
}

impl FileBackend {
    /// Open or create the storage file at `path`.
    ///
    /// A file that is not a JSON object of strings is logged and treated as
    /// empty; it is overwritten on the next write.
    pub fn open(path: impl AsRef<Path>, quota: Option<usize>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let items = read_file(&path)?.unwrap_or_default();

        debug!(path = %path.display(), keys = items.len(), "Opened preference file");

        Ok(Self {
            path,
            items: Mutex::new(items),
            quota,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Pick up changes other processes made to the file since the last read.
    fn refresh(&self, items: &mut BTreeMap<String, String>) -> Result<()> {
        if let Some(on_disk) = read_file(&self.path)? {
            *items = on_disk;
        }
        Ok(())
    }

    fn flush(&self, items: &BTreeMap<String, String>) -> Result<()> {
        let io_err = |source| StorageError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(io_err)?;
            }
        }

        let text = serde_json::to_string_pretty(items)?;
        let mut tmp = self.path.as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        fs::write(&tmp, text).map_err(io_err)?;
        fs::rename(&tmp, &self.path).map_err(io_err)?;
        Ok(())
    }
}

impl StorageBackend for FileBackend {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(lock(&self.items).get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let mut items = lock(&self.items);
        self.refresh(&mut items)?;
        check_quota(&items, key, value, self.quota)?;

        let previous = items.insert(key.to_string(), value.to_string());
        if let Err(err) = self.flush(&items) {
            // Keep memory in step with what is on disk.
            match previous {
                Some(old) => items.insert(key.to_string(), old),
                None => items.remove(key),
            };
            return Err(err);
        }
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        let mut items = lock(&self.items);
        self.refresh(&mut items)?;
        let Some(previous) = items.remove(key) else {
            return Ok(());
        };

        if let Err(err) = self.flush(&items) {
            items.insert(key.to_string(), previous);
            return Err(err);
        }
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(lock(&self.items).keys().cloned().collect())
    }
}

/// Read a storage file. `None` when it is missing or not a JSON object of
/// strings; the latter is logged.
fn read_file(path: &Path) -> Result<Option<BTreeMap<String, String>>> {
    match fs::read_to_string(path) {
        Ok(text) => match serde_json::from_str(&text) {
            Ok(items) => Ok(Some(items)),
            Err(err) => {
                warn!(path = %path.display(), "Ignoring unreadable preference file: {}", err);
                Ok(None)
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(source) => Err(StorageError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_backend_roundtrip() {
        let backend = MemoryBackend::new();
        assert_eq!(backend.get_item("a").unwrap(), None);

        backend.set_item("a", "1").unwrap();
        backend.set_item("b", "2").unwrap();
        assert_eq!(backend.get_item("a").unwrap(), Some("1".to_string()));
        assert_eq!(backend.keys().unwrap(), vec!["a".to_string(), "b".to_string()]);

        backend.remove_item("a").unwrap();
        backend.remove_item("missing").unwrap();
        assert_eq!(backend.get_item("a").unwrap(), None);
    }

    #[test]
    fn test_quota_exceeded() {
        let backend = MemoryBackend::with_quota(10);
        backend.set_item("k", "12345").unwrap();

        let err = backend.set_item("other", "123456789").unwrap_err();
        assert!(matches!(err, StorageError::QuotaExceeded { quota: 10, .. }));

        // Replacing an existing value only counts the difference
        backend.set_item("k", "123456789").unwrap();
        assert_eq!(backend.get_item("k").unwrap(), Some("123456789".to_string()));
    }

    #[test]
    fn test_file_backend_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("prefs.json");

        let backend = FileBackend::open(&path, None).unwrap();
        backend.set_item("halodex-view-mode", "\"grid\"").unwrap();
        drop(backend);

        let reopened = FileBackend::open(&path, None).unwrap();
        assert_eq!(
            reopened.get_item("halodex-view-mode").unwrap(),
            Some("\"grid\"".to_string())
        );

        reopened.remove_item("halodex-view-mode").unwrap();
        let reopened = FileBackend::open(&path, None).unwrap();
        assert!(reopened.keys().unwrap().is_empty());
    }

    #[test]
    fn test_file_backend_ignores_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        fs::write(&path, "not json").unwrap();

        let backend = FileBackend::open(&path, None).unwrap();
        assert!(backend.keys().unwrap().is_empty());

        backend.set_item("k", "v").unwrap();
        let reopened = FileBackend::open(&path, None).unwrap();
        assert_eq!(reopened.get_item("k").unwrap(), Some("v".to_string()));
    }

    #[test]
    fn test_file_backend_quota_leaves_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");

        let backend = FileBackend::open(&path, Some(8)).unwrap();
        backend.set_item("k", "v").unwrap();
        assert!(backend.set_item("k", "far too long").is_err());

        let reopened = FileBackend::open(&path, None).unwrap();
        assert_eq!(reopened.get_item("k").unwrap(), Some("v".to_string()));
    }

    #[test]
    fn test_file_backend_keeps_other_writers_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");

        let first = FileBackend::open(&path, None).unwrap();
        let second = FileBackend::open(&path, None).unwrap();

        first.set_item("halodex-view-mode", "\"grid\"").unwrap();
        second.set_item("halodex-active-tab", "\"dashboard\"").unwrap();
        first.set_item("halodex-favorites", "[1]").unwrap();

        let reopened = FileBackend::open(&path, None).unwrap();
        assert_eq!(
            reopened.keys().unwrap(),
            vec![
                "halodex-active-tab".to_string(),
                "halodex-favorites".to_string(),
                "halodex-view-mode".to_string(),
            ]
        );

        // A removal does not resurrect or drop anyone else's keys either
        second.remove_item("halodex-favorites").unwrap();
        let reopened = FileBackend::open(&path, None).unwrap();
        assert_eq!(reopened.get_item("halodex-favorites").unwrap(), None);
        assert_eq!(
            reopened.get_item("halodex-view-mode").unwrap(),
            Some("\"grid\"".to_string())
        );
    }
}

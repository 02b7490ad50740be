//! Shared storage substrate and per-context typed access.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::backend::{FileBackend, MemoryBackend, StorageBackend};
use crate::error::Result;
use crate::preference::Preference;

const EVENT_CAPACITY: usize = 64;

/// A change made through one context, delivered to every other context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEvent {
    pub key: String,
    /// New raw JSON value, `None` when the key was removed.
    pub new_value: Option<String>,
    /// Context that made the change.
    pub origin: u64,
}

#[derive(Debug)]
struct Shared {
    backend: Box<dyn StorageBackend>,
    events: broadcast::Sender<StorageEvent>,
    next_origin: AtomicU64,
}

/// Storage substrate shared by every context (one per open window, tab or
/// process-local session).
#[derive(Debug, Clone)]
pub struct LocalStorage {
    shared: Arc<Shared>,
}

impl LocalStorage {
    pub fn new(backend: impl StorageBackend + 'static) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            shared: Arc::new(Shared {
                backend: Box::new(backend),
                events,
                next_origin: AtomicU64::new(1),
            }),
        }
    }

    /// Storage that lives only as long as this process.
    pub fn in_memory() -> Self {
        Self::new(MemoryBackend::new())
    }

    /// Storage persisted to a JSON file.
    pub fn open_file(path: impl AsRef<Path>, quota: Option<usize>) -> Result<Self> {
        Ok(Self::new(FileBackend::open(path, quota)?))
    }

    /// Open a new execution context over this storage.
    pub fn context(&self) -> PreferenceStore {
        let origin = self.shared.next_origin.fetch_add(1, Ordering::Relaxed);
        PreferenceStore {
            storage: self.clone(),
            origin,
        }
    }
}

/// Typed, JSON-serialized preference access for one execution context.
#[derive(Debug, Clone)]
pub struct PreferenceStore {
    storage: LocalStorage,
    origin: u64,
}

impl PreferenceStore {
    /// A context over fresh in-memory storage.
    pub fn in_memory() -> Self {
        LocalStorage::in_memory().context()
    }

    /// Identifier stamped on the events this context emits.
    pub fn origin(&self) -> u64 {
        self.origin
    }

    /// The substrate this context writes to.
    pub fn storage(&self) -> &LocalStorage {
        &self.storage
    }

    fn backend(&self) -> &dyn StorageBackend {
        self.storage.shared.backend.as_ref()
    }

    /// Read `key`, falling back to `default` when it is absent or malformed.
    pub fn get<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        let raw = match self.backend().get_item(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return default,
            Err(err) => {
                warn!("Failed to read preference {}: {}", key, err);
                return default;
            }
        };

        match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(err) => {
                warn!("Ignoring malformed preference {}: {}", key, err);
                default
            }
        }
    }

    /// Persist `value` under `key`.
    ///
    /// Failures (quota, I/O) are logged and otherwise ignored; other contexts
    /// are only notified of writes that reached storage.
    pub fn set<T: Serialize>(&self, key: &str, value: &T) {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(err) => {
                warn!("Failed to serialize preference {}: {}", key, err);
                return;
            }
        };

        if let Err(err) = self.backend().set_item(key, &raw) {
            warn!("Failed to persist preference {}: {}", key, err);
            return;
        }

        debug!(key, origin = self.origin, "Stored preference");
        self.notify(key, Some(raw));
    }

    /// Remove `key`.
    pub fn remove(&self, key: &str) {
        if let Err(err) = self.backend().remove_item(key) {
            warn!("Failed to remove preference {}: {}", key, err);
            return;
        }
        self.notify(key, None);
    }

    fn notify(&self, key: &str, new_value: Option<String>) {
        // No receivers is fine.
        let _ = self.storage.shared.events.send(StorageEvent {
            key: key.to_string(),
            new_value,
            origin: self.origin,
        });
    }

    /// Subscribe to changes made by other contexts.
    pub fn subscribe(&self) -> PreferenceEvents {
        PreferenceEvents {
            receiver: self.storage.shared.events.subscribe(),
            origin: self.origin,
        }
    }

    /// Load `key` into a held value that can follow changes from other contexts.
    pub fn held<T>(&self, key: &str, default: T) -> Preference<T>
    where
        T: Serialize + DeserializeOwned,
    {
        Preference::load(self.clone(), key, default)
    }
}

/// Change notifications from other contexts.
#[derive(Debug)]
pub struct PreferenceEvents {
    receiver: broadcast::Receiver<StorageEvent>,
    origin: u64,
}

impl PreferenceEvents {
    /// Next pending event without waiting, if any.
    pub fn try_next(&mut self) -> Option<StorageEvent> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) if event.origin == self.origin => continue,
                Ok(event) => return Some(event),
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    warn!(skipped, "Preference events lagged");
                    continue;
                }
                Err(_) => return None,
            }
        }
    }

    /// Wait for the next event. `None` once the storage is gone.
    pub async fn next(&mut self) -> Option<StorageEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) if event.origin == self.origin => continue,
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Preference events lagged");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;
    use std::collections::BTreeMap;

    #[test]
    fn test_get_default_when_absent() {
        let store = PreferenceStore::in_memory();
        let favorites: Vec<i64> = store.get("halodex-favorites", vec![]);
        assert!(favorites.is_empty());
    }

    #[test]
    fn test_set_then_get() {
        let store = PreferenceStore::in_memory();
        let mut notes = BTreeMap::new();
        notes.insert(3_i64, "Watch the flank".to_string());
        store.set("halodex-character-notes", &notes);

        let loaded: BTreeMap<i64, String> = store.get("halodex-character-notes", BTreeMap::new());
        assert_eq!(loaded, notes);
    }

    #[test]
    fn test_malformed_value_returns_default() {
        let storage = LocalStorage::new(MemoryBackend::new());
        storage
            .shared
            .backend
            .set_item("halodex-favorites", "{not json")
            .unwrap();

        let store = storage.context();
        assert_eq!(store.get("halodex-favorites", vec![7_i64]), vec![7]);

        // Well-formed JSON of the wrong shape also falls back
        store.set("halodex-favorites", &"grid");
        assert_eq!(store.get::<Vec<i64>>("halodex-favorites", vec![]), Vec::<i64>::new());
    }

    #[test]
    fn test_failed_write_is_swallowed() {
        let storage = LocalStorage::new(MemoryBackend::with_quota(16));
        let store = storage.context();
        let mut events = storage.context().subscribe();

        store.set("halodex-active-tab", &"x".repeat(64));
        assert_eq!(store.get("halodex-active-tab", "characters".to_string()), "characters");
        assert!(events.try_next().is_none());
    }

    #[test]
    fn test_events_skip_own_origin() {
        let storage = LocalStorage::in_memory();
        let tab_a = storage.context();
        let tab_b = storage.context();
        assert_ne!(tab_a.origin(), tab_b.origin());

        let mut a_events = tab_a.subscribe();
        let mut b_events = tab_b.subscribe();

        tab_a.set("halodex-view-mode", &"grid");

        assert!(a_events.try_next().is_none());
        let event = b_events.try_next().unwrap();
        assert_eq!(event.key, "halodex-view-mode");
        assert_eq!(event.new_value.as_deref(), Some("\"grid\""));
        assert_eq!(event.origin, tab_a.origin());

        tab_a.remove("halodex-view-mode");
        assert_eq!(b_events.try_next().unwrap().new_value, None);
    }

    #[tokio::test]
    async fn test_next_waits_for_other_context() {
        let storage = LocalStorage::in_memory();
        let tab_a = storage.context();
        let tab_b = storage.context();
        let mut events = tab_b.subscribe();

        let writer = tokio::spawn(async move {
            tab_a.set("halodex-favorites", &vec![1_i64, 2]);
        });

        let event = tokio::time::timeout(std::time::Duration::from_secs(5), events.next())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(event.key, "halodex-favorites");
        writer.await.unwrap();
    }
}

//! A preference value held in memory and kept in step with other contexts.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::store::{PreferenceEvents, PreferenceStore, StorageEvent};

/// One preference key, loaded once and held for the life of a context.
///
/// Writes update the held value first and then persist it; a failed write
/// leaves the new value in memory for the rest of the session.
#[derive(Debug)]
pub struct Preference<T> {
    store: PreferenceStore,
    key: String,
    value: T,
    events: PreferenceEvents,
}

impl<T> Preference<T>
where
    T: Serialize + DeserializeOwned,
{
    pub(crate) fn load(store: PreferenceStore, key: &str, default: T) -> Self {
        let events = store.subscribe();
        let value = store.get(key, default);
        Self {
            store,
            key: key.to_string(),
            value,
            events,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Current held value.
    pub fn value(&self) -> &T {
        &self.value
    }

    /// Replace the value and persist it.
    pub fn set(&mut self, value: T) {
        self.value = value;
        self.store.set(&self.key, &self.value);
    }

    /// Modify the value in place and persist it.
    pub fn update<F>(&mut self, f: F)
    where
        F: FnOnce(&mut T),
    {
        f(&mut self.value);
        self.store.set(&self.key, &self.value);
    }

    /// Refresh from a change made in another context.
    ///
    /// Returns `true` when the held value changed. Removals and values that
    /// fail to parse are ignored.
    pub fn apply(&mut self, event: &StorageEvent) -> bool {
        if event.key != self.key || event.origin == self.store.origin() {
            return false;
        }

        let Some(raw) = event.new_value.as_deref() else {
            return false;
        };

        match serde_json::from_str(raw) {
            Ok(value) => {
                self.value = value;
                debug!(key = %self.key, origin = event.origin, "Refreshed preference");
                true
            }
            Err(err) => {
                warn!("Ignoring malformed change to {}: {}", self.key, err);
                false
            }
        }
    }

    /// Apply every pending change from other contexts. Returns how many
    /// refreshed the held value.
    pub fn sync(&mut self) -> usize {
        let mut refreshed = 0;
        while let Some(event) = self.events.try_next() {
            if self.apply(&event) {
                refreshed += 1;
            }
        }
        refreshed
    }

    /// Wait until another context changes this key and refresh the held
    /// value.
    ///
    /// The held context keeps the storage alive, so this only returns once
    /// such a change arrives; wrap it in a timeout to bound the wait.
    pub async fn changed(&mut self) {
        while let Some(event) = self.events.next().await {
            if self.apply(&event) {
                return;
            }
        }
    }

    pub fn into_inner(self) -> T {
        self.value
    }
}

//! Typed local preference storage with change notification.
//!
//! Preferences are small JSON values stored under string keys in a
//! [`LocalStorage`] substrate. Each execution context gets its own
//! [`PreferenceStore`]; writes made through one context are announced to
//! every other context over a broadcast channel, and a held
//! [`Preference`] can follow them.
//!
//! Reads never fail: absent or malformed values yield the caller's default.
//! Writes never fail either: a value that cannot be persisted is logged and
//! the caller keeps its in-memory copy.
//!
//! # Example
//!
//! ```rust
//! use preferences::LocalStorage;
//!
//! let storage = LocalStorage::in_memory();
//! let window = storage.context();
//! let other = storage.context();
//!
//! let mut favorites = other.held("favorites", Vec::<i64>::new());
//! window.set("favorites", &vec![1_i64, 2]);
//!
//! favorites.sync();
//! assert_eq!(favorites.value(), &vec![1, 2]);
//! ```

pub mod backend;
pub mod error;
mod preference;
mod store;

pub use backend::{FileBackend, MemoryBackend, StorageBackend, DEFAULT_QUOTA_BYTES};
pub use error::{Result, StorageError};
pub use preference::Preference;
pub use store::{LocalStorage, PreferenceEvents, PreferenceStore, StorageEvent};

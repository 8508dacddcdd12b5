//! Persistent Store: durable key/value storage for the registry collections.
//!
//! Backends only move raw JSON text. The typed [`read`] / [`write`] helpers own the
//! "never fail the caller" contract: unreadable or corrupt values degrade to the
//! default, and failed writes are logged and dropped.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// Key of the persisted player list.
pub const PLAYERS_KEY: &str = "players";
/// Key of the persisted match list.
pub const MATCHES_KEY: &str = "matches";
/// Key of the persisted tournament list.
pub const TOURNAMENTS_KEY: &str = "tournaments";
/// Key of the match currently selected in the UI.
pub const SELECTED_MATCH_KEY: &str = "selectedMatchId";
/// Key of the tournament currently selected in the UI.
pub const SELECTED_TOURNAMENT_KEY: &str = "selectedTournamentId";

/// Every key the registry persists.
pub const ALL_KEYS: [&str; 5] = [
    PLAYERS_KEY,
    MATCHES_KEY,
    TOURNAMENTS_KEY,
    SELECTED_MATCH_KEY,
    SELECTED_TOURNAMENT_KEY,
];

/// Failure inside a store backend. Never escapes to registry callers.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("i/o error on key `{key}`")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid store key `{0}`")]
    InvalidKey(String),
}

/// Raw key/value backend.
pub trait Store: Send + Sync {
    /// Current text stored under `key`, or `None` when the key was never written.
    fn read_raw(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Replace the text stored under `key`.
    fn write_raw(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Keys changed by another handle since this handle last read or wrote them.
    fn poll_changes(&self) -> Vec<String> {
        Vec::new()
    }
}

/// Read and parse `key`; absent, unreadable or unparseable values yield `default`.
pub fn read<T: DeserializeOwned>(store: &dyn Store, key: &str, default: T) -> T {
    match store.read_raw(key) {
        Ok(Some(raw)) => match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(err) => {
                log::warn!("Stored value for {key} is corrupt, using default: {err}");
                default
            }
        },
        Ok(None) => default,
        Err(err) => {
            log::warn!("Failed to read {key}, using default: {err}");
            default
        }
    }
}

/// Re-read a key another context changed. `None` means "keep what you have":
/// the value was unreadable or malformed. A removed key yields the default.
pub fn read_changed<T: DeserializeOwned + Default>(store: &dyn Store, key: &str) -> Option<T> {
    match store.read_raw(key) {
        Ok(Some(raw)) => match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(err) => {
                log::warn!("Ignoring malformed external update to {key}: {err}");
                None
            }
        },
        Ok(None) => Some(T::default()),
        Err(err) => {
            log::warn!("Failed to reload {key}: {err}");
            None
        }
    }
}

/// Serialize and store `value` under `key`. Failures are logged, never returned.
pub fn write<T: Serialize + ?Sized>(store: &dyn Store, key: &str, value: &T) {
    let raw = match serde_json::to_string(value) {
        Ok(raw) => raw,
        Err(err) => {
            log::error!("Failed to serialize {key}: {err}");
            return;
        }
    };
    if let Err(err) = store.write_raw(key, &raw) {
        log::error!("Failed to persist {key}: {err}");
    }
}

/// Keys are used as file names by the file backend, so keep them to a safe alphabet.
pub(crate) fn validate_key(key: &str) -> Result<(), StoreError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidKey(key.to_string()))
    }
}

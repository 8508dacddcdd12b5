//! In-process store. Handles created with [`MemoryStore::connect`] share one map and
//! see each other's writes as external changes, like tabs sharing browser storage.

use crate::store::{validate_key, Store, StoreError};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

struct Slot {
    value: String,
    revision: u64,
    writer: u64,
}

#[derive(Default)]
struct Shared {
    slots: HashMap<String, Slot>,
    next_revision: u64,
    next_handle: u64,
}

/// One handle onto a shared in-memory map.
pub struct MemoryStore {
    shared: Arc<Mutex<Shared>>,
    handle: u64,
    /// Revision of each key as last observed through this handle.
    seen: Mutex<HashMap<String, u64>>,
}

impl MemoryStore {
    /// A fresh, empty store with a single handle.
    pub fn new() -> Self {
        Self::attach(Arc::new(Mutex::new(Shared::default())))
    }

    /// Another handle onto the same data, standing in for a second process.
    pub fn connect(&self) -> Self {
        Self::attach(Arc::clone(&self.shared))
    }

    fn attach(shared: Arc<Mutex<Shared>>) -> Self {
        let handle = {
            let mut guard = shared.lock().unwrap_or_else(PoisonError::into_inner);
            guard.next_handle += 1;
            guard.next_handle
        };
        Self {
            shared,
            handle,
            seen: Mutex::new(HashMap::new()),
        }
    }

    fn shared(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn seen(&self) -> MutexGuard<'_, HashMap<String, u64>> {
        self.seen.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Store for MemoryStore {
    fn read_raw(&self, key: &str) -> Result<Option<String>, StoreError> {
        validate_key(key)?;
        let shared = self.shared();
        let slot = shared.slots.get(key);
        self.seen()
            .insert(key.to_string(), slot.map_or(0, |s| s.revision));
        Ok(slot.map(|s| s.value.clone()))
    }

    fn write_raw(&self, key: &str, value: &str) -> Result<(), StoreError> {
        validate_key(key)?;
        let mut shared = self.shared();
        shared.next_revision += 1;
        let revision = shared.next_revision;
        shared.slots.insert(
            key.to_string(),
            Slot {
                value: value.to_string(),
                revision,
                writer: self.handle,
            },
        );
        self.seen().insert(key.to_string(), revision);
        Ok(())
    }

    fn poll_changes(&self) -> Vec<String> {
        let shared = self.shared();
        let seen = self.seen();
        let mut changed: Vec<String> = shared
            .slots
            .iter()
            .filter(|(key, slot)| {
                slot.writer != self.handle && slot.revision > seen.get(*key).copied().unwrap_or(0)
            })
            .map(|(key, _)| key.clone())
            .collect();
        changed.sort();
        changed
    }
}

//! Shard implementation
//!
//! HashMap-based shard with a single mutex for concurrency.

use std::collections::HashMap;

use bytes::Bytes;
use parking_lot::Mutex;

/// A single partition of the store
#[derive(Debug, Default)]
pub struct Shard {
    data: Mutex<HashMap<Vec<u8>, Bytes>>,
}

impl Shard {
    /// Create a new empty shard
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a value by key
    pub fn get(&self, key: &[u8]) -> Option<Bytes> {
        self.data.lock().get(key).cloned()
    }

    /// Insert or overwrite a value, returning the previous one
    pub fn put(&self, key: Vec<u8>, value: Bytes) -> Option<Bytes> {
        self.data.lock().insert(key, value)
    }

    /// Remove a key, returning whether it was present
    pub fn remove(&self, key: &[u8]) -> bool {
        self.data.lock().remove(key).is_some()
    }

    /// Run `f` with the shard's map locked
    ///
    /// Used by the store to keep the WAL append and the in-memory apply of
    /// one mutation inside the same critical section.
    pub fn with_locked<R>(&self, f: impl FnOnce(&mut HashMap<Vec<u8>, Bytes>) -> R) -> R {
        f(&mut self.data.lock())
    }

    /// Number of live entries
    pub fn len(&self) -> usize {
        self.data.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

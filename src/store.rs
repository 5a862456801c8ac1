//! Store Module
//!
//! The sharded key-value store that coordinates shards and the WAL.
//!
//! ## Responsibilities
//! - Route every key to exactly one shard
//! - Append to the WAL before applying a mutation in memory
//! - Rebuild in-memory state from the WAL on construction

use std::collections::hash_map::RandomState;
use std::hash::BuildHasher;

use bytes::Bytes;

use crate::config::Config;
use crate::error::{KvError, Result};
use crate::shard::Shard;
use crate::wal::{LogEntry, ReplayStats, Wal};

/// The sharded key-value store
///
/// ## Concurrency Model: Lock Striping
///
/// - Each shard owns its own mutex; operations on different shards never
///   contend with each other.
/// - Within a shard, get/put/del are mutually exclusive, which linearizes
///   all operations on a single key.
/// - Mutations additionally pass through the WAL's single lock, so the log
///   holds one total order of all mutations across shards.
/// - Lock order is always shard, then WAL. A mutation appends while holding
///   its shard lock, so per-key log order equals per-key apply order.
///
/// ## Durability
///
/// `put` and `del` append their record and flush it *before* touching the
/// shard. A mutation visible to readers is therefore always recoverable.
pub struct KvStore {
    /// Partitions, indexed by `shard_index`
    shards: Vec<Shard>,

    /// Hash state fixed for the lifetime of the store
    hasher: RandomState,

    /// Write-ahead log, absent in pure in-memory mode
    wal: Option<Wal>,

    /// Outcome of the startup replay, if a WAL was supplied
    replay_stats: Option<ReplayStats>,
}

impl KvStore {
    /// Create a store with `shard_count` partitions and an optional WAL.
    ///
    /// With a WAL, the whole log is replayed into the shards before this
    /// returns. Replayed records are applied directly, never re-logged.
    pub fn new(shard_count: usize, wal: Option<Wal>) -> Result<Self> {
        if shard_count == 0 {
            return Err(KvError::InvalidShardCount);
        }

        let mut store = Self {
            shards: (0..shard_count).map(|_| Shard::new()).collect(),
            hasher: RandomState::new(),
            wal: None,
            replay_stats: None,
        };

        if let Some(wal) = wal {
            let mut stats = wal.replay(|entry| store.apply(entry))?;
            // The torn tail was already cut off by `Wal::open`
            stats.repaired_bytes = wal.bytes_repaired();
            stats.torn_tail |= stats.repaired_bytes > 0;
            if stats.is_clean() {
                tracing::info!(
                    "WAL replay: {} records applied from {}",
                    stats.applied,
                    wal.path().display()
                );
            } else {
                tracing::warn!(
                    "WAL replay: {} records applied, {} malformed lines skipped, torn tail: {} ({} bytes discarded) ({})",
                    stats.applied,
                    stats.skipped,
                    stats.torn_tail,
                    stats.repaired_bytes,
                    wal.path().display()
                );
            }
            store.replay_stats = Some(stats);
            store.wal = Some(wal);
        }

        Ok(store)
    }

    /// Create a store without durability
    pub fn in_memory(shard_count: usize) -> Result<Self> {
        Self::new(shard_count, None)
    }

    /// Open a store from configuration
    ///
    /// A configured `wal_path` that cannot be opened for writing is an
    /// error; the store never silently falls back to in-memory mode.
    pub fn open(config: &Config) -> Result<Self> {
        let wal = match &config.wal_path {
            Some(path) => Some(Wal::open_with(path, config.wal_sync_strategy)?),
            None => None,
        };
        Self::new(config.shard_count, wal)
    }

    /// Get a value by key
    pub fn get(&self, key: &[u8]) -> Option<Bytes> {
        self.shard_for(key).get(key)
    }

    /// Put a key-value pair
    ///
    /// Steps, all under the owning shard's lock:
    /// 1. Append `Put` to the WAL and flush (if durable)
    /// 2. Insert into the shard
    ///
    /// Holding the shard lock across the append keeps the log order of
    /// mutations to one key identical to the order they are applied in.
    pub fn put(&self, key: &[u8], value: &[u8]) -> Result<()> {
        self.shard_for(key).with_locked(|data| -> Result<_> {
            if let Some(wal) = &self.wal {
                wal.append_put(key, value)?;
            }
            data.insert(key.to_vec(), Bytes::copy_from_slice(value));
            Ok(())
        })
    }

    /// Delete a key, returning whether it was present
    ///
    /// Same locking as `put`. The `Del` record is logged even when the key
    /// is absent.
    pub fn del(&self, key: &[u8]) -> Result<bool> {
        self.shard_for(key).with_locked(|data| -> Result<_> {
            if let Some(wal) = &self.wal {
                wal.append_del(key)?;
            }
            Ok(data.remove(key).is_some())
        })
    }

    /// Number of partitions, fixed at construction
    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    /// Index of the shard owning `key`
    pub fn shard_index(&self, key: &[u8]) -> usize {
        (self.hasher.hash_one(key) % self.shards.len() as u64) as usize
    }

    /// Total live entries. Shards are counted one after another, so this is
    /// not a consistent snapshot under concurrent writes.
    pub fn len(&self) -> usize {
        self.shards.iter().map(Shard::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.shards.iter().all(Shard::is_empty)
    }

    /// Statistics of the startup replay, `None` in in-memory mode
    pub fn replay_stats(&self) -> Option<ReplayStats> {
        self.replay_stats
    }

    /// Whether mutations are being logged
    pub fn is_durable(&self) -> bool {
        self.wal.is_some()
    }

    /// Force the WAL to stable storage. No-op in in-memory mode.
    pub fn sync(&self) -> Result<()> {
        match &self.wal {
            Some(wal) => wal.sync(),
            None => Ok(()),
        }
    }

    // =========================================================================
    // Internal
    // =========================================================================

    fn shard_for(&self, key: &[u8]) -> &Shard {
        &self.shards[self.shard_index(key)]
    }

    /// Apply a replayed record straight to the shards, bypassing the WAL
    fn apply(&self, entry: LogEntry) {
        match entry {
            LogEntry::Put { key, value } => {
                let shard = self.shard_for(&key);
                shard.put(key, Bytes::from(value));
            }
            LogEntry::Del { key } => {
                self.shard_for(&key).remove(&key);
            }
        }
    }
}

impl std::fmt::Debug for KvStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KvStore")
            .field("shard_count", &self.shards.len())
            .field("wal", &self.wal)
            .finish()
    }
}

//! Write-Ahead Log (WAL) Module
//!
//! Provides durability guarantees through append-only logging.
//!
//! ## Responsibilities
//! - Append a record before any mutation becomes visible
//! - Serialize concurrent appends into one total order
//! - Binary-safe, line-oriented encoding
//! - Crash recovery and replay
//!
//! ## File Format
//! ```text
//! P<TAB><escaped key><TAB><escaped value><LF>
//! D<TAB><escaped key><LF>
//! ```
//! Inside a field `\`, LF, TAB and CR are written as `\\`, `\n`, `\t` and
//! `\r`; every other byte is copied as is.

mod entry;
mod reader;
mod recovery;
mod writer;

use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use crate::config::WalSyncStrategy;
use crate::error::Result;

pub use entry::{encode_del, encode_put, escape, unescape, LogEntry, DEL_TAG, PUT_TAG};
pub use reader::{ReadOutcome, WalReader};
pub use recovery::{replay_file, ReplayStats};
pub use writer::WalWriter;

/// The write-ahead log owned by a store
///
/// A single mutex guards the file so concurrent appends land as whole lines,
/// and physical append order is the log's logical order.
pub struct Wal {
    path: PathBuf,
    writer: Mutex<WalWriter>,
}

impl Wal {
    /// Open or create the log at `path` with the default sync strategy
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with(path, WalSyncStrategy::default())
    }

    /// Open or create the log at `path`
    pub fn open_with(path: impl AsRef<Path>, sync_strategy: WalSyncStrategy) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let writer = WalWriter::open(&path, sync_strategy)?;
        tracing::debug!("Opened WAL at {} ({:?})", path.display(), sync_strategy);

        Ok(Self {
            path,
            writer: Mutex::new(writer),
        })
    }

    /// Append a put record; returns once it has been written out
    pub fn append_put(&self, key: &[u8], value: &[u8]) -> Result<()> {
        let record = encode_put(key, value);
        self.writer.lock().append(&record)
    }

    /// Append a delete record; returns once it has been written out
    pub fn append_del(&self, key: &[u8]) -> Result<()> {
        let record = encode_del(key);
        self.writer.lock().append(&record)
    }

    /// Append an already built entry
    pub fn append(&self, entry: &LogEntry) -> Result<()> {
        let record = entry.encode();
        self.writer.lock().append(&record)
    }

    /// Replay the log from the start, calling `apply` once per valid record
    pub fn replay<F>(&self, apply: F) -> Result<ReplayStats>
    where
        F: FnMut(LogEntry),
    {
        replay_file(&self.path, apply)
    }

    /// Force everything appended so far to stable storage
    pub fn sync(&self) -> Result<()> {
        self.writer.lock().sync()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Bytes of torn trailing record discarded when the log was opened
    pub fn bytes_repaired(&self) -> u64 {
        self.writer.lock().bytes_repaired()
    }

    /// Records appended since the log was opened
    pub fn records_written(&self) -> u64 {
        self.writer.lock().records_written()
    }
}

impl std::fmt::Debug for Wal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wal").field("path", &self.path).finish()
    }
}

//! WAL Writer
//!
//! Handles appending records to the WAL file.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use crate::config::WalSyncStrategy;
use crate::error::Result;

/// Chunk size used when scanning backwards for the last record boundary
const TAIL_SCAN_CHUNK: u64 = 4096;

/// Appends encoded records to the WAL file
///
/// Not synchronized on its own; `Wal` wraps it in a mutex so records from
/// concurrent writers never interleave.
pub struct WalWriter {
    file: File,
    sync_strategy: WalSyncStrategy,
    records_written: u64,
    bytes_repaired: u64,
}

impl WalWriter {
    /// Open or create a WAL file in append mode
    ///
    /// If the file ends in the middle of a line, that incomplete record was
    /// never acknowledged, so it is cut off before any new record is appended
    /// behind it.
    pub fn open(path: &Path, sync_strategy: WalSyncStrategy) -> Result<Self> {
        let mut file = OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(path)?;

        let bytes_repaired = repair_torn_tail(&mut file)?;
        if bytes_repaired > 0 {
            tracing::warn!(
                "Discarded {} bytes of incomplete trailing record in {}",
                bytes_repaired,
                path.display()
            );
        }

        Ok(Self {
            file,
            sync_strategy,
            records_written: 0,
            bytes_repaired,
        })
    }

    /// Append one complete record and push it out according to the sync strategy
    pub fn append(&mut self, record: &[u8]) -> Result<()> {
        self.file.write_all(record)?;
        self.file.flush()?;
        if self.sync_strategy == WalSyncStrategy::Fsync {
            self.file.sync_data()?;
        }
        self.records_written += 1;
        Ok(())
    }

    /// Force sync to disk
    pub fn sync(&mut self) -> Result<()> {
        self.file.flush()?;
        self.file.sync_data()?;
        Ok(())
    }

    /// Records appended through this writer since it was opened
    pub fn records_written(&self) -> u64 {
        self.records_written
    }

    /// Bytes of torn trailing record removed when the file was opened
    pub fn bytes_repaired(&self) -> u64 {
        self.bytes_repaired
    }
}

/// Truncate the file back to just after its last newline.
///
/// Returns the number of bytes removed (0 when the file is empty or already
/// ends on a record boundary).
fn repair_torn_tail(file: &mut File) -> Result<u64> {
    let len = file.metadata()?.len();
    if len == 0 {
        return Ok(0);
    }

    let mut end = len;
    let mut buf = vec![0u8; TAIL_SCAN_CHUNK as usize];
    let boundary = loop {
        let start = end.saturating_sub(TAIL_SCAN_CHUNK);
        let chunk = &mut buf[..(end - start) as usize];
        file.seek(SeekFrom::Start(start))?;
        file.read_exact(chunk)?;

        if let Some(pos) = chunk.iter().rposition(|&b| b == b'\n') {
            break start + pos as u64 + 1;
        }
        if start == 0 {
            break 0;
        }
        end = start;
    };

    if boundary < len {
        file.set_len(boundary)?;
        file.sync_data()?;
    }
    Ok(len - boundary)
}

//! WAL Recovery
//!
//! Replays the WAL file into a caller-supplied apply function.

use std::path::Path;

use super::{LogEntry, ReadOutcome, WalReader};
use crate::error::Result;

/// Result of a replay
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplayStats {
    /// Number of records handed to the apply function
    pub applied: u64,

    /// Number of complete but malformed lines skipped
    pub skipped: u64,

    /// Whether the file ended with an incomplete line (ignored)
    pub torn_tail: bool,

    /// Bytes of incomplete trailing record cut off when the log was opened
    /// for appending. Set by the owner of the `Wal`, not by `replay_file`.
    pub repaired_bytes: u64,
}

impl ReplayStats {
    pub fn is_clean(&self) -> bool {
        self.skipped == 0 && !self.torn_tail && self.repaired_bytes == 0
    }
}

/// Replay every well-formed record of the log at `path`, in file order.
///
/// Malformed lines are skipped and counted rather than aborting the replay:
/// whatever state is recoverable is recovered. A log that cannot be opened
/// (usually because it does not exist yet) replays as empty.
pub fn replay_file<F>(path: &Path, mut apply: F) -> Result<ReplayStats>
where
    F: FnMut(LogEntry),
{
    let mut stats = ReplayStats::default();

    let reader = match WalReader::open(path) {
        Ok(reader) => reader,
        Err(e) => {
            tracing::debug!("No log to replay at {}: {}", path.display(), e);
            return Ok(stats);
        }
    };

    for outcome in reader {
        match outcome? {
            ReadOutcome::Entry(entry) => {
                apply(entry);
                stats.applied += 1;
            }
            ReadOutcome::Malformed { line_no } => {
                tracing::warn!("Skipping malformed log line {} in {}", line_no, path.display());
                stats.skipped += 1;
            }
            ReadOutcome::TornTail { line_no } => {
                tracing::warn!(
                    "Ignoring incomplete trailing record at line {} in {}",
                    line_no,
                    path.display()
                );
                stats.torn_tail = true;
            }
        }
    }

    Ok(stats)
}

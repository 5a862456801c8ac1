//! WAL Reader
//!
//! Handles reading records from the WAL file, one line at a time.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use super::LogEntry;
use crate::error::Result;

/// What a single line of the log turned out to be
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// A well-formed record
    Entry(LogEntry),

    /// A complete line that does not decode
    Malformed { line_no: u64 },

    /// Bytes after the last newline: an append that never finished
    TornTail { line_no: u64 },
}

/// Reads records from the WAL file
pub struct WalReader {
    reader: BufReader<File>,
    line_no: u64,
    buf: Vec<u8>,
    done: bool,
}

impl WalReader {
    /// Open a WAL file for reading
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self {
            reader: BufReader::new(file),
            line_no: 0,
            buf: Vec::new(),
            done: false,
        })
    }

    /// Read the next line from the WAL. `Ok(None)` at end of file.
    pub fn next_outcome(&mut self) -> Result<Option<ReadOutcome>> {
        if self.done {
            return Ok(None);
        }

        self.buf.clear();
        let read = self.reader.read_until(b'\n', &mut self.buf)?;
        if read == 0 {
            self.done = true;
            return Ok(None);
        }
        self.line_no += 1;

        let Some(line) = self.buf.strip_suffix(b"\n") else {
            self.done = true;
            return Ok(Some(ReadOutcome::TornTail {
                line_no: self.line_no,
            }));
        };

        Ok(Some(match LogEntry::decode(line) {
            Some(entry) => ReadOutcome::Entry(entry),
            None => ReadOutcome::Malformed {
                line_no: self.line_no,
            },
        }))
    }
}

impl Iterator for WalReader {
    type Item = Result<ReadOutcome>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_outcome() {
            Ok(Some(outcome)) => Some(Ok(outcome)),
            Ok(None) => None,
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

//! WAL Entry definitions
//!
//! Defines the structure of individual WAL records and their line encoding.

/// Tag byte of a put record
pub const PUT_TAG: u8 = b'P';

/// Tag byte of a delete record
pub const DEL_TAG: u8 = b'D';

const FIELD_SEP: u8 = b'\t';
const RECORD_END: u8 = b'\n';

/// Operations that can be logged
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogEntry {
    /// Put a key-value pair
    Put { key: Vec<u8>, value: Vec<u8> },

    /// Delete a key
    Del { key: Vec<u8> },
}

impl LogEntry {
    pub fn key(&self) -> &[u8] {
        match self {
            LogEntry::Put { key, .. } | LogEntry::Del { key } => key.as_slice(),
        }
    }

    /// Encode the entry as one complete log line, trailing newline included
    pub fn encode(&self) -> Vec<u8> {
        match self {
            LogEntry::Put { key, value } => encode_put(key, value),
            LogEntry::Del { key } => encode_del(key),
        }
    }

    /// Decode one log line (without its trailing newline)
    ///
    /// Returns `None` for anything that is not a well-formed record: an
    /// unknown tag, a missing field separator or an invalid escape. The value
    /// of a put is the remainder of the line, so stray tabs after the key end
    /// up inside the value.
    pub fn decode(line: &[u8]) -> Option<LogEntry> {
        let (tag, rest) = split_field(line)?;
        let &[tag] = tag else {
            return None;
        };

        match tag {
            PUT_TAG => {
                let (raw_key, raw_value) = split_field(rest)?;
                Some(LogEntry::Put {
                    key: unescape(raw_key)?,
                    value: unescape(raw_value)?,
                })
            }
            DEL_TAG => {
                // Anything after a second separator is ignored
                let raw_key = match split_field(rest) {
                    Some((raw_key, _)) => raw_key,
                    None => rest,
                };
                Some(LogEntry::Del {
                    key: unescape(raw_key)?,
                })
            }
            _ => None,
        }
    }
}

/// Encode a put record without building a `LogEntry` first
pub fn encode_put(key: &[u8], value: &[u8]) -> Vec<u8> {
    let mut line = Vec::with_capacity(key.len() + value.len() + 4);
    line.push(PUT_TAG);
    line.push(FIELD_SEP);
    escape_into(key, &mut line);
    line.push(FIELD_SEP);
    escape_into(value, &mut line);
    line.push(RECORD_END);
    line
}

/// Encode a delete record without building a `LogEntry` first
pub fn encode_del(key: &[u8]) -> Vec<u8> {
    let mut line = Vec::with_capacity(key.len() + 3);
    line.push(DEL_TAG);
    line.push(FIELD_SEP);
    escape_into(key, &mut line);
    line.push(RECORD_END);
    line
}

/// Escape a field so it contains no separator, newline or carriage return
pub fn escape(field: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(field.len());
    escape_into(field, &mut out);
    out
}

fn escape_into(field: &[u8], out: &mut Vec<u8>) {
    for &byte in field {
        match byte {
            b'\\' => out.extend_from_slice(b"\\\\"),
            b'\n' => out.extend_from_slice(b"\\n"),
            b'\t' => out.extend_from_slice(b"\\t"),
            b'\r' => out.extend_from_slice(b"\\r"),
            other => out.push(other),
        }
    }
}

/// Reverse `escape`. Returns `None` on an unknown or unterminated escape.
pub fn unescape(encoded: &[u8]) -> Option<Vec<u8>> {
    let mut out = Vec::with_capacity(encoded.len());
    let mut bytes = encoded.iter();

    while let Some(&byte) = bytes.next() {
        if byte != b'\\' {
            out.push(byte);
            continue;
        }
        let decoded = match bytes.next()? {
            b'\\' => b'\\',
            b'n' => b'\n',
            b't' => b'\t',
            b'r' => b'\r',
            _ => return None,
        };
        out.push(decoded);
    }

    Some(out)
}

fn split_field(line: &[u8]) -> Option<(&[u8], &[u8])> {
    let pos = line.iter().position(|&b| b == FIELD_SEP)?;
    Some((&line[..pos], &line[pos + 1..]))
}

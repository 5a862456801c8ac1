//! Protocol codec
//!
//! Parsing and formatting functions for the line protocol.

use std::io::{BufRead, Read, Write};

use bytes::Bytes;

use super::{Command, CommandType, Response};
use crate::error::{KvError, Result};

/// Maximum accepted request line, newline included (16 MB)
pub const MAX_LINE_LEN: usize = 16 * 1024 * 1024;

pub(crate) const MISSING_KEY: &str = "missing key";
pub(crate) const UNKNOWN_COMMAND: &str = "unknown command";
pub(crate) const LINE_TOO_LONG: &str = "line too long";

// =============================================================================
// Command Parsing/Encoding
// =============================================================================

/// Parse one request line (with or without its trailing newline)
///
/// Returns `Ok(None)` for a blank line. A missing key or an unknown keyword
/// is a `KvError::Protocol` carrying the message to send back.
pub fn parse_command(line: &[u8]) -> Result<Option<Command>> {
    let line = trim(line);
    if line.is_empty() {
        return Ok(None);
    }

    let (keyword, rest) = next_token(line);
    let command_type = CommandType::from_keyword(keyword)
        .ok_or_else(|| KvError::Protocol(UNKNOWN_COMMAND.to_string()))?;

    let (key, rest) = next_token(rest);
    if key.is_empty() {
        return Err(KvError::Protocol(MISSING_KEY.to_string()));
    }
    let key = key.to_vec();

    let command = match command_type {
        CommandType::Get => Command::Get { key },
        CommandType::Put => Command::Put {
            key,
            value: trim(rest).to_vec(),
        },
        CommandType::Delete => Command::Delete { key },
    };
    Ok(Some(command))
}

/// Encode a command as a request line
pub fn encode_command(command: &Command) -> Vec<u8> {
    let keyword = command.command_type().keyword().as_bytes();
    let mut line = Vec::with_capacity(keyword.len() + command.key().len() + 2);
    line.extend_from_slice(keyword);
    line.push(b' ');
    line.extend_from_slice(command.key());
    if let Command::Put { value, .. } = command {
        line.push(b' ');
        line.extend_from_slice(value);
    }
    line.push(b'\n');
    line
}

// =============================================================================
// Response Encoding/Decoding
// =============================================================================

/// Encode a response as a line
pub fn encode_response(response: &Response) -> Vec<u8> {
    match response {
        Response::Value(value) => {
            let mut line = Vec::with_capacity(value.len() + 7);
            line.extend_from_slice(b"VALUE ");
            line.extend_from_slice(value);
            line.push(b'\n');
            line
        }
        Response::Ok => b"OK\n".to_vec(),
        Response::NotFound => b"NOT_FOUND\n".to_vec(),
        Response::Error(message) => format!("ERROR {}\n", message).into_bytes(),
    }
}

/// Decode a response line (with or without its trailing newline)
pub fn decode_response(line: &[u8]) -> Result<Response> {
    let line = line.strip_suffix(b"\n").unwrap_or(line);

    if let Some(value) = line.strip_prefix(b"VALUE ") {
        return Ok(Response::Value(Bytes::copy_from_slice(value)));
    }
    if let Some(message) = line.strip_prefix(b"ERROR ") {
        return Ok(Response::Error(String::from_utf8_lossy(message).into_owned()));
    }
    match line {
        b"OK" => Ok(Response::Ok),
        b"NOT_FOUND" => Ok(Response::NotFound),
        _ => Err(KvError::Protocol(format!(
            "unrecognized response: {:?}",
            String::from_utf8_lossy(line)
        ))),
    }
}

// =============================================================================
// Stream-based I/O helpers
// =============================================================================

/// Read one newline-terminated line into `buf` (newline stripped)
///
/// Returns `Ok(false)` once the peer has closed the stream; an unterminated
/// trailing fragment is discarded. Lines longer than `MAX_LINE_LEN` fail
/// with a protocol error.
pub fn read_line<R: BufRead>(reader: &mut R, buf: &mut Vec<u8>) -> Result<bool> {
    buf.clear();
    let read = reader
        .by_ref()
        .take(MAX_LINE_LEN as u64)
        .read_until(b'\n', buf)?;

    if buf.last() == Some(&b'\n') {
        buf.pop();
        return Ok(true);
    }
    if read == MAX_LINE_LEN {
        return Err(KvError::Protocol(LINE_TOO_LONG.to_string()));
    }
    Ok(false)
}

/// Write a response to a stream
pub fn write_response<W: Write>(writer: &mut W, response: &Response) -> Result<()> {
    writer.write_all(&encode_response(response))?;
    writer.flush()?;
    Ok(())
}

// =============================================================================
// Tokenizing
// =============================================================================

/// ASCII whitespace plus vertical tab, which `is_ascii_whitespace` leaves out
fn is_space(b: u8) -> bool {
    b.is_ascii_whitespace() || b == b'\x0B'
}

fn trim(bytes: &[u8]) -> &[u8] {
    let start = bytes
        .iter()
        .position(|&b| !is_space(b))
        .unwrap_or(bytes.len());
    let end = bytes
        .iter()
        .rposition(|&b| !is_space(b))
        .map_or(start, |pos| pos + 1);
    &bytes[start..end]
}

/// Split off the next whitespace-delimited token
fn next_token(bytes: &[u8]) -> (&[u8], &[u8]) {
    let start = bytes
        .iter()
        .position(|&b| !is_space(b))
        .unwrap_or(bytes.len());
    let bytes = &bytes[start..];
    let end = bytes
        .iter()
        .position(|&b| is_space(b))
        .unwrap_or(bytes.len());
    bytes.split_at(end)
}

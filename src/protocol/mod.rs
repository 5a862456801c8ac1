//! Protocol Module
//!
//! Defines the line-oriented text protocol for client-server communication.
//!
//! ## Request Format
//! One command per line, whitespace separated, terminated by `\n`:
//! ```text
//! GET <key>
//! PUT <key> <value...>      (value = rest of the line, trimmed)
//! DEL <key>
//! ```
//!
//! ## Response Format
//! ```text
//! VALUE <value>             GET hit
//! OK                        PUT, or DEL of a present key
//! NOT_FOUND                 GET miss, or DEL of an absent key
//! ERROR <message>           missing key, unknown command, store failure
//! ```
//!
//! Blank lines are ignored and get no response.

mod codec;
mod command;
mod response;

pub use codec::{
    decode_response, encode_command, encode_response, parse_command, read_line, write_response,
    MAX_LINE_LEN,
};
pub use command::{Command, CommandType};
pub use response::Response;

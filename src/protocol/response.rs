//! Response definitions
//!
//! Represents responses to clients.

use bytes::Bytes;

/// A response to send to a client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// GET hit
    Value(Bytes),

    /// PUT done, or DEL removed the key
    Ok,

    /// GET miss, or DEL of an absent key
    NotFound,

    /// Anything that went wrong; the message goes on the wire as is
    Error(String),
}

impl Response {
    /// Create an ERROR response
    pub fn error(message: impl Into<String>) -> Self {
        Response::Error(message.into())
    }
}

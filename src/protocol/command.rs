//! Command definitions
//!
//! Represents commands from clients.

/// Command types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandType {
    Get,
    Put,
    Delete,
}

impl CommandType {
    /// The keyword that starts the command on the wire
    pub fn keyword(self) -> &'static str {
        match self {
            CommandType::Get => "GET",
            CommandType::Put => "PUT",
            CommandType::Delete => "DEL",
        }
    }

    pub fn from_keyword(word: &[u8]) -> Option<Self> {
        match word {
            b"GET" => Some(CommandType::Get),
            b"PUT" => Some(CommandType::Put),
            b"DEL" => Some(CommandType::Delete),
            _ => None,
        }
    }
}

/// A parsed command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Get a value by key
    Get { key: Vec<u8> },

    /// Put a key-value pair
    Put { key: Vec<u8>, value: Vec<u8> },

    /// Delete a key
    Delete { key: Vec<u8> },
}

impl Command {
    /// Get the command type
    pub fn command_type(&self) -> CommandType {
        match self {
            Command::Get { .. } => CommandType::Get,
            Command::Put { .. } => CommandType::Put,
            Command::Delete { .. } => CommandType::Delete,
        }
    }

    pub fn key(&self) -> &[u8] {
        match self {
            Command::Get { key } | Command::Put { key, .. } | Command::Delete { key } => {
                key.as_slice()
            }
        }
    }
}

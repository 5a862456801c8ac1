//! Connection Handler
//!
//! Handles individual client connections.

use std::io::{BufReader, BufWriter, ErrorKind};
use std::net::TcpStream;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{KvError, Result};
use crate::protocol::{parse_command, read_line, write_response, Command, Response};
use crate::store::KvStore;

/// Handles a single client connection
pub struct Connection {
    /// TCP stream reader (buffered for efficiency)
    reader: BufReader<TcpStream>,

    /// TCP stream writer (buffered for efficiency)
    writer: BufWriter<TcpStream>,

    /// Reference to the store
    store: Arc<KvStore>,

    /// Peer address for logging
    peer_addr: String,
}

impl Connection {
    /// Create a new connection handler
    pub fn new(stream: TcpStream, store: Arc<KvStore>) -> Result<Self> {
        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "unknown".to_string());

        // Disable Nagle's algorithm for low latency
        stream.set_nodelay(true)?;

        let read_stream = stream.try_clone()?;

        Ok(Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(stream),
            store,
            peer_addr,
        })
    }

    /// Configure connection timeouts (0 leaves a direction unbounded)
    pub fn set_timeouts(&mut self, read_ms: u64, write_ms: u64) -> Result<()> {
        if read_ms > 0 {
            self.reader
                .get_ref()
                .set_read_timeout(Some(Duration::from_millis(read_ms)))?;
        }
        if write_ms > 0 {
            self.writer
                .get_ref()
                .set_write_timeout(Some(Duration::from_millis(write_ms)))?;
        }
        Ok(())
    }

    /// Handle the connection (blocking until closed)
    ///
    /// Reads lines in a loop and answers each command. Returns when the
    /// client disconnects; peer resets and timeouts are not errors.
    pub fn handle(&mut self) -> Result<()> {
        tracing::debug!("Connection established from {}", self.peer_addr);
        let mut line = Vec::new();

        loop {
            match read_line(&mut self.reader, &mut line) {
                Ok(true) => {}
                Ok(false) => {
                    tracing::debug!("Client {} disconnected", self.peer_addr);
                    return Ok(());
                }
                Err(KvError::Io(ref e)) if is_disconnect(e.kind()) => {
                    tracing::debug!("Connection to {} closed: {}", self.peer_addr, e);
                    return Ok(());
                }
                Err(KvError::Protocol(message)) => {
                    tracing::warn!("Dropping {}: {}", self.peer_addr, message);
                    let _ = self.send_response(&Response::Error(message.clone()));
                    return Err(KvError::Protocol(message));
                }
                Err(e) => {
                    tracing::warn!("Error reading from {}: {}", self.peer_addr, e);
                    return Err(e);
                }
            }

            let response = match parse_command(&line) {
                Ok(Some(command)) => {
                    tracing::trace!("Received command from {}: {:?}", self.peer_addr, command);
                    execute(&self.store, command)
                }
                Ok(None) => continue,
                Err(KvError::Protocol(message)) => Response::Error(message),
                Err(e) => Response::error(e.to_string()),
            };

            if let Err(e) = self.send_response(&response) {
                if let KvError::Io(ref io_err) = e {
                    if is_disconnect(io_err.kind()) || io_err.kind() == ErrorKind::BrokenPipe {
                        tracing::debug!(
                            "Client {} disconnected before response could be sent: {}",
                            self.peer_addr,
                            e
                        );
                        return Ok(());
                    }
                }
                tracing::warn!("Error writing to {}: {}", self.peer_addr, e);
                return Err(e);
            }
        }
    }

    /// Send a response to the client
    fn send_response(&mut self, response: &Response) -> Result<()> {
        write_response(&mut self.writer, response)
    }
}

/// Run a command against the store and build its response
pub fn execute(store: &KvStore, command: Command) -> Response {
    match command {
        Command::Get { key } => match store.get(&key) {
            Some(value) => Response::Value(value),
            None => Response::NotFound,
        },
        Command::Put { key, value } => match store.put(&key, &value) {
            Ok(()) => Response::Ok,
            Err(e) => Response::error(e.to_string()),
        },
        Command::Delete { key } => match store.del(&key) {
            Ok(true) => Response::Ok,
            Ok(false) => Response::NotFound,
            Err(e) => Response::error(e.to_string()),
        },
    }
}

fn is_disconnect(kind: ErrorKind) -> bool {
    matches!(
        kind,
        ErrorKind::UnexpectedEof
            | ErrorKind::ConnectionReset
            | ErrorKind::ConnectionAborted
            | ErrorKind::WouldBlock
            | ErrorKind::TimedOut
    )
}

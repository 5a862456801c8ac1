//! Network Module
//!
//! TCP server and client handling.
//!
//! ## Architecture
//! - Single acceptor thread running `Server::run`
//! - Each accepted connection is one task on the worker pool
//! - Commands are executed directly against the shared `KvStore`

mod connection;
mod server;

pub use connection::{execute, Connection};
pub use server::{Server, ShutdownHandle};

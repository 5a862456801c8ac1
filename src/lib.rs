//! # shardkv
//!
//! A sharded key-value store with:
//! - Lock striping: one mutex per shard, keys routed by hash
//! - Write-Ahead Logging (WAL) for durability, appended before apply
//! - Best-effort crash recovery that skips malformed log lines
//! - A fixed-size worker pool serving a line-oriented TCP protocol
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      TCP Server                             │
//! │              (accept loop → worker pool)                    │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                     KvStore                                 │
//! │             hash(key) mod shard_count                       │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌───────────────────┐
//!   │     WAL     │  first   │ Shard 0 .. N-1    │
//!   │  (Append)   │ ───────▶ │ (Mutex<HashMap>)  │
//!   └─────────────┘          └───────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod config;
pub mod error;

pub mod network;
pub mod pool;
pub mod protocol;
pub mod shard;
pub mod store;
pub mod wal;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use config::Config;
pub use error::{KvError, Result};
pub use pool::ThreadPool;
pub use store::KvStore;
pub use wal::Wal;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of shardkv
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

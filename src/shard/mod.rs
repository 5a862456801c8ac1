//! Shard Module
//!
//! One independently locked partition of the key space.
//!
//! ## Responsibilities
//! - Own the key → value map for every key routed to it
//! - Serialize get/put/del on that map behind its own mutex
//!
//! ## Data Structure Choice
//! A `HashMap` behind a `parking_lot::Mutex`:
//! - Point lookups only, no ordering needed
//! - Reads and writes are short critical sections, so a plain mutex beats
//!   an RwLock's bookkeeping
//! - Values are `Bytes`, so a read clones a refcount instead of the payload

mod table;

pub use table::Shard;

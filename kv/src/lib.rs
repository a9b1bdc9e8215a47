//! Key-value backend interface and implementations.
//!
//! The backend exposes two shapes of data, both addressed by a string name:
//!
//! - **hashes**: a namespace of `field -> bytes` entries (registrations)
//! - **lists**: append-at-head string lists (attendance logs)
//!
//! [`MemoryStore`] is for tests and ephemeral sessions, [`RedbStore`]
//! persists to a single redb file.

pub mod memory;
pub mod redb;

use std::fmt;
use thiserror::Error;

/// Errors that can occur in KV store operations.
#[derive(Error, Debug)]
pub enum KVError {
    #[error("kv: storage error: {0}")]
    Storage(String),

    #[error("kv: invalid value: {0}")]
    InvalidValue(String),
}

/// Result type for KV operations.
pub type KVResult<T> = Result<T, KVError>;

/// Key-value store trait.
///
/// Implementations must be safe for concurrent use.
pub trait KVStore: Send + Sync {
    /// Set a field in a hash, replacing any previous value.
    fn hset(&self, hash: &str, field: &str, value: &[u8]) -> KVResult<()>;

    /// Get a single field of a hash.
    fn hget(&self, hash: &str, field: &str) -> KVResult<Option<Vec<u8>>>;

    /// Return every field of a hash, ordered by field name.
    /// A hash that was never written is empty, not an error.
    fn hgetall(&self, hash: &str) -> KVResult<Vec<(String, Vec<u8>)>>;

    /// Push values to the head of a list, in order, as one write.
    ///
    /// After `lpush("l", &["a", "b"])` the list reads `["b", "a", ...]`.
    fn lpush(&self, list: &str, values: &[&str]) -> KVResult<()>;

    /// Return the whole list, head (most recent push) first.
    fn lrange(&self, list: &str) -> KVResult<Vec<String>>;

    /// Return the number of entries in a list.
    fn llen(&self, list: &str) -> KVResult<usize>;
}

impl fmt::Debug for dyn KVStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "KVStore {{ ... }}")
    }
}

// Re-export the implementations
pub use memory::MemoryStore;
pub use self::redb::RedbStore;

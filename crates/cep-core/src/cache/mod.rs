//! Cache store abstraction consumed by the lookup pipeline.
//!
//! A store holds serialized [`AddressRecord`]s keyed by the canonical cache
//! key (`"cep_" + code`) with a per-entry TTL. Reads never fail: absent,
//! expired, and malformed entries all report as a miss, since the pipeline
//! only trusts structurally valid cached values.
//!
//! No locking discipline is required beyond single-key atomicity. Two
//! concurrent misses for the same code may both fetch and both write; the
//! last write wins, which is fine because upstream responses are idempotent
//! per code.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::types::AddressRecord;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Errors raised by cache writes and maintenance operations.
///
/// Reads deliberately have no error channel; see the module docs.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("cache serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Key-value store for normalized address records.
///
/// A store instance owns one namespace; [`CacheStore::clear`] empties it.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Returns the record stored under `key`, or `None` on a miss.
    ///
    /// Expired and undeserializable entries are treated as misses, not
    /// errors.
    async fn read(&self, key: &str) -> Option<AddressRecord>;

    /// Stores `record` under `key` with the given time-to-live.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] if the entry cannot be serialized or persisted.
    async fn write(&self, key: &str, record: &AddressRecord, ttl: Duration)
        -> Result<(), CacheError>;

    /// Removes every entry in this store's namespace.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] if the underlying storage cannot be cleared.
    async fn clear(&self) -> Result<(), CacheError>;
}

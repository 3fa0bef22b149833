use super::{CacheError, CacheStore};
use crate::types::AddressRecord;
use async_trait::async_trait;
use dashmap::DashMap;
use std::time::{Duration, Instant};
use tracing::trace;

struct Entry {
    record: AddressRecord,
    deadline: Instant,
}

/// In-memory cache store backed by a concurrent hash map.
///
/// Expired entries are dropped lazily on read; there is no background
/// sweeper, which is acceptable for a keyspace of 8-digit codes.
#[derive(Default)]
pub struct MemoryStore {
    entries: DashMap<String, Entry>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live (possibly expired, not yet swept) entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn read(&self, key: &str) -> Option<AddressRecord> {
        let expired = match self.entries.get(key) {
            Some(entry) if Instant::now() < entry.deadline => {
                return Some(entry.record.clone());
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            trace!(key, "dropping expired cache entry");
            self.entries.remove(key);
        }
        None
    }

    async fn write(
        &self,
        key: &str,
        record: &AddressRecord,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        let entry = Entry { record: record.clone(), deadline: Instant::now() + ttl };
        self.entries.insert(key.to_string(), entry);
        Ok(())
    }

    async fn clear(&self) -> Result<(), CacheError> {
        self.entries.clear();
        Ok(())
    }
}

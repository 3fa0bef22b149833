use super::{CacheError, CacheStore};
use crate::types::AddressRecord;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{
    path::{Path, PathBuf},
    time::Duration,
};
use tracing::trace;

/// On-disk shape of one cache entry: the record plus its absolute expiry.
#[derive(Debug, Serialize, Deserialize)]
struct StoredEntry {
    expires_at: DateTime<Utc>,
    record: AddressRecord,
}

/// File-backed cache store: one JSON document per key under a namespace
/// directory.
///
/// Survives process restarts, which matters for a 30-day TTL. Keys are
/// restricted to `[A-Za-z0-9_]` so they can be used as file names directly;
/// anything else is refused on write and misses on read.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Creates a store rooted at `dir`. The directory is created lazily on
    /// the first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn key_is_safe(key: &str) -> bool {
        !key.is_empty() && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    async fn read_entry(path: &Path) -> Option<StoredEntry> {
        let bytes = tokio::fs::read(path).await.ok()?;
        serde_json::from_slice(&bytes).ok()
    }
}

#[async_trait]
impl CacheStore for FileStore {
    async fn read(&self, key: &str) -> Option<AddressRecord> {
        if !Self::key_is_safe(key) {
            return None;
        }

        let path = self.path_for(key);
        let Some(entry) = Self::read_entry(&path).await else {
            // Missing or undeserializable file, either way a miss.
            trace!(key, "cache file absent or malformed");
            return None;
        };

        if entry.expires_at <= Utc::now() {
            trace!(key, "dropping expired cache file");
            let _ = tokio::fs::remove_file(&path).await;
            return None;
        }

        Some(entry.record)
    }

    async fn write(
        &self,
        key: &str,
        record: &AddressRecord,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        if !Self::key_is_safe(key) {
            return Err(CacheError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("cache key {key:?} is not filesystem safe"),
            )));
        }

        // TTLs beyond chrono's range are capped at a century.
        let ttl = chrono::Duration::from_std(ttl).unwrap_or_else(|_| chrono::Duration::days(36_500));
        let entry = StoredEntry { expires_at: Utc::now() + ttl, record: record.clone() };
        let bytes = serde_json::to_vec(&entry)?;

        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(self.path_for(key), bytes).await?;
        Ok(())
    }

    async fn clear(&self) -> Result<(), CacheError> {
        let mut dir = match tokio::fs::read_dir(&self.dir).await {
            Ok(dir) => dir,
            // A namespace that was never written to is already clear.
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e.into()),
        };

        while let Some(item) = dir.next_entry().await? {
            if item.path().extension().is_some_and(|ext| ext == "json") {
                tokio::fs::remove_file(item.path()).await?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Cep, Source};

    fn sample_record() -> AddressRecord {
        AddressRecord {
            cep: Cep::parse("01001000").unwrap(),
            street: Some("Praça da Sé".to_string()),
            complement: Some("lado ímpar".to_string()),
            neighborhood: Some("Sé".to_string()),
            city: Some("São Paulo".to_string()),
            state: Some("SP".to_string()),
            service: Source::Viacep,
        }
    }

    #[tokio::test]
    async fn test_write_then_read_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        let record = sample_record();

        store.write("cep_01001000", &record, Duration::from_secs(60)).await.unwrap();

        assert_eq!(store.read("cep_01001000").await.unwrap(), record);
    }

    #[tokio::test]
    async fn test_read_miss_on_empty_namespace() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("never_written"));
        assert!(store.read("cep_01001000").await.is_none());
    }

    #[tokio::test]
    async fn test_malformed_file_is_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        tokio::fs::write(dir.path().join("cep_01001000.json"), b"{not json")
            .await
            .unwrap();

        assert!(store.read("cep_01001000").await.is_none());
    }

    #[tokio::test]
    async fn test_expired_entry_is_a_miss_and_removed() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        store.write("cep_01001000", &sample_record(), Duration::ZERO).await.unwrap();

        assert!(store.read("cep_01001000").await.is_none());
        assert!(!dir.path().join("cep_01001000.json").exists());
    }

    #[tokio::test]
    async fn test_unsafe_key_rejected_on_write() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        let result = store.write("../escape", &sample_record(), Duration::from_secs(60)).await;
        assert!(result.is_err());
        assert!(store.read("../escape").await.is_none());
    }

    #[tokio::test]
    async fn test_clear_removes_entries() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        store.write("cep_01001000", &sample_record(), Duration::from_secs(60)).await.unwrap();
        store.write("cep_20040030", &sample_record(), Duration::from_secs(60)).await.unwrap();

        store.clear().await.unwrap();

        assert!(store.read("cep_01001000").await.is_none());
        assert!(store.read("cep_20040030").await.is_none());
    }

    #[tokio::test]
    async fn test_clear_on_missing_directory_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("never_written"));
        store.clear().await.unwrap();
    }
}

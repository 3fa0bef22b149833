//! Cache-aside lookup pipeline.
//!
//! One [`LookupEngine::lookup`] call is a self-contained, straight-line unit
//! of work: normalize, read cache, call upstream on a miss, validate and
//! map, write cache, return. Each stage either proceeds or terminates with
//! exactly one [`LookupError`]. There is no single-flight deduplication:
//! concurrent misses for the same code each reach upstream independently and
//! the last cache write wins.

pub mod errors;
pub mod mapper;

pub use errors::LookupError;

use crate::{
    cache::CacheStore,
    types::{AddressRecord, Cep, Source},
    upstream::ViaCepClient,
};
use std::{
    sync::Arc,
    time::{Duration, Instant},
};
use tracing::{debug, info, warn};

/// Orchestrator for CEP lookups over one cache store and one upstream
/// client. Thread-safe; share it behind an `Arc` across request handlers.
pub struct LookupEngine {
    store: Arc<dyn CacheStore>,
    client: ViaCepClient,
    cache_ttl: Duration,
}

impl LookupEngine {
    #[must_use]
    pub fn new(store: Arc<dyn CacheStore>, client: ViaCepClient, cache_ttl: Duration) -> Self {
        Self { store, client, cache_ttl }
    }

    /// Resolves raw user input to a normalized address record.
    ///
    /// # Errors
    ///
    /// Returns one [`LookupError`] per the pipeline contract: invalid input,
    /// not found, upstream timeout/unavailable, or an invalid upstream
    /// payload. A failed cache write does not fail the lookup.
    pub async fn lookup(&self, raw: &str) -> Result<AddressRecord, LookupError> {
        let cep = match Cep::parse(raw) {
            Ok(cep) => cep,
            Err(e) => {
                warn!(input = raw, digits = e.digits, "rejected malformed CEP");
                return Err(e.into());
            }
        };
        let key = cep.cache_key();

        if let Some(mut record) = self.store.read(&key).await {
            debug!(cep = %cep, "cache hit");
            record.service = Source::Cache;
            return Ok(record);
        }
        debug!(cep = %cep, "cache miss");

        let started = Instant::now();
        let response = match self.client.get(&cep).await {
            Ok(response) => response,
            Err(e) => {
                warn!(cep = %cep, error = %e, "upstream unreachable");
                return Err(LookupError::UpstreamUnavailable(e.to_string()));
            }
        };
        let duration_ms: u64 = started.elapsed().as_millis().try_into().unwrap_or(u64::MAX);
        info!(cep = %cep, status = response.status, duration_ms, "upstream response");

        let record = mapper::validate_and_map(response, &cep)?;

        if let Err(e) = self.store.write(&key, &record, self.cache_ttl).await {
            warn!(cep = %cep, error = %e, "cache write failed");
        }

        Ok(record)
    }
}

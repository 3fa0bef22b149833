//! cepd: cached CEP lookup service.
//!
//! Wires configuration, logging, the cache store, and the lookup engine
//! together, then serves the HTTP API until a shutdown signal arrives.

mod middleware;
mod router;

use anyhow::Result;
use axum::{routing::get, serve, Router};
use cep_core::{
    cache::{CacheStore, FileStore, MemoryStore},
    config::{AppConfig, CacheBackend},
    lookup::LookupEngine,
    upstream::ViaCepClient,
};
use std::sync::Arc;
use tokio::signal;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::compression::CompressionLayer;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initializes the logging system based on the configuration.
///
/// `RUST_LOG` takes precedence over the configured level; the configured
/// format selects JSON or pretty output.
fn init_logging(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = &config.logging.level;
        EnvFilter::new(format!("warn,cep_core={level},cepd={level},server={level}"))
    });

    let registry = tracing_subscriber::registry().with(filter);

    if config.logging.format.as_str() == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer().pretty().with_target(false)).init();
    }
}

/// Builds the application router with its middleware stack.
fn create_app(engine: Arc<LookupEngine>, max_concurrent_requests: usize) -> Router {
    let (set_request_id, propagate_request_id) = middleware::create_request_id_layers();

    Router::new()
        .route("/health", get(router::handle_health))
        .route("/api/cep/{cep}", get(router::handle_cep))
        .with_state(engine)
        .layer(ConcurrencyLimitLayer::new(max_concurrent_requests))
        .layer(CompressionLayer::new())
        .layer(propagate_request_id)
        .layer(set_request_id)
}

fn build_store(config: &AppConfig) -> Arc<dyn CacheStore> {
    match config.cache.backend {
        CacheBackend::Memory => Arc::new(MemoryStore::new()),
        CacheBackend::File => Arc::new(FileStore::new(&config.cache.directory)),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config =
        AppConfig::load().map_err(|e| anyhow::anyhow!("configuration load failed: {e}"))?;
    init_logging(&config);
    info!(
        environment = %config.environment,
        cache_backend = ?config.cache.backend,
        "starting cepd"
    );

    let store = build_store(&config);
    let client = ViaCepClient::new(&config.upstream)
        .map_err(|e| anyhow::anyhow!("upstream client init failed: {e}"))?;
    let engine = Arc::new(LookupEngine::new(store, client, config.cache.ttl()));

    let app = create_app(engine, config.server.max_concurrent_requests);
    let addr = config.socket_addr().map_err(|e| anyhow::anyhow!(e))?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(address = %addr, "cepd listening");

    serve(listener, app).with_graceful_shutdown(shutdown_signal()).await?;

    info!("shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "failed to install Ctrl+C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut s) => {
                s.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to install signal handler");
                () = std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("shutdown signal received");
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use cep_core::config::CacheSettings;
    use std::time::Duration;

    fn test_engine() -> Arc<LookupEngine> {
        let store = Arc::new(MemoryStore::new());
        let client = ViaCepClient::new(&cep_core::config::UpstreamConfig::default()).unwrap();
        Arc::new(LookupEngine::new(store, client, Duration::from_secs(60)))
    }

    #[test]
    fn test_create_app_builds() {
        let _app = create_app(test_engine(), 100);
    }

    #[test]
    fn test_build_store_selects_backend() {
        let mut config = AppConfig::default();
        config.cache = CacheSettings {
            backend: CacheBackend::Memory,
            ..CacheSettings::default()
        };
        // Both arms must construct without touching the filesystem.
        let _memory = build_store(&config);
        config.cache.backend = CacheBackend::File;
        let _file = build_store(&config);
    }
}

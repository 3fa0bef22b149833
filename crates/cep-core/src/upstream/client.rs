use crate::{config::UpstreamConfig, types::Cep};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Transport-level failures, distinct from HTTP error statuses.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The request exceeded the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// Connection could not be established or broke mid-flight.
    #[error("connection failed: {0}")]
    Connection(String),
}

/// Raw upstream response: HTTP status plus the JSON parse attempt of the
/// body. Consumed entirely within one pipeline invocation; never persisted.
#[derive(Debug)]
pub struct RawResponse {
    pub status: u16,
    pub body: Result<Value, serde_json::Error>,
}

/// Bounded-timeout HTTP client for the ViaCEP API.
///
/// Issues exactly one `GET {base_url}/ws/{code}/json/` per invocation: no
/// internal retries and no redirect following. Redirect statuses therefore
/// surface as-is and fall through to response validation downstream.
pub struct ViaCepClient {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl ViaCepClient {
    /// Builds a client from the upstream configuration.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Connection`] if the underlying reqwest
    /// client fails to build.
    pub fn new(config: &UpstreamConfig) -> Result<Self, TransportError> {
        let timeout = config.timeout();
        let http = reqwest::Client::builder()
            .connect_timeout(timeout)
            .redirect(reqwest::redirect::Policy::none())
            .use_rustls_tls()
            .user_agent(concat!("cepd/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                tracing::error!(error = %e, "failed to build http client");
                TransportError::Connection(format!("HTTP client build failed: {e}"))
            })?;

        Ok(Self { http, base_url: config.base_url.trim_end_matches('/').to_string(), timeout })
    }

    /// Sanitizes network errors to prevent information disclosure in logs
    /// and client-facing messages.
    fn sanitize_network_error(error: &reqwest::Error) -> String {
        if error.is_connect() {
            "connection refused or unreachable".to_string()
        } else if error.is_timeout() {
            "connection timed out".to_string()
        } else if error.is_body() {
            "response body error".to_string()
        } else if error.is_request() {
            "request failed".to_string()
        } else {
            "network error".to_string()
        }
    }

    /// Fetches the raw directory response for a canonical code.
    ///
    /// # Errors
    ///
    /// - [`TransportError::Timeout`] if the request exceeds the bounded wait
    /// - [`TransportError::Connection`] for any other transport failure
    pub async fn get(&self, cep: &Cep) -> Result<RawResponse, TransportError> {
        let url = format!("{}/ws/{}/json/", self.base_url, cep);

        let response =
            self.http.get(&url).timeout(self.timeout).send().await.map_err(|e| {
                if e.is_timeout() {
                    TransportError::Timeout
                } else {
                    TransportError::Connection(Self::sanitize_network_error(&e))
                }
            })?;

        let status = response.status().as_u16();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| TransportError::Connection(Self::sanitize_network_error(&e)))?;

        Ok(RawResponse { status, body: serde_json::from_slice(&bytes) })
    }
}

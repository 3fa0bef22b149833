//! Route handlers and the JSON response envelope.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use cep_core::{
    lookup::{LookupEngine, LookupError},
    types::AddressRecord,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info_span, Instrument};

/// Response envelope shared by every outcome of the lookup endpoint.
#[derive(Debug, Serialize)]
pub struct Envelope {
    pub success: bool,
    pub data: Option<AddressRecord>,
    pub error: Option<ErrorBody>,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub message: String,
    pub status: u16,
}

impl Envelope {
    fn ok(record: AddressRecord) -> Self {
        Self { success: true, data: Some(record), error: None }
    }

    fn err(status: StatusCode, message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ErrorBody { message, status: status.as_u16() }),
        }
    }
}

/// Maps each pipeline failure to its HTTP status.
fn status_for(error: &LookupError) -> StatusCode {
    match error {
        LookupError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        LookupError::NotFound => StatusCode::NOT_FOUND,
        LookupError::UpstreamTimeout => StatusCode::GATEWAY_TIMEOUT,
        LookupError::UpstreamUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        LookupError::InvalidResponse(_) => StatusCode::BAD_GATEWAY,
        LookupError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// `GET /api/cep/{cep}`: resolves a raw CEP through the lookup pipeline.
///
/// Pipeline log events run inside a span carrying the request ID set by the
/// middleware, so cache and upstream events correlate with the request.
pub async fn handle_cep(
    State(engine): State<Arc<LookupEngine>>,
    Path(raw): Path<String>,
    headers: HeaderMap,
) -> impl IntoResponse {
    let request_id = headers
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_owned();
    let span = info_span!("cep_lookup", request_id = %request_id);

    match engine.lookup(&raw).instrument(span).await {
        Ok(record) => (StatusCode::OK, Json(Envelope::ok(record))),
        Err(error) => {
            let status = status_for(&error);
            (status, Json(Envelope::err(status, error.to_string())))
        }
    }
}

/// `GET /health`: process liveness.
pub async fn handle_health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

//! Request-ID middleware.
//!
//! Accepts an `x-request-id` header from the caller or generates a UUID v4,
//! and echoes the ID on the response. Handlers pick the header up to
//! correlate pipeline log events with the inbound request.

use axum::http::{header::HeaderValue, HeaderName, Request};
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use uuid::Uuid;

/// The request correlation header.
pub static X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// UUID v4 generator for requests that arrive without an ID.
#[derive(Clone, Copy, Default)]
pub struct UuidRequestIdGenerator;

impl MakeRequestId for UuidRequestIdGenerator {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        Some(RequestId::new(HeaderValue::from_str(&id).ok()?))
    }
}

/// Returns the `(set, propagate)` layer pair for the router.
///
/// Layers apply in reverse order, so attach the propagate layer first:
///
/// ```ignore
/// let (set_request_id, propagate_request_id) = create_request_id_layers();
/// let app = app.layer(propagate_request_id).layer(set_request_id);
/// ```
pub fn create_request_id_layers()
-> (SetRequestIdLayer<UuidRequestIdGenerator>, PropagateRequestIdLayer) {
    (
        SetRequestIdLayer::new(X_REQUEST_ID.clone(), UuidRequestIdGenerator),
        PropagateRequestIdLayer::new(X_REQUEST_ID.clone()),
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::{body::Body, http::StatusCode, routing::get, Router};
    use tower::ServiceExt;

    fn create_test_app() -> Router {
        let (set_request_id, propagate_request_id) = create_request_id_layers();
        Router::new()
            .route("/test", get(|| async { "ok" }))
            .layer(propagate_request_id)
            .layer(set_request_id)
    }

    #[tokio::test]
    async fn test_generates_request_id_when_missing() {
        let app = create_test_app();
        let request = Request::builder().uri("/test").body(Body::empty()).unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let header = response.headers().get(&X_REQUEST_ID).expect("response should carry an id");
        let id = header.to_str().unwrap();
        assert!(Uuid::parse_str(id).is_ok(), "generated id should be a UUID, got: {id}");
    }

    #[tokio::test]
    async fn test_preserves_caller_supplied_request_id() {
        let app = create_test_app();
        let custom_id = "caller-supplied-id-123";

        let request = Request::builder()
            .uri("/test")
            .header(X_REQUEST_ID.clone(), custom_id)
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(request).await.unwrap();

        let header = response.headers().get(&X_REQUEST_ID).expect("response should carry an id");
        assert_eq!(header.to_str().unwrap(), custom_id);
    }

    #[test]
    fn test_generator_produces_unique_ids() {
        let mut generator = UuidRequestIdGenerator;
        let request = Request::builder().body(()).unwrap();

        let first = generator.make_request_id(&request).unwrap();
        let second = generator.make_request_id(&request).unwrap();
        assert_ne!(first.header_value(), second.header_value());
    }
}

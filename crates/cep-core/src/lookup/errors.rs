use crate::types::InvalidCep;
use thiserror::Error;

/// Typed failures of the lookup pipeline, all terminal.
///
/// Every stage of the pipeline either proceeds or ends with exactly one of
/// these; there are no internal retries. Callers pattern-match on the
/// variant to pick an HTTP status code. Only cache-write failures are not
/// represented here: they are logged and discarded, never surfaced.
#[derive(Debug, Error)]
pub enum LookupError {
    /// Normalization rejected the input before any I/O happened.
    #[error("invalid CEP format, expected 8 digits (e.g. 01001000 or 01001-000)")]
    InvalidInput(#[from] InvalidCep),

    /// Upstream confirms the code does not exist.
    #[error("CEP not found")]
    NotFound,

    /// Upstream signaled a request-level timeout (HTTP 408).
    #[error("timed out querying the CEP directory")]
    UpstreamTimeout,

    /// Transport-level failure or upstream 5xx.
    #[error("CEP directory unavailable: {0}")]
    UpstreamUnavailable(String),

    /// Malformed or incomplete upstream payload.
    #[error("invalid response from the CEP directory: {0}")]
    InvalidResponse(String),

    /// Catch-all for anything not classified above. Surfaces to callers as
    /// a generic failure; internal detail stays in the logs.
    #[error("unexpected error")]
    Unexpected(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Cep;

    #[test]
    fn test_invalid_cep_converts_to_invalid_input() {
        let err: LookupError = Cep::parse("123").unwrap_err().into();
        assert!(matches!(err, LookupError::InvalidInput(_)));
    }

    #[test]
    fn test_unexpected_display_leaks_no_detail() {
        let err = LookupError::Unexpected("cache mutex poisoned".to_string());
        assert_eq!(err.to_string(), "unexpected error");
    }
}

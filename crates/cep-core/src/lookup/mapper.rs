//! Validation and mapping of raw ViaCEP responses.
//!
//! Pure functions over an already-received response; no I/O happens here.

use super::errors::LookupError;
use crate::{
    types::{AddressRecord, Cep, Source},
    upstream::RawResponse,
};
use serde::Deserialize;
use serde_json::Value;

/// Field names as ViaCEP sends them.
#[derive(Debug, Deserialize)]
struct ViaCepPayload {
    logradouro: Option<String>,
    complemento: Option<String>,
    bairro: Option<String>,
    localidade: Option<String>,
    uf: Option<String>,
}

/// ViaCEP signals "no such code" with a loosely-typed `erro` field that has
/// been observed as `true`, `"true"`, and `1` across API revisions. The
/// sentinel fires on any of those.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty() && s != "0",
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

fn is_blank(field: Option<&str>) -> bool {
    field.is_none_or(str::is_empty)
}

/// Validates a raw upstream response and maps it to the normalized schema.
///
/// Statuses other than 408/5xx (redirects and other 4xx included) fall
/// through to JSON validation; that matches the observed upstream contract
/// and is deliberate.
///
/// # Errors
///
/// - [`LookupError::UpstreamTimeout`] for HTTP 408
/// - [`LookupError::UpstreamUnavailable`] for HTTP 5xx
/// - [`LookupError::NotFound`] when the `erro` sentinel is set
/// - [`LookupError::InvalidResponse`] for non-object bodies, bodies of an
///   unexpected shape, or payloads missing `uf`/`localidade`
pub fn validate_and_map(response: RawResponse, cep: &Cep) -> Result<AddressRecord, LookupError> {
    if response.status == 408 {
        return Err(LookupError::UpstreamTimeout);
    }
    if response.status >= 500 {
        return Err(LookupError::UpstreamUnavailable(format!(
            "directory returned status {}",
            response.status
        )));
    }

    let body = response
        .body
        .map_err(|e| LookupError::InvalidResponse(format!("body is not valid JSON: {e}")))?;
    if !body.is_object() {
        return Err(LookupError::InvalidResponse("body is not a JSON object".to_string()));
    }

    if body.get("erro").is_some_and(is_truthy) {
        return Err(LookupError::NotFound);
    }

    let payload: ViaCepPayload = serde_json::from_value(body)
        .map_err(|e| LookupError::InvalidResponse(format!("unexpected body shape: {e}")))?;

    if is_blank(payload.uf.as_deref()) || is_blank(payload.localidade.as_deref()) {
        return Err(LookupError::InvalidResponse(
            "payload is missing required address fields".to_string(),
        ));
    }

    Ok(AddressRecord {
        cep: cep.clone(),
        street: payload.logradouro,
        complement: payload.complemento,
        neighborhood: payload.bairro,
        city: payload.localidade,
        state: payload.uf,
        service: Source::Viacep,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn cep() -> Cep {
        Cep::parse("01001000").unwrap()
    }

    fn response(status: u16, body: Value) -> RawResponse {
        RawResponse { status, body: Ok(body) }
    }

    fn unparsable(status: u16) -> RawResponse {
        RawResponse { status, body: serde_json::from_str("<html>") }
    }

    #[test]
    fn test_maps_full_payload() {
        let body = json!({
            "cep": "01001-000",
            "logradouro": "Praça da Sé",
            "complemento": "lado ímpar",
            "bairro": "Sé",
            "localidade": "São Paulo",
            "uf": "SP"
        });

        let record = validate_and_map(response(200, body), &cep()).unwrap();
        assert_eq!(record.cep.as_str(), "01001000");
        assert_eq!(record.street.as_deref(), Some("Praça da Sé"));
        assert_eq!(record.complement.as_deref(), Some("lado ímpar"));
        assert_eq!(record.neighborhood.as_deref(), Some("Sé"));
        assert_eq!(record.city.as_deref(), Some("São Paulo"));
        assert_eq!(record.state.as_deref(), Some("SP"));
        assert_eq!(record.service, Source::Viacep);
    }

    #[test]
    fn test_record_carries_looked_up_code_not_payload_cep() {
        // Upstream echoes a formatted cep; the record keeps the canonical one.
        let body = json!({"cep": "01001-000", "localidade": "São Paulo", "uf": "SP"});
        let record = validate_and_map(response(200, body), &cep()).unwrap();
        assert_eq!(record.cep.as_str(), "01001000");
        assert_eq!(record.street, None);
    }

    #[test]
    fn test_status_408_is_timeout() {
        let err = validate_and_map(response(408, json!({})), &cep()).unwrap_err();
        assert!(matches!(err, LookupError::UpstreamTimeout));
    }

    #[test]
    fn test_status_5xx_is_unavailable() {
        for status in [500, 502, 503, 599] {
            let err = validate_and_map(response(status, json!({})), &cep()).unwrap_err();
            assert!(matches!(err, LookupError::UpstreamUnavailable(_)), "status {status}");
        }
    }

    #[test]
    fn test_other_statuses_fall_through_to_body_validation() {
        // Redirects and non-404 4xx are not classified by status; their
        // bodies decide the outcome.
        for status in [301, 403, 418] {
            let body = json!({"localidade": "São Paulo", "uf": "SP"});
            let record = validate_and_map(response(status, body), &cep()).unwrap();
            assert_eq!(record.state.as_deref(), Some("SP"));
        }
    }

    #[test]
    fn test_unparsable_body_is_invalid_response() {
        let err = validate_and_map(unparsable(200), &cep()).unwrap_err();
        assert!(matches!(err, LookupError::InvalidResponse(_)));
    }

    #[test]
    fn test_non_object_body_is_invalid_response() {
        for body in [json!([1, 2]), json!("ok"), json!(42), json!(null)] {
            let err = validate_and_map(response(200, body), &cep()).unwrap_err();
            assert!(matches!(err, LookupError::InvalidResponse(_)));
        }
    }

    #[test]
    fn test_erro_sentinel_variants_are_not_found() {
        for sentinel in [json!(true), json!("true"), json!(1), json!("yes")] {
            let body = json!({"erro": sentinel, "localidade": "x", "uf": "y"});
            let err = validate_and_map(response(200, body), &cep()).unwrap_err();
            assert!(matches!(err, LookupError::NotFound), "sentinel {sentinel}");
        }
    }

    #[test]
    fn test_falsy_erro_values_do_not_trigger_not_found() {
        for sentinel in [json!(false), json!(0), json!(""), json!("0"), json!(null)] {
            let body = json!({"erro": sentinel, "localidade": "São Paulo", "uf": "SP"});
            assert!(
                validate_and_map(response(200, body), &cep()).is_ok(),
                "sentinel {sentinel}"
            );
        }
    }

    #[test]
    fn test_missing_required_fields_is_invalid_response() {
        for body in [
            json!({"localidade": "São Paulo"}),
            json!({"uf": "SP"}),
            json!({"localidade": "", "uf": "SP"}),
            json!({"localidade": "São Paulo", "uf": ""}),
            json!({}),
        ] {
            let err = validate_and_map(response(200, body), &cep()).unwrap_err();
            assert!(matches!(err, LookupError::InvalidResponse(_)));
        }
    }
}

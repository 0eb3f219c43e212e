//! Status Resolver for the gateway's dual-status protocol, plus the JSON
//! body helpers shared with the response shaping code.
//!
//! # Design
//! The gateway usually answers HTTP 200 and signals the real outcome through
//! a `status` integer embedded in the body — at the top level for
//! single-object responses, per positional item for batch responses. The two
//! layers are independent gates and both must pass. Positional items arrive
//! either as a JSON array or as an object keyed `"0"`, `"1"`, …, sometimes
//! next to unrelated top-level fields; `items` treats both the same.

use serde_json::Value;

use crate::error::Error;

/// Embedded status extracted from one body scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CarrierStatus {
    pub code: i64,
    pub text: Option<String>,
}

/// Decide success or failure for one response.
///
/// `require_status` is false for the read-only endpoints that answer without
/// an embedded status (overview, package, orderview, trackstatus); those are
/// verified by the HTTP gate alone, but a status that *is* present still
/// gets checked.
pub(crate) fn resolve(http_status: u16, body: &Value, require_status: bool) -> Result<(), Error> {
    // HTTP gate. A non-2xx answer that still parsed as JSON is a carrier
    // rejection; unparseable ones never get this far.
    if !(200..300).contains(&http_status) {
        if let Some(status) = status_of(body) {
            return Err(rejected(status, body));
        }
        return Err(rejected(
            CarrierStatus {
                code: i64::from(http_status),
                text: None,
            },
            body,
        ));
    }

    // Embedded gate: top-level status first, then one per positional item.
    let mut found = false;
    if let Some(status) = status_of(body) {
        found = true;
        if status.code != 200 {
            return Err(rejected(status, body));
        }
    }
    for item in items(body) {
        if let Some(status) = status_of(item) {
            found = true;
            if status.code != 200 {
                return Err(rejected(status, body));
            }
        }
    }

    if require_status && !found {
        return Err(Error::MalformedResponse {
            field: "status".to_string(),
        });
    }
    Ok(())
}

fn rejected(status: CarrierStatus, body: &Value) -> Error {
    Error::CarrierRejected {
        status: status.code,
        status_text: status.text,
        body: body.clone(),
    }
}

/// Embedded status of one scope (the whole body or a single item), if any.
pub(crate) fn status_of(scope: &Value) -> Option<CarrierStatus> {
    let code = int_of(scope.get("status")?)?;
    let text = scope
        .get("status_message")
        .or_else(|| scope.get("status_text"))
        .and_then(string_of);
    Some(CarrierStatus { code, text })
}

/// Positional items of a body: the elements of a JSON array, or the values
/// at consecutive `"0"`, `"1"`, … keys of an object.
pub(crate) fn items(body: &Value) -> Vec<&Value> {
    match body {
        Value::Array(values) => values.iter().collect(),
        Value::Object(map) => {
            let mut found = Vec::new();
            for index in 0..map.len() {
                match map.get(index.to_string().as_str()) {
                    Some(value) => found.push(value),
                    None => break,
                }
            }
            found
        }
        _ => Vec::new(),
    }
}

/// First positional item, if any.
pub(crate) fn first_item(body: &Value) -> Option<&Value> {
    items(body).first().copied()
}

/// Integer coercion: JSON integers and numeric strings both count (the
/// gateway is inconsistent about which one it sends).
pub(crate) fn int_of(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Float coercion for coordinate-style fields.
pub(crate) fn float_of(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// String coercion: strings pass through, numbers are rendered.
pub(crate) fn string_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_status_fails_when_required() {
        let err = resolve(200, &json!({"labels_url": "http://x"}), true).unwrap_err();
        assert!(matches!(err, Error::MalformedResponse { ref field } if field == "status"));
    }

    #[test]
    fn missing_status_passes_when_not_required() {
        assert!(resolve(200, &json!([{"id": 1}]), false).is_ok());
    }

    #[test]
    fn top_level_failure_wins_over_http_200() {
        let err = resolve(200, &json!({"status": 406}), true).unwrap_err();
        assert_eq!(err.carrier_status(), Some(406));
    }

    #[test]
    fn item_level_failure_fails_the_whole_batch() {
        let body = json!({
            "status": 200,
            "0": {"package_id": 42, "status": 200},
            "1": {"status": 404, "status_message": "unknown package"},
        });
        let err = resolve(200, &body, true).unwrap_err();
        match err {
            Error::CarrierRejected {
                status, status_text, ..
            } => {
                assert_eq!(status, 404);
                assert_eq!(status_text.as_deref(), Some("unknown package"));
            }
            other => panic!("expected CarrierRejected, got {other:?}"),
        }
    }

    #[test]
    fn numeric_string_status_is_coerced() {
        assert!(resolve(200, &json!({"status": "200"}), true).is_ok());
        let err = resolve(200, &json!({"status": "409"}), true).unwrap_err();
        assert_eq!(err.carrier_status(), Some(409));
    }

    #[test]
    fn http_gate_rejects_parsed_error_bodies() {
        let err = resolve(503, &json!({"message": "down"}), true).unwrap_err();
        assert_eq!(err.carrier_status(), Some(503));
    }

    #[test]
    fn http_gate_prefers_the_embedded_status_when_present() {
        let err = resolve(400, &json!({"status": 406}), true).unwrap_err();
        assert_eq!(err.carrier_status(), Some(406));
    }

    #[test]
    fn items_walks_positional_object_keys_in_order() {
        let body = json!({
            "status": 200,
            "labels_url": "http://x",
            "0": {"package_id": 1},
            "1": {"package_id": 2},
        });
        let ids: Vec<_> = items(&body)
            .iter()
            .map(|item| item["package_id"].as_i64().unwrap())
            .collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn items_of_an_array_body_are_its_elements() {
        let body = json!([{"a": 1}, {"a": 2}]);
        assert_eq!(items(&body).len(), 2);
        assert!(first_item(&body).is_some());
    }

    #[test]
    fn items_of_a_scalar_body_are_empty() {
        assert!(items(&json!("nope")).is_empty());
        assert!(first_item(&json!({"status": 200})).is_none());
    }
}

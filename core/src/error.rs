//! Error taxonomy for the carrier-gateway client.
//!
//! # Design
//! The gateway signals failure on two layers: the HTTP status code and an
//! embedded `status` integer inside the JSON body. Both layers collapse into
//! `CarrierRejected`, which keeps the raw body so callers can inspect what
//! the carrier actually said. `Transport` is reserved for failures below the
//! protocol (unreachable host, timeout, non-JSON error page). The client
//! never retries or swallows an error; retry policy belongs to the caller.

use serde_json::Value;
use thiserror::Error;

/// Errors returned by [`ShipbotClient`](crate::ShipbotClient) operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The network round-trip itself failed — unreachable host, timeout, or
    /// a non-2xx response with no parseable JSON body.
    #[error("transport failure: {message}")]
    Transport { message: String },

    /// A field the protocol requires was absent from the response.
    #[error("malformed response: missing `{field}`")]
    MalformedResponse { field: String },

    /// The response contained no item where at least one was expected.
    #[error("empty response: expected at least one item")]
    EmptyResponse { body: Value },

    /// The gateway (or the carrier behind it) rejected the request via an
    /// embedded status or a non-2xx HTTP code. Carries the raw body.
    #[error("carrier rejected the request with status {status}")]
    CarrierRejected {
        status: i64,
        status_text: Option<String>,
        body: Value,
    },

    /// Caller input failed local validation; no network call was made.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl Error {
    /// Embedded or HTTP status carried by a `CarrierRejected` error.
    pub fn carrier_status(&self) -> Option<i64> {
        match self {
            Error::CarrierRejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn display_includes_carrier_status() {
        let err = Error::CarrierRejected {
            status: 406,
            status_text: None,
            body: json!({"status": 406}),
        };
        assert_eq!(err.to_string(), "carrier rejected the request with status 406");
        assert_eq!(err.carrier_status(), Some(406));
    }

    #[test]
    fn carrier_status_is_none_for_other_kinds() {
        let err = Error::MalformedResponse {
            field: "status".to_string(),
        };
        assert!(err.carrier_status().is_none());
    }
}

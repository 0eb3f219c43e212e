//! Raw Requester contract and the shipped blocking transport.
//!
//! # Design
//! The core talks to the network through [`Requester`] only: one JSON POST,
//! one `(status, decoded body)` back. Everything below that line — TLS,
//! pooling, timeouts, authentication — is the requester's business, so unit
//! tests swap in a scripted double and the rest of the crate never notices.
//! [`UreqRequester`] is the shipped implementation: a blocking ureq agent
//! with automatic status-as-error handling turned off, because the gateway
//! hides its real outcome inside the body and the status interpretation
//! belongs to the status resolver.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use serde_json::Value;

use crate::error::Error;

/// One HTTP round-trip against the gateway.
pub trait Requester {
    /// POST `payload` as JSON to `url`, returning the HTTP status code and
    /// the decoded response body.
    fn request(&self, url: &str, payload: &Value) -> Result<(u16, Value), Error>;
}

/// Blocking ureq-backed requester with HTTP Basic authentication.
#[derive(Debug)]
pub struct UreqRequester {
    agent: ureq::Agent,
    authorization: String,
}

impl UreqRequester {
    /// Build a requester authenticating with the given gateway credentials.
    pub fn new(api_user: &str, api_key: &str) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        let credentials = BASE64.encode(format!("{api_user}:{api_key}"));
        UreqRequester {
            agent,
            authorization: format!("Basic {credentials}"),
        }
    }
}

impl Requester for UreqRequester {
    fn request(&self, url: &str, payload: &Value) -> Result<(u16, Value), Error> {
        let body = payload.to_string();
        let mut response = self
            .agent
            .post(url)
            .header("Authorization", &self.authorization)
            .content_type("application/json")
            .send(body.as_bytes())
            .map_err(|e| Error::Transport {
                message: e.to_string(),
            })?;

        let status = response.status().as_u16();
        let text = response
            .body_mut()
            .read_to_string()
            .map_err(|e| Error::Transport {
                message: e.to_string(),
            })?;
        tracing::debug!(status, bytes = text.len(), "gateway answered");

        match serde_json::from_str(&text) {
            Ok(decoded) => Ok((status, decoded)),
            // The gateway's error pages are not JSON; report them at the
            // transport layer together with the HTTP code.
            Err(_) if !(200..300).contains(&status) => Err(Error::Transport {
                message: format!("HTTP {status} with unparseable body"),
            }),
            Err(_) => Err(Error::MalformedResponse {
                field: "body".to_string(),
            }),
        }
    }
}

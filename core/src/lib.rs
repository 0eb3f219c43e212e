//! Synchronous client core for the shipbot carrier gateway.
//!
//! # Overview
//! The gateway multiplexes dozens of shipping carriers behind uniform verbs
//! (`add`, `drop`, `track`, `order`, …) at `{base}/{shipper}/{verb}`. Each
//! carrier answers in a slightly different shape, and the real outcome hides
//! behind a dual-status protocol: HTTP usually says 200 while a `status`
//! integer inside the body says what actually happened. This crate turns
//! that into a typed surface — one [`ShipbotClient`] method per verb, one
//! error taxonomy, one shaping rule per response family.
//!
//! # Design
//! - `ShipbotClient` is stateless between calls: one method, one round-trip,
//!   results built fresh from that response.
//! - The network sits behind the [`Requester`] trait; [`UreqRequester`] is
//!   the shipped blocking transport, tests script their own.
//! - Status interpretation lives in one resolver with two independent gates
//!   (HTTP layer, embedded layer) — no endpoint re-implements it.
//! - Retries, backoff and caching are deliberately absent; wrap the client
//!   if you need them.

pub mod client;
pub mod country;
pub mod endpoint;
pub mod error;
pub mod http;
mod status;
pub mod types;

pub use client::{ShipbotClient, DEFAULT_BASE_URL};
pub use country::validate_country_code;
pub use endpoint::{ApiVersion, Endpoint};
pub use error::Error;
pub use http::{Requester, UreqRequester};
pub use types::{
    Branch, LastStatus, OrderedShipment, PackageRecord, PostCode, PostCodes, TrackedShipment,
    TrackingStatus,
};

//! The gateway's verb table: every endpoint the client can dispatch to.
//!
//! # Design
//! The gateway multiplexes carriers behind uniform verbs mounted at
//! `{base}/{shipper}/{segment}`. Version 2 endpoints live under a `/v2/`
//! prefix while v1 is unprefixed, so the version resolves to a URL prefix
//! rather than a path segment of its own. Each `Endpoint` variant carries a
//! fixed path segment and version; the dispatcher never special-cases a
//! shipper.

/// Gateway API version, expressed as the URL prefix it mounts under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiVersion {
    V1,
    V2,
}

impl ApiVersion {
    /// Prefix inserted between the base URL and the shipper code.
    pub fn url_prefix(self) -> &'static str {
        match self {
            ApiVersion::V1 => "",
            ApiVersion::V2 => "v2/",
        }
    }
}

/// One gateway verb. Closed enumeration — the dispatcher builds paths only
/// from this table, never from caller-supplied strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// Register package(s) with a carrier.
    Add,
    /// Remove not-yet-ordered package(s).
    Drop,
    /// Full tracking history for a package.
    Track,
    /// Latest tracking status only.
    TrackStatus,
    /// Packages registered but not yet handed over.
    Overview,
    /// Merged label sheet for several packages.
    Labels,
    /// Complete data of a single package.
    Package,
    /// Order shipment (carrier pick-up of registered packages).
    Order,
    /// Details of a placed order.
    OrderView,
    /// One-off courier pick-up.
    OrderPickup,
    /// Services offered by a shipper.
    Services,
    /// Manipulation units for palette shipping.
    ManipulationUnits,
    /// Pick-up branches for a shipper/service.
    Branches,
    /// Branches with full details.
    FullBranches,
    /// Branches near a location.
    BranchLocator,
    /// Countries a service delivers to.
    Countries,
    /// Countries with cash-on-delivery support per service.
    CodCountries,
    /// Serviced zip codes.
    ZipCodes,
    /// Validate package data without registering.
    Check,
    /// ADR (dangerous goods) unit codes.
    AdrUnits,
}

impl Endpoint {
    /// Fixed path segment for this verb.
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::Add => "add",
            Endpoint::Drop => "drop",
            Endpoint::Track => "track",
            Endpoint::TrackStatus => "trackstatus",
            Endpoint::Overview => "overview",
            Endpoint::Labels => "labels",
            Endpoint::Package => "package",
            Endpoint::Order => "order",
            Endpoint::OrderView => "orderview",
            Endpoint::OrderPickup => "orderpickup",
            Endpoint::Services => "services",
            Endpoint::ManipulationUnits => "manipulationunits",
            Endpoint::Branches => "branches",
            Endpoint::FullBranches => "fullbranches",
            Endpoint::BranchLocator => "branchlocator",
            Endpoint::Countries => "countries4service",
            Endpoint::CodCountries => "cashondeliverycountries",
            Endpoint::ZipCodes => "zipcodes",
            Endpoint::Check => "check",
            Endpoint::AdrUnits => "adrunits",
        }
    }

    /// API version the verb is served under. Only tracking moved to v2.
    pub fn version(self) -> ApiVersion {
        match self {
            Endpoint::Track => ApiVersion::V2,
            _ => ApiVersion::V1,
        }
    }
}

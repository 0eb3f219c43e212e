//! The gateway client: endpoint dispatch plus the public domain facade.
//!
//! # Design
//! `ShipbotClient` holds a [`Requester`] and a base URL and carries no other
//! state; every operation is one blocking round-trip. The private `call`
//! dispatcher builds `{base}/{version-prefix}{shipper}/{segment}[/{suffix}]`,
//! sends the payload exactly as given (an empty payload is the empty JSON
//! array, never omitted) and runs the status resolver before any shaping
//! happens. The public methods validate caller input first — a bad country
//! code never reaches the network — then reshape the loosely typed body into
//! the types of [`crate::types`]. No retries, no caching: a failed call
//! surfaces immediately and retry policy stays with the caller.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime};
use serde_json::{json, Map, Value};

use crate::country::validate_country_code;
use crate::endpoint::Endpoint;
use crate::error::Error;
use crate::http::Requester;
use crate::status::{self, int_of, string_of};
use crate::types::{
    Branch, LastStatus, OrderedShipment, PackageRecord, PostCodes, TrackedShipment, TrackingStatus,
};

/// Production gateway host.
pub const DEFAULT_BASE_URL: &str = "https://api.shipbot.io";

/// Synchronous client for the carrier gateway.
///
/// Generic over the transport so tests can substitute a scripted requester;
/// production code uses [`crate::UreqRequester`].
#[derive(Debug, Clone)]
pub struct ShipbotClient<R> {
    requester: R,
    base_url: String,
}

impl<R: Requester> ShipbotClient<R> {
    /// Client against the production gateway.
    pub fn new(requester: R) -> Self {
        Self::with_base_url(requester, DEFAULT_BASE_URL)
    }

    /// Client against a custom gateway host (staging, tests).
    pub fn with_base_url(requester: R, base_url: impl Into<String>) -> Self {
        ShipbotClient {
            requester,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// One dispatch: build the URL, round-trip, resolve the dual status.
    fn call(
        &self,
        endpoint: Endpoint,
        shipper: &str,
        path_suffix: Option<&str>,
        payload: Value,
        require_status: bool,
    ) -> Result<Value, Error> {
        let mut url = format!(
            "{}/{}{}/{}",
            self.base_url,
            endpoint.version().url_prefix(),
            shipper,
            endpoint.path(),
        );
        if let Some(suffix) = path_suffix {
            url.push('/');
            url.push_str(suffix);
        }
        tracing::debug!(%url, shipper, "dispatching gateway call");
        let (http_status, body) = self.requester.request(&url, &payload)?;
        status::resolve(http_status, &body, require_status)?;
        Ok(body)
    }

    /// Register packages with a carrier. One batched round-trip; one
    /// rejected package fails the whole call.
    pub fn add_packages(
        &self,
        shipper: &str,
        packages: &[Map<String, Value>],
    ) -> Result<Vec<PackageRecord>, Error> {
        let payload = Value::Array(packages.iter().cloned().map(Value::Object).collect());
        let body = self.call(Endpoint::Add, shipper, None, payload, true)?;

        let items = status::items(&body);
        let first = match items.first() {
            Some(item) if present(item) => *item,
            _ => return Err(Error::EmptyResponse { body: body.clone() }),
        };
        if first.get("package_id").is_none() {
            // Well-formed answer that still lacks the one field the whole
            // operation exists to return.
            return Err(Error::CarrierRejected {
                status: 400,
                status_text: None,
                body: body.clone(),
            });
        }
        items.iter().map(|item| PackageRecord::from_item(item)).collect()
    }

    /// Drop one not-yet-ordered package.
    pub fn drop_package(&self, shipper: &str, package_id: i64) -> Result<(), Error> {
        self.drop_packages(shipper, &[package_id])
    }

    /// Drop not-yet-ordered packages. An empty id list is a no-op and
    /// performs no network call.
    pub fn drop_packages(&self, shipper: &str, package_ids: &[i64]) -> Result<(), Error> {
        if package_ids.is_empty() {
            return Ok(());
        }
        let payload = Value::Array(package_ids.iter().map(|id| json!({ "id": id })).collect());
        self.call(Endpoint::Drop, shipper, None, payload, true)?;
        Ok(())
    }

    /// Full tracking history of one package, by carrier-side id.
    pub fn track_package(&self, shipper: &str, carrier_id: &str) -> Result<TrackedShipment, Error> {
        let payload = json!([{ "id": carrier_id }]);
        let body = self.call(Endpoint::Track, shipper, None, payload, true)?;

        let first = match status::first_item(&body) {
            Some(item) if present(item) => item,
            _ => return Err(Error::EmptyResponse { body: body.clone() }),
        };
        let records = first.as_array().ok_or_else(|| Error::MalformedResponse {
            field: "status_records".to_string(),
        })?;
        let status_records = records
            .iter()
            .map(TrackingStatus::from_record)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(TrackedShipment {
            carrier_id: carrier_id.to_string(),
            status_records,
        })
    }

    /// Latest tracking status of one package.
    ///
    /// The endpoint answers without a top-level status, so only statuses that
    /// are present get checked; the date is not supplied by the gateway.
    pub fn track_package_last_status(
        &self,
        shipper: &str,
        carrier_id: &str,
    ) -> Result<LastStatus, Error> {
        let payload = json!([{ "id": carrier_id }]);
        let body = self.call(Endpoint::TrackStatus, shipper, None, payload, false)?;
        match status::first_item(&body) {
            Some(item) if present(item) => LastStatus::from_item(item),
            _ => Err(Error::EmptyResponse { body: body.clone() }),
        }
    }

    /// Packages registered but not yet handed over, as the gateway sent them.
    pub fn get_overview(&self, shipper: &str) -> Result<Vec<Map<String, Value>>, Error> {
        let body = self.call(Endpoint::Overview, shipper, None, json!([]), false)?;
        status::items(&body)
            .iter()
            .map(|item| {
                item.as_object().cloned().ok_or_else(|| Error::MalformedResponse {
                    field: "packages".to_string(),
                })
            })
            .collect()
    }

    /// URL of the merged label sheet for the given packages.
    pub fn get_labels(&self, shipper: &str, package_ids: &[i64]) -> Result<String, Error> {
        let payload = json!({ "package_ids": package_ids });
        let body = self.call(Endpoint::Labels, shipper, None, payload, true)?;
        body.get("labels_url")
            .and_then(string_of)
            .ok_or_else(|| Error::MalformedResponse {
                field: "labels_url".to_string(),
            })
    }

    /// Complete gateway-side data of one package.
    pub fn get_package_info(
        &self,
        shipper: &str,
        package_id: i64,
    ) -> Result<Map<String, Value>, Error> {
        let body = self.call(
            Endpoint::Package,
            shipper,
            Some(&package_id.to_string()),
            json!([]),
            false,
        )?;
        body.as_object().cloned().ok_or_else(|| Error::MalformedResponse {
            field: "package".to_string(),
        })
    }

    /// Order shipment of registered packages.
    ///
    /// Absent `date`/`note` are sent as explicit JSON nulls — the gateway
    /// expects the keys to be present either way.
    pub fn order_shipment(
        &self,
        shipper: &str,
        package_ids: &[i64],
        date: Option<NaiveDate>,
        note: Option<&str>,
    ) -> Result<OrderedShipment, Error> {
        let payload = json!({
            "package_ids": package_ids,
            "date": date.map(|d| d.format("%Y-%m-%d").to_string()),
            "note": note,
        });
        let body = self.call(Endpoint::Order, shipper, None, payload, true)?;
        OrderedShipment::from_response(shipper, package_ids, &body)
    }

    /// Details of a placed order, with the embedded status stripped.
    pub fn get_order(&self, shipper: &str, order_id: i64) -> Result<Map<String, Value>, Error> {
        let body = self.call(
            Endpoint::OrderView,
            shipper,
            Some(&order_id.to_string()),
            json!([]),
            false,
        )?;
        let mut object = body.as_object().cloned().ok_or_else(|| Error::MalformedResponse {
            field: "order".to_string(),
        })?;
        object.remove("status");
        Ok(object)
    }

    /// Order a one-off courier pick-up within the given time window.
    pub fn order_pickup(
        &self,
        shipper: &str,
        date_from: NaiveDateTime,
        date_to: NaiveDateTime,
        weight: f64,
        package_count: i64,
        message: Option<&str>,
    ) -> Result<(), Error> {
        let payload = json!({
            "date": date_from.format("%Y-%m-%d").to_string(),
            "time_from": date_from.format("%H:%M").to_string(),
            "time_to": date_to.format("%H:%M").to_string(),
            "weight": weight,
            "package_count": package_count,
            "message": message,
        });
        self.call(Endpoint::OrderPickup, shipper, None, payload, true)?;
        Ok(())
    }

    /// Services offered by a shipper, as `code → display name`.
    ///
    /// The gateway answers with either an object map or a list of
    /// `{service_type, name}` records; both fold into one map, later
    /// duplicates overwriting earlier ones.
    pub fn get_services(&self, shipper: &str) -> Result<BTreeMap<String, String>, Error> {
        let body = self.call(Endpoint::Services, shipper, None, json!([]), true)?;
        let mut services = BTreeMap::new();
        match body.get("service_types") {
            None | Some(Value::Null) => {}
            Some(Value::Object(entries)) => {
                for (code, name) in entries {
                    services.insert(code.clone(), string_of(name).unwrap_or_default());
                }
            }
            Some(Value::Array(entries)) => {
                for entry in entries {
                    let code = entry.get("service_type").and_then(string_of).ok_or_else(|| {
                        Error::MalformedResponse {
                            field: "service_type".to_string(),
                        }
                    })?;
                    services.insert(code, entry.get("name").and_then(string_of).unwrap_or_default());
                }
            }
            Some(_) => {
                return Err(Error::MalformedResponse {
                    field: "service_types".to_string(),
                })
            }
        }
        Ok(services)
    }

    /// Manipulation units for palette shipping, as `code → name`.
    pub fn get_manipulation_units(&self, shipper: &str) -> Result<BTreeMap<i64, String>, Error> {
        let body = self.call(Endpoint::ManipulationUnits, shipper, None, json!([]), true)?;
        unit_map(&body)
    }

    /// ADR (dangerous goods) units, as `code → name`.
    pub fn get_adr_units(&self, shipper: &str) -> Result<BTreeMap<i64, String>, Error> {
        let body = self.call(Endpoint::AdrUnits, shipper, None, json!([]), true)?;
        unit_map(&body)
    }

    /// Pick-up branches of a shipper, optionally narrowed to one service.
    /// `full_data` switches to the verb that returns complete branch details.
    pub fn get_branches(
        &self,
        shipper: &str,
        service: Option<&str>,
        full_data: bool,
    ) -> Result<Vec<Branch>, Error> {
        let endpoint = if full_data {
            Endpoint::FullBranches
        } else {
            Endpoint::Branches
        };
        let body = self.call(endpoint, shipper, service, json!([]), true)?;
        branch_list(&body)
    }

    /// Branches near a location. The country code is validated before any
    /// network call; absent optional filters are omitted from the payload.
    #[allow(clippy::too_many_arguments)]
    pub fn get_branches_for_location(
        &self,
        shipper: &str,
        country: &str,
        city: &str,
        postcode: Option<&str>,
        street: Option<&str>,
        max_results: Option<i64>,
        radius: Option<f64>,
    ) -> Result<Vec<Branch>, Error> {
        validate_country_code(country)?;

        let mut filters = Map::new();
        filters.insert("country".to_string(), json!(country));
        filters.insert("city".to_string(), json!(city));
        if let Some(postcode) = postcode {
            filters.insert("zip".to_string(), json!(postcode));
        }
        if let Some(street) = street {
            filters.insert("street".to_string(), json!(street));
        }
        if let Some(max_results) = max_results {
            filters.insert("max_results".to_string(), json!(max_results));
        }
        if let Some(radius) = radius {
            filters.insert("radius".to_string(), json!(radius));
        }

        let body = self.call(
            Endpoint::BranchLocator,
            shipper,
            None,
            Value::Object(filters),
            true,
        )?;
        branch_list(&body)
    }

    /// Countries each service delivers to, `service type → countries`.
    pub fn get_countries(&self, shipper: &str) -> Result<BTreeMap<String, Value>, Error> {
        let body = self.call(Endpoint::Countries, shipper, None, json!([]), true)?;
        service_country_map(&body, "countries")
    }

    /// Countries with cash-on-delivery support, `service type → countries`.
    pub fn get_cod_countries(&self, shipper: &str) -> Result<BTreeMap<String, Value>, Error> {
        let body = self.call(Endpoint::CodCountries, shipper, None, json!([]), true)?;
        service_country_map(&body, "cod_countries")
    }

    /// Serviced postcodes of one shipper service, lazily shaped.
    ///
    /// The response is fetched eagerly; the returned sequence materializes
    /// one [`crate::types::PostCode`] per step and ends once the fetched
    /// records run out.
    pub fn get_post_codes(
        &self,
        shipper: &str,
        service: &str,
        country: Option<&str>,
    ) -> Result<PostCodes, Error> {
        if let Some(country) = country {
            validate_country_code(country)?;
        }
        let suffix = match country {
            Some(country) => format!("{service}/{country}"),
            None => service.to_string(),
        };
        let body = self.call(Endpoint::ZipCodes, shipper, Some(&suffix), json!([]), true)?;

        let records = match body.get("zip_codes") {
            None | Some(Value::Null) => return Ok(PostCodes::empty()),
            Some(Value::Array(entries)) => entries.clone(),
            Some(_) => {
                return Err(Error::MalformedResponse {
                    field: "zip_codes".to_string(),
                })
            }
        };
        let fallback_country = body
            .get("country")
            .and_then(string_of)
            .or_else(|| country.map(str::to_string));
        Ok(PostCodes::new(records, fallback_country))
    }

    /// Validate package data without registering anything.
    pub fn check_packages(
        &self,
        shipper: &str,
        packages: &[Map<String, Value>],
    ) -> Result<(), Error> {
        let payload = Value::Array(packages.iter().cloned().map(Value::Object).collect());
        self.call(Endpoint::Check, shipper, None, payload, true)?;
        Ok(())
    }
}

/// Positional item that actually holds data (not null, `{}` or `[]`).
fn present(item: &Value) -> bool {
    match item {
        Value::Null => false,
        Value::Array(values) => !values.is_empty(),
        Value::Object(map) => !map.is_empty(),
        _ => true,
    }
}

/// `{code: name}` map from a `units` list; `null`/absent means no units.
/// Later duplicates overwrite earlier ones.
fn unit_map(body: &Value) -> Result<BTreeMap<i64, String>, Error> {
    let mut units = BTreeMap::new();
    match body.get("units") {
        None | Some(Value::Null) => {}
        Some(Value::Array(entries)) => {
            for entry in entries {
                let code = entry.get("code").and_then(int_of).ok_or_else(|| {
                    Error::MalformedResponse {
                        field: "code".to_string(),
                    }
                })?;
                let name = entry.get("name").and_then(string_of).ok_or_else(|| {
                    Error::MalformedResponse {
                        field: "name".to_string(),
                    }
                })?;
                units.insert(code, name);
            }
        }
        Some(_) => {
            return Err(Error::MalformedResponse {
                field: "units".to_string(),
            })
        }
    }
    Ok(units)
}

/// Branch list from a `branches` field; `null`/absent means no branches.
fn branch_list(body: &Value) -> Result<Vec<Branch>, Error> {
    match body.get("branches") {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(entries)) => entries.iter().map(Branch::from_value).collect(),
        Some(_) => Err(Error::MalformedResponse {
            field: "branches".to_string(),
        }),
    }
}

/// `{service type → countries}` from a `service_types` list.
fn service_country_map(body: &Value, value_field: &str) -> Result<BTreeMap<String, Value>, Error> {
    match body.get("service_types") {
        None | Some(Value::Null) => Ok(BTreeMap::new()),
        Some(Value::Array(entries)) => {
            let mut map = BTreeMap::new();
            for entry in entries {
                let service = entry.get("service_type").and_then(string_of).ok_or_else(|| {
                    Error::MalformedResponse {
                        field: "service_type".to_string(),
                    }
                })?;
                map.insert(service, entry.get(value_field).cloned().unwrap_or(Value::Null));
            }
            Ok(map)
        }
        Some(_) => Err(Error::MalformedResponse {
            field: "service_types".to_string(),
        }),
    }
}

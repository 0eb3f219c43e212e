//! Shaped results returned by the client.
//!
//! # Design
//! The gateway's bodies are loosely typed: fields come and go per carrier,
//! integers arrive as strings, and batch items sit under positional keys.
//! Each type here owns its shaping rule — which fields are required, which
//! default, which are renamed — so the client methods stay a thin dispatch
//! layer. Everything is built fresh from one response and immutable after
//! construction; nothing outlives the call that produced it except the
//! [`PostCodes`] iterator, which walks an already-fetched record list.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Error;
use crate::status::{float_of, int_of, string_of};

/// One package registered via the add endpoint.
///
/// `fields` keeps every item field except the embedded `status`, so
/// carrier-specific extras survive unchanged next to the extracted ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageRecord {
    pub package_id: i64,
    pub carrier_id: Option<String>,
    pub label_url: Option<String>,
    pub fields: Map<String, Value>,
}

impl PackageRecord {
    pub(crate) fn from_item(item: &Value) -> Result<Self, Error> {
        let object = item.as_object().ok_or_else(|| Error::MalformedResponse {
            field: "package_id".to_string(),
        })?;
        let package_id = object
            .get("package_id")
            .and_then(int_of)
            .ok_or_else(|| Error::MalformedResponse {
                field: "package_id".to_string(),
            })?;
        let mut fields = object.clone();
        fields.remove("status");
        Ok(PackageRecord {
            package_id,
            carrier_id: object.get("carrier_id").and_then(string_of),
            label_url: object.get("label_url").and_then(string_of),
            fields,
        })
    }
}

/// One entry of a package's tracking history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingStatus {
    pub date: Option<String>,
    pub name: Option<String>,
    pub status_id: i64,
    pub status_text: Option<String>,
}

impl TrackingStatus {
    pub(crate) fn from_record(record: &Value) -> Result<Self, Error> {
        let status_id = record
            .get("status_id")
            .and_then(int_of)
            .ok_or_else(|| Error::MalformedResponse {
                field: "status_id".to_string(),
            })?;
        Ok(TrackingStatus {
            date: record.get("date").and_then(string_of),
            name: record.get("name").and_then(string_of),
            status_id,
            status_text: record.get("status_text").and_then(string_of),
        })
    }
}

/// Full tracking history of one package.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedShipment {
    /// Carrier-side id the caller asked about; the gateway does not echo it.
    pub carrier_id: String,
    pub status_records: Vec<TrackingStatus>,
}

/// Latest tracking status of one package.
///
/// The trackstatus endpoint renames `status_text` to `name` and supplies no
/// date at all — `date` is always `None` at this layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LastStatus {
    pub name: String,
    pub status_id: i64,
    pub date: Option<NaiveDate>,
}

impl LastStatus {
    pub(crate) fn from_item(item: &Value) -> Result<Self, Error> {
        let name = item
            .get("status_text")
            .and_then(string_of)
            .ok_or_else(|| Error::MalformedResponse {
                field: "status_text".to_string(),
            })?;
        let status_id = item
            .get("status_id")
            .and_then(int_of)
            .ok_or_else(|| Error::MalformedResponse {
                field: "status_id".to_string(),
            })?;
        Ok(LastStatus {
            name,
            status_id,
            date: None,
        })
    }
}

/// A placed shipment order.
///
/// The order response does not echo the package ids, so the caller-supplied
/// list is retained verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderedShipment {
    pub shipper: String,
    pub package_ids: Vec<i64>,
    pub order_id: i64,
    pub handover_url: String,
    pub labels_url: String,
    pub file_url: Option<String>,
}

impl OrderedShipment {
    pub(crate) fn from_response(
        shipper: &str,
        package_ids: &[i64],
        body: &Value,
    ) -> Result<Self, Error> {
        let required = |field: &str| -> Result<&Value, Error> {
            body.get(field).ok_or_else(|| Error::MalformedResponse {
                field: field.to_string(),
            })
        };
        let order_id = int_of(required("order_id")?).ok_or_else(|| Error::MalformedResponse {
            field: "order_id".to_string(),
        })?;
        let handover_url =
            string_of(required("handover_url")?).ok_or_else(|| Error::MalformedResponse {
                field: "handover_url".to_string(),
            })?;
        let labels_url =
            string_of(required("labels_url")?).ok_or_else(|| Error::MalformedResponse {
                field: "labels_url".to_string(),
            })?;
        Ok(OrderedShipment {
            shipper: shipper.to_string(),
            package_ids: package_ids.to_vec(),
            order_id,
            handover_url,
            labels_url,
            file_url: body.get("file_url").and_then(string_of),
        })
    }
}

/// One pick-up branch of a shipper.
///
/// Branch shapes differ wildly per carrier, so every field is optional and
/// numeric ids are coerced to strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Branch {
    pub id: Option<String>,
    pub name: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub zip: Option<String>,
    pub country: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl Branch {
    pub(crate) fn from_value(value: &Value) -> Result<Self, Error> {
        if !value.is_object() {
            return Err(Error::MalformedResponse {
                field: "branches".to_string(),
            });
        }
        let field = |key: &str| value.get(key).and_then(string_of);
        Ok(Branch {
            id: field("id"),
            name: field("name"),
            street: field("street"),
            city: field("city"),
            zip: field("zip"),
            country: field("country"),
            latitude: value.get("latitude").and_then(float_of),
            longitude: value.get("longitude").and_then(float_of),
        })
    }
}

/// One serviced postcode (or postcode range).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostCode {
    pub postcode: Option<String>,
    pub postcode_end: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    /// The gateway's "1B" flag: remote/restricted delivery area.
    pub is_remote_area: bool,
}

impl PostCode {
    fn from_record(record: &Value, fallback_country: Option<&str>) -> Self {
        let field = |key: &str| record.get(key).and_then(string_of);
        PostCode {
            postcode: field("zip").or_else(|| field("zip_start")),
            postcode_end: field("zip_end"),
            city: field("city"),
            country: field("country").or_else(|| fallback_country.map(str::to_string)),
            is_remote_area: record.get("1B").map(truthy).unwrap_or(false),
        }
    }
}

// Carriers send the flag as bool, 0/1 or "0"/"1".
fn truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty() && s != "0",
        _ => false,
    }
}

/// Lazily shaped postcode sequence.
///
/// The network call was already made; this walks the fetched record list one
/// element at a time. Single pass, not restartable — reconstruct it with a
/// new request to iterate again.
#[derive(Debug)]
pub struct PostCodes {
    records: std::vec::IntoIter<Value>,
    fallback_country: Option<String>,
}

impl PostCodes {
    pub(crate) fn new(records: Vec<Value>, fallback_country: Option<String>) -> Self {
        PostCodes {
            records: records.into_iter(),
            fallback_country,
        }
    }

    /// An exhausted sequence with nothing to yield.
    pub(crate) fn empty() -> Self {
        PostCodes::new(Vec::new(), None)
    }
}

impl Iterator for PostCodes {
    type Item = PostCode;

    fn next(&mut self) -> Option<PostCode> {
        let record = self.records.next()?;
        Some(PostCode::from_record(
            &record,
            self.fallback_country.as_deref(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn package_record_strips_status_and_keeps_the_rest() {
        let item = json!({
            "package_id": 5,
            "carrier_id": "NP00001",
            "label_url": "https://gateway.example/label/5",
            "eid": "8316",
            "status": 200,
        });
        let record = PackageRecord::from_item(&item).unwrap();
        assert_eq!(record.package_id, 5);
        assert_eq!(record.carrier_id.as_deref(), Some("NP00001"));
        assert_eq!(
            record.label_url.as_deref(),
            Some("https://gateway.example/label/5")
        );
        assert!(record.fields.get("status").is_none());
        assert_eq!(record.fields["eid"], "8316");
    }

    #[test]
    fn package_record_coerces_string_ids() {
        let item = json!({"package_id": "42", "carrier_id": 3});
        let record = PackageRecord::from_item(&item).unwrap();
        assert_eq!(record.package_id, 42);
        assert_eq!(record.carrier_id.as_deref(), Some("3"));
    }

    #[test]
    fn package_record_requires_package_id() {
        let err = PackageRecord::from_item(&json!({"status": 200})).unwrap_err();
        assert!(matches!(err, Error::MalformedResponse { ref field } if field == "package_id"));
    }

    #[test]
    fn last_status_renames_status_text_and_has_no_date() {
        let item = json!({"status": 200, "status_id": 2, "status_text": "Delivered"});
        let last = LastStatus::from_item(&item).unwrap();
        assert_eq!(last.name, "Delivered");
        assert_eq!(last.status_id, 2);
        assert!(last.date.is_none());
    }

    #[test]
    fn ordered_shipment_retains_caller_package_ids() {
        let body = json!({
            "order_id": 1234,
            "handover_url": "/handover",
            "labels_url": "/labels",
            "file_url": "/file",
        });
        let order = OrderedShipment::from_response("cp", &[1, 67], &body).unwrap();
        assert_eq!(order.shipper, "cp");
        assert_eq!(order.package_ids, vec![1, 67]);
        assert_eq!(order.order_id, 1234);
        assert_eq!(order.handover_url, "/handover");
        assert_eq!(order.labels_url, "/labels");
        assert_eq!(order.file_url.as_deref(), Some("/file"));
    }

    #[test]
    fn ordered_shipment_file_url_is_optional() {
        let body = json!({
            "order_id": 1234,
            "handover_url": "/handover",
            "labels_url": "/labels",
        });
        let order = OrderedShipment::from_response("cp", &[1, 67], &body).unwrap();
        assert!(order.file_url.is_none());
    }

    #[test]
    fn ordered_shipment_requires_order_id() {
        let body = json!({"handover_url": "/h", "labels_url": "/l"});
        let err = OrderedShipment::from_response("cp", &[], &body).unwrap_err();
        assert!(matches!(err, Error::MalformedResponse { ref field } if field == "order_id"));
    }

    #[test]
    fn branch_coerces_numeric_fields() {
        let branch = Branch::from_value(&json!({
            "id": 1616,
            "name": "Depo Praha",
            "zip": "17000",
            "latitude": "50.1",
            "longitude": 14.44,
        }))
        .unwrap();
        assert_eq!(branch.id.as_deref(), Some("1616"));
        assert_eq!(branch.latitude, Some(50.1));
        assert_eq!(branch.longitude, Some(14.44));
        assert!(branch.street.is_none());
    }

    #[test]
    fn postcodes_yield_each_record_then_terminate() {
        let mut postcodes = PostCodes::new(
            vec![
                json!({"zip": "35002", "1B": false, "country": "CZ"}),
                json!({"zip": "19000", "1B": true, "country": "CZ"}),
            ],
            None,
        );
        let first = postcodes.next().unwrap();
        assert_eq!(first.postcode.as_deref(), Some("35002"));
        assert!(!first.is_remote_area);
        let second = postcodes.next().unwrap();
        assert_eq!(second.postcode.as_deref(), Some("19000"));
        assert!(second.is_remote_area);
        assert!(postcodes.next().is_none());
        assert!(postcodes.next().is_none());
    }

    #[test]
    fn postcode_defaults_from_range_and_fallback_country() {
        let mut postcodes = PostCodes::new(
            vec![json!({"zip_start": "10000", "zip_end": "10199", "city": "Praha"})],
            Some("CZ".to_string()),
        );
        let code = postcodes.next().unwrap();
        assert_eq!(code.postcode.as_deref(), Some("10000"));
        assert_eq!(code.postcode_end.as_deref(), Some("10199"));
        assert_eq!(code.city.as_deref(), Some("Praha"));
        assert_eq!(code.country.as_deref(), Some("CZ"));
        assert!(!code.is_remote_area);
    }

    #[test]
    fn remote_area_flag_accepts_carrier_spellings() {
        for (raw, expected) in [
            (json!({"zip": "1", "1B": 1}), true),
            (json!({"zip": "1", "1B": "1"}), true),
            (json!({"zip": "1", "1B": "0"}), false),
            (json!({"zip": "1"}), false),
        ] {
            let flag = PostCodes::new(vec![raw], None)
                .next()
                .unwrap()
                .is_remote_area;
            assert_eq!(flag, expected);
        }
    }
}

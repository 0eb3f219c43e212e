//! Fake carrier gateway for integration tests.
//!
//! Reproduces the gateway's wire quirks so the client gets exercised against
//! the real thing's shapes: every verb is a JSON POST under
//! `/{shipper}/{verb}` (tracking under `/v2/`), batch answers use positional
//! `"0"`, `"1"`, … keys next to unrelated top-level fields, and failures are
//! signaled by an embedded `status` while HTTP stays 200 — an unknown
//! shipper answers `200 OK` with `status: 406` in the body.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};

const KNOWN_SHIPPERS: &[&str] = &["cp", "ppl", "dpd", "zasilkovna"];

/// In-memory gateway state: registered packages and id counters.
#[derive(Debug, Default)]
pub struct Gateway {
    next_package_id: i64,
    next_order_id: i64,
    packages: HashMap<i64, Value>,
}

pub type Db = Arc<RwLock<Gateway>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Gateway::default()));
    Router::new()
        .route("/{shipper}/{verb}", post(verb))
        .route("/{shipper}/{verb}/{*suffix}", post(verb_with_suffix))
        .route("/v2/{shipper}/{verb}", post(verb))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn verb(
    State(db): State<Db>,
    Path((shipper, verb)): Path<(String, String)>,
    Json(payload): Json<Value>,
) -> (StatusCode, Json<Value>) {
    respond(&db, &shipper, &verb, None, payload).await
}

async fn verb_with_suffix(
    State(db): State<Db>,
    Path((shipper, verb, suffix)): Path<(String, String, String)>,
    Json(payload): Json<Value>,
) -> (StatusCode, Json<Value>) {
    respond(&db, &shipper, &verb, Some(&suffix), payload).await
}

async fn respond(
    db: &Db,
    shipper: &str,
    verb: &str,
    suffix: Option<&str>,
    payload: Value,
) -> (StatusCode, Json<Value>) {
    if !KNOWN_SHIPPERS.contains(&shipper) {
        return (
            StatusCode::OK,
            Json(json!({"status": 406, "status_message": "unknown shipper"})),
        );
    }

    match verb {
        "add" => add(db, shipper, payload).await,
        "drop" => drop_packages(db, payload).await,
        "check" => (StatusCode::OK, Json(json!({"status": 200}))),
        "track" => (
            StatusCode::OK,
            Json(positional(
                vec![json!([
                    {"date": "2018-11-07 14:15:01", "name": "Picked up", "status_id": 1},
                    {"date": "2018-11-08 09:00:00", "name": "On the way", "status_id": 3},
                    {"date": "2018-11-08 18:00:00", "name": "Delivered", "status_id": 2},
                ])],
                &[("status", json!(200))],
            )),
        ),
        "trackstatus" => (
            StatusCode::OK,
            Json(positional(
                vec![json!({"status": 200, "status_id": 2, "status_text": "Delivered"})],
                &[],
            )),
        ),
        "overview" => overview(db).await,
        "labels" => (
            StatusCode::OK,
            Json(json!({"status": 200, "labels_url": "https://gateway.mock/pdf/labels.pdf"})),
        ),
        "package" => package_info(db, suffix).await,
        "order" => order(db, payload).await,
        "orderview" => (
            StatusCode::OK,
            Json(json!({
                "status": 200,
                "order_id": suffix.and_then(|s| s.parse::<i64>().ok()).unwrap_or(0),
                "handover_url": "https://gateway.mock/handover/29",
                "labels_url": "https://gateway.mock/pdf/29.pdf",
                "package_ids": ["1", "67"],
            })),
        ),
        "orderpickup" => (StatusCode::OK, Json(json!({"status": 200}))),
        "services" => (
            StatusCode::OK,
            Json(json!({
                "status": 200,
                "service_types": {"NP": "Parcel", "RR": "Registered mail"},
            })),
        ),
        "manipulationunits" => (
            StatusCode::OK,
            Json(json!({
                "status": 200,
                "units": [{"code": 1, "name": "KM"}, {"code": 876, "name": "M"}],
            })),
        ),
        "adrunits" => (
            StatusCode::OK,
            Json(json!({
                "status": 200,
                "units": [{"code": 432, "name": "flammable liquids"}],
            })),
        ),
        "branches" | "fullbranches" | "branchlocator" => (
            StatusCode::OK,
            Json(json!({
                "status": 200,
                "branches": [
                    {
                        "id": "1616",
                        "name": "Depo Praha 7",
                        "street": "Argentinská 38",
                        "city": "Praha",
                        "zip": "17000",
                        "country": "CZ",
                        "latitude": 50.1,
                        "longitude": 14.44,
                    },
                    {"id": "1617", "name": "Depo Brno 2", "city": "Brno", "zip": "60200"},
                ],
            })),
        ),
        "countries4service" => (
            StatusCode::OK,
            Json(json!({
                "status": 200,
                "service_types": [{"service_type": "NP", "countries": ["CZ", "SK", "DE"]}],
            })),
        ),
        "cashondeliverycountries" => (
            StatusCode::OK,
            Json(json!({
                "status": 200,
                "service_types": [{"service_type": "NP", "cod_countries": ["CZ", "SK"]}],
            })),
        ),
        "zipcodes" => {
            let country = suffix
                .and_then(|s| s.split('/').nth(1))
                .unwrap_or("CZ");
            (
                StatusCode::OK,
                Json(json!({
                    "status": 200,
                    "country": country,
                    "zip_codes": [
                        {"zip": "35002", "1B": false},
                        {"zip": "19000", "1B": true},
                    ],
                })),
            )
        }
        _ => (
            StatusCode::NOT_FOUND,
            Json(json!({"status": 404, "status_message": "unknown endpoint"})),
        ),
    }
}

async fn add(db: &Db, shipper: &str, payload: Value) -> (StatusCode, Json<Value>) {
    let Some(items) = payload.as_array().filter(|items| !items.is_empty()) else {
        return (
            StatusCode::OK,
            Json(json!({"status": 400, "status_message": "no packages"})),
        );
    };

    let mut state = db.write().await;
    let mut records = Vec::with_capacity(items.len());
    for item in items {
        state.next_package_id += 1;
        let id = state.next_package_id;
        let mut record = item.as_object().cloned().unwrap_or_default();
        record.insert("package_id".to_string(), json!(id));
        record.insert(
            "carrier_id".to_string(),
            json!(format!("{}{id:05}", shipper.to_uppercase())),
        );
        record.insert(
            "label_url".to_string(),
            json!(format!("https://gateway.mock/pdf/{id}.pdf")),
        );
        state.packages.insert(id, Value::Object(record.clone()));
        record.insert("status".to_string(), json!(200));
        records.push(Value::Object(record));
    }

    let body = positional(
        records,
        &[
            ("status", json!(200)),
            ("labels_url", json!("https://gateway.mock/pdf/batch.pdf")),
        ],
    );
    (StatusCode::OK, Json(body))
}

async fn drop_packages(db: &Db, payload: Value) -> (StatusCode, Json<Value>) {
    let ids: Vec<i64> = payload
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.get("id").and_then(Value::as_i64))
                .collect()
        })
        .unwrap_or_default();

    let mut state = db.write().await;
    for id in &ids {
        if !state.packages.contains_key(id) {
            return (
                StatusCode::OK,
                Json(json!({"status": 404, "status_message": "the package does not exist"})),
            );
        }
    }
    for id in &ids {
        state.packages.remove(id);
    }
    (StatusCode::OK, Json(json!({"status": 200})))
}

async fn overview(db: &Db) -> (StatusCode, Json<Value>) {
    let state = db.read().await;
    let mut ids: Vec<_> = state.packages.keys().copied().collect();
    ids.sort_unstable();
    let packages: Vec<Value> = ids
        .iter()
        .filter_map(|id| state.packages.get(id).cloned())
        .collect();
    (StatusCode::OK, Json(Value::Array(packages)))
}

async fn package_info(db: &Db, suffix: Option<&str>) -> (StatusCode, Json<Value>) {
    let id = suffix.and_then(|s| s.parse::<i64>().ok());
    let state = db.read().await;
    match id.and_then(|id| state.packages.get(&id)) {
        Some(package) => (StatusCode::OK, Json(package.clone())),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({"status": 404, "status_message": "the package does not exist"})),
        ),
    }
}

async fn order(db: &Db, payload: Value) -> (StatusCode, Json<Value>) {
    if payload.get("package_ids").and_then(Value::as_array).is_none() {
        return (
            StatusCode::OK,
            Json(json!({"status": 400, "status_message": "no package ids"})),
        );
    }
    let mut state = db.write().await;
    state.next_order_id += 1;
    let order_id = state.next_order_id;
    (
        StatusCode::OK,
        Json(json!({
            "status": 200,
            "order_id": order_id,
            "handover_url": format!("https://gateway.mock/handover/{order_id}"),
            "labels_url": format!("https://gateway.mock/pdf/order-{order_id}.pdf"),
            "file_url": format!("https://gateway.mock/file/{order_id}"),
        })),
    )
}

/// Gateway-style batch body: positional string keys next to top-level fields.
fn positional(items: Vec<Value>, extra: &[(&str, Value)]) -> Value {
    let mut body = Map::new();
    for (index, item) in items.into_iter().enumerate() {
        body.insert(index.to_string(), item);
    }
    for (key, value) in extra {
        body.insert((*key).to_string(), value.clone());
    }
    Value::Object(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positional_bodies_key_items_by_index() {
        let body = positional(
            vec![json!({"package_id": 1}), json!({"package_id": 2})],
            &[("status", json!(200))],
        );
        assert_eq!(body["0"]["package_id"], 1);
        assert_eq!(body["1"]["package_id"], 2);
        assert_eq!(body["status"], 200);
    }

    #[test]
    fn positional_bodies_may_have_no_extras() {
        let body = positional(vec![json!({"status_id": 2})], &[]);
        assert_eq!(body["0"]["status_id"], 2);
        assert!(body.get("status").is_none());
    }
}

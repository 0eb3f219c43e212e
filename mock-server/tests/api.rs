use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::app;
use serde_json::{json, Value};
use tower::ServiceExt;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn gateway_post(uri: &str, payload: &Value) -> Request<String> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(payload.to_string())
        .unwrap()
}

// --- add ---

#[tokio::test]
async fn add_assigns_sequential_package_ids() {
    let app = app();
    let resp = app
        .oneshot(gateway_post("/cp/add", &json!([{"eid": "1"}, {"eid": "2"}])))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["status"], 200);
    assert_eq!(body["0"]["package_id"], 1);
    assert_eq!(body["0"]["status"], 200);
    assert_eq!(body["1"]["package_id"], 2);
    assert!(body["labels_url"].is_string());
    assert!(body["0"]["carrier_id"].as_str().unwrap().starts_with("CP"));
}

#[tokio::test]
async fn add_with_no_packages_fails_in_the_body() {
    let app = app();
    let resp = app
        .oneshot(gateway_post("/cp/add", &json!([])))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["status"], 400);
}

// --- dual-status signaling ---

#[tokio::test]
async fn unknown_shipper_fails_in_the_body_at_http_200() {
    let app = app();
    let resp = app
        .oneshot(gateway_post("/nope/add", &json!([{"eid": "1"}])))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["status"], 406);
}

#[tokio::test]
async fn unknown_verb_is_http_404() {
    let app = app();
    let resp = app
        .oneshot(gateway_post("/cp/frobnicate", &json!([])))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(resp).await["status"], 404);
}

// --- drop ---

#[tokio::test]
async fn drop_unknown_package_reports_embedded_404() {
    let app = app();
    let resp = app
        .oneshot(gateway_post("/cp/drop", &json!([{"id": 99}])))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["status"], 404);
}

#[tokio::test]
async fn added_packages_show_in_overview_until_dropped() {
    let app = app();

    let resp = app
        .clone()
        .oneshot(gateway_post("/cp/add", &json!([{"eid": "1"}])))
        .await
        .unwrap();
    let added = body_json(resp).await;
    let id = added["0"]["package_id"].as_i64().unwrap();

    let resp = app
        .clone()
        .oneshot(gateway_post("/cp/overview", &json!([])))
        .await
        .unwrap();
    let overview = body_json(resp).await;
    assert_eq!(overview.as_array().unwrap().len(), 1);

    let resp = app
        .clone()
        .oneshot(gateway_post("/cp/drop", &json!([{"id": id}])))
        .await
        .unwrap();
    assert_eq!(body_json(resp).await["status"], 200);

    let resp = app
        .oneshot(gateway_post("/cp/overview", &json!([])))
        .await
        .unwrap();
    assert!(body_json(resp).await.as_array().unwrap().is_empty());
}

// --- tracking ---

#[tokio::test]
async fn track_answers_positional_record_lists_under_v2() {
    let app = app();
    let resp = app
        .oneshot(gateway_post("/v2/cp/track", &json!([{"id": "CP00001"}])))
        .await
        .unwrap();

    let body = body_json(resp).await;
    assert_eq!(body["status"], 200);
    let records = body["0"].as_array().unwrap();
    assert_eq!(records.len(), 3);
    assert_eq!(records[2]["status_id"], 2);
}

#[tokio::test]
async fn trackstatus_answers_without_a_top_level_status() {
    let app = app();
    let resp = app
        .oneshot(gateway_post("/cp/trackstatus", &json!([{"id": "CP00001"}])))
        .await
        .unwrap();

    let body = body_json(resp).await;
    assert!(body.get("status").is_none());
    assert_eq!(body["0"]["status"], 200);
    assert_eq!(body["0"]["status_text"], "Delivered");
}

// --- catalogs ---

#[tokio::test]
async fn zipcodes_suffix_selects_the_country() {
    let app = app();
    let resp = app
        .oneshot(gateway_post("/cp/zipcodes/NP/DE", &json!([])))
        .await
        .unwrap();

    let body = body_json(resp).await;
    assert_eq!(body["country"], "DE");
    assert_eq!(body["zip_codes"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn package_info_missing_package_is_http_404() {
    let app = app();
    let resp = app
        .oneshot(gateway_post("/cp/package/7", &json!([])))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

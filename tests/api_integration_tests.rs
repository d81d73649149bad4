//! Integration Tests for API Endpoints
//!
//! Tests the full request/response cycle of the admin router against a
//! shared cache.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use paid_cache::fetch::{ClientOptions, ReqwestTransport};
use paid_cache::{
    api::create_router, cache::keys, ttl, AppState, DataCache, PaidClient, RefreshEvent,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// == Helper Functions ==

fn app_for_origin(origin: &str) -> (Router, DataCache) {
    let cache = DataCache::default();
    let transport = ReqwestTransport::new(Duration::from_secs(5)).unwrap();
    let client = PaidClient::new(
        cache.clone(),
        Arc::new(transport),
        ClientOptions::proxy(origin),
    );
    (create_router(AppState::new(client)), cache)
}

/// Admin-only tests never reach the backend.
fn create_test_app() -> (Router, DataCache) {
    app_for_origin("http://127.0.0.1:9")
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

// == GET /cache/:key ==

#[tokio::test]
async fn test_get_entry_success() {
    let (app, cache) = create_test_app();
    cache
        .set(keys::invoices("cus_1"), json!({"data": [{"id": "inv_1"}]}), Some(ttl::DATA))
        .await;

    let response = app.oneshot(request("GET", "/cache/invoices:cus_1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["key"], "invoices:cus_1");
    assert_eq!(json["value"]["data"][0]["id"], "inv_1");
}

#[tokio::test]
async fn test_get_entry_not_found() {
    let (app, _cache) = create_test_app();

    let response = app.oneshot(request("GET", "/cache/usage:nobody")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let json = body_to_json(response.into_body()).await;
    assert!(json["error"].as_str().unwrap().contains("usage:nobody"));
}

#[tokio::test(start_paused = true)]
async fn test_get_entry_expired() {
    let (app, cache) = create_test_app();
    cache.set(keys::usage("cus_1"), json!([1, 2]), Some(ttl::DATA)).await;

    tokio::time::advance(Duration::from_millis(31_000)).await;

    let response = app.oneshot(request("GET", "/cache/usage:cus_1")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(cache.stats().await.size, 0);
}

// == DELETE endpoints ==

#[tokio::test]
async fn test_delete_entry() {
    let (app, cache) = create_test_app();
    cache.set("payments:cus_1", json!([]), None).await;

    let response = app
        .clone()
        .oneshot(request("DELETE", "/cache/payments:cus_1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_to_json(response.into_body()).await["removed"], 1);

    let response = app
        .oneshot(request("DELETE", "/cache/payments:cus_1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_to_json(response.into_body()).await["removed"], 0);
}

#[tokio::test]
async fn test_clear_cache() {
    let (app, cache) = create_test_app();
    for key in keys::customer_keys("cus_1") {
        cache.set(key, json!([]), None).await;
    }

    let response = app.oneshot(request("DELETE", "/cache")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_to_json(response.into_body()).await["removed"], 6);
    assert_eq!(cache.stats().await.size, 0);
}

#[tokio::test]
async fn test_clear_pdf_cache() {
    let (app, cache) = create_test_app();
    cache.set(keys::invoice_pdf("inv_9"), json!({"url": "x"}), Some(ttl::PDF)).await;
    cache.set(keys::invoices("inv_9"), json!([]), None).await;

    let response = app
        .oneshot(request("DELETE", "/cache/pdf/inv_9"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_to_json(response.into_body()).await["removed"], 1);

    assert!(!cache.has("pdf:invoice:inv_9").await);
    assert!(cache.has("invoices:inv_9").await);
}

// == POST /cache/cleanup ==

#[tokio::test(start_paused = true)]
async fn test_cleanup_sweeps_unread_entries() {
    let (app, cache) = create_test_app();
    cache.set("short", json!(1), Some(ttl::DATA)).await;
    cache.set("long", json!(2), Some(ttl::LONG)).await;

    tokio::time::advance(Duration::from_secs(60)).await;

    let response = app.oneshot(request("POST", "/cache/cleanup")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_to_json(response.into_body()).await["removed"], 1);

    let stats = cache.stats().await;
    assert_eq!(stats.keys, vec!["long".to_string()]);
    assert_eq!(stats.expirations, 1);
}

// == POST /refresh ==

#[tokio::test]
async fn test_refresh_account() {
    let (app, cache) = create_test_app();
    let mut subscription = cache.subscribe(Some("cus_1".to_string()));
    for key in keys::customer_keys("cus_1") {
        cache.set(key, json!([]), None).await;
    }
    cache.set(keys::invoices("cus_2"), json!([]), None).await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/refresh",
            r#"{"type":"account","entity_id":"cus_1"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_to_json(response.into_body()).await["delivered"], 1);

    assert_eq!(cache.stats().await.keys, vec!["invoices:cus_2".to_string()]);
    assert_eq!(subscription.recv().await, Some(RefreshEvent::account("cus_1")));
}

#[tokio::test]
async fn test_refresh_alerts_only_drops_alert_rules() {
    let (app, cache) = create_test_app();
    cache.set(keys::alert_rules("cus_1"), json!([]), None).await;
    cache.set(keys::usage("cus_1"), json!([]), None).await;

    let response = app
        .oneshot(json_request(
            "POST",
            "/refresh",
            r#"{"type":"alerts","entity_id":"cus_1"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    assert!(!cache.has("alert-rules:cus_1").await);
    assert!(cache.has("usage:cus_1").await);
}

#[tokio::test]
async fn test_refresh_all() {
    let (app, cache) = create_test_app();
    let mut unfiltered = cache.subscribe(None);
    cache.set(keys::usage("a"), json!([]), None).await;
    cache.set(keys::usage("b"), json!([]), None).await;

    let response = app
        .oneshot(json_request("POST", "/refresh", r#"{"type":"all"}"#))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    assert_eq!(cache.stats().await.size, 0);
    assert_eq!(unfiltered.recv().await, Some(RefreshEvent::All));
}

#[tokio::test]
async fn test_refresh_empty_entity_is_bad_request() {
    let (app, _cache) = create_test_app();

    let response = app
        .oneshot(json_request(
            "POST",
            "/refresh",
            r#"{"type":"account","entity_id":""}"#,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_refresh_malformed_body() {
    let (app, _cache) = create_test_app();

    let response = app
        .oneshot(json_request("POST", "/refresh", "not json"))
        .await
        .unwrap();
    assert!(response.status().is_client_error());
}

// == GET /paid/:endpoint/:id ==

#[tokio::test]
async fn test_paid_read_through_fills_cache() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/usage/cus_1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": [{"units": 3}]})))
        .expect(1)
        .mount(&server)
        .await;
    let (app, cache) = app_for_origin(&server.uri());

    let response = app
        .clone()
        .oneshot(request("GET", "/paid/usage/cus_1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["x-cache"], "MISS");
    assert_eq!(
        body_to_json(response.into_body()).await,
        json!({"data": [{"units": 3}]})
    );

    let response = app
        .clone()
        .oneshot(request("GET", "/paid/usage/cus_1"))
        .await
        .unwrap();
    assert_eq!(response.headers()["x-cache"], "HIT");

    let response = app
        .oneshot(request("GET", "/cache/usage:cus_1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(cache.stats().await.hits, 1);
}

#[tokio::test]
async fn test_paid_invoice_pdf_and_refresh() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/invoice-pdf/inv_1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": "JVBERi0="})))
        .expect(2)
        .mount(&server)
        .await;
    let (app, cache) = app_for_origin(&server.uri());

    let response = app
        .clone()
        .oneshot(request("GET", "/paid/invoice-pdf/inv_1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(cache.has("pdf:invoice:inv_1").await);

    let response = app
        .clone()
        .oneshot(request("DELETE", "/cache/pdf/inv_1"))
        .await
        .unwrap();
    assert_eq!(body_to_json(response.into_body()).await["removed"], 1);

    let response = app
        .oneshot(request("GET", "/paid/invoice-pdf/inv_1"))
        .await
        .unwrap();
    assert_eq!(response.headers()["x-cache"], "MISS");
}

#[tokio::test]
async fn test_paid_upstream_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/payments/cus_1"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;
    let (app, cache) = app_for_origin(&server.uri());

    let response = app
        .oneshot(request("GET", "/paid/payments/cus_1"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body_to_json(response.into_body()).await["error"],
        "Failed to fetch payments data"
    );
    assert_eq!(cache.stats().await.size, 0);
}

#[tokio::test]
async fn test_paid_rejects_unknown_and_write_endpoints() {
    let (app, _cache) = create_test_app();

    for uri in ["/paid/refunds/cus_1", "/paid/pay-invoice/inv_1"] {
        let response = app.clone().oneshot(request("GET", uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

// == GET /stats and /health ==

#[tokio::test]
async fn test_stats_endpoint() {
    let (app, cache) = create_test_app();
    let _subscription = cache.subscribe(None);
    cache.set("first", json!(1), None).await;
    cache.set("second", json!(2), None).await;
    cache.get("first").await;
    cache.get("missing").await;

    let response = app.oneshot(request("GET", "/stats")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["size"], 2);
    assert_eq!(json["keys"], json!(["first", "second"]));
    assert_eq!(json["hits"], 1);
    assert_eq!(json["misses"], 1);
    assert_eq!(json["hit_rate"], 0.5);
    assert_eq!(json["subscribers"], 1);
}

#[tokio::test]
async fn test_health_endpoint() {
    let (app, _cache) = create_test_app();

    let response = app.oneshot(request("GET", "/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], "healthy");
    assert!(json.get("timestamp").is_some());
}

#[tokio::test]
async fn test_unknown_route() {
    let (app, _cache) = create_test_app();

    let response = app.oneshot(request("GET", "/set")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

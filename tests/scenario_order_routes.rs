//! In-process scenario tests for the order HTTP endpoints.
//!
//! The router is built with `http::build_router` on top of a fresh
//! `OrderSystem` and driven with `tower::ServiceExt::oneshot`; no socket is
//! bound.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use order_engine::app_system::OrderSystem;
use order_engine::config::EngineConfig;
use order_engine::domain::{Money, Product};
use order_engine::http::build_router;
use serde_json::{json, Value};
use tower::ServiceExt; // oneshot

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn make_system() -> OrderSystem {
    let system = OrderSystem::start(&EngineConfig::default());
    for product in [
        Product::new("P1", "Tea", Money::from_cents(10_000), 5),
        Product::new("P2", "Mug", Money::from_cents(5_000), 1),
    ] {
        system.product_client.create_product(product).await.expect("seed product");
    }
    system
}

async fn call(system: &OrderSystem, req: Request<Body>) -> (StatusCode, Value) {
    let router = build_router(system.engine.clone());
    let resp = router.oneshot(req).await.expect("oneshot failed");
    let status = resp.status();
    let body = resp.into_body().collect().await.expect("body collect failed").to_bytes();
    let json = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).expect("body is not valid JSON")
    };
    (status, json)
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().method("GET").uri(uri).body(Body::empty()).unwrap()
}

fn checkout_body(lines: Value) -> Value {
    json!({
        "products": lines,
        "total": 345.0,
        "name": "Asha Rao",
        "address": "12 Lake Road",
        "phone": "9876543210"
    })
}

async fn place(system: &OrderSystem, lines: Value) -> (StatusCode, Value) {
    call(system, json_request("POST", "/orders", checkout_body(lines))).await
}

// ---------------------------------------------------------------------------
// GET /health
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_returns_200_ok_true() {
    let system = make_system().await;
    let (status, json) = call(&system, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["ok"], true);
    assert_eq!(json["service"], "order-engine");
}

// ---------------------------------------------------------------------------
// POST /orders
// ---------------------------------------------------------------------------

#[tokio::test]
async fn place_order_returns_id_and_pending_status() {
    let system = make_system().await;
    let (status, json) = place(
        &system,
        json!([
            { "productId": "P1", "quantity": 2, "name": "Tea" },
            { "productId": "P2", "quantity": 1, "name": "Mug" }
        ]),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "pending");
    let order_id = json["orderId"].as_str().expect("orderId").to_string();

    let (status, order) = call(&system, get(&format!("/orders/{}", order_id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(order["_id"], order_id.as_str());
    assert_eq!(order["total"], 345.0);
    assert_eq!(order["subtotal"], 250.0);
    assert_eq!(order["products"][0]["productId"], "P1");
    assert!(order["completedDate"].is_null());
}

#[tokio::test]
async fn empty_cart_is_400_with_field_detail() {
    let system = make_system().await;
    let (status, json) = place(&system, json!([])).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "cart is empty");
    assert_eq!(json["details"]["field"], "products");
}

#[tokio::test]
async fn bad_phone_is_400() {
    let system = make_system().await;
    let mut body = checkout_body(json!([{ "productId": "P1", "quantity": 1 }]));
    body["phone"] = json!("12345");
    let (status, json) = call(&system, json_request("POST", "/orders", body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["details"]["field"], "phone");
}

#[tokio::test]
async fn insufficient_stock_is_400_and_stock_is_untouched() {
    let system = make_system().await;
    let (status, json) = place(
        &system,
        json!([
            { "productId": "P1", "quantity": 2 },
            { "productId": "P2", "quantity": 2 }
        ]),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["details"]["productId"], "P2");
    assert_eq!(json["details"]["available"], 1);
    assert_eq!(json["details"]["requested"], 2);

    let (_, orders) = call(&system, get("/orders")).await;
    assert_eq!(orders, json!([]));
    let (status, _) = place(&system, json!([{ "productId": "P1", "quantity": 5 }])).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn malformed_json_is_400() {
    let system = make_system().await;
    let req = Request::builder()
        .method("POST")
        .uri("/orders")
        .header("content-type", "application/json")
        .body(Body::from("{ not json"))
        .unwrap();
    let (status, json) = call(&system, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().starts_with("malformed request body"));
    assert!(json["details"]["reason"].is_string());
}

// ---------------------------------------------------------------------------
// PUT /orders/:order_id/status
// ---------------------------------------------------------------------------

#[tokio::test]
async fn cancel_then_complete_is_rejected() {
    let system = make_system().await;
    let (_, placed) = place(&system, json!([{ "productId": "P2", "quantity": 1 }])).await;
    let uri = format!("/orders/{}/status", placed["orderId"].as_str().unwrap());

    let (status, json) = call(&system, json_request("PUT", &uri, json!({ "status": "cancelled" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["order"]["status"], "cancelled");
    assert!(json["order"]["cancelledDate"].is_string());

    let (status, json) = call(&system, json_request("PUT", &uri, json!({ "status": "completed" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["details"]["from"], "cancelled");

    // The released unit can be bought again.
    let (status, _) = place(&system, json!([{ "productId": "P2", "quantity": 1 }])).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn status_update_errors_map_to_400_and_404() {
    let system = make_system().await;
    let (_, placed) = place(&system, json!([{ "productId": "P1", "quantity": 1 }])).await;
    let order_id = placed["orderId"].as_str().unwrap().to_string();

    let (status, _) = call(
        &system,
        json_request("PUT", "/orders/not-an-id/status", json!({ "status": "completed" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = call(
        &system,
        json_request("PUT", &format!("/orders/{}/status", order_id), json!({ "status": "shipped" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = call(
        &system,
        json_request("PUT", &format!("/orders/{}/status", order_id), json!({ "status": "pending" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let unknown = "00000000-0000-4000-8000-000000000000";
    let (status, _) = call(
        &system,
        json_request("PUT", &format!("/orders/{}/status", unknown), json!({ "status": "completed" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = call(&system, get(&format!("/orders/{}", unknown))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// GET /orders
// ---------------------------------------------------------------------------

#[tokio::test]
async fn list_returns_newest_first() {
    let system = make_system().await;
    let (_, first) = place(&system, json!([{ "productId": "P1", "quantity": 1 }])).await;
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    let (_, second) = place(&system, json!([{ "productId": "P1", "quantity": 1 }])).await;

    let (status, orders) = call(&system, get("/orders")).await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<&str> = orders.as_array().unwrap().iter().map(|o| o["_id"].as_str().unwrap()).collect();
    assert_eq!(ids, vec![second["orderId"].as_str().unwrap(), first["orderId"].as_str().unwrap()]);
}

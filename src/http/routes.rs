//! Axum router and handlers.
//!
//! `build_router` is the single entry point. Middleware is attached by
//! `main.rs`, so tests drive the bare router.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use tracing::info;

use super::api_types::{HealthResponse, PlaceOrderResponse, StatusUpdateRequest, StatusUpdateResponse};
use crate::domain::Order;
use crate::engine::{CheckoutPayload, OrderEngine, ValidationError};
use crate::error::EngineError;

pub fn build_router(engine: OrderEngine) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/orders", post(place_order).get(list_orders))
        .route("/orders/:order_id", get(get_order))
        .route("/orders/:order_id/status", put(update_status))
        .with_state(engine)
}

fn malformed(rejection: JsonRejection) -> EngineError {
    ValidationError::MalformedBody(rejection.body_text()).into()
}

// ---------------------------------------------------------------------------
// GET /health
// ---------------------------------------------------------------------------

pub(crate) async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        ok: true,
        service: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
    })
}

// ---------------------------------------------------------------------------
// POST /orders
// ---------------------------------------------------------------------------

pub(crate) async fn place_order(
    State(engine): State<OrderEngine>,
    body: Result<Json<CheckoutPayload>, JsonRejection>,
) -> Result<Json<PlaceOrderResponse>, EngineError> {
    let Json(payload) = body.map_err(malformed)?;
    let order = engine.place_order(payload).await?;
    info!(order_id = %order.id, "Order accepted");
    Ok(Json(PlaceOrderResponse {
        message: "Order placed successfully".to_string(),
        order_id: order.id,
        status: order.status,
    }))
}

// ---------------------------------------------------------------------------
// PUT /orders/:order_id/status
// ---------------------------------------------------------------------------

pub(crate) async fn update_status(
    State(engine): State<OrderEngine>,
    Path(order_id): Path<String>,
    body: Result<Json<StatusUpdateRequest>, JsonRejection>,
) -> Result<Json<StatusUpdateResponse>, EngineError> {
    let Json(request) = body.map_err(malformed)?;
    let order = engine.update_status(&order_id, &request.status).await?;
    Ok(Json(StatusUpdateResponse {
        message: format!("Order status updated to {}", order.status),
        order,
    }))
}

// ---------------------------------------------------------------------------
// GET /orders, GET /orders/:order_id
// ---------------------------------------------------------------------------

pub(crate) async fn list_orders(State(engine): State<OrderEngine>) -> Result<Json<Vec<Order>>, EngineError> {
    Ok(Json(engine.list_orders().await?))
}

pub(crate) async fn get_order(
    State(engine): State<OrderEngine>,
    Path(order_id): Path<String>,
) -> Result<(StatusCode, Json<Order>), EngineError> {
    let order = engine.get_order(&order_id).await?;
    Ok((StatusCode::OK, Json(order)))
}

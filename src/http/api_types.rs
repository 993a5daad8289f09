//! Request and response bodies of the HTTP API.

use serde::{Deserialize, Serialize};

use crate::domain::{Order, OrderId, OrderStatus};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderResponse {
    pub message: String,
    pub order_id: OrderId,
    pub status: OrderStatus,
}

/// `PUT /orders/{orderId}/status` body. The status stays a string so an
/// unknown value is reported as an invalid status, not a parse failure.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusUpdateRequest {
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusUpdateResponse {
    pub message: String,
    pub order: Order,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub service: &'static str,
    pub version: &'static str,
}

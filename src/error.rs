use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};
use thiserror::Error;

use crate::engine::{StockError, TransitionError, ValidationError};
use crate::repository::StoreError;

/// Every failure an engine operation can report to a caller.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Stock(#[from] StockError),
    #[error(transparent)]
    Transition(#[from] TransitionError),
    #[error("storage failure: {0}")]
    Storage(#[from] StoreError),
    /// Something that must not happen did, e.g. stock was reserved but the
    /// order could not be stored.
    #[error("internal invariant violated: {0}")]
    InternalInvariant(String),
}

impl EngineError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            EngineError::Validation(_) => StatusCode::BAD_REQUEST,
            EngineError::Stock(StockError::InsufficientStock { .. } | StockError::UnknownProduct(_)) => {
                StatusCode::BAD_REQUEST
            }
            EngineError::Stock(_) => StatusCode::INTERNAL_SERVER_ERROR,
            EngineError::Transition(TransitionError::OrderNotFound(_)) => StatusCode::NOT_FOUND,
            EngineError::Transition(_) => StatusCode::BAD_REQUEST,
            EngineError::Storage(_) | EngineError::InternalInvariant(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Structured context for the response body, if any.
    pub fn details(&self) -> Option<Value> {
        match self {
            EngineError::Validation(ValidationError::MalformedBody(reason)) => Some(json!({ "reason": reason })),
            EngineError::Validation(e) => e.field().map(|field| json!({ "field": field })),
            EngineError::Stock(StockError::InsufficientStock { product_id, available, requested }) => Some(json!({
                "productId": product_id,
                "available": available,
                "requested": requested,
            })),
            EngineError::Stock(StockError::UnknownProduct(product_id)) => Some(json!({ "productId": product_id })),
            EngineError::Transition(TransitionError::IllegalTransition { from, to }) => {
                Some(json!({ "from": from, "to": to }))
            }
            EngineError::Transition(TransitionError::NoOpTransition(status)) => Some(json!({ "status": status })),
            _ => None,
        }
    }
}

impl IntoResponse for EngineError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }
        let mut body = json!({ "error": self.to_string() });
        if let Some(details) = self.details() {
            body["details"] = details;
        }
        (status, Json(body)).into_response()
    }
}

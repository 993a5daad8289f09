use thiserror::Error;

use crate::domain::OrderStatus;

/// Rejections raised by the order store itself.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum OrderError {
    #[error("Order status is {actual}, expected {expected}")]
    StatusConflict {
        expected: OrderStatus,
        actual: OrderStatus,
    },
    #[error("Order validation error: {0}")]
    ValidationError(String),
}

//! Storage seams consumed by the engine.
//!
//! The engine only ever talks to these traits. [`crate::clients`] implements
//! them on top of the store actors; tests substitute their own.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::warn;

use crate::domain::{Order, OrderId, OrderStatus, ProductId, ReservationId, User, UserId};
use crate::product_actor::StockReserved;

/// Failures reported by a storage collaborator.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StoreError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },
    #[error("{entity} already exists: {id}")]
    AlreadyExists { entity: &'static str, id: String },
    #[error("insufficient stock for {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: ProductId,
        available: u32,
        requested: u32,
    },
    #[error("order is {actual}, expected {expected}")]
    StatusConflict {
        expected: OrderStatus,
        actual: OrderStatus,
    },
    #[error("storage operation `{operation}` timed out after {after:?}")]
    Timeout { operation: &'static str, after: Duration },
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error("storage rejected the write: {0}")]
    Rejected(String),
}

impl StoreError {
    /// Timeouts and lost connections may succeed on a later attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Timeout { .. } | StoreError::Unavailable(_))
    }
}

/// Product store operations the stock ledger is built on.
///
/// Every stock write is a single conditional operation keyed by a
/// reservation id, so replaying one is harmless.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn stock_level(&self, id: &ProductId) -> Result<u32, StoreError>;

    /// Decrements `quantity` only if stock stays non-negative.
    async fn reserve_stock(
        &self,
        id: &ProductId,
        reservation: ReservationId,
        quantity: u32,
    ) -> Result<StockReserved, StoreError>;

    /// Returns the quantity given back (0 when `reservation` held nothing).
    async fn release_stock(&self, id: &ProductId, reservation: ReservationId) -> Result<u32, StoreError>;

    async fn settle_stock(&self, id: &ProductId, reservation: ReservationId) -> Result<(), StoreError>;
}

#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// Stores a new order. Not idempotent: never retry blindly.
    async fn insert_order(&self, order: Order) -> Result<Order, StoreError>;

    async fn get_order(&self, id: OrderId) -> Result<Option<Order>, StoreError>;

    async fn list_orders(&self) -> Result<Vec<Order>, StoreError>;

    /// Moves the order to `target` only if it is still `expected`.
    async fn transition_order(
        &self,
        id: OrderId,
        expected: OrderStatus,
        target: OrderStatus,
        at: DateTime<Utc>,
    ) -> Result<Order, StoreError>;
}

#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_user(&self, id: &UserId) -> Result<Option<User>, StoreError>;
}

/// Runs an idempotent storage call, retrying retryable failures up to
/// `attempts` times in total.
///
/// Only reads and writes keyed by an idempotency key may go through here.
pub async fn retry_idempotent<T, F, Fut>(operation: &'static str, attempts: u32, mut call: F) -> Result<T, StoreError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, StoreError>>,
{
    let attempts = attempts.max(1);
    let mut attempt = 1;
    loop {
        match call().await {
            Err(error) if error.is_retryable() && attempt < attempts => {
                warn!(operation, attempt, %error, "Retrying storage call");
                attempt += 1;
            }
            outcome => return outcome,
        }
    }
}

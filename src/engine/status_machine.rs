//! Order lifecycle: `pending` moves once to `completed` or `cancelled`.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use super::stock_ledger::StockLedger;
use crate::domain::{Order, OrderId, OrderStatus};
use crate::error::EngineError;
use crate::repository::{OrderRepository, StoreError};

#[derive(Debug, Clone, Error, PartialEq)]
pub enum TransitionError {
    #[error("invalid order id: {0:?}")]
    InvalidOrderId(String),
    #[error("invalid status: {0:?}")]
    InvalidStatus(String),
    #[error("order not found: {0}")]
    OrderNotFound(OrderId),
    #[error("order is already {0}")]
    NoOpTransition(OrderStatus),
    #[error("cannot change order status from {from} to {to}")]
    IllegalTransition { from: OrderStatus, to: OrderStatus },
}

pub fn parse_order_id(raw: &str) -> Result<OrderId, TransitionError> {
    raw.parse().map_err(|_| TransitionError::InvalidOrderId(raw.to_string()))
}

pub fn parse_status(raw: &str) -> Result<OrderStatus, TransitionError> {
    raw.parse().map_err(TransitionError::InvalidStatus)
}

/// The transition table, without touching storage.
pub fn check_transition(current: OrderStatus, target: OrderStatus) -> Result<(), TransitionError> {
    if current == target {
        return Err(TransitionError::NoOpTransition(current));
    }
    if current.is_terminal() {
        return Err(TransitionError::IllegalTransition { from: current, to: target });
    }
    Ok(())
}

#[derive(Clone)]
pub struct OrderStatusMachine {
    orders: Arc<dyn OrderRepository>,
    ledger: StockLedger,
}

impl OrderStatusMachine {
    pub fn new(orders: Arc<dyn OrderRepository>, ledger: StockLedger) -> Self {
        Self { orders, ledger }
    }

    /// Moves a pending order to `target`.
    ///
    /// The write is conditional on the order still being `pending`, so of
    /// two racing transitions exactly one wins. Cancelling releases the
    /// order's stock; completing settles it. Cancelling an order that is
    /// already cancelled re-issues the release before reporting the no-op.
    #[instrument(skip(self))]
    pub async fn transition(&self, id: OrderId, target: OrderStatus) -> Result<Order, EngineError> {
        let current = self
            .orders
            .get_order(id)
            .await?
            .ok_or(TransitionError::OrderNotFound(id))?;
        if let Err(refusal) = check_transition(current.status, target) {
            return Err(self.refuse(&current, current.status, target, refusal).await);
        }

        let at = Utc::now();
        let updated = match self.orders.transition_order(id, OrderStatus::Pending, target, at).await {
            Ok(updated) => updated,
            Err(StoreError::StatusConflict { actual, .. }) => {
                return Err(self.refuse(&current, actual, target, lost_race(actual, target)).await);
            }
            Err(StoreError::NotFound { .. }) => return Err(TransitionError::OrderNotFound(id).into()),
            Err(cause) if cause.is_retryable() => self.confirm(id, target, at, cause).await?,
            Err(cause) => return Err(cause.into()),
        };

        match target {
            OrderStatus::Cancelled => self.release_cancelled(&updated).await?,
            OrderStatus::Completed => self.ledger.settle(&updated.reservation).await,
            OrderStatus::Pending => {}
        }

        info!(order_id = %id, from = %current.status, to = %target, "Order status changed");
        Ok(updated)
    }

    /// Reads back after an unanswered write. Our own write is recognized by
    /// its timestamp.
    async fn confirm(
        &self,
        id: OrderId,
        target: OrderStatus,
        at: DateTime<Utc>,
        cause: StoreError,
    ) -> Result<Order, EngineError> {
        let Some(order) = self.orders.get_order(id).await? else {
            return Err(TransitionError::OrderNotFound(id).into());
        };
        let stamped = match target {
            OrderStatus::Completed => order.completed_date,
            OrderStatus::Cancelled => order.cancelled_date,
            OrderStatus::Pending => None,
        };
        if order.status == target && stamped == Some(at) {
            info!(order_id = %id, "Transition confirmed after {}", cause);
            return Ok(order);
        }
        if order.status == OrderStatus::Pending {
            warn!(order_id = %id, "Transition not applied");
            return Err(cause.into());
        }
        Err(self.refuse(&order, order.status, target, lost_race(order.status, target)).await)
    }

    /// Turns a refused transition into its error. A repeated cancel first
    /// finishes any release a previous cancel left undone.
    async fn refuse(
        &self,
        order: &Order,
        actual: OrderStatus,
        target: OrderStatus,
        refusal: TransitionError,
    ) -> EngineError {
        if actual == OrderStatus::Cancelled && target == OrderStatus::Cancelled {
            if let Err(e) = self.release_cancelled(order).await {
                return e;
            }
        }
        refusal.into()
    }

    /// Release is idempotent per reservation, so this is safe to repeat.
    async fn release_cancelled(&self, order: &Order) -> Result<(), EngineError> {
        match self.ledger.release(&order.reservation).await {
            Ok(0) => Ok(()),
            Ok(restored) => {
                debug!(order_id = %order.id, restored, "Cancelled order's stock released");
                Ok(())
            }
            Err(e) => Err(EngineError::InternalInvariant(format!(
                "order {} cancelled but its stock was not released: {}",
                order.id, e
            ))),
        }
    }
}

/// Another request moved the order first.
fn lost_race(actual: OrderStatus, target: OrderStatus) -> TransitionError {
    if actual == target {
        TransitionError::NoOpTransition(actual)
    } else {
        TransitionError::IllegalTransition { from: actual, to: target }
    }
}

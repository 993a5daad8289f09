//! Builds and persists a pending order from a reservation.

use std::sync::Arc;

use chrono::Utc;
use tracing::{error, info, instrument, warn};

use super::pricing::PricingPolicy;
use super::stock_ledger::StockLedger;
use super::validator::ValidatedOrder;
use crate::domain::{Order, OrderId, OrderLineItem, OrderStatus, ReservationToken};
use crate::error::EngineError;
use crate::repository::{OrderRepository, StoreError};

#[derive(Clone)]
pub struct OrderFactory {
    orders: Arc<dyn OrderRepository>,
    ledger: StockLedger,
    pricing: PricingPolicy,
}

impl OrderFactory {
    pub fn new(orders: Arc<dyn OrderRepository>, ledger: StockLedger, pricing: PricingPolicy) -> Self {
        Self { orders, ledger, pricing }
    }

    /// Prices the reserved lines and stores a `pending` order.
    ///
    /// Totals come from the reserved price snapshots; the client's claimed
    /// total is only compared and logged. If the order cannot be stored the
    /// reservation is released before the error is returned.
    #[instrument(skip(self, request, token), fields(reservation = %token.id))]
    pub async fn create(&self, request: ValidatedOrder, token: ReservationToken) -> Result<Order, EngineError> {
        let Some(quote) = self.pricing.price(&token.lines) else {
            return self.abandon(&token, "order total overflows".to_string()).await;
        };
        if quote.total != request.claimed_total {
            warn!(
                claimed = %request.claimed_total,
                computed = %quote.total,
                "Client total differs from computed total; using computed"
            );
        }

        let order = Order {
            id: OrderId::new(),
            user_id: request.user_id,
            products: token
                .lines
                .iter()
                .map(|line| OrderLineItem {
                    product_id: line.product_id.clone(),
                    quantity: line.quantity,
                    name: line.product_name.clone(),
                    unit_price: line.unit_price,
                })
                .collect(),
            subtotal: quote.subtotal,
            total: quote.total,
            name: request.customer.name,
            address: request.customer.address,
            phone: request.customer.phone,
            status: OrderStatus::Pending,
            order_date: Utc::now(),
            completed_date: None,
            cancelled_date: None,
            reservation: token,
        };
        let order_id = order.id;

        match self.orders.insert_order(order.clone()).await {
            Ok(stored) => {
                info!(%order_id, total = %stored.total, "Order created");
                Ok(stored)
            }
            Err(cause) if cause.is_retryable() => self.confirm_insert(order, cause).await,
            Err(cause) => self.abandon(&order.reservation, format!("order {} not stored: {}", order_id, cause)).await,
        }
    }

    /// The insert may or may not have landed. A read issued now is ordered
    /// after it, so it settles the question.
    async fn confirm_insert(&self, order: Order, cause: StoreError) -> Result<Order, EngineError> {
        match self.orders.get_order(order.id).await {
            Ok(Some(stored)) => {
                info!(order_id = %stored.id, "Order insert confirmed after {}", cause);
                Ok(stored)
            }
            Ok(None) => {
                self.abandon(&order.reservation, format!("order {} not stored: {}", order.id, cause))
                    .await
            }
            Err(read_error) => {
                // Unknown outcome: keep the stock held rather than risk a
                // stored order whose stock was given back.
                error!(
                    order_id = %order.id,
                    reservation = %order.reservation.id,
                    error = %read_error,
                    "Cannot confirm order insert; reservation kept"
                );
                Err(EngineError::InternalInvariant(format!(
                    "order {} outcome unknown after {}; reservation {} kept",
                    order.id, cause, order.reservation.id
                )))
            }
        }
    }

    async fn abandon(&self, token: &ReservationToken, reason: String) -> Result<Order, EngineError> {
        error!(reservation = %token.id, %reason, "Abandoning reservation");
        match self.ledger.release(token).await {
            Ok(_) => Err(EngineError::InternalInvariant(format!("{}; reservation released", reason))),
            Err(release_error) => Err(EngineError::InternalInvariant(format!(
                "{}; release also failed: {}",
                reason, release_error
            ))),
        }
    }
}

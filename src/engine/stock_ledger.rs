//! All-or-nothing stock reservation across the lines of one checkout.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};

use super::validator::RequestedLine;
use crate::domain::{ProductId, ReservationId, ReservationToken, ReservedLine};
use crate::repository::{ProductRepository, StoreError};

#[derive(Debug, Clone, Error, PartialEq)]
pub enum StockError {
    #[error("insufficient stock for {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: ProductId,
        available: u32,
        requested: u32,
    },
    #[error("unknown product: {0}")]
    UnknownProduct(ProductId),
    #[error("stock storage failure: {0}")]
    Storage(StoreError),
    /// Compensation did not complete; `pending` may still hold stock.
    #[error("reservation {reservation} could not be rolled back for {pending:?}: {source}")]
    RollbackIncomplete {
        reservation: ReservationId,
        pending: Vec<ProductId>,
        source: StoreError,
    },
    #[error("reservation task aborted: {0}")]
    Aborted(String),
}

/// Reserves, releases and settles stock through a [`ProductRepository`].
///
/// Lines are always decremented in ascending product id order. A failed
/// reservation leaves every product's stock exactly as it was.
#[derive(Clone)]
pub struct StockLedger {
    products: Arc<dyn ProductRepository>,
}

impl StockLedger {
    pub fn new(products: Arc<dyn ProductRepository>) -> Self {
        Self { products }
    }

    /// Reserves every line or none of them.
    ///
    /// Runs on its own task: dropping the returned future does not stop a
    /// reservation half way or skip its rollback.
    #[instrument(skip(self, lines), fields(lines = lines.len()))]
    pub async fn reserve(&self, lines: &[RequestedLine]) -> Result<ReservationToken, StockError> {
        let mut ordered = lines.to_vec();
        ordered.sort_by(|a, b| a.product_id.cmp(&b.product_id));
        let reservation = ReservationId::new();

        let ledger = self.clone();
        tokio::spawn(async move { ledger.reserve_in_order(reservation, ordered).await })
            .await
            .map_err(|e| StockError::Aborted(e.to_string()))?
    }

    async fn reserve_in_order(
        &self,
        reservation: ReservationId,
        lines: Vec<RequestedLine>,
    ) -> Result<ReservationToken, StockError> {
        let mut token = ReservationToken {
            id: reservation,
            lines: Vec::with_capacity(lines.len()),
        };

        for line in &lines {
            match self.products.reserve_stock(&line.product_id, reservation, line.quantity).await {
                Ok(reserved) => {
                    debug!(product_id = %line.product_id, remaining = reserved.remaining, "Line reserved");
                    token.lines.push(ReservedLine {
                        product_id: line.product_id.clone(),
                        quantity: line.quantity,
                        product_name: reserved.product_name,
                        unit_price: reserved.unit_price,
                    });
                }
                Err(cause) => {
                    warn!(%reservation, product_id = %line.product_id, error = %cause, "Reservation failed, rolling back");
                    let mut touched: Vec<ProductId> = token.lines.iter().map(|l| l.product_id.clone()).collect();
                    // A timed-out decrement may have been applied.
                    if cause.is_retryable() {
                        touched.push(line.product_id.clone());
                    }
                    self.roll_back(reservation, &touched).await?;
                    return Err(match cause {
                        StoreError::InsufficientStock { product_id, available, requested } => {
                            StockError::InsufficientStock { product_id, available, requested }
                        }
                        StoreError::NotFound { .. } => StockError::UnknownProduct(line.product_id.clone()),
                        other => StockError::Storage(other),
                    });
                }
            }
        }

        info!(%reservation, units = token.total_quantity(), "Stock reserved");
        Ok(token)
    }

    /// Releases in reverse order. Attempts every product even after a failure.
    async fn roll_back(&self, reservation: ReservationId, products: &[ProductId]) -> Result<(), StockError> {
        let mut pending = Vec::new();
        let mut last_error = None;
        for product_id in products.iter().rev() {
            if let Err(e) = self.products.release_stock(product_id, reservation).await {
                error!(%reservation, %product_id, error = %e, "Rollback release failed");
                pending.push(product_id.clone());
                last_error = Some(e);
            }
        }
        match last_error {
            None => Ok(()),
            Some(source) => Err(StockError::RollbackIncomplete { reservation, pending, source }),
        }
    }

    /// Gives back everything `token` holds. Safe to call more than once.
    #[instrument(skip(self, token), fields(reservation = %token.id))]
    pub async fn release(&self, token: &ReservationToken) -> Result<u64, StockError> {
        let products: Vec<ProductId> = token.lines.iter().map(|l| l.product_id.clone()).collect();
        let mut restored = 0u64;
        let mut pending = Vec::new();
        let mut last_error = None;
        for product_id in products.iter().rev() {
            match self.products.release_stock(product_id, token.id).await {
                Ok(quantity) => restored += u64::from(quantity),
                Err(e) => {
                    error!(%product_id, error = %e, "Release failed");
                    pending.push(product_id.clone());
                    last_error = Some(e);
                }
            }
        }
        match last_error {
            None => {
                info!(restored, "Stock released");
                Ok(restored)
            }
            Some(source) => Err(StockError::RollbackIncomplete { reservation: token.id, pending, source }),
        }
    }

    /// Marks `token`'s stock as consumed. Failures only leave stale holds
    /// behind, so they are logged and not returned.
    #[instrument(skip(self, token), fields(reservation = %token.id))]
    pub async fn settle(&self, token: &ReservationToken) {
        for line in &token.lines {
            if let Err(e) = self.products.settle_stock(&line.product_id, token.id).await {
                warn!(product_id = %line.product_id, error = %e, "Settle failed, hold left in place");
            }
        }
        debug!("Reservation settled");
    }

    pub async fn available(&self, product_id: &ProductId) -> Result<u32, StockError> {
        self.products.stock_level(product_id).await.map_err(|e| match e {
            StoreError::NotFound { .. } => StockError::UnknownProduct(product_id.clone()),
            other => StockError::Storage(other),
        })
    }
}

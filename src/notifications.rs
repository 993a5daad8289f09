//! Order confirmation side effects.
//!
//! Notification runs after the order is stored and never affects the
//! checkout result.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{info, warn, Instrument};

use crate::domain::Order;

#[derive(Debug, Error)]
#[error("notification failed: {0}")]
pub struct NotifyError(pub String);

#[async_trait]
pub trait OrderNotifier: Send + Sync {
    async fn order_placed(&self, order: &Order) -> Result<(), NotifyError>;
}

/// Records confirmations in the log instead of sending them anywhere.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl OrderNotifier for LogNotifier {
    async fn order_placed(&self, order: &Order) -> Result<(), NotifyError> {
        info!(
            order_id = %order.id,
            customer = %order.name,
            phone = %order.phone,
            total = %order.total,
            "Order confirmation sent"
        );
        Ok(())
    }
}

/// Fire-and-forget delivery on a background task.
pub fn dispatch(notifier: Arc<dyn OrderNotifier>, order: Order) -> tokio::task::JoinHandle<()> {
    let span = tracing::info_span!("order_notification", order_id = %order.id);
    tokio::spawn(
        async move {
            if let Err(e) = notifier.order_placed(&order).await {
                warn!(error = %e, "Order notification failed");
            }
        }
        .instrument(span),
    )
}

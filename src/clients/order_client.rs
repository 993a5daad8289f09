use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, instrument};

use super::store_error;
use crate::actor_framework::ResourceClient;
use crate::config::StorageSettings;
use crate::domain::{Order, OrderId, OrderStatus};
use crate::order_actor::OrderAction;
use crate::repository::{OrderRepository, StoreError};

/// Client for interacting with the Order store.
///
/// Reads are retried. Inserts and transitions are sent once; callers that
/// see a timeout confirm the outcome with a read instead.
#[derive(Clone)]
pub struct OrderClient {
    inner: ResourceClient<Order>,
    settings: StorageSettings,
}

crate::impl_basic_client!(OrderClient, Order, "order", order);

#[async_trait]
impl OrderRepository for OrderClient {
    #[instrument(skip(self, order), fields(order_id = %order.id))]
    async fn insert_order(&self, order: Order) -> Result<Order, StoreError> {
        debug!("Sending request");
        self.inner
            .insert(order)
            .await
            .map_err(|e| store_error("order", "insert_order", e))
    }

    async fn get_order(&self, id: OrderId) -> Result<Option<Order>, StoreError> {
        self.fetch_order(id).await
    }

    async fn list_orders(&self) -> Result<Vec<Order>, StoreError> {
        self.fetch_all_orders().await
    }

    #[instrument(skip(self, at))]
    async fn transition_order(
        &self,
        id: OrderId,
        expected: OrderStatus,
        target: OrderStatus,
        at: DateTime<Utc>,
    ) -> Result<Order, StoreError> {
        debug!("Sending request");
        self.inner
            .perform_action(id, OrderAction::Transition { expected, target, at })
            .await
            .map_err(|e| store_error("order", "transition_order", e))
    }
}

use async_trait::async_trait;
use tracing::{debug, instrument};

use super::store_error;
use crate::actor_framework::ResourceClient;
use crate::config::StorageSettings;
use crate::domain::{Product, ProductId, ReservationId};
use crate::product_actor::{ProductAction, ProductActionResult, StockReserved};
use crate::repository::{retry_idempotent, ProductRepository, StoreError};

/// Client for interacting with the Product store.
///
/// Every stock write carries a reservation id, so all of them are retried
/// on timeout.
#[derive(Clone)]
pub struct ProductClient {
    inner: ResourceClient<Product>,
    settings: StorageSettings,
}

crate::impl_basic_client!(ProductClient, Product, "product", product);

impl ProductClient {
    /// Adds a catalog record. Not retried: a duplicate insert is refused.
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub async fn create_product(&self, product: Product) -> Result<Product, StoreError> {
        debug!("Sending request");
        self.inner
            .insert(product)
            .await
            .map_err(|e| store_error("product", "insert_product", e))
    }

    async fn keyed_action(
        &self,
        operation: &'static str,
        id: &ProductId,
        action: ProductAction,
    ) -> Result<ProductActionResult, StoreError> {
        let inner = &self.inner;
        let action = &action;
        retry_idempotent(operation, self.settings.max_attempts, move || async move {
            inner
                .perform_action(id.clone(), action.clone())
                .await
                .map_err(|e| store_error("product", operation, e))
        })
        .await
    }
}

fn unexpected(operation: &'static str, result: ProductActionResult) -> StoreError {
    StoreError::Unavailable(format!("unexpected reply to {}: {:?}", operation, result))
}

#[async_trait]
impl ProductRepository for ProductClient {
    #[instrument(skip(self))]
    async fn stock_level(&self, id: &ProductId) -> Result<u32, StoreError> {
        debug!("Sending request");
        match self.keyed_action("check_stock", id, ProductAction::CheckStock).await? {
            ProductActionResult::CheckStock(level) => Ok(level),
            other => Err(unexpected("check_stock", other)),
        }
    }

    #[instrument(skip(self, reservation), fields(reservation = %reservation))]
    async fn reserve_stock(
        &self,
        id: &ProductId,
        reservation: ReservationId,
        quantity: u32,
    ) -> Result<StockReserved, StoreError> {
        debug!("Sending request");
        match self
            .keyed_action("reserve_stock", id, ProductAction::Reserve { reservation, quantity })
            .await?
        {
            ProductActionResult::Reserve(reserved) => Ok(reserved),
            other => Err(unexpected("reserve_stock", other)),
        }
    }

    #[instrument(skip(self, reservation), fields(reservation = %reservation))]
    async fn release_stock(&self, id: &ProductId, reservation: ReservationId) -> Result<u32, StoreError> {
        debug!("Sending request");
        match self
            .keyed_action("release_stock", id, ProductAction::Release { reservation })
            .await?
        {
            ProductActionResult::Release(restored) => Ok(restored),
            other => Err(unexpected("release_stock", other)),
        }
    }

    #[instrument(skip(self, reservation), fields(reservation = %reservation))]
    async fn settle_stock(&self, id: &ProductId, reservation: ReservationId) -> Result<(), StoreError> {
        debug!("Sending request");
        match self
            .keyed_action("settle_stock", id, ProductAction::Settle { reservation })
            .await?
        {
            ProductActionResult::Settle => Ok(()),
            other => Err(unexpected("settle_stock", other)),
        }
    }
}

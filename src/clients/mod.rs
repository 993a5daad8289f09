//! Store clients.
//!
//! Each client wraps a [`ResourceClient`](crate::actor_framework::ResourceClient),
//! bounds its round trips, retries what is safe to retry and translates
//! actor failures into [`StoreError`]. They are the production
//! implementations of the [`crate::repository`] traits.

mod macros;
pub mod order_client;
pub mod product_client;
pub mod user_client;

pub use order_client::OrderClient;
pub use product_client::ProductClient;
pub use user_client::UserClient;

use crate::actor_framework::FrameworkError;
use crate::order_actor::OrderError;
use crate::product_actor::ProductError;
use crate::repository::StoreError;
use crate::user_actor::UserError;

/// Maps a failed round trip onto the storage error taxonomy.
pub fn store_error<E>(entity: &'static str, operation: &'static str, error: FrameworkError<E>) -> StoreError
where
    E: std::error::Error + Into<StoreError>,
{
    match error {
        FrameworkError::NotFound(id) => StoreError::NotFound { entity, id },
        FrameworkError::AlreadyExists(id) => StoreError::AlreadyExists { entity, id },
        FrameworkError::Entity(rejection) => rejection.into(),
        FrameworkError::Timeout(after) => StoreError::Timeout { operation, after },
        FrameworkError::Closed | FrameworkError::Dropped => {
            StoreError::Unavailable(format!("{} store: {}", entity, error))
        }
    }
}

impl From<ProductError> for StoreError {
    fn from(error: ProductError) -> Self {
        match error {
            ProductError::InsufficientStock { product_id, available, requested } => {
                StoreError::InsufficientStock { product_id, available, requested }
            }
            other => StoreError::Rejected(other.to_string()),
        }
    }
}

impl From<OrderError> for StoreError {
    fn from(error: OrderError) -> Self {
        match error {
            OrderError::StatusConflict { expected, actual } => StoreError::StatusConflict { expected, actual },
            other => StoreError::Rejected(other.to_string()),
        }
    }
}

impl From<UserError> for StoreError {
    fn from(error: UserError) -> Self {
        StoreError::Rejected(error.to_string())
    }
}

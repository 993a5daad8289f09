use async_trait::async_trait;
use tracing::{debug, instrument};

use super::store_error;
use crate::actor_framework::ResourceClient;
use crate::config::StorageSettings;
use crate::domain::{User, UserId};
use crate::repository::{StoreError, UserDirectory};

/// Client for interacting with the User store.
#[derive(Clone)]
pub struct UserClient {
    inner: ResourceClient<User>,
    settings: StorageSettings,
}

crate::impl_basic_client!(UserClient, User, "user", user);

impl UserClient {
    #[instrument(skip(self, user), fields(user_id = %user.id))]
    pub async fn create_user(&self, user: User) -> Result<User, StoreError> {
        debug!("Sending request");
        self.inner.insert(user).await.map_err(|e| store_error("user", "insert_user", e))
    }
}

#[async_trait]
impl UserDirectory for UserClient {
    async fn find_user(&self, id: &UserId) -> Result<Option<User>, StoreError> {
        self.fetch_user(id.clone()).await
    }
}

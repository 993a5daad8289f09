use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info, warn};

use crate::actor_framework::ResourceActor;
use crate::clients::{OrderClient, ProductClient, UserClient};
use crate::config::EngineConfig;
use crate::domain::{Order, Product, User};
use crate::engine::OrderEngine;

const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// The running application: three store actors, their clients and the
/// engine wired on top of them.
pub struct OrderSystem {
    pub product_client: ProductClient,
    pub order_client: OrderClient,
    pub user_client: UserClient,
    pub engine: OrderEngine,
    handles: Vec<tokio::task::JoinHandle<()>>,
}

impl OrderSystem {
    pub fn start(config: &EngineConfig) -> Self {
        let (product_actor, product_resource_client) =
            ResourceActor::<Product>::new("products", config.mailbox_capacity);
        let product_client = ProductClient::new(product_resource_client, config.storage);
        let product_handle = tokio::spawn(product_actor.run());

        let (order_actor, order_resource_client) = ResourceActor::<Order>::new("orders", config.mailbox_capacity);
        let order_client = OrderClient::new(order_resource_client, config.storage);
        let order_handle = tokio::spawn(order_actor.run());

        let (user_actor, user_resource_client) = ResourceActor::<User>::new("users", config.mailbox_capacity);
        let user_client = UserClient::new(user_resource_client, config.storage);
        let user_handle = tokio::spawn(user_actor.run());

        let engine = OrderEngine::new(
            Arc::new(product_client.clone()),
            Arc::new(order_client.clone()),
            config.pricing,
        )
        .with_users(Arc::new(user_client.clone()));

        info!(
            mailbox_capacity = config.mailbox_capacity,
            storage_timeout_ms = config.storage.timeout.as_millis() as u64,
            "Order system started"
        );

        Self {
            product_client,
            order_client,
            user_client,
            engine,
            handles: vec![product_handle, order_handle, user_handle],
        }
    }

    /// Stops the stores once every client and engine handle is gone.
    /// Handles still held elsewhere (e.g. by a router) keep a store alive
    /// until the grace period runs out.
    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down system...");
        drop(self.engine);
        drop(self.order_client);
        drop(self.user_client);
        drop(self.product_client);

        for handle in self.handles {
            match tokio::time::timeout(SHUTDOWN_GRACE, handle).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    error!("Actor task failed: {:?}", e);
                    return Err(format!("Actor task failed: {:?}", e));
                }
                Err(_) => warn!("Store still referenced after {:?}; abandoning it", SHUTDOWN_GRACE),
            }
        }

        info!("System shutdown complete.");
        Ok(())
    }
}

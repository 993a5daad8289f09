//! # Mock Framework
//!
//! Utilities for testing clients and the engine in isolation.
//!
//! Use [`create_mock_client`] to get a client and a receiver, then helpers
//! like [`expect_insert`] or [`expect_action`] to script the store's side.
//! [`spawn_product_store`] and [`spawn_order_store`] start real in-memory
//! stores; [`FlakyProducts`] and [`FlakyOrders`] wrap them to inject faults.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::mpsc;

use crate::actor_framework::{Entity, ResourceActor, ResourceClient, ResourceRequest, Response};
use crate::clients::{OrderClient, ProductClient};
use crate::config::StorageSettings;
use crate::domain::{Order, OrderId, OrderStatus, Product, ProductId, ReservationId};
use crate::product_actor::StockReserved;
use crate::repository::{OrderRepository, ProductRepository, StoreError};

/// Creates a client whose requests land on a channel the test controls.
pub fn create_mock_client<T: Entity>(buffer_size: usize) -> (ResourceClient<T>, mpsc::Receiver<ResourceRequest<T>>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (ResourceClient::new(sender), receiver)
}

pub async fn expect_insert<T: Entity>(receiver: &mut mpsc::Receiver<ResourceRequest<T>>) -> Option<(T, Response<T, T::Error>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Insert { item, respond_to }) => Some((item, respond_to)),
        _ => None,
    }
}

pub async fn expect_get<T: Entity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Id, Response<Option<T>, T::Error>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Get { id, respond_to }) => Some((id, respond_to)),
        _ => None,
    }
}

pub async fn expect_action<T: Entity>(
    receiver: &mut mpsc::Receiver<ResourceRequest<T>>,
) -> Option<(T::Id, T::Action, Response<T::ActionResult, T::Error>)> {
    match receiver.recv().await {
        Some(ResourceRequest::Action { id, action, respond_to }) => Some((id, action, respond_to)),
        _ => None,
    }
}

/// Starts a product store holding `catalog`.
pub async fn spawn_product_store(catalog: Vec<Product>) -> ProductClient {
    let (actor, client) = ResourceActor::new("products", 64);
    tokio::spawn(actor.run());
    let products = ProductClient::new(client, StorageSettings::default());
    for product in catalog {
        products.create_product(product).await.expect("seed product");
    }
    products
}

pub async fn spawn_order_store() -> OrderClient {
    let (actor, client) = ResourceActor::new("orders", 64);
    tokio::spawn(actor.run());
    OrderClient::new(client, StorageSettings::default())
}

fn lost_reply(operation: &'static str) -> StoreError {
    StoreError::Timeout { operation, after: Duration::from_millis(1) }
}

/// Product store whose reserve replies go missing for chosen products
/// (the decrement itself still happens) and whose first releases fail.
pub struct FlakyProducts {
    inner: ProductClient,
    lose_reserve: HashSet<ProductId>,
    failing_releases: AtomicU32,
}

impl FlakyProducts {
    pub fn new(inner: ProductClient) -> Self {
        Self {
            inner,
            lose_reserve: HashSet::new(),
            failing_releases: AtomicU32::new(0),
        }
    }

    pub fn lose_reserve_reply(mut self, product_id: &str) -> Self {
        self.lose_reserve.insert(product_id.into());
        self
    }

    /// The next `count` releases fail without reaching the store.
    pub fn fail_releases(self, count: u32) -> Self {
        self.failing_releases.store(count, Ordering::SeqCst);
        self
    }
}

#[async_trait]
impl ProductRepository for FlakyProducts {
    async fn stock_level(&self, id: &ProductId) -> Result<u32, StoreError> {
        self.inner.stock_level(id).await
    }

    async fn reserve_stock(
        &self,
        id: &ProductId,
        reservation: ReservationId,
        quantity: u32,
    ) -> Result<StockReserved, StoreError> {
        let outcome = self.inner.reserve_stock(id, reservation, quantity).await;
        if self.lose_reserve.contains(id) {
            return Err(lost_reply("reserve_stock"));
        }
        outcome
    }

    async fn release_stock(&self, id: &ProductId, reservation: ReservationId) -> Result<u32, StoreError> {
        let failing = self
            .failing_releases
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if failing {
            return Err(StoreError::Unavailable("product store offline".to_string()));
        }
        self.inner.release_stock(id, reservation).await
    }

    async fn settle_stock(&self, id: &ProductId, reservation: ReservationId) -> Result<(), StoreError> {
        self.inner.settle_stock(id, reservation).await
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InsertFault {
    /// The store refuses the insert outright.
    Reject,
    /// The insert is applied but the caller sees a timeout.
    LoseReply,
    /// The insert never reaches the store; the caller sees a timeout.
    DropRequest,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransitionFault {
    /// The status write is applied but the caller sees a timeout.
    LoseReply,
    /// The status write never reaches the store; the caller sees a timeout.
    DropRequest,
}

pub struct FlakyOrders {
    inner: OrderClient,
    insert_fault: Option<InsertFault>,
    transition_fault: Option<TransitionFault>,
}

impl FlakyOrders {
    pub fn new(inner: OrderClient) -> Self {
        Self {
            inner,
            insert_fault: None,
            transition_fault: None,
        }
    }

    pub fn insert_fault(mut self, fault: InsertFault) -> Self {
        self.insert_fault = Some(fault);
        self
    }

    pub fn transition_fault(mut self, fault: TransitionFault) -> Self {
        self.transition_fault = Some(fault);
        self
    }
}

#[async_trait]
impl OrderRepository for FlakyOrders {
    async fn insert_order(&self, order: Order) -> Result<Order, StoreError> {
        match self.insert_fault {
            None => self.inner.insert_order(order).await,
            Some(InsertFault::Reject) => Err(StoreError::Rejected("disk full".to_string())),
            Some(InsertFault::LoseReply) => {
                let _ = self.inner.insert_order(order).await;
                Err(lost_reply("insert_order"))
            }
            Some(InsertFault::DropRequest) => Err(lost_reply("insert_order")),
        }
    }

    async fn get_order(&self, id: OrderId) -> Result<Option<Order>, StoreError> {
        self.inner.get_order(id).await
    }

    async fn list_orders(&self) -> Result<Vec<Order>, StoreError> {
        self.inner.list_orders().await
    }

    async fn transition_order(
        &self,
        id: OrderId,
        expected: OrderStatus,
        target: OrderStatus,
        at: DateTime<Utc>,
    ) -> Result<Order, StoreError> {
        match self.transition_fault {
            None => self.inner.transition_order(id, expected, target, at).await,
            Some(TransitionFault::LoseReply) => {
                let _ = self.inner.transition_order(id, expected, target, at).await;
                Err(lost_reply("transition_order"))
            }
            Some(TransitionFault::DropRequest) => Err(lost_reply("transition_order")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Money;
    use crate::product_actor::{ProductAction, ProductActionResult};

    #[tokio::test]
    async fn test_mock_client() {
        let (client, mut receiver) = create_mock_client::<Product>(10);
        let products = ProductClient::new(client, StorageSettings::default());

        let create_task = tokio::spawn(async move {
            products
                .create_product(Product::new("p1", "Tea", Money::from_cents(100), 3))
                .await
        });

        let (item, responder) = expect_insert(&mut receiver).await.expect("Expected Insert request");
        assert_eq!(item.name, "Tea");
        responder.send(Ok(item)).unwrap();

        let created = create_task.await.unwrap().unwrap();
        assert_eq!(created.id, ProductId::from("p1"));
    }

    #[tokio::test]
    async fn reserve_is_retried_with_the_same_reservation() {
        let (client, mut receiver) = create_mock_client::<Product>(10);
        let settings = StorageSettings { timeout: Duration::from_millis(50), max_attempts: 2 };
        let products = ProductClient::new(client, settings);
        let reservation = ReservationId::new();

        let task = tokio::spawn(async move { products.reserve_stock(&"p1".into(), reservation, 2).await });

        // First attempt: never answered.
        let (_, first, unanswered) = expect_action(&mut receiver).await.expect("first attempt");
        let (_, second, responder) = expect_action(&mut receiver).await.expect("second attempt");
        drop(unanswered);
        assert!(matches!(first, ProductAction::Reserve { reservation: r, quantity: 2 } if r == reservation));
        assert!(matches!(second, ProductAction::Reserve { reservation: r, .. } if r == reservation));

        let reserved = StockReserved {
            remaining: 1,
            product_name: "Tea".to_string(),
            unit_price: Money::from_cents(100),
        };
        responder.send(Ok(ProductActionResult::Reserve(reserved.clone()))).unwrap();

        assert_eq!(task.await.unwrap(), Ok(reserved));
    }

    #[tokio::test]
    async fn reads_are_retried_until_the_budget_runs_out() {
        let (client, mut receiver) = create_mock_client::<Order>(10);
        let settings = StorageSettings { timeout: Duration::from_millis(20), max_attempts: 3 };
        let orders = OrderClient::new(client, settings);

        let task = tokio::spawn(async move { orders.list_orders().await });
        // Hold every request unanswered so each attempt times out.
        let mut pending = Vec::new();
        for _ in 0..3 {
            let request = receiver.recv().await.expect("list request");
            assert!(matches!(request, ResourceRequest::List { .. }));
            pending.push(request);
        }
        assert!(matches!(task.await.unwrap(), Err(StoreError::Timeout { .. })));
    }
}

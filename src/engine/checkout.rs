//! The entry points the HTTP layer calls.

use std::future::Future;
use std::sync::Arc;

use tracing::{info, instrument, warn};

use super::order_factory::OrderFactory;
use super::pricing::PricingPolicy;
use super::status_machine::{parse_order_id, parse_status, OrderStatusMachine, TransitionError};
use super::stock_ledger::StockLedger;
use super::validator::{CheckoutPayload, OrderValidator, ValidatedOrder, ValidationError};
use crate::domain::Order;
use crate::error::EngineError;
use crate::notifications::{self, LogNotifier, OrderNotifier};
use crate::repository::{OrderRepository, ProductRepository, UserDirectory};

/// Places orders and drives their lifecycle.
///
/// Cheap to clone. Mutating calls run on a spawned task, so a caller that
/// goes away mid-request cannot leave a reservation without its order or
/// its rollback.
#[derive(Clone)]
pub struct OrderEngine {
    validator: OrderValidator,
    ledger: StockLedger,
    factory: OrderFactory,
    machine: OrderStatusMachine,
    orders: Arc<dyn OrderRepository>,
    users: Option<Arc<dyn UserDirectory>>,
    notifier: Arc<dyn OrderNotifier>,
}

impl OrderEngine {
    pub fn new(
        products: Arc<dyn ProductRepository>,
        orders: Arc<dyn OrderRepository>,
        pricing: PricingPolicy,
    ) -> Self {
        let ledger = StockLedger::new(products);
        Self {
            validator: OrderValidator,
            factory: OrderFactory::new(orders.clone(), ledger.clone(), pricing),
            machine: OrderStatusMachine::new(orders.clone(), ledger.clone()),
            ledger,
            orders,
            users: None,
            notifier: Arc::new(LogNotifier),
        }
    }

    /// Enables `userId` attribution; without a directory the field is ignored.
    pub fn with_users(mut self, users: Arc<dyn UserDirectory>) -> Self {
        self.users = Some(users);
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn OrderNotifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Validate, reserve, persist, notify.
    #[instrument(skip(self, payload), fields(lines = payload.products.len()))]
    pub async fn place_order(&self, payload: CheckoutPayload) -> Result<Order, EngineError> {
        let request = self.validator.validate(&payload)?;
        let engine = self.clone();
        detached(async move { engine.checkout(request).await }).await
    }

    async fn checkout(&self, mut request: ValidatedOrder) -> Result<Order, EngineError> {
        if let Some(user_id) = request.user_id.take() {
            match &self.users {
                Some(users) => match users.find_user(&user_id).await? {
                    Some(user) => request.user_id = Some(user.id),
                    None => return Err(ValidationError::UnknownUser(user_id).into()),
                },
                None => warn!(%user_id, "No user directory configured; order left unattributed"),
            }
        }

        let token = self.ledger.reserve(&request.lines).await?;
        let order = self.factory.create(request, token).await?;
        info!(order_id = %order.id, total = %order.total, "Order placed");

        notifications::dispatch(self.notifier.clone(), order.clone());
        Ok(order)
    }

    #[instrument(skip(self))]
    pub async fn update_status(&self, raw_id: &str, raw_status: &str) -> Result<Order, EngineError> {
        let id = parse_order_id(raw_id)?;
        let target = parse_status(raw_status)?;
        let machine = self.machine.clone();
        detached(async move { machine.transition(id, target).await }).await
    }

    pub async fn get_order(&self, raw_id: &str) -> Result<Order, EngineError> {
        let id = parse_order_id(raw_id)?;
        self.orders
            .get_order(id)
            .await?
            .ok_or_else(|| TransitionError::OrderNotFound(id).into())
    }

    /// All orders, newest first.
    pub async fn list_orders(&self) -> Result<Vec<Order>, EngineError> {
        let mut orders = self.orders.list_orders().await?;
        orders.sort_by(|a, b| b.order_date.cmp(&a.order_date).then_with(|| b.id.0.cmp(&a.id.0)));
        Ok(orders)
    }
}

async fn detached<T, F>(work: F) -> Result<T, EngineError>
where
    T: Send + 'static,
    F: Future<Output = Result<T, EngineError>> + Send + 'static,
{
    tokio::spawn(work)
        .await
        .map_err(|e| EngineError::InternalInvariant(format!("engine task failed: {}", e)))?
}

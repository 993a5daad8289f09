use crate::actor_framework::Entity;
use crate::domain::{Order, OrderId, OrderStatus};
use super::actions::OrderAction;
use super::error::OrderError;

impl Entity for Order {
    type Id = OrderId;
    type Action = OrderAction;
    type ActionResult = Order;
    type Error = OrderError;

    fn id(&self) -> &OrderId {
        &self.id
    }

    /// Orders enter the store exactly as the factory built them: pending,
    /// unstamped and with at least one line.
    fn on_insert(&mut self) -> Result<(), OrderError> {
        if self.status != OrderStatus::Pending {
            return Err(OrderError::ValidationError(format!("new order has status {}", self.status)));
        }
        if self.completed_date.is_some() || self.cancelled_date.is_some() {
            return Err(OrderError::ValidationError("new order carries a transition date".to_string()));
        }
        if self.products.is_empty() {
            return Err(OrderError::ValidationError("order has no line items".to_string()));
        }
        Ok(())
    }

    /// Applies a status change conditioned on the current status.
    ///
    /// Returns the updated order; on conflict the stored order is untouched.
    fn handle_action(&mut self, action: OrderAction) -> Result<Order, OrderError> {
        match action {
            OrderAction::Transition { expected, target, at } => {
                if self.status != expected {
                    return Err(OrderError::StatusConflict { expected, actual: self.status });
                }
                match target {
                    OrderStatus::Completed => self.completed_date = Some(at),
                    OrderStatus::Cancelled => self.cancelled_date = Some(at),
                    OrderStatus::Pending => {}
                }
                self.status = target;
                Ok(self.clone())
            }
        }
    }
}

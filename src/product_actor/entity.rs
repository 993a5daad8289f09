use crate::actor_framework::Entity;
use crate::domain::{Product, ProductId};
use super::actions::{ProductAction, ProductActionResult, StockReserved};
use super::error::ProductError;

impl Entity for Product {
    type Id = ProductId;
    type Action = ProductAction;
    type ActionResult = ProductActionResult;
    type Error = ProductError;

    fn id(&self) -> &ProductId {
        &self.id
    }

    /// Rejects catalog records the ledger could not price.
    fn on_insert(&mut self) -> Result<(), ProductError> {
        if self.price.is_negative() {
            return Err(ProductError::ValidationError(format!("negative price for {}", self.id)));
        }
        if self.name.trim().is_empty() {
            return Err(ProductError::ValidationError(format!("blank name for {}", self.id)));
        }
        self.holds.clear();
        Ok(())
    }

    /// Handles product-specific actions.
    ///
    /// # Actions
    /// - `CheckStock`: Returns the current stock level
    /// - `Reserve`: Conditional decrement, idempotent per reservation
    /// - `Release`: Compensating increment, idempotent per reservation
    /// - `Settle`: Drops a consumed hold
    ///
    /// # Errors
    /// `Reserve` fails without side effects when stock would go negative.
    fn handle_action(&mut self, action: ProductAction) -> Result<ProductActionResult, ProductError> {
        match action {
            ProductAction::CheckStock => Ok(ProductActionResult::CheckStock(self.stock)),
            ProductAction::Reserve { reservation, quantity } => {
                if quantity == 0 {
                    return Err(ProductError::InvalidQuantity(quantity));
                }
                if self.holds.contains_key(&reservation) {
                    return Ok(ProductActionResult::Reserve(self.reserved()));
                }
                let Some(remaining) = self.stock.checked_sub(quantity) else {
                    return Err(ProductError::InsufficientStock {
                        product_id: self.id.clone(),
                        available: self.stock,
                        requested: quantity,
                    });
                };
                self.stock = remaining;
                self.holds.insert(reservation, quantity);
                Ok(ProductActionResult::Reserve(self.reserved()))
            }
            ProductAction::Release { reservation } => {
                let Some(&held) = self.holds.get(&reservation) else {
                    return Ok(ProductActionResult::Release(0));
                };
                let restored = self
                    .stock
                    .checked_add(held)
                    .ok_or_else(|| ProductError::StockOverflow(self.id.clone()))?;
                self.stock = restored;
                self.holds.remove(&reservation);
                Ok(ProductActionResult::Release(held))
            }
            ProductAction::Settle { reservation } => {
                self.holds.remove(&reservation);
                Ok(ProductActionResult::Settle)
            }
        }
    }
}

impl Product {
    fn reserved(&self) -> StockReserved {
        StockReserved {
            remaining: self.stock,
            product_name: self.name.clone(),
            unit_price: self.price,
        }
    }
}

use thiserror::Error;

use crate::domain::ProductId;

/// Rejections raised by the product store itself.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ProductError {
    #[error("Insufficient stock for {product_id}: requested {requested}, available {available}")]
    InsufficientStock {
        product_id: ProductId,
        available: u32,
        requested: u32,
    },
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(u32),
    #[error("Stock counter for {0} would overflow")]
    StockOverflow(ProductId),
    #[error("Product validation error: {0}")]
    ValidationError(String),
}

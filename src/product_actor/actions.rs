//! Custom actions for the Product store.
//!
//! Each action is applied by the product actor as one atomic step, which is
//! what makes the conditional decrement safe under concurrent checkouts.

use crate::domain::{Money, ReservationId};

/// Custom actions for Product entities.
#[derive(Debug, Clone)]
pub enum ProductAction {
    /// Reads the current stock level without modifying it.
    CheckStock,
    /// Decrements stock by `quantity` only if the result stays non-negative.
    ///
    /// Keyed by `reservation`: replaying the same reservation does not
    /// decrement twice.
    Reserve {
        reservation: ReservationId,
        quantity: u32,
    },
    /// Gives back whatever `reservation` took. A no-op when it holds nothing.
    Release { reservation: ReservationId },
    /// Forgets `reservation`'s hold without touching stock.
    Settle { reservation: ReservationId },
}

/// Outcome of a successful [`ProductAction::Reserve`], with the catalog
/// snapshot read in the same step as the decrement.
#[derive(Debug, Clone, PartialEq)]
pub struct StockReserved {
    pub remaining: u32,
    pub product_name: String,
    pub unit_price: Money,
}

/// Results from ProductActions - variants match 1:1 with ProductAction
#[derive(Debug, Clone, PartialEq)]
pub enum ProductActionResult {
    CheckStock(u32),
    Reserve(StockReserved),
    /// Quantity put back on the shelf (0 when there was no hold).
    Release(u32),
    Settle,
}

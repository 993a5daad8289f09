use chrono::{DateTime, Utc};

use crate::domain::OrderStatus;

/// Custom actions for Order entities.
#[derive(Debug, Clone)]
pub enum OrderAction {
    /// Moves the order to `target` only if its status is still `expected`,
    /// stamping the matching date with `at`.
    Transition {
        expected: OrderStatus,
        target: OrderStatus,
        at: DateTime<Utc>,
    },
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

use super::{Money, OrderId, ProductId, ReservationId, UserId};

/// Lifecycle status of an order. `Completed` and `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "pending" => Ok(OrderStatus::Pending),
            "completed" => Ok(OrderStatus::Completed),
            "cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(other.to_string()),
        }
    }
}

/// Delivery contact captured at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CustomerContact {
    pub name: String,
    pub address: String,
    pub phone: String,
}

/// One line of a persisted order. Name and price are snapshots taken when
/// the stock was reserved, so later catalog edits do not rewrite history.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineItem {
    pub product_id: ProductId,
    pub quantity: u32,
    pub name: String,
    pub unit_price: Money,
}

/// One product's share of a reservation.
#[derive(Debug, Clone, PartialEq)]
pub struct ReservedLine {
    pub product_id: ProductId,
    pub quantity: u32,
    pub product_name: String,
    pub unit_price: Money,
}

/// Handle naming exactly what one reservation decremented.
///
/// Lines are in ascending product id order, the same order the decrements
/// were applied in.
#[derive(Debug, Clone, PartialEq)]
pub struct ReservationToken {
    pub id: ReservationId,
    pub lines: Vec<ReservedLine>,
}

impl ReservationToken {
    pub fn total_quantity(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity)).sum()
    }
}

/// Represents a customer order.
///
/// Everything but the status fields is fixed at creation.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "_id")]
    pub id: OrderId,
    pub user_id: Option<UserId>,
    pub products: Vec<OrderLineItem>,
    pub subtotal: Money,
    pub total: Money,
    pub name: String,
    pub address: String,
    pub phone: String,
    pub status: OrderStatus,
    pub order_date: DateTime<Utc>,
    pub completed_date: Option<DateTime<Utc>>,
    pub cancelled_date: Option<DateTime<Utc>>,
    #[serde(skip)]
    pub reservation: ReservationToken,
}

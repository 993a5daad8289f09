use std::collections::HashMap;

use serde::Serialize;

use super::{Money, ProductId, ReservationId};

/// Represents a product in the inventory.
///
/// The catalog owns every field except `stock`, which only the stock ledger
/// mutates. `holds` remembers how much each reservation took so that a
/// replayed decrement or release is recognised.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub category: String,
    pub price: Money,
    pub stock: u32,
    pub image: Option<String>,
    #[serde(skip)]
    pub holds: HashMap<ReservationId, u32>,
}

impl Product {
    /// Creates a new Product instance.
    ///
    /// # Arguments
    /// * `id` - Catalog identifier
    /// * `name` - Product name
    /// * `price` - Unit price
    /// * `stock` - Quantity on hand
    pub fn new(id: impl Into<ProductId>, name: impl Into<String>, price: Money, stock: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category: String::new(),
            price,
            stock,
            image: None,
            holds: HashMap::new(),
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }
}

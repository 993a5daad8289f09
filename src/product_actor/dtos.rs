use serde::Deserialize;

use crate::domain::{Money, Product, ProductId};

/// Catalog record as supplied by the catalog collaborator (seed files).
#[derive(Debug, Clone, Deserialize)]
pub struct ProductCreate {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub category: String,
    pub price: Money,
    pub stock: u32,
    #[serde(default)]
    pub image: Option<String>,
}

impl From<ProductCreate> for Product {
    fn from(params: ProductCreate) -> Self {
        let mut product = Product::new(params.id, params.name, params.price, params.stock)
            .with_category(params.category);
        product.image = params.image;
        product
    }
}

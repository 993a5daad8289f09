//! Initial catalog loading.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{info, instrument};

use crate::clients::ProductClient;
use crate::domain::Product;
use crate::product_actor::ProductCreate;
use crate::repository::StoreError;

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("cannot parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("cannot store product: {0}")]
    Store(#[from] StoreError),
}

/// Parses a JSON array of `{ id, name, category, price, stock, image }`.
pub fn parse_catalog(json: &str) -> Result<Vec<Product>, serde_json::Error> {
    let records: Vec<ProductCreate> = serde_json::from_str(json)?;
    Ok(records.into_iter().map(Product::from).collect())
}

pub async fn load_catalog(path: &Path) -> Result<Vec<Product>, SeedError> {
    let json = tokio::fs::read_to_string(path).await.map_err(|source| SeedError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_catalog(&json).map_err(|source| SeedError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[instrument(skip(products, catalog), fields(records = catalog.len()))]
pub async fn seed_catalog(products: &ProductClient, catalog: Vec<Product>) -> Result<usize, SeedError> {
    let mut stored = 0;
    for product in catalog {
        products.create_product(product).await?;
        stored += 1;
    }
    info!(stored, "Catalog seeded");
    Ok(stored)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Money;

    #[test]
    fn parses_seed_records() {
        let catalog = parse_catalog(
            r#"[
                { "id": "p1", "name": "Tea", "category": "drinks", "price": 100.0, "stock": 5, "image": "tea.png" },
                { "id": "p2", "name": "Mug", "price": 49.99, "stock": 0 }
            ]"#,
        )
        .unwrap();

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog[0].price, Money::from_cents(10_000));
        assert_eq!(catalog[0].image.as_deref(), Some("tea.png"));
        assert_eq!(catalog[1].category, "");
        assert_eq!(catalog[1].price, Money::from_cents(4_999));
    }

    #[tokio::test]
    async fn seeded_records_are_readable() {
        let products = crate::mock_framework::spawn_product_store(Vec::new()).await;
        let catalog = parse_catalog(r#"[{ "id": "p1", "name": "Tea", "price": 2.5, "stock": 4 }]"#).unwrap();

        assert_eq!(seed_catalog(&products, catalog).await.unwrap(), 1);
        let stored = products.fetch_product("p1".into()).await.unwrap().unwrap();
        assert_eq!(stored.price, Money::from_cents(250));
        assert_eq!(stored.stock, 4);
        assert_eq!(products.fetch_all_products().await.unwrap().len(), 1);
    }

    #[test]
    fn rejects_negative_stock() {
        assert!(parse_catalog(r#"[{ "id": "p1", "name": "Tea", "price": 1, "stock": -1 }]"#).is_err());
    }
}

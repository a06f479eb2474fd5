//! Offline stock client backed by a json-server `db.json` file

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::application::errors::{ConfigError, FetchError};
use crate::domain::entities::{Product, ProductId, Stock};
use crate::domain::traits::StockClient;

#[derive(Debug, Deserialize)]
struct Database {
    #[serde(default)]
    products: Vec<Product>,
    #[serde(default)]
    stock: Vec<Stock>,
}

/// In-memory catalog answering the same requests as the HTTP API.
///
/// Unknown ids fail with `FetchError::NotFound`, like a 404 from the server.
#[derive(Debug, Default)]
pub struct FixtureCatalog {
    products: Mutex<HashMap<ProductId, Product>>,
    stock: Mutex<HashMap<ProductId, u32>>,
}

impl FixtureCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Parse(format!("Failed to read catalog {}: {}", path.display(), e)))?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let db: Database = serde_json::from_str(json)
            .map_err(|e| ConfigError::Parse(format!("Failed to parse catalog: {}", e)))?;

        let catalog = Self::new();
        {
            let mut stock = catalog.stock_table();
            for entry in db.stock {
                let id = entry
                    .id
                    .ok_or_else(|| ConfigError::InvalidValue("stock entry without id".to_string()))?;
                stock.insert(id, entry.amount);
            }
        }
        {
            let mut products = catalog.product_table();
            for product in db.products {
                products.insert(product.id, product);
            }
        }
        Ok(catalog)
    }

    pub fn with_product(self, product: Product, stock: u32) -> Self {
        self.set_stock(product.id, stock);
        self.product_table().insert(product.id, product);
        self
    }

    /// Change the available quantity reported for a product
    pub fn set_stock(&self, id: impl Into<ProductId>, amount: u32) {
        self.stock_table().insert(id.into(), amount);
    }

    pub fn len(&self) -> usize {
        self.product_table().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn stock_table(&self) -> MutexGuard<'_, HashMap<ProductId, u32>> {
        self.stock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn product_table(&self) -> MutexGuard<'_, HashMap<ProductId, Product>> {
        self.products.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl StockClient for FixtureCatalog {
    async fn stock(&self, id: ProductId) -> Result<Stock, FetchError> {
        self.stock_table()
            .get(&id)
            .map(|amount| Stock::new(id, *amount))
            .ok_or_else(|| FetchError::NotFound(format!("/stock/{}", id)))
    }

    async fn product(&self, id: ProductId) -> Result<Product, FetchError> {
        self.product_table()
            .get(&id)
            .cloned()
            .ok_or_else(|| FetchError::NotFound(format!("/products/{}", id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DB: &str = r#"{
        "products": [
            {"id": 1, "title": "Tênis de Caminhada Leve Confortável", "price": 179.9, "image": "a.jpg"},
            {"id": 2, "title": "Tênis VR Caminhada Confortável", "price": 139.9, "image": "b.jpg"}
        ],
        "stock": [
            {"id": 1, "amount": 3},
            {"id": 2, "amount": 0}
        ]
    }"#;

    #[tokio::test]
    async fn test_loads_json_server_database() {
        let catalog = FixtureCatalog::from_json(DB).unwrap();
        assert_eq!(catalog.len(), 2);

        let stock = catalog.stock(ProductId(1)).await.unwrap();
        assert_eq!(stock.amount, 3);
        assert!(catalog.stock(ProductId(2)).await.unwrap().is_empty());

        let product = catalog.product(ProductId(2)).await.unwrap();
        assert_eq!(product.price(), Some(139.9));
    }

    #[tokio::test]
    async fn test_unknown_id_is_not_found() {
        let catalog = FixtureCatalog::from_json(DB).unwrap();
        assert!(matches!(
            catalog.product(ProductId(99)).await,
            Err(FetchError::NotFound(_))
        ));
        assert!(matches!(
            catalog.stock(ProductId(99)).await,
            Err(FetchError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_set_stock() {
        let catalog = FixtureCatalog::new().with_product(Product::new(5u64), 1);
        catalog.set_stock(5u64, 10);
        assert_eq!(catalog.stock(ProductId(5)).await.unwrap().amount, 10);
    }

    #[test]
    fn test_rejects_stock_without_id() {
        let result = FixtureCatalog::from_json(r#"{"stock":[{"amount":1}]}"#);
        assert!(matches!(result, Err(ConfigError::InvalidValue(_))));
    }
}

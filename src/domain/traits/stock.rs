use async_trait::async_trait;
use crate::application::errors::FetchError;
use crate::domain::entities::{Product, ProductId, Stock};

/// StockClient trait - abstraction for the remote stock/product API
#[async_trait]
pub trait StockClient: Send + Sync {
    /// Current available quantity for a product (`/stock/{id}`)
    async fn stock(&self, id: ProductId) -> Result<Stock, FetchError>;

    /// Full product record (`/products/{id}`)
    async fn product(&self, id: ProductId) -> Result<Product, FetchError>;
}

//! Stock/product API over HTTP

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::application::errors::FetchError;
use crate::domain::entities::{Product, ProductId, Stock};
use crate::domain::traits::StockClient;

/// Default API endpoint (json-server in development)
pub const DEFAULT_BASE_URL: &str = "http://localhost:3333";

/// reqwest-backed stock client
pub struct HttpStockClient {
    client: Client,
    base_url: String,
}

impl HttpStockClient {
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self, FetchError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| FetchError::Network(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Full URL for an API path such as `/stock/1`
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, FetchError> {
        let url = self.url(path);
        tracing::debug!(url = %url, "GET");

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url,
            });
        }

        response
            .json()
            .await
            .map_err(|e| FetchError::Parse(e.to_string()))
    }
}

#[async_trait]
impl StockClient for HttpStockClient {
    async fn stock(&self, id: ProductId) -> Result<Stock, FetchError> {
        self.get_json(&format!("/stock/{}", id)).await
    }

    async fn product(&self, id: ProductId) -> Result<Product, FetchError> {
        self.get_json(&format!("/products/{}", id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joining() {
        let client = HttpStockClient::new("http://localhost:3333/", None).unwrap();
        assert_eq!(client.url("/stock/1"), "http://localhost:3333/stock/1");

        let client = HttpStockClient::new("http://api.test/v1", None).unwrap();
        assert_eq!(client.url("/products/7"), "http://api.test/v1/products/7");
    }

    #[tokio::test]
    async fn test_unreachable_server_is_network_error() {
        let client =
            HttpStockClient::new("http://127.0.0.1:9", Some(Duration::from_secs(2))).unwrap();
        let err = client.stock(ProductId(1)).await.unwrap_err();
        assert!(matches!(err, FetchError::Network(_)));
    }

    #[tokio::test]
    #[ignore] // Requires the json-server API on localhost:3333
    async fn test_live_stock() {
        let client = HttpStockClient::new(DEFAULT_BASE_URL, None).expect("client");
        let stock = client.stock(ProductId(1)).await.expect("stock request failed");
        println!("Stock for 1: {}", stock.amount);
    }
}

//! Stock/product API clients

pub mod fixture;
pub mod http;

pub use fixture::FixtureCatalog;
pub use http::{HttpStockClient, DEFAULT_BASE_URL};

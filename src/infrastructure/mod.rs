//! Infrastructure layer - External concerns
//! 
//! This layer contains:
//! - Config: Configuration loading
//! - Api: Stock/product clients (HTTP, fixture file)
//! - Storage: Key-value persistence (memory, JSON file)
//! - Database: SQLite key-value persistence
//! - Adapters: Notification sinks (console, tracing)

pub mod adapters;
pub mod api;
pub mod config;
pub mod database;
pub mod storage;

use std::sync::Arc;

use crate::application::errors::AppError;
use crate::application::services::CartStore;
use crate::domain::traits::{KeyValueStore, Notifier, StockClient};
use config::{Config, StorageBackend, StorageConfig};

/// Open the key-value store selected by the configuration
pub fn open_storage(config: &StorageConfig) -> Result<Arc<dyn KeyValueStore>, AppError> {
    let storage: Arc<dyn KeyValueStore> = match config.backend {
        StorageBackend::Memory => Arc::new(storage::MemoryStore::new()),
        StorageBackend::JsonFile => Arc::new(storage::JsonFileStore::open(&config.path)?),
        StorageBackend::Sqlite => Arc::new(database::SqliteStore::new(&config.path)?),
    };
    tracing::debug!(backend = ?config.backend, path = %config.path.display(), "Storage ready");
    Ok(storage)
}

/// Build the stock client: the fixture catalog when configured, HTTP otherwise
pub fn stock_client(config: &Config) -> Result<Arc<dyn StockClient>, AppError> {
    if let Some(path) = &config.catalog {
        let catalog = api::FixtureCatalog::load(path)?;
        tracing::info!(path = %path.display(), products = catalog.len(), "Using fixture catalog");
        return Ok(Arc::new(catalog));
    }

    let client = api::HttpStockClient::new(&config.api.base_url, config.api.timeout())?;
    tracing::info!(url = %client.base_url(), "Using stock API");
    Ok(Arc::new(client))
}

/// Wire a cart store from configuration
pub fn build_cart_store(config: &Config, notifier: Arc<dyn Notifier>) -> Result<CartStore, AppError> {
    config.validate()?;
    let client = stock_client(config)?;
    let storage = open_storage(&config.storage)?;
    Ok(CartStore::with_storage_key(
        client,
        storage,
        notifier,
        config.storage.key.clone(),
    ))
}

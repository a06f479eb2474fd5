//! Shopping cart state for the RocketShoes storefront.
//!
//! The [`CartStore`] keeps an ordered list of cart lines, checks every
//! quantity change against the remote stock API, mirrors each new snapshot to
//! a key-value store under `"@RocketShoes:cart"` and reports outcomes through
//! a [`Notifier`].
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use rocketshoes_cart::prelude::*;
//!
//! let store = CartStore::new(
//!     Arc::new(HttpStockClient::new(DEFAULT_BASE_URL, None)?),
//!     Arc::new(JsonFileStore::open("storage.json")?),
//!     Arc::new(ConsoleNotifier::new()),
//! );
//!
//! store.add(ProductId(1)).await?;
//! store.update_amount(UpdateProductAmount::new(1u64, 3)).await?;
//! store.remove(ProductId(1))?;
//! ```

pub mod application;
pub mod domain;
pub mod infrastructure;

pub use application::errors::{AppError, CartError, ConfigError, FetchError, StorageError};
pub use application::messages::CartOperation;
pub use application::services::{CartEvent, CartStore, UpdateProductAmount, CART_STORAGE_KEY};
pub use domain::entities::{Cart, Product, ProductId, Stock};
pub use domain::traits::{KeyValueStore, Notifier, StockClient};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::application::errors::{AppError, CartError, FetchError, StorageError};
    pub use crate::application::messages::CartOperation;
    pub use crate::application::services::{CartEvent, CartStore, UpdateProductAmount};
    pub use crate::domain::entities::{Cart, Product, ProductId, Stock};
    pub use crate::domain::traits::{KeyValueStore, Notifier, StockClient};
    pub use crate::infrastructure::adapters::{ConsoleNotifier, TracingNotifier};
    pub use crate::infrastructure::api::{FixtureCatalog, HttpStockClient, DEFAULT_BASE_URL};
    pub use crate::infrastructure::config::Config;
    pub use crate::infrastructure::database::SqliteStore;
    pub use crate::infrastructure::storage::{JsonFileStore, MemoryStore};
}

//! Domain layer - Core business logic with no external dependencies
//! 
//! This layer contains:
//! - Entities: Core business objects (Product, Stock, Cart)
//! - Traits: Abstractions for the collaborators (StockClient, KeyValueStore, Notifier)

pub mod entities;
pub mod traits;

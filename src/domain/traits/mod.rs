//! Domain traits - Abstractions for infrastructure implementations

pub mod notifier;
pub mod stock;
pub mod store;

pub use notifier::Notifier;
pub use stock::StockClient;
pub use store::KeyValueStore;

//! Domain entities - Core business objects with no external dependencies

pub mod cart;
pub mod product;

pub use cart::Cart;
pub use product::{Product, ProductId, Stock};

//! Application services - Business logic orchestration

pub mod cart_service;

pub use cart_service::{CartEvent, CartStore, UpdateProductAmount, CART_STORAGE_KEY};

//! Application layer - Use cases and business logic
//! 
//! This layer contains:
//! - Services: The cart store orchestrating stock checks, persistence and notifications
//! - Messages: User-facing notification texts
//! - Errors: Domain-specific errors

pub mod errors;
pub mod messages;
pub mod services;

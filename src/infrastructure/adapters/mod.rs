//! Notification adapters

pub mod console;
pub mod log;

pub use console::ConsoleNotifier;
pub use log::TracingNotifier;

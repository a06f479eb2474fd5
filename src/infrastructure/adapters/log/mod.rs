//! Notifier that only writes log lines

use crate::domain::traits::Notifier;

/// Routes toasts into `tracing`, for headless embedding
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn success(&self, message: &str) {
        tracing::info!(target: "cart::toast", "{}", message);
    }

    fn error(&self, message: &str) {
        tracing::warn!(target: "cart::toast", "{}", message);
    }
}

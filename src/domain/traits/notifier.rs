/// Notifier trait - user-facing toast sink.
///
/// Calls are fire-and-forget; implementations must not fail.
pub trait Notifier: Send + Sync {
    fn success(&self, message: &str);
    fn error(&self, message: &str);
}

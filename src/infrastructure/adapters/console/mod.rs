//! Console notifier for the command-line front-end

use std::io::Write;

use crate::domain::traits::Notifier;

/// Prints toasts to the terminal
pub struct ConsoleNotifier {
    color: bool,
}

impl ConsoleNotifier {
    pub fn new() -> Self {
        Self { color: false }
    }

    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    fn format(&self, ok: bool, message: &str) -> String {
        match (ok, self.color) {
            (true, true) => format!("\x1b[32m[OK]\x1b[0m {}", message),
            (false, true) => format!("\x1b[31m[ERRO]\x1b[0m {}", message),
            (true, false) => format!("[OK] {}", message),
            (false, false) => format!("[ERRO] {}", message),
        }
    }
}

impl Default for ConsoleNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier for ConsoleNotifier {
    fn success(&self, message: &str) {
        let mut out = std::io::stdout().lock();
        let _ = writeln!(out, "{}", self.format(true, message));
    }

    fn error(&self, message: &str) {
        let mut err = std::io::stderr().lock();
        let _ = writeln!(err, "{}", self.format(false, message));
    }
}

//! Output formatting for the CLI.

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use relay_sdk::relay_transport::NormalizedError;

/// Shown when an error carries no readable message.
pub const FALLBACK_ERROR_MESSAGE: &str = "An unexpected error occurred";

/// Output handler for CLI messages.
#[derive(Clone)]
pub struct Output {
    verbose: bool,
    json: bool,
}

impl Output {
    /// Create a new output handler.
    pub fn new(verbose: bool, json: bool) -> Self {
        Self { verbose, json }
    }

    /// Print an info message.
    pub fn info(&self, msg: &str) {
        if self.json {
            return;
        }
        println!("{} {}", style("ℹ").blue(), msg);
    }

    /// Print a success message.
    pub fn success(&self, msg: &str) {
        if self.json {
            return;
        }
        println!("{} {}", style("✓").green(), msg);
    }

    /// Print a warning message.
    pub fn warn(&self, msg: &str) {
        if self.json {
            return;
        }
        eprintln!("{} {}", style("⚠").yellow(), msg);
    }

    /// Print an error message.
    pub fn error(&self, msg: &str) {
        if self.json {
            eprintln!("{}", serde_json::json!({ "error": msg }));
            return;
        }
        eprintln!("{} {}", style("✗").red(), style(msg).red());
    }

    /// Print a debug message (only in verbose mode).
    pub fn debug(&self, msg: &str) {
        if !self.verbose || self.json {
            return;
        }
        eprintln!("{} {}", style("→").dim(), style(msg).dim());
    }

    /// Print a header/title.
    pub fn header(&self, msg: &str) {
        if self.json {
            return;
        }
        println!("\n{}", style(msg).bold().underlined());
    }

    /// Print JSON output.
    pub fn json<T: serde::Serialize>(&self, value: &T) {
        if let Ok(json) = serde_json::to_string_pretty(value) {
            println!("{}", json);
        }
    }

    /// Print a key-value pair.
    pub fn kv(&self, key: &str, value: &str) {
        if self.json {
            return;
        }
        println!("  {}: {}", style(key).dim(), value);
    }

    /// Create a spinner for indeterminate progress.
    pub fn spinner(&self, msg: &str) -> ProgressBar {
        if self.json {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new_spinner();
        if let Ok(spinner_style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}")
        {
            pb.set_style(spinner_style);
        }
        pb.set_message(msg.to_string());
        pb.enable_steady_tick(std::time::Duration::from_millis(100));
        pb
    }

    /// Check if JSON mode is enabled.
    pub fn is_json(&self) -> bool {
        self.json
    }
}

/// Text to show a person for a failed operation.
pub fn user_message(err: &NormalizedError) -> &str {
    err.message()
        .map(str::trim)
        .filter(|msg| !msg.is_empty())
        .unwrap_or(FALLBACK_ERROR_MESSAGE)
}

/// Status badge for service health.
pub fn status_badge(status: &str) -> String {
    match status.to_lowercase().as_str() {
        "healthy" | "ok" => style(status).green().to_string(),
        "degraded" => style(status).yellow().to_string(),
        _ => style(status).red().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // === Message Tests ===

    #[test]
    fn test_user_message_uses_server_text() {
        let err = NormalizedError::server(404, json!({"error": "Data not found"}));
        assert_eq!(user_message(&err), "Data not found");
    }

    #[test]
    fn test_user_message_no_response() {
        assert_eq!(
            user_message(&NormalizedError::no_response()),
            "No response received from server"
        );
    }

    #[test]
    fn test_user_message_falls_back() {
        let err = NormalizedError::server(500, json!({"code": 17}));
        assert_eq!(user_message(&err), FALLBACK_ERROR_MESSAGE);

        let err = NormalizedError::server(502, serde_json::Value::Null);
        assert_eq!(user_message(&err), FALLBACK_ERROR_MESSAGE);

        let err = NormalizedError::server(500, json!("   "));
        assert_eq!(user_message(&err), FALLBACK_ERROR_MESSAGE);
    }
}

//! Logging helpers.
//!
//! - [`init_tracing`] installs the crate's preferred subscriber for embedding
//!   applications
//! - [`truncate_for_log`] keeps response previews in log lines short

use std::error::Error;
use tracing_subscriber::{EnvFilter, fmt as tfmt};

/// Install a `tracing` fmt subscriber.
///
/// `RUST_LOG` takes precedence; `default_directive` (e.g. `"info"` or
/// `"nyt_article_search=debug"`) applies when it is unset or invalid.
/// Returns an error if a global subscriber is already installed.
pub fn init_tracing(default_directive: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .try_init()
}

/// Truncate a string for logging purposes.
///
/// Strings longer than `max` bytes are cut at the nearest character boundary
/// at or below `max` and suffixed with `"…(+N bytes)"`.
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut cut = max;
    while !s.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}…(+{} bytes)", &s[..cut], s.len() - cut)
}

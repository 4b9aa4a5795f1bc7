//! Structured logging configuration.
//!
//! Library crates log through the `log` facade; `init` installs a tracing
//! subscriber that also captures those records.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize structured logging
///
/// Log levels come from `RUST_LOG`, defaulting to `info,sqlx=warn,hyper=warn`.
///
/// # Example
///
/// ```no_run
/// use ba_server::logging;
///
/// #[tokio::main]
/// async fn main() {
///     logging::init();
///     tracing::info!("Server starting");
/// }
/// ```
pub fn init() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn,hyper=warn"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();

    tracing::info!("Structured logging initialized");
}

/// Log security event with structured data
///
/// # Example
///
/// ```
/// use ba_server::logging::log_security_event;
///
/// log_security_event("failed_login", None, "Invalid password attempt");
/// ```
pub fn log_security_event(event_type: &str, user_id: Option<i64>, message: &str) {
    tracing::warn!(
        event_type = event_type,
        user_id = user_id,
        "SECURITY: {}",
        message
    );
}

/// Log an administrative change to money state
///
/// # Arguments
///
/// * `action` - What was done (e.g. `balance_adjusted`, `recharge_approved`)
/// * `admin_id` - Admin performing the change
/// * `user_id` - Account whose balances changed
/// * `amount` - Signed amount moved
pub fn log_ledger_event(action: &str, admin_id: i64, user_id: i64, amount: i64) {
    tracing::info!(
        action = action,
        admin_id = admin_id,
        user_id = user_id,
        amount = amount,
        "LEDGER: {}",
        action
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_security_event() {
        // Just ensure it doesn't panic
        log_security_event("test_event", Some(123456), "Test message");
        log_security_event("test_event", None, "Anonymous");
    }

    #[test]
    fn test_log_ledger_event() {
        log_ledger_event("balance_adjusted", 100001, 654321, -250);
    }
}

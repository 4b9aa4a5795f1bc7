//! Prometheus metrics for the administration server.
//!
//! The exporter is installed only when a metrics address is configured;
//! without it every recording call below is a no-op.
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use ba_server::metrics;
//! use std::net::SocketAddr;
//!
//! let addr: SocketAddr = "127.0.0.1:9090".parse().unwrap();
//! metrics::init_metrics(addr).unwrap();
//!
//! metrics::http_requests_total("POST", 200);
//! ```

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Initialize Prometheus metrics exporter.
///
/// Metrics will be available at `http://<addr>/metrics`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), String> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus exporter: {}", e))
}

// ============================================================================
// HTTP Metrics
// ============================================================================

/// Record an HTTP request by method and status
pub fn http_requests_total(method: &str, status: u16) {
    metrics::counter!("http_requests_total",
        "method" => method.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
}

// ============================================================================
// Ledger Metrics
// ============================================================================

/// Bets placed or settled, by resulting status
pub fn bet_settlements_total(status: &str) {
    metrics::counter!("bet_settlements_total",
        "status" => status.to_string()
    )
    .increment(1);
}

/// Recharge/withdrawal decisions by kind and outcome
pub fn transaction_decisions_total(kind: &str, outcome: &str) {
    metrics::counter!("transaction_decisions_total",
        "kind" => kind.to_string(),
        "outcome" => outcome.to_string()
    )
    .increment(1);
}

// ============================================================================
// Auth Metrics
// ============================================================================

/// Registrations, split by whether a referrer was credited
pub fn registrations_total(referred: bool) {
    metrics::counter!("registrations_total",
        "referred" => referred.to_string()
    )
    .increment(1);
}

/// Increment login attempts counter.
pub fn login_attempts_total(success: bool) {
    metrics::counter!("login_attempts_total",
        "success" => success.to_string()
    )
    .increment(1);
}

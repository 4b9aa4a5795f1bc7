//! HTTP administration server for the betting platform backend.
//!
//! Exposes the `betting_admin` managers as a JSON API. Every response uses
//! the `{status, success, message, data}` envelope.

pub mod api;
pub mod config;
pub mod logging;
pub mod metrics;

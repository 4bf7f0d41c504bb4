//! Internal diagnostics setup.
//!
//! The crate reports its own operational events (batch dispatch, flush
//! results, skipped transports) through `tracing`. Host applications that
//! do not install their own subscriber can call [`init_diagnostics`].

use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber for skylog's own diagnostics.
/// Uses JSON format when `RUST_LOG_FORMAT=json`.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_diagnostics() {
    let use_json = std::env::var("RUST_LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if use_json {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .json()
                    .flatten_event(true)
                    .with_current_span(true),
            )
            .with(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
            .try_init()
            .ok();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer())
            .with(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
            .try_init()
            .ok();
    }
}

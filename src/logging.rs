//! Logging initialization and configuration.
//!
//! Log output goes to stderr; stdout carries the conversation.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter used when no level is configured.
pub const DEFAULT_FILTER: &str = "support_desk=warn";

fn build_filter(filter: &str) -> EnvFilter {
    if filter.trim().is_empty() {
        return EnvFilter::new(DEFAULT_FILTER);
    }
    EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Initialize the logging system with the given filter directive.
///
/// An empty or unparsable filter falls back to [`DEFAULT_FILTER`].
///
/// # Panics
///
/// Panics if called more than once, or if another tracing subscriber
/// has already been set.
pub fn init(filter: &str) {
    tracing_subscriber::registry()
        .with(build_filter(filter))
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_writer(std::io::stderr),
        )
        .init();
}

/// Try to initialize the logging system.
///
/// Returns `Ok(())` if successful, or `Err` if logging has already been
/// initialized.
pub fn try_init(filter: &str) -> Result<(), tracing_subscriber::util::TryInitError> {
    tracing_subscriber::registry()
        .with(build_filter(filter))
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_writer(std::io::stderr),
        )
        .try_init()
}

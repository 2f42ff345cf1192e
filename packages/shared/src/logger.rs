//! Logging setup utilities for the beango server.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Build the default filter directive for the server crates and the binary.
///
/// Every beango crate and the binary itself are logged at `default_log_level`;
/// `tower_http` request spans are kept at `debug` so transport traces stay quiet
/// unless explicitly requested.
pub fn default_directive(binary_name: &str, default_log_level: &str) -> String {
    format!(
        "beango_server={level},beango_shared={level},{bin}={level},tower_http=debug",
        level = default_log_level,
        bin = binary_name.replace('-', "_"),
    )
}

/// Initialize the tracing subscriber with the specified default log level.
///
/// The log level can be overridden using the `RUST_LOG` environment variable.
///
/// # Arguments
///
/// * `binary_name` - The name of the binary (e.g., "beango-server")
/// * `default_level` - The default log level (e.g., "debug", "info", "warn", "error")
///
/// # Examples
///
/// ```no_run
/// use beango_shared::logger::setup_logger;
///
/// setup_logger("beango-server", "info");
/// ```
pub fn setup_logger(binary_name: &str, default_log_level: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_directive(binary_name, default_log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

//! Diagnostic logging setup
//!
//! Log lines go to stderr so command output on stdout stays machine-readable.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::core::config::LoggingConfig;

/// Environment variable checked before `RUST_LOG`
pub const LOG_ENV: &str = "SHOPFLOOR_LOG";

/// Filter directive for a `-v` count when no environment filter is set
pub fn default_directive(config: &LoggingConfig, verbosity: u8) -> String {
    match verbosity {
        0 => config.level.clone().unwrap_or_else(|| "warn".to_string()),
        1 => "info".to_string(),
        _ => "debug".to_string(),
    }
}

fn env_filter(config: &LoggingConfig, verbosity: u8) -> EnvFilter {
    let from_env = std::env::var(LOG_ENV)
        .or_else(|_| std::env::var("RUST_LOG"))
        .ok()
        .filter(|v| !v.trim().is_empty());

    // Explicit -v wins over the environment
    let directive = match from_env {
        Some(env) if verbosity == 0 => env,
        _ => default_directive(config, verbosity),
    };
    EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// Install the global subscriber
///
/// Safe to call more than once; later calls are ignored.
pub fn init(config: &LoggingConfig, verbosity: u8) {
    let filter = env_filter(config, verbosity);

    let result = if config.json {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(verbosity > 1)
                    .without_time()
                    .with_writer(std::io::stderr),
            )
            .try_init()
    };

    if result.is_ok() {
        tracing::debug!(json = config.json, verbosity, "Logging initialized");
    }
}

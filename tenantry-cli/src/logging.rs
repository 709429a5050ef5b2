//! Tracing setup for the CLI.

use tenantry_config::LoggingSettings;
use tracing_subscriber::EnvFilter;

/// Filter used by `--debug`.
pub const DEBUG_FILTER: &str =
    "tenantry=debug,tenantry_config=debug,tenantry_fields=debug,tenantry_workspace=debug";

/// Pick the log filter: `--debug` wins, then `RUST_LOG`, then settings.
pub fn env_filter(debug: bool, settings: &LoggingSettings) -> EnvFilter {
    if debug {
        return EnvFilter::new(DEBUG_FILTER);
    }
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.filter_or_default()))
}

/// Install the global subscriber, writing to stderr so stdout stays
/// machine-readable.
pub fn init(debug: bool, settings: &LoggingSettings) {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(debug, settings))
        .with_target(false)
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .init();
}

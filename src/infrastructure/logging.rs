//! Logging setup
//!
//! Builds the tracing subscriber for the binary. The `SHIPLINE_LOG` env
//! var overrides the configured level and accepts full `EnvFilter`
//! directives, e.g. `shipline=debug,tokio=warn`.

use tracing_subscriber::{EnvFilter, fmt};

use super::config::Config;

/// Env var carrying a filter override
pub const LOG_ENV: &str = "SHIPLINE_LOG";

/// Initializes tracing with the given fallback level.
///
/// Safe to call more than once; later calls keep the first subscriber.
pub fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(level));

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .try_init();
}

/// Initializes tracing from the application configuration
pub fn init_from_config(config: &Config) {
    init_logging(&config.log_level);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeated_init_does_not_panic() {
        init_logging("debug");
        init_from_config(&Config::default());
    }
}

//! Infrastructure concerns: configuration and logging

pub mod config;
pub mod logging;

pub use config::Config;
pub use logging::{LOG_ENV, init_from_config, init_logging};

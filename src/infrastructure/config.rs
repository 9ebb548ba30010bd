//! Configuration management

use serde::{Deserialize, Serialize};

use crate::pipeline::version::PROTECTED_BRANCH;

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Long-lived integration branch whose pushes get the "latest" tag
    pub protected_branch: String,
    /// Maximum number of job instances running concurrently
    pub max_parallel_jobs: usize,
    /// Image repository the publishing jobs push to
    pub image: String,
    /// Log level
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            protected_branch: PROTECTED_BRANCH.to_string(),
            max_parallel_jobs: 4,
            image: "acme/node".to_string(),
            log_level: "info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.protected_branch, "master");
        assert_eq!(config.max_parallel_jobs, 4);
        assert_eq!(config.log_level, "info");
    }
}

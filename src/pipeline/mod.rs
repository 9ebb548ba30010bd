//! Orchestration domain types and logic

pub mod artifacts;
pub mod errors;
pub mod graph;
pub mod instance;
pub mod matrix;
pub mod publish;
pub mod release;
pub mod steps;
pub mod trigger;
pub mod version;

pub use serde::{Deserialize, Serialize};

pub use artifacts::{ArtifactHandle, ArtifactRef, ArtifactRelay};
pub use errors::{PipelineError, ValidationError};
pub use graph::{JobGraph, JobNode, JobNodeBuilder, WhenCondition};
pub use instance::{JobInstance, JobStatus, PublishOutcome};
pub use matrix::{PLATFORM_VAR, PlatformAxis, expand_node};
pub use publish::{ImageTag, PublishSpec, ReleaseAsset, should_publish};
pub use release::release_graph;
pub use steps::{OutputDecl, Step};
pub use trigger::{EventKind, TriggerContext};
pub use version::{PROTECTED_BRANCH, ResolvedVersion, sanitize_ref};

/// Trait for types that can be validated
#[allow(clippy::missing_errors_doc)]
pub trait Validate {
    /// Type of validation error
    type Error;

    /// Validates this type
    fn validate(&self) -> std::result::Result<(), Self::Error>;
}

/// Defines environment variables available to a job's steps.
///
/// Values can be resolved with [`resolve`][Environment::resolve], which
/// supports `${VAR}` expansion; a matrix cell sees its platform id under
/// [`PLATFORM_VAR`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Environment {
    /// Environment variables as key-value pairs.
    #[serde(flatten)]
    pub vars: std::collections::HashMap<String, String>,
}

impl Environment {
    /// Creates a new empty environment.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets an environment variable.
    #[must_use]
    pub fn set(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }

    /// Gets an environment variable by name.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&String> {
        self.vars.get(key)
    }

    /// Resolves a value that may contain variable expansions like `${VAR}`.
    ///
    /// Unknown variables are left in place.
    #[must_use]
    pub fn resolve(&self, value: &str) -> String {
        let mut result = value.to_string();
        let mut start = 0;

        while let Some(dollar_pos) = result[start..].find('$') {
            let dollar = start + dollar_pos;
            let var_start = dollar + 1;
            if var_start >= result.len() {
                break;
            }

            if result[var_start..].starts_with('{') {
                if let Some(end_brace) = result[var_start..].find('}') {
                    let var_end = var_start + end_brace + 1;
                    let var_name = &result[var_start + 1..var_end - 1];

                    if let Some(var_value) = self.vars.get(var_name) {
                        result.replace_range(dollar..var_end, var_value);
                        start = dollar + var_value.len();
                    } else {
                        start = var_end;
                    }
                } else {
                    break;
                }
            } else {
                start = var_start;
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_resolve() {
        let env = Environment::new().set("PLATFORM", "linux-x64");
        assert_eq!(env.resolve("dist-${PLATFORM}.tar.gz"), "dist-linux-x64.tar.gz");
    }

    #[test]
    fn test_environment_resolve_unknown_var() {
        let env = Environment::new();
        assert_eq!(env.resolve("dist-${PLATFORM}"), "dist-${PLATFORM}");
    }

    #[test]
    fn test_environment_resolve_keeps_surrounding_text() {
        let env = Environment::new()
            .set("PLATFORM", "linux-x64")
            .set("VERSION", "v1.2.3");

        assert_eq!(
            env.resolve("make dist TARGET=${PLATFORM} TAG=${VERSION}"),
            "make dist TARGET=linux-x64 TAG=v1.2.3"
        );
        assert_eq!(env.resolve("a-${PLATFORM}-b"), "a-linux-x64-b");
    }

    #[test]
    fn test_environment_resolve_after_unknown_var() {
        let env = Environment::new().set("KNOWN", "x");
        assert_eq!(env.resolve("${MISSING}/${KNOWN}"), "${MISSING}/x");
    }
}

//! Matrix expansion over a platform axis
//!
//! A job node carrying a platform axis fans out into one independent
//! instance per platform. Axis order carries no priority but fixes the
//! deterministic scheduling tie-break.

use serde::{Deserialize, Serialize};

use super::errors::ValidationError;
use super::graph::JobNode;
use super::instance::JobInstance;

/// Env var each matrix cell receives with its platform id
pub const PLATFORM_VAR: &str = "PLATFORM";

/// Ordered, duplicate-free sequence of platform identifiers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PlatformAxis {
    /// Platform identifiers, in declaration order
    pub platforms: Vec<String>,
}

impl PlatformAxis {
    /// Creates an axis from platform ids
    #[must_use]
    pub fn new(platforms: Vec<String>) -> Self {
        Self { platforms }
    }

    /// Creates an axis from string slices
    #[must_use]
    pub fn of(platforms: &[&str]) -> Self {
        Self::new(platforms.iter().map(ToString::to_string).collect())
    }

    /// Validates the axis for the given job id.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::EmptyAxis`] for an empty axis and
    /// [`ValidationError::DuplicatePlatform`] for repeated entries.
    pub fn validate_for(&self, job_id: &str) -> Result<(), ValidationError> {
        if self.platforms.is_empty() {
            return Err(ValidationError::EmptyAxis {
                id: job_id.to_string(),
            });
        }

        for (i, platform) in self.platforms.iter().enumerate() {
            if self.platforms[..i].contains(platform) {
                return Err(ValidationError::DuplicatePlatform {
                    id: job_id.to_string(),
                    platform: platform.clone(),
                });
            }
        }

        Ok(())
    }

    /// Returns the number of platforms on the axis
    #[must_use]
    pub fn len(&self) -> usize {
        self.platforms.len()
    }

    /// Returns true if the axis is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.platforms.is_empty()
    }
}

/// Expands a job node into its concrete instances.
///
/// A node without an axis yields exactly one instance. A node with an
/// axis yields one instance per platform, in axis order; the instances
/// inherit the parent's dependencies and predicate through the node id
/// and share no mutable state.
#[must_use]
pub fn expand_node(node: &JobNode) -> Vec<JobInstance> {
    match &node.platform_axis {
        None => vec![JobInstance::for_node(&node.id)],
        Some(axis) => axis
            .platforms
            .iter()
            .map(|platform| JobInstance::for_platform(&node.id, platform))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::super::steps::Step;
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_axis_validation_empty() {
        let axis = PlatformAxis::default();
        assert!(matches!(
            axis.validate_for("dist"),
            Err(ValidationError::EmptyAxis { .. })
        ));
    }

    #[test]
    fn test_axis_validation_duplicates() {
        let axis = PlatformAxis::of(&["linux-x64", "linux-x64"]);
        assert!(matches!(
            axis.validate_for("dist"),
            Err(ValidationError::DuplicatePlatform { .. })
        ));
    }

    #[test]
    fn test_expand_plain_node() {
        let node = JobNode::builder("unit-tests")
            .step(Step::shell("cargo test"))
            .build()
            .unwrap();

        let instances = expand_node(&node);
        assert_eq!(instances.len(), 1);
        assert_eq!(instances[0].instance_id, "unit-tests");
    }

    #[test]
    fn test_expand_matrix_node() {
        let node = JobNode::builder("dist")
            .depends_on("unit-tests")
            .platform_axis(PlatformAxis::of(&["a", "b", "c"]))
            .step(Step::shell("make dist"))
            .build()
            .unwrap();

        let instances = expand_node(&node);
        assert_eq!(instances.len(), 3);

        let platforms: Vec<_> = instances
            .iter()
            .map(|i| i.platform_id.clone().unwrap())
            .collect();
        assert_eq!(platforms, vec!["a", "b", "c"]);

        // Every cell is driven by the same node, so they all share the
        // parent's dependency set.
        assert!(instances.iter().all(|i| i.node_id == "dist"));
    }
}

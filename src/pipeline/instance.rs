//! Job instances and their status lifecycle
//!
//! A job instance is one concrete, schedulable execution of a job node,
//! materialized by matrix expansion. The status transition is the only
//! mutation an instance undergoes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of a job instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Waiting for dependencies to become terminal
    Pending,
    /// Dispatched to an executor
    Running,
    /// Execution completed successfully
    Succeeded,
    /// Execution failed
    Failed,
    /// Run predicate was false; never executed
    Skipped,
    /// A dependency failed or the run was cancelled; never executed
    Cancelled,
}

impl JobStatus {
    /// Returns true if the status is terminal
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Succeeded | Self::Failed | Self::Skipped | Self::Cancelled
        )
    }

    /// Returns true if a dependent may still run after this status
    ///
    /// Skipped dependencies satisfy their dependents; only failures and
    /// cancellations propagate downward.
    #[must_use]
    pub fn satisfies_dependents(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Skipped)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "PENDING"),
            Self::Running => write!(f, "RUNNING"),
            Self::Succeeded => write!(f, "SUCCEEDED"),
            Self::Failed => write!(f, "FAILED"),
            Self::Skipped => write!(f, "SKIPPED"),
            Self::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

/// Outcome of the publish side effect attached to an instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PublishOutcome {
    /// The instance carries no publish side effect
    #[default]
    NotPublishing,
    /// The push/release side effect executed
    Published,
    /// The body ran but the gate suppressed the side effect (soft skip)
    GateSkipped,
}

/// One concrete, schedulable execution of a job node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobInstance {
    /// Instance id: the node id, suffixed with the platform for matrix cells
    pub instance_id: String,

    /// Id of the node this instance was expanded from
    pub node_id: String,

    /// Platform this instance targets, for matrix cells
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform_id: Option<String>,

    /// Current status
    pub status: JobStatus,

    /// Publish side-effect outcome, observable per instance
    #[serde(default)]
    pub publish_outcome: PublishOutcome,
}

impl JobInstance {
    /// Creates a pending instance for a plain (non-matrix) node
    #[must_use]
    pub fn for_node(node_id: impl Into<String>) -> Self {
        let node_id = node_id.into();
        Self {
            instance_id: node_id.clone(),
            node_id,
            platform_id: None,
            status: JobStatus::Pending,
            publish_outcome: PublishOutcome::NotPublishing,
        }
    }

    /// Creates a pending instance for one matrix cell
    #[must_use]
    pub fn for_platform(node_id: impl Into<String>, platform_id: impl Into<String>) -> Self {
        let node_id = node_id.into();
        let platform_id = platform_id.into();
        Self {
            instance_id: format!("{node_id}/{platform_id}"),
            node_id,
            platform_id: Some(platform_id),
            status: JobStatus::Pending,
            publish_outcome: PublishOutcome::NotPublishing,
        }
    }
}

impl fmt::Display for JobInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.instance_id, self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_statuses() {
        assert!(!JobStatus::Pending.is_terminal());
        assert!(!JobStatus::Running.is_terminal());
        assert!(JobStatus::Succeeded.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
        assert!(JobStatus::Skipped.is_terminal());
        assert!(JobStatus::Cancelled.is_terminal());
    }

    #[test]
    fn test_skipped_satisfies_dependents() {
        assert!(JobStatus::Succeeded.satisfies_dependents());
        assert!(JobStatus::Skipped.satisfies_dependents());
        assert!(!JobStatus::Failed.satisfies_dependents());
        assert!(!JobStatus::Cancelled.satisfies_dependents());
    }

    #[test]
    fn test_instance_ids() {
        let plain = JobInstance::for_node("unit-tests");
        assert_eq!(plain.instance_id, "unit-tests");
        assert_eq!(plain.platform_id, None);

        let cell = JobInstance::for_platform("dist", "linux-x64");
        assert_eq!(cell.instance_id, "dist/linux-x64");
        assert_eq!(cell.platform_id.as_deref(), Some("linux-x64"));
    }
}

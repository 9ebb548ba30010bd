//! Run reports
//!
//! The user-visible outcome of a pipeline run: one line per instance plus
//! the aggregated run status.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::pipeline::instance::{JobInstance, JobStatus, PublishOutcome};
use crate::pipeline::version::ResolvedVersion;

/// Final outcome of one job instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstanceOutcome {
    /// Ran and succeeded (including any publish side effect)
    Succeeded,
    /// Ran and failed
    Failed,
    /// Never ran: run predicate was false
    SkippedPredicate,
    /// Ran, but the publish gate suppressed the side effect
    SkippedPublishGate,
    /// Never ran: a dependency failed or the run was cancelled
    Cancelled,
}

impl InstanceOutcome {
    /// Classifies a finished instance
    #[must_use]
    pub fn from_instance(instance: &JobInstance) -> Self {
        match (instance.status, instance.publish_outcome) {
            (JobStatus::Succeeded, PublishOutcome::GateSkipped) => Self::SkippedPublishGate,
            (JobStatus::Succeeded, _) => Self::Succeeded,
            (JobStatus::Failed, _) => Self::Failed,
            (JobStatus::Skipped, _) => Self::SkippedPredicate,
            // Pending/Running only appear here if the run was torn down.
            (JobStatus::Cancelled | JobStatus::Pending | JobStatus::Running, _) => Self::Cancelled,
        }
    }

    /// Returns true if this outcome counts against the run
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed)
    }
}

impl fmt::Display for InstanceOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Succeeded => write!(f, "succeeded"),
            Self::Failed => write!(f, "failed"),
            Self::SkippedPredicate => write!(f, "skipped (predicate false)"),
            Self::SkippedPublishGate => write!(f, "skipped (publish gate)"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Report line for one instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceReport {
    /// Instance id
    pub instance_id: String,

    /// Node the instance was expanded from
    pub node_id: String,

    /// Platform, for matrix cells
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform_id: Option<String>,

    /// Final outcome
    pub outcome: InstanceOutcome,
}

/// Aggregated result of a pipeline run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    /// Unique id of the run
    pub run_id: Uuid,

    /// Version tags resolved for the run
    pub version: ResolvedVersion,

    /// Per-instance outcomes, in scheduling order
    pub instances: Vec<InstanceReport>,
}

impl RunReport {
    /// Returns true if no instance failed or was cancelled
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.instances.iter().all(|i| {
            matches!(
                i.outcome,
                InstanceOutcome::Succeeded
                    | InstanceOutcome::SkippedPredicate
                    | InstanceOutcome::SkippedPublishGate
            )
        })
    }

    /// Returns true if any instance failed
    #[must_use]
    pub fn has_failure(&self) -> bool {
        self.instances.iter().any(|i| i.outcome.is_failure())
    }

    /// Process exit code for the run: zero only when every instance
    /// succeeded or was (soft-)skipped
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        i32::from(!self.is_success())
    }

    /// Looks up one instance's outcome by id
    #[must_use]
    pub fn outcome_of(&self, instance_id: &str) -> Option<InstanceOutcome> {
        self.instances
            .iter()
            .find(|i| i.instance_id == instance_id)
            .map(|i| i.outcome)
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "run {} ({} / {}):",
            self.run_id, self.version.primary_tag, self.version.legacy_tag
        )?;
        for instance in &self.instances {
            writeln!(f, "  {:<40} {}", instance.instance_id, instance.outcome)?;
        }
        write!(
            f,
            "overall: {}",
            if self.is_success() { "success" } else { "failure" }
        )
    }
}

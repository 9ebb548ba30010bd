//! Prelude module for common imports

// Re-export all pipeline types with full paths
pub use crate::pipeline::artifacts::{ArtifactHandle, ArtifactRef, ArtifactRelay};
pub use crate::pipeline::errors::{PipelineError, ValidationError};
pub use crate::pipeline::graph::{JobGraph, JobNode, JobNodeBuilder, WhenCondition};
pub use crate::pipeline::instance::{JobInstance, JobStatus, PublishOutcome};
pub use crate::pipeline::matrix::{PLATFORM_VAR, PlatformAxis};
pub use crate::pipeline::publish::{ImageTag, PublishSpec, ReleaseAsset, should_publish};
pub use crate::pipeline::release::release_graph;
pub use crate::pipeline::steps::{OutputDecl, Step};
pub use crate::pipeline::trigger::{EventKind, TriggerContext};
pub use crate::pipeline::version::{PROTECTED_BRANCH, ResolvedVersion, sanitize_ref};
pub use crate::pipeline::{Environment, Validate};

// Re-export executor and scheduler types
pub use crate::executor::{
    CoverageReporter, ExecutionOutput, ExecutionRequest, JobExecutor, LocalExecutor,
    RegistryClient, ReleaseClient,
};
pub use crate::scheduler::{
    CancelHandle, InstanceOutcome, InstanceReport, RunCoordinator, RunReport, Scheduler, Services,
};

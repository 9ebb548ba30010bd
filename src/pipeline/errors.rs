//! Error types for the orchestration domain

use thiserror::Error;

/// Errors that can occur while running a pipeline
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    /// Configuration was malformed; the run never starts
    #[error("Configuration error: {0}")]
    Configuration(#[from] ValidationError),

    /// A job's delegated execution exited non-zero
    #[error("Job '{instance}' failed with exit code {code}")]
    StepFailure {
        /// Instance that failed.
        instance: String,
        /// Exit code returned by the delegated execution.
        code: i32,
    },

    /// An external service (registry, release service, artifact store)
    /// was unreachable or rejected the request
    #[error("External service '{service}' failed: {reason}")]
    ExternalService {
        /// Name of the failing service.
        service: String,
        /// Reason reported by the service.
        reason: String,
    },

    /// A consumer asked for an artifact its producer never published
    #[error("Artifact '{name}' not found in relay")]
    ArtifactMissing {
        /// Name of the missing artifact.
        name: String,
    },

    /// An artifact name was written twice
    #[error("Artifact '{name}' already produced by instance '{producer}'")]
    ArtifactConflict {
        /// Name of the conflicting artifact.
        name: String,
        /// Instance that already owns the name.
        producer: String,
    },

    /// The run was cancelled by a superseding trigger
    #[error("Run cancelled")]
    RunCancelled,

    /// IO error occurred
    #[error("IO error: {0}")]
    Io(String),
}

impl From<std::io::Error> for PipelineError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

/// Validation errors for trigger input and graph definitions
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Ref name cannot be empty
    #[error("Ref name cannot be empty")]
    EmptyRef,

    /// Commit hash is too short or not hexadecimal
    #[error("Invalid commit hash: '{hash}'")]
    InvalidCommitHash {
        /// The offending hash.
        hash: String,
    },

    /// Job id cannot be empty
    #[error("Job id cannot be empty")]
    EmptyJobId,

    /// Two jobs declared the same id
    #[error("Duplicate job id: '{id}'")]
    DuplicateJobId {
        /// The duplicated id.
        id: String,
    },

    /// A dependency edge points at an undeclared job
    #[error("Job '{id}' depends on unknown job '{dependency}'")]
    UnknownDependency {
        /// Job declaring the edge.
        id: String,
        /// The undeclared dependency.
        dependency: String,
    },

    /// The dependency graph contains a cycle
    #[error("Dependency cycle involving job '{id}'")]
    DependencyCycle {
        /// A job on the cycle.
        id: String,
    },

    /// A platform axis must name at least one platform
    #[error("Job '{id}' declares an empty platform axis")]
    EmptyAxis {
        /// Job declaring the axis.
        id: String,
    },

    /// Platform axis values must be unique
    #[error("Job '{id}' repeats platform '{platform}' in its axis")]
    DuplicatePlatform {
        /// Job declaring the axis.
        id: String,
        /// The repeated platform id.
        platform: String,
    },

    /// A job must have at least one step
    #[error("Job '{id}' has no steps")]
    EmptyJob {
        /// The empty job.
        id: String,
    },
}

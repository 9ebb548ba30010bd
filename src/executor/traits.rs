//! Execution and external service traits

use async_trait::async_trait;

use crate::pipeline::artifacts::{ArtifactHandle, ArtifactRef};
use crate::pipeline::errors::PipelineError;
use crate::pipeline::steps::{OutputDecl, Step};
use crate::pipeline::Environment;

/// Everything an executor needs to run one job instance
#[derive(Debug, Clone)]
pub struct ExecutionRequest {
    /// Instance being executed
    pub instance_id: String,

    /// Steps of the job body
    pub steps: Vec<Step>,

    /// Environment for the body; matrix cells carry their platform here
    pub env: Environment,

    /// Outputs the job declared it will produce
    pub outputs: Vec<OutputDecl>,
}

/// Result of a delegated job execution
#[derive(Debug, Clone)]
pub struct ExecutionOutput {
    /// Exit code of the body; zero means success
    pub exit_code: i32,

    /// Declared outputs, resolved to locations
    pub outputs: Vec<(String, ArtifactHandle)>,
}

impl ExecutionOutput {
    /// Returns true if the body exited zero
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Trait for running one job instance's opaque body
#[async_trait]
pub trait JobExecutor: Send + Sync {
    /// Executes the body and collects declared outputs.
    ///
    /// A non-zero exit code is a normal return, not an error; errors are
    /// reserved for the executor itself failing to run anything.
    ///
    /// # Errors
    ///
    /// Returns a [`PipelineError`] when the executor cannot dispatch the
    /// body at all.
    async fn execute(&self, request: &ExecutionRequest) -> Result<ExecutionOutput, PipelineError>;
}

/// Trait for pushing container images to a registry
#[async_trait]
pub trait RegistryClient: Send + Sync {
    /// Pushes an image under the given tags.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::ExternalService`] if the registry rejects
    /// the push or is unreachable.
    async fn push(
        &self,
        image: &str,
        tags: &[String],
        labels: &[(String, String)],
    ) -> Result<(), PipelineError>;
}

/// Trait for creating releases and uploading their assets
#[async_trait]
pub trait ReleaseClient: Send + Sync {
    /// Creates a release and returns its asset upload URL.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::ExternalService`] on rejection.
    async fn create_release(
        &self,
        tag_name: &str,
        name: &str,
        draft: bool,
        prerelease: bool,
    ) -> Result<String, PipelineError>;

    /// Uploads one asset to a previously created release.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::ExternalService`] on rejection.
    async fn upload_asset(
        &self,
        upload_url: &str,
        asset: &ArtifactHandle,
        asset_name: &str,
        content_type: &str,
    ) -> Result<(), PipelineError>;
}

/// Trait for best-effort coverage reporting
#[async_trait]
pub trait CoverageReporter: Send + Sync {
    /// Reports one coverage artifact under a label.
    ///
    /// Callers treat failures as non-fatal.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::ExternalService`] if the service rejects
    /// the report; the scheduler logs and swallows it.
    async fn report(&self, artifact: &ArtifactRef, label: &str) -> Result<(), PipelineError>;
}

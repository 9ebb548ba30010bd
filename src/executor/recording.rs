//! In-memory recording implementations of the execution interfaces
//!
//! Used by dry runs and tests: every call is recorded, nothing external
//! happens, and failures can be injected per instance or per service.

use ahash::AHashMap;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::Notify;

use super::traits::{
    CoverageReporter, ExecutionOutput, ExecutionRequest, JobExecutor, RegistryClient,
    ReleaseClient,
};
use crate::pipeline::artifacts::{ArtifactHandle, ArtifactRef};
use crate::pipeline::errors::PipelineError;

/// Executor that returns scripted exit codes without running anything
///
/// Instances not scripted succeed; declared outputs materialize as inline
/// handles carrying the instance id.
#[derive(Debug, Clone, Default)]
pub struct ScriptedExecutor {
    exit_codes: Arc<Mutex<AHashMap<String, i32>>>,
    executed: Arc<Mutex<Vec<String>>>,
    gate: Option<Arc<Notify>>,
}

impl ScriptedExecutor {
    /// Creates an executor where every instance succeeds
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts an exit code for one instance id
    #[must_use]
    pub fn with_exit_code(self, instance_id: impl Into<String>, code: i32) -> Self {
        self.exit_codes.lock().insert(instance_id.into(), code);
        self
    }

    /// Blocks every execution until `notify_waiters` is called on the gate
    #[must_use]
    pub fn with_gate(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    /// Returns the instance ids that were executed, in dispatch order
    #[must_use]
    pub fn executed(&self) -> Vec<String> {
        self.executed.lock().clone()
    }
}

#[async_trait]
impl JobExecutor for ScriptedExecutor {
    async fn execute(&self, request: &ExecutionRequest) -> Result<ExecutionOutput, PipelineError> {
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        self.executed.lock().push(request.instance_id.clone());

        let exit_code = self
            .exit_codes
            .lock()
            .get(&request.instance_id)
            .copied()
            .unwrap_or(0);

        let outputs = if exit_code == 0 {
            request
                .outputs
                .iter()
                .map(|decl| {
                    (
                        request.env.resolve(&decl.name),
                        ArtifactHandle::Inline(request.instance_id.clone()),
                    )
                })
                .collect()
        } else {
            Vec::new()
        };

        Ok(ExecutionOutput { exit_code, outputs })
    }
}

/// Registry client that records pushes instead of performing them
#[derive(Debug, Clone, Default)]
pub struct RecordingRegistry {
    pushes: Arc<Mutex<Vec<(String, Vec<String>)>>>,
    fail: Arc<Mutex<bool>>,
}

impl RecordingRegistry {
    /// Creates a registry that accepts every push
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent push fail
    pub fn fail_pushes(&self) {
        *self.fail.lock() = true;
    }

    /// Returns recorded `(image, tags)` pushes in order
    #[must_use]
    pub fn pushes(&self) -> Vec<(String, Vec<String>)> {
        self.pushes.lock().clone()
    }
}

#[async_trait]
impl RegistryClient for RecordingRegistry {
    async fn push(
        &self,
        image: &str,
        tags: &[String],
        _labels: &[(String, String)],
    ) -> Result<(), PipelineError> {
        if *self.fail.lock() {
            return Err(PipelineError::ExternalService {
                service: "registry".to_string(),
                reason: "push rejected".to_string(),
            });
        }
        self.pushes
            .lock()
            .push((image.to_string(), tags.to_vec()));
        Ok(())
    }
}

/// Release client that records releases and uploads
#[derive(Debug, Clone, Default)]
pub struct RecordingRelease {
    releases: Arc<Mutex<Vec<(String, String, bool, bool)>>>,
    uploads: Arc<Mutex<Vec<(String, String)>>>,
}

impl RecordingRelease {
    /// Creates a release client that accepts everything
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns recorded `(tag, name, draft, prerelease)` releases
    #[must_use]
    pub fn releases(&self) -> Vec<(String, String, bool, bool)> {
        self.releases.lock().clone()
    }

    /// Returns recorded `(upload_url, asset_name)` uploads
    #[must_use]
    pub fn uploads(&self) -> Vec<(String, String)> {
        self.uploads.lock().clone()
    }
}

#[async_trait]
impl ReleaseClient for RecordingRelease {
    async fn create_release(
        &self,
        tag_name: &str,
        name: &str,
        draft: bool,
        prerelease: bool,
    ) -> Result<String, PipelineError> {
        self.releases
            .lock()
            .push((tag_name.to_string(), name.to_string(), draft, prerelease));
        Ok(format!("mem://uploads/{tag_name}"))
    }

    async fn upload_asset(
        &self,
        upload_url: &str,
        _asset: &ArtifactHandle,
        asset_name: &str,
        _content_type: &str,
    ) -> Result<(), PipelineError> {
        self.uploads
            .lock()
            .push((upload_url.to_string(), asset_name.to_string()));
        Ok(())
    }
}

/// Coverage reporter that records labels, with injectable failure
#[derive(Debug, Clone, Default)]
pub struct RecordingCoverage {
    reports: Arc<Mutex<Vec<String>>>,
    fail: Arc<Mutex<bool>>,
}

impl RecordingCoverage {
    /// Creates a reporter that accepts every report
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent report fail
    pub fn fail_reports(&self) {
        *self.fail.lock() = true;
    }

    /// Returns recorded labels in order
    #[must_use]
    pub fn reports(&self) -> Vec<String> {
        self.reports.lock().clone()
    }
}

#[async_trait]
impl CoverageReporter for RecordingCoverage {
    async fn report(&self, _artifact: &ArtifactRef, label: &str) -> Result<(), PipelineError> {
        if *self.fail.lock() {
            return Err(PipelineError::ExternalService {
                service: "coverage".to_string(),
                reason: "report rejected".to_string(),
            });
        }
        self.reports.lock().push(label.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::steps::OutputDecl;
    use crate::pipeline::{Environment, Step};

    #[tokio::test]
    async fn test_scripted_exit_codes() {
        let executor = ScriptedExecutor::new().with_exit_code("bad", 1);

        let ok = executor
            .execute(&ExecutionRequest {
                instance_id: "good".to_string(),
                steps: vec![Step::echo("hi")],
                env: Environment::new(),
                outputs: vec![OutputDecl::new("out", "out.bin")],
            })
            .await
            .unwrap();
        assert!(ok.is_success());
        assert_eq!(ok.outputs.len(), 1);

        let bad = executor
            .execute(&ExecutionRequest {
                instance_id: "bad".to_string(),
                steps: vec![Step::echo("hi")],
                env: Environment::new(),
                outputs: vec![],
            })
            .await
            .unwrap();
        assert_eq!(bad.exit_code, 1);

        assert_eq!(executor.executed(), vec!["good", "bad"]);
    }

    #[tokio::test]
    async fn test_recording_registry_failure_injection() {
        let registry = RecordingRegistry::new();
        registry
            .push("acme/node", &["v1".to_string()], &[])
            .await
            .unwrap();
        registry.fail_pushes();
        assert!(registry.push("acme/node", &[], &[]).await.is_err());
        assert_eq!(registry.pushes().len(), 1);
    }
}

//! Local job execution
//!
//! Runs job bodies as child processes on the orchestrator's own host.

use async_trait::async_trait;
use std::path::PathBuf;
use tokio::process::Command;
use tracing::{debug, info, warn};

use super::traits::{ExecutionOutput, ExecutionRequest, JobExecutor};
use crate::pipeline::artifacts::ArtifactHandle;
use crate::pipeline::errors::PipelineError;
use crate::pipeline::steps::Step;

/// Executes job bodies as local child processes
#[derive(Debug, Clone)]
pub struct LocalExecutor {
    /// Working directory for spawned commands
    working_dir: PathBuf,
}

impl LocalExecutor {
    /// Creates a local executor rooted at the current directory
    #[must_use]
    pub fn new() -> Self {
        Self {
            working_dir: std::env::current_dir().unwrap_or_default(),
        }
    }

    /// Sets the working directory for spawned commands
    #[must_use]
    pub fn with_working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = dir.into();
        self
    }

    async fn run_shell(
        &self,
        request: &ExecutionRequest,
        command: &str,
    ) -> Result<i32, PipelineError> {
        let resolved = request.env.resolve(command);
        let words = shell_words::split(&resolved)
            .map_err(|e| PipelineError::Io(format!("bad command '{resolved}': {e}")))?;

        let Some((program, args)) = words.split_first() else {
            return Err(PipelineError::Io(format!("empty command '{resolved}'")));
        };

        debug!(instance = %request.instance_id, command = %resolved, "spawning");

        let status = Command::new(program)
            .args(args)
            .envs(request.env.vars.iter())
            .current_dir(&self.working_dir)
            .status()
            .await?;

        Ok(status.code().unwrap_or(-1))
    }
}

impl Default for LocalExecutor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl JobExecutor for LocalExecutor {
    async fn execute(&self, request: &ExecutionRequest) -> Result<ExecutionOutput, PipelineError> {
        for step in &request.steps {
            match step {
                Step::Echo { message } => {
                    info!(instance = %request.instance_id, "{}", request.env.resolve(message));
                }
                Step::Shell { command } => {
                    let code = self.run_shell(request, command).await?;
                    if code != 0 {
                        warn!(
                            instance = %request.instance_id,
                            code,
                            "step exited non-zero"
                        );
                        return Ok(ExecutionOutput {
                            exit_code: code,
                            outputs: Vec::new(),
                        });
                    }
                }
            }
        }

        let outputs = request
            .outputs
            .iter()
            .map(|decl| {
                let path = self
                    .working_dir
                    .join(request.env.resolve(&decl.path))
                    .to_string_lossy()
                    .into_owned();
                (request.env.resolve(&decl.name), ArtifactHandle::Path(path))
            })
            .collect();

        Ok(ExecutionOutput {
            exit_code: 0,
            outputs,
        })
    }
}

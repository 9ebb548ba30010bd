//! Execution interfaces and implementations
//!
//! The orchestration core never inspects step internals: it hands a job
//! body to a [`JobExecutor`], observes the exit code, and collects the
//! declared outputs. Registry, release, and coverage services sit behind
//! equally narrow traits.

mod local;
mod recording;
mod traits;

pub use local::LocalExecutor;
pub use recording::{RecordingCoverage, RecordingRegistry, RecordingRelease, ScriptedExecutor};
pub use traits::{
    CoverageReporter, ExecutionOutput, ExecutionRequest, JobExecutor, RegistryClient,
    ReleaseClient,
};

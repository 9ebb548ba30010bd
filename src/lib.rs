//! # Shipline - Declarative build-and-release orchestration
//!
//! Shipline turns a triggering event (a pull request, a manual dispatch)
//! into a validated run of a declarative job graph: versions are resolved
//! up front, matrix jobs fan out one instance per platform, and publishing
//! jobs sit behind a gate that soft-skips side effects for unqualified
//! triggers instead of failing the run.
//!
//! ## Quick Start
//!
//! ```no_run
//! use shipline::infrastructure::Config;
//! use shipline::pipeline::release_graph;
//! use shipline::pipeline::trigger::{EventKind, TriggerContext};
//! use shipline::scheduler::{Scheduler, Services};
//! # fn services() -> Services { unimplemented!() }
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let config = Config::default();
//! let ctx = TriggerContext::resolve(
//!     EventKind::ManualDispatch,
//!     "master",
//!     "0123456789abcdef",
//!     Some("v1.2.3".to_string()),
//! )?;
//! let graph = release_graph(&config.image)?;
//! let report = Scheduler::new(graph, ctx, &config, services()).run().await?;
//! std::process::exit(report.exit_code());
//! # }
//! ```
//!
//! ## Features
//!
//! - **Validated job graphs**: duplicate ids, unknown dependencies, and
//!   cycles are rejected before anything runs
//! - **Matrix fan-out**: one instance per platform, fan-in on the node
//! - **Failure isolation**: a failure cancels its transitive dependents
//!   and nothing else
//! - **Publish gating**: unqualified triggers run job bodies but skip the
//!   effectful sub-action, reported distinctly from scheduler skips
//! - **Artifact relay**: named hand-off between producing and consuming
//!   instances within a run

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod cli;
pub mod executor;
pub mod infrastructure;
pub mod pipeline;
pub mod scheduler;

// Prelude module for common imports
pub mod prelude;

// Re-export commonly used types
pub use executor::{
    CoverageReporter, ExecutionOutput, ExecutionRequest, JobExecutor, LocalExecutor,
    RegistryClient, ReleaseClient,
};
pub use infrastructure::Config;
pub use pipeline::{
    ArtifactRelay, Environment, EventKind, JobGraph, JobNode, JobNodeBuilder, PipelineError,
    PlatformAxis, ResolvedVersion, Step, TriggerContext, Validate, ValidationError, WhenCondition,
    release_graph,
};
pub use scheduler::{CancelHandle, RunCoordinator, RunReport, Scheduler, Services};

/// Version of the shipline crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

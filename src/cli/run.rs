//! `shipline run` - execute the release pipeline for a trigger

use anyhow::{Context, Result};
use std::process::ExitCode;
use std::sync::Arc;

use super::{PipelineArgs, TriggerArgs};
use crate::executor::{LocalExecutor, RecordingCoverage, RecordingRegistry, RecordingRelease};
use crate::infrastructure::Config;
use crate::pipeline::release::release_graph;
use crate::pipeline::trigger::TriggerContext;
use crate::scheduler::{Scheduler, Services};

/// Builds the configuration from CLI flags over the defaults
pub fn build_config(pipeline: &PipelineArgs) -> Config {
    let mut config = Config::default();
    if let Some(image) = &pipeline.image {
        config.image = image.clone();
    }
    if let Some(branch) = &pipeline.protected_branch {
        config.protected_branch = branch.clone();
    }
    if let Some(jobs) = pipeline.jobs {
        config.max_parallel_jobs = jobs;
    }
    config
}

/// Resolves the trigger context from CLI flags
pub fn resolve_trigger(trigger: &TriggerArgs) -> Result<TriggerContext> {
    TriggerContext::resolve(
        trigger.event.into(),
        trigger.ref_name.clone(),
        trigger.commit.clone(),
        trigger.tag.clone(),
    )
    .context("invalid trigger")
}

/// Executes the stock release pipeline and prints the report.
///
/// Job bodies run locally; registry, release, and coverage calls go to
/// in-memory recorders, since the concrete services are deployment
/// specific and wired in by whoever embeds the library.
pub fn run_pipeline(trigger: &TriggerArgs, pipeline: &PipelineArgs, json: bool) -> Result<ExitCode> {
    let config = build_config(pipeline);
    let ctx = resolve_trigger(trigger)?;
    let graph = release_graph(&config.image).context("invalid release graph")?;

    let services = Services {
        executor: Arc::new(LocalExecutor::new()),
        registry: Arc::new(RecordingRegistry::new()),
        release: Arc::new(RecordingRelease::new()),
        coverage: Arc::new(RecordingCoverage::new()),
    };

    let scheduler = Scheduler::new(graph, ctx, &config, services);

    let runtime = tokio::runtime::Runtime::new().context("failed to start runtime")?;
    let report = runtime.block_on(scheduler.run())?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{report}");
    }

    Ok(if report.exit_code() == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

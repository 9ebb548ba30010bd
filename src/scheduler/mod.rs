//! Job graph scheduling
//!
//! A single control loop coordinates many concurrently executing job
//! instances: it dispatches every currently-eligible instance (bounded by
//! the configured pool size), wakes on completion events, and propagates
//! failure and cancellation along dependency edges. It never blocks on
//! I/O itself; job bodies are opaque external calls.

mod coordinator;
mod report;

pub use coordinator::{CancelHandle, RunCoordinator};
pub use report::{InstanceOutcome, InstanceReport, RunReport};

use ahash::AHashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::executor::{
    CoverageReporter, ExecutionRequest, JobExecutor, RegistryClient, ReleaseClient,
};
use crate::infrastructure::Config;
use crate::pipeline::artifacts::{ArtifactHandle, ArtifactRelay};
use crate::pipeline::errors::PipelineError;
use crate::pipeline::graph::{JobGraph, JobNode};
use crate::pipeline::instance::{JobInstance, JobStatus, PublishOutcome};
use crate::pipeline::matrix::{PLATFORM_VAR, expand_node};
use crate::pipeline::publish::{PublishSpec, should_publish};
use crate::pipeline::trigger::TriggerContext;
use crate::pipeline::version::ResolvedVersion;
use crate::pipeline::Validate;

/// Relay name under which a release job publishes its upload URL
pub const RELEASE_UPLOAD_URL: &str = "release-upload-url";

/// External collaborators a run talks to
#[derive(Clone)]
pub struct Services {
    /// Runs job bodies
    pub executor: Arc<dyn JobExecutor>,
    /// Pushes container images
    pub registry: Arc<dyn RegistryClient>,
    /// Creates releases and uploads assets
    pub release: Arc<dyn ReleaseClient>,
    /// Receives coverage reports, best-effort
    pub coverage: Arc<dyn CoverageReporter>,
}

/// Outcome a finished instance task reports back to the control loop
#[derive(Debug, Clone, Copy)]
struct TaskOutcome {
    status: JobStatus,
    publish: PublishOutcome,
}

/// Schedules and runs one pipeline
pub struct Scheduler {
    graph: Arc<JobGraph>,
    ctx: Arc<TriggerContext>,
    version: Arc<ResolvedVersion>,
    relay: ArtifactRelay,
    services: Services,
    max_parallel: usize,
    protected_branch: String,
    cancel: CancelHandle,
    cancel_rx: watch::Receiver<bool>,
    run_id: Uuid,
}

impl Scheduler {
    /// Creates a scheduler for one run.
    ///
    /// The version is derived here, once, and shared by reference with
    /// every instance that stamps artifacts.
    #[must_use]
    pub fn new(graph: JobGraph, ctx: TriggerContext, config: &Config, services: Services) -> Self {
        let version = ResolvedVersion::derive(&ctx, &config.protected_branch);
        let (cancel, cancel_rx) = CancelHandle::new();
        Self {
            graph: Arc::new(graph),
            ctx: Arc::new(ctx),
            version: Arc::new(version),
            relay: ArtifactRelay::new(),
            services,
            max_parallel: config.max_parallel_jobs.max(1),
            protected_branch: config.protected_branch.clone(),
            cancel,
            cancel_rx,
            run_id: Uuid::new_v4(),
        }
    }

    /// Returns a handle that cancels this run
    #[must_use]
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Returns the version resolved for this run
    #[must_use]
    pub fn version(&self) -> &ResolvedVersion {
        &self.version
    }

    /// Returns the run's artifact relay
    #[must_use]
    pub fn relay(&self) -> &ArtifactRelay {
        &self.relay
    }

    /// Runs the pipeline to completion and returns the report.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Configuration`] when the graph is invalid;
    /// job failures are reported per instance, not as errors.
    pub async fn run(&self) -> Result<RunReport, PipelineError> {
        self.graph.validate()?;

        // Materialize instances in deterministic topological order; axis
        // order is the tie-break among matrix cells.
        let order = self.graph.topo_order()?;
        let mut instances: Vec<JobInstance> = Vec::new();
        let mut by_node: AHashMap<String, Vec<usize>> = AHashMap::new();
        for id in order {
            let node = self
                .graph
                .node(id)
                .expect("topological order only yields graph nodes");
            for instance in expand_node(node) {
                by_node
                    .entry(node.id.clone())
                    .or_default()
                    .push(instances.len());
                instances.push(instance);
            }
        }

        info!(
            run = %self.run_id,
            trigger = %self.ctx,
            instances = instances.len(),
            "starting run"
        );

        let mut rx = self.cancel_rx.clone();
        let mut tasks: JoinSet<(usize, TaskOutcome)> = JoinSet::new();
        let mut running = 0usize;

        loop {
            if *rx.borrow() {
                warn!(run = %self.run_id, "run cancelled, tearing down");
                tasks.abort_all();
                for instance in &mut instances {
                    if !instance.status.is_terminal() {
                        instance.status = JobStatus::Cancelled;
                    }
                }
                break;
            }

            // Settle pass: resolve cascades (cancellation, skips) and
            // dispatch eligible instances until a fixpoint.
            let mut changed = true;
            while changed {
                changed = false;
                for idx in 0..instances.len() {
                    if instances[idx].status != JobStatus::Pending {
                        continue;
                    }
                    let node = self
                        .graph
                        .node(&instances[idx].node_id)
                        .expect("instances only reference graph nodes");

                    let dep_statuses: Vec<JobStatus> = node
                        .depends_on
                        .iter()
                        .flat_map(|dep| by_node[dep].iter().map(|&i| instances[i].status))
                        .collect();

                    if !dep_statuses.iter().all(JobStatus::is_terminal) {
                        continue;
                    }

                    if dep_statuses.iter().any(|s| !s.satisfies_dependents()) {
                        debug!(instance = %instances[idx].instance_id, "cancelled by dependency");
                        instances[idx].status = JobStatus::Cancelled;
                        changed = true;
                        continue;
                    }

                    if let Some(when) = &node.when {
                        if !when.evaluate(&self.ctx) {
                            debug!(instance = %instances[idx].instance_id, "predicate false, skipping");
                            instances[idx].status = JobStatus::Skipped;
                            changed = true;
                            continue;
                        }
                    }

                    if running >= self.max_parallel {
                        continue;
                    }

                    debug!(instance = %instances[idx].instance_id, "dispatching");
                    instances[idx].status = JobStatus::Running;
                    running += 1;
                    changed = true;
                    tasks.spawn(self.instance_task(idx, node.clone(), instances[idx].clone()));
                }
            }

            if running == 0 {
                break;
            }

            tokio::select! {
                _ = rx.changed() => {}
                Some(joined) = tasks.join_next() => {
                    running -= 1;
                    match joined {
                        Ok((idx, outcome)) => {
                            debug!(
                                instance = %instances[idx].instance_id,
                                status = %outcome.status,
                                "instance finished"
                            );
                            instances[idx].status = outcome.status;
                            instances[idx].publish_outcome = outcome.publish;
                        }
                        Err(e) if e.is_cancelled() => {}
                        Err(e) => warn!(run = %self.run_id, "instance task panicked: {e}"),
                    }
                }
            }
        }

        let report = RunReport {
            run_id: self.run_id,
            version: (*self.version).clone(),
            instances: instances
                .iter()
                .map(|instance| InstanceReport {
                    instance_id: instance.instance_id.clone(),
                    node_id: instance.node_id.clone(),
                    platform_id: instance.platform_id.clone(),
                    outcome: InstanceOutcome::from_instance(instance),
                })
                .collect(),
        };

        info!(
            run = %self.run_id,
            success = report.is_success(),
            "run finished"
        );
        Ok(report)
    }

    fn instance_task(
        &self,
        idx: usize,
        node: JobNode,
        instance: JobInstance,
    ) -> impl Future<Output = (usize, TaskOutcome)> + Send + 'static {
        let ctx = Arc::clone(&self.ctx);
        let version = Arc::clone(&self.version);
        let relay = self.relay.clone();
        let services = self.services.clone();
        let protected_branch = self.protected_branch.clone();

        async move {
            let outcome = run_instance(
                &node,
                &instance,
                &ctx,
                &version,
                &relay,
                &services,
                &protected_branch,
            )
            .await;
            (idx, outcome)
        }
    }
}

/// Runs one instance end to end: body, outputs, coverage, publish.
async fn run_instance(
    node: &JobNode,
    instance: &JobInstance,
    ctx: &TriggerContext,
    version: &ResolvedVersion,
    relay: &ArtifactRelay,
    services: &Services,
    protected_branch: &str,
) -> TaskOutcome {
    let mut env = node
        .env
        .clone()
        .set("VERSION", version.primary_tag.clone())
        .set("COMMIT_SHORT", ctx.commit_short());
    if let Some(platform) = &instance.platform_id {
        env = env.set(PLATFORM_VAR, platform.clone());
    }

    let request = ExecutionRequest {
        instance_id: instance.instance_id.clone(),
        steps: node.steps.clone(),
        env,
        outputs: node.outputs.clone(),
    };

    let output = match services.executor.execute(&request).await {
        Ok(output) => output,
        Err(e) => return settle_failure(node, instance, format!("executor error: {e}")),
    };

    if !output.is_success() {
        return settle_failure(
            node,
            instance,
            format!("body exited with code {}", output.exit_code),
        );
    }

    for (name, handle) in output.outputs {
        if let Err(e) = relay.put(&instance.instance_id, name, handle) {
            return settle_failure(node, instance, format!("artifact error: {e}"));
        }
    }

    // Coverage reporting is best-effort for every job: failures are
    // logged and never fail the instance.
    for name in &node.coverage_reports {
        match relay.get(name) {
            Ok(artifact) => {
                if let Err(e) = services.coverage.report(&artifact, name).await {
                    warn!(instance = %instance.instance_id, "coverage report '{name}' failed: {e}");
                }
            }
            Err(e) => {
                warn!(instance = %instance.instance_id, "coverage artifact '{name}' unavailable: {e}");
            }
        }
    }

    let publish = match &node.publish {
        None => PublishOutcome::NotPublishing,
        Some(spec) => {
            if should_publish(ctx, protected_branch) {
                match perform_publish(spec, instance, ctx, version, relay, services).await {
                    Ok(()) => PublishOutcome::Published,
                    Err(e) => {
                        return settle_failure(node, instance, format!("publish failed: {e}"));
                    }
                }
            } else {
                info!(instance = %instance.instance_id, "publish gate closed, soft skip");
                PublishOutcome::GateSkipped
            }
        }
    };

    TaskOutcome {
        status: JobStatus::Succeeded,
        publish,
    }
}

/// Maps a failure to the instance's terminal status, honoring best-effort
/// jobs whose failures are swallowed.
fn settle_failure(node: &JobNode, instance: &JobInstance, reason: String) -> TaskOutcome {
    if node.best_effort {
        warn!(instance = %instance.instance_id, "best-effort job failed: {reason}");
        TaskOutcome {
            status: JobStatus::Succeeded,
            publish: PublishOutcome::NotPublishing,
        }
    } else {
        warn!(instance = %instance.instance_id, "{reason}");
        TaskOutcome {
            status: JobStatus::Failed,
            publish: PublishOutcome::NotPublishing,
        }
    }
}

/// Executes the effectful sub-action of a publishing instance.
async fn perform_publish(
    spec: &PublishSpec,
    instance: &JobInstance,
    ctx: &TriggerContext,
    version: &ResolvedVersion,
    relay: &ArtifactRelay,
    services: &Services,
) -> Result<(), PipelineError> {
    match spec {
        PublishSpec::PushImage {
            image,
            tags,
            labels,
        } => {
            let resolved: Vec<String> = tags.iter().map(|t| t.resolve(version)).collect();
            services.registry.push(image, &resolved, labels).await
        }
        PublishSpec::CreateRelease {
            name,
            draft,
            prerelease,
            assets,
        } => {
            // Hard precondition: a release is only ever cut for an
            // explicitly supplied tag.
            let Some(tag) = ctx.user_tag.clone() else {
                return Err(PipelineError::ExternalService {
                    service: "release".to_string(),
                    reason: "no tag supplied for release creation".to_string(),
                });
            };

            let upload_url = services
                .release
                .create_release(&tag, name, *draft, *prerelease)
                .await?;
            relay.put(
                &instance.instance_id,
                RELEASE_UPLOAD_URL,
                ArtifactHandle::Inline(upload_url.clone()),
            )?;

            for asset in assets {
                let artifact = relay.get(&asset.artifact)?;
                services
                    .release
                    .upload_asset(
                        &upload_url,
                        &artifact.handle,
                        &asset.asset_name,
                        &asset.content_type,
                    )
                    .await?;
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::{
        RecordingCoverage, RecordingRegistry, RecordingRelease, ScriptedExecutor,
    };
    use crate::pipeline::graph::WhenCondition;
    use crate::pipeline::matrix::PlatformAxis;
    use crate::pipeline::publish::{ImageTag, ReleaseAsset};
    use crate::pipeline::release::release_graph;
    use crate::pipeline::trigger::EventKind;
    use crate::pipeline::Step;
    use pretty_assertions::assert_eq;

    struct Recorded {
        executor: ScriptedExecutor,
        registry: RecordingRegistry,
        release: RecordingRelease,
        coverage: RecordingCoverage,
    }

    impl Recorded {
        fn new(executor: ScriptedExecutor) -> Self {
            Self {
                executor,
                registry: RecordingRegistry::new(),
                release: RecordingRelease::new(),
                coverage: RecordingCoverage::new(),
            }
        }

        fn services(&self) -> Services {
            Services {
                executor: Arc::new(self.executor.clone()),
                registry: Arc::new(self.registry.clone()),
                release: Arc::new(self.release.clone()),
                coverage: Arc::new(self.coverage.clone()),
            }
        }
    }

    fn ctx(event: EventKind, ref_name: &str, tag: Option<&str>) -> TriggerContext {
        TriggerContext::resolve(event, ref_name, "abcdef0123", tag.map(String::from)).unwrap()
    }

    fn job(id: &str, deps: &[&str]) -> JobNode {
        let mut builder = JobNode::builder(id).step(Step::shell("true"));
        for dep in deps {
            builder = builder.depends_on(*dep);
        }
        builder.build().unwrap()
    }

    fn push_job(id: &str, tag: ImageTag) -> JobNode {
        JobNode::builder(id)
            .step(Step::shell("docker build ."))
            .publish(PublishSpec::PushImage {
                image: "acme/node".to_string(),
                tags: vec![tag],
                labels: Vec::new(),
            })
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_failure_cancels_dependents_but_not_siblings() {
        let mut graph = JobGraph::new();
        graph.add_node(job("x", &[])).unwrap();
        graph.add_node(job("y", &["x"])).unwrap();
        graph.add_node(job("grandchild", &["y"])).unwrap();
        graph.add_node(job("z", &[])).unwrap();

        let recorded = Recorded::new(ScriptedExecutor::new().with_exit_code("x", 1));
        let scheduler = Scheduler::new(
            graph,
            ctx(EventKind::ManualDispatch, "feature/x", None),
            &Config::default(),
            recorded.services(),
        );

        let report = scheduler.run().await.unwrap();
        assert_eq!(report.outcome_of("x"), Some(InstanceOutcome::Failed));
        assert_eq!(report.outcome_of("y"), Some(InstanceOutcome::Cancelled));
        assert_eq!(
            report.outcome_of("grandchild"),
            Some(InstanceOutcome::Cancelled)
        );
        assert_eq!(report.outcome_of("z"), Some(InstanceOutcome::Succeeded));
        assert!(report.has_failure());
        assert_eq!(report.exit_code(), 1);
    }

    #[tokio::test]
    async fn test_skipped_dependency_satisfies_dependents() {
        let mut graph = JobGraph::new();
        let gated = JobNode::builder("gated")
            .step(Step::shell("true"))
            .when(WhenCondition::TagPresent)
            .build()
            .unwrap();
        graph.add_node(gated).unwrap();
        graph.add_node(job("after", &["gated"])).unwrap();

        let recorded = Recorded::new(ScriptedExecutor::new());
        let scheduler = Scheduler::new(
            graph,
            ctx(EventKind::ManualDispatch, "feature/x", None),
            &Config::default(),
            recorded.services(),
        );

        let report = scheduler.run().await.unwrap();
        assert_eq!(
            report.outcome_of("gated"),
            Some(InstanceOutcome::SkippedPredicate)
        );
        assert_eq!(report.outcome_of("after"), Some(InstanceOutcome::Succeeded));
        assert!(report.is_success());
    }

    #[tokio::test]
    async fn test_pull_request_soft_skips_publish() {
        let mut graph = JobGraph::new();
        graph.add_node(push_job("build-publish", ImageTag::Primary)).unwrap();

        let recorded = Recorded::new(ScriptedExecutor::new());
        let scheduler = Scheduler::new(
            graph,
            ctx(EventKind::PullRequest, "feature/x", None),
            &Config::default(),
            recorded.services(),
        );

        let report = scheduler.run().await.unwrap();
        // The body ran, but nothing was pushed.
        assert_eq!(recorded.executor.executed(), vec!["build-publish"]);
        assert!(recorded.registry.pushes().is_empty());
        assert_eq!(
            report.outcome_of("build-publish"),
            Some(InstanceOutcome::SkippedPublishGate)
        );
        assert!(report.is_success());
        assert_eq!(report.exit_code(), 0);
    }

    #[tokio::test]
    async fn test_explicit_tag_publishes_both_variants() {
        let mut graph = JobGraph::new();
        graph.add_node(push_job("build-publish", ImageTag::Primary)).unwrap();
        graph
            .add_node(push_job("build-publish-legacy", ImageTag::Legacy))
            .unwrap();

        let recorded = Recorded::new(ScriptedExecutor::new());
        let scheduler = Scheduler::new(
            graph,
            ctx(EventKind::PullRequest, "master", Some("v1.2.3")),
            &Config::default(),
            recorded.services(),
        );

        let report = scheduler.run().await.unwrap();
        assert!(report.is_success());

        let mut tags: Vec<String> = recorded
            .registry
            .pushes()
            .into_iter()
            .flat_map(|(_, tags)| tags)
            .collect();
        tags.sort();
        assert_eq!(tags, vec!["v1.2.3", "v1.2.3-legacy"]);
    }

    #[tokio::test]
    async fn test_registry_rejection_fails_instance() {
        let mut graph = JobGraph::new();
        graph.add_node(push_job("build-publish", ImageTag::Primary)).unwrap();

        let recorded = Recorded::new(ScriptedExecutor::new());
        recorded.registry.fail_pushes();
        let scheduler = Scheduler::new(
            graph,
            ctx(EventKind::ManualDispatch, "feature/x", None),
            &Config::default(),
            recorded.services(),
        );

        let report = scheduler.run().await.unwrap();
        assert_eq!(
            report.outcome_of("build-publish"),
            Some(InstanceOutcome::Failed)
        );
    }

    #[tokio::test]
    async fn test_matrix_artifacts_flow_into_release() {
        let mut graph = JobGraph::new();
        graph.add_node(
            JobNode::builder("dist")
                .platform_axis(PlatformAxis::of(&["a", "b", "c"]))
                .step(Step::shell("make dist"))
                .output("dist-${PLATFORM}", "dist/${PLATFORM}.tar.gz")
                .build()
                .unwrap(),
        )
        .unwrap();
        graph.add_node(
            JobNode::builder("create-release")
                .depends_on("dist")
                .when(WhenCondition::TagPresent)
                .step(Step::echo("release"))
                .publish(PublishSpec::CreateRelease {
                    name: "Release".to_string(),
                    draft: false,
                    prerelease: true,
                    assets: ["a", "b", "c"]
                        .iter()
                        .map(|p| {
                            ReleaseAsset::new(
                                format!("dist-{p}"),
                                format!("{p}.tar.gz"),
                                "application/gzip",
                            )
                        })
                        .collect(),
                })
                .build()
                .unwrap(),
        )
        .unwrap();

        let recorded = Recorded::new(ScriptedExecutor::new());
        let scheduler = Scheduler::new(
            graph,
            ctx(EventKind::ManualDispatch, "master", Some("v2.0.0")),
            &Config::default(),
            recorded.services(),
        );

        let report = scheduler.run().await.unwrap();
        assert!(report.is_success());
        assert_eq!(
            report.outcome_of("create-release"),
            Some(InstanceOutcome::Succeeded)
        );

        assert_eq!(
            recorded.release.releases(),
            vec![("v2.0.0".to_string(), "Release".to_string(), false, true)]
        );
        assert_eq!(recorded.release.uploads().len(), 3);
        assert!(scheduler.relay().contains(RELEASE_UPLOAD_URL));
    }

    #[tokio::test]
    async fn test_release_hard_skipped_without_tag() {
        // Gate passes (dispatch on a feature branch), but the release
        // job's tag precondition does not.
        let mut graph = JobGraph::new();
        graph.add_node(
            JobNode::builder("create-release")
                .when(WhenCondition::TagPresent)
                .step(Step::echo("release"))
                .publish(PublishSpec::CreateRelease {
                    name: "Release".to_string(),
                    draft: false,
                    prerelease: true,
                    assets: Vec::new(),
                })
                .build()
                .unwrap(),
        )
        .unwrap();

        let recorded = Recorded::new(ScriptedExecutor::new());
        let scheduler = Scheduler::new(
            graph,
            ctx(EventKind::ManualDispatch, "feature/x", Some("")),
            &Config::default(),
            recorded.services(),
        );

        let report = scheduler.run().await.unwrap();
        assert_eq!(
            report.outcome_of("create-release"),
            Some(InstanceOutcome::SkippedPredicate)
        );
        assert!(recorded.release.releases().is_empty());
        assert!(recorded.executor.executed().is_empty());
    }

    #[tokio::test]
    async fn test_coverage_failure_is_non_fatal() {
        let mut graph = JobGraph::new();
        graph.add_node(
            JobNode::builder("unit-tests")
                .step(Step::shell("cargo test"))
                .output("unit-coverage", "cov.lcov")
                .build()
                .unwrap(),
        )
        .unwrap();
        graph.add_node(
            JobNode::builder("coverage-report")
                .depends_on("unit-tests")
                .step(Step::echo("upload"))
                .consumes("unit-coverage")
                .report_coverage("unit-coverage")
                .best_effort()
                .build()
                .unwrap(),
        )
        .unwrap();

        let recorded = Recorded::new(ScriptedExecutor::new());
        recorded.coverage.fail_reports();
        let scheduler = Scheduler::new(
            graph,
            ctx(EventKind::ManualDispatch, "master", None),
            &Config::default(),
            recorded.services(),
        );

        let report = scheduler.run().await.unwrap();
        assert_eq!(
            report.outcome_of("coverage-report"),
            Some(InstanceOutcome::Succeeded)
        );
        assert!(report.is_success());
    }

    #[tokio::test]
    async fn test_cancellation_tears_down_run() {
        let gate = Arc::new(tokio::sync::Notify::new());
        let mut graph = JobGraph::new();
        graph.add_node(job("slow", &[])).unwrap();
        graph.add_node(job("after", &["slow"])).unwrap();

        let recorded = Recorded::new(ScriptedExecutor::new().with_gate(Arc::clone(&gate)));
        let scheduler = Scheduler::new(
            graph,
            ctx(EventKind::PullRequest, "feature/x", None),
            &Config::default(),
            recorded.services(),
        );

        let handle = scheduler.cancel_handle();
        let (report, ()) = tokio::join!(scheduler.run(), async {
            tokio::time::sleep(std::time::Duration::from_millis(20)).await;
            handle.cancel();
        });

        let report = report.unwrap();
        assert_eq!(report.outcome_of("slow"), Some(InstanceOutcome::Cancelled));
        assert_eq!(report.outcome_of("after"), Some(InstanceOutcome::Cancelled));
        assert!(!report.is_success());
    }

    #[tokio::test]
    async fn test_stock_graph_dispatch_on_master_without_tag() {
        // End-to-end: manual dispatch, protected branch, no tag. Tags
        // resolve to the short commit and latest-legacy, the image jobs
        // soft-skip their pushes, and the release is hard-skipped.
        let recorded = Recorded::new(ScriptedExecutor::new());
        let scheduler = Scheduler::new(
            release_graph("acme/node").unwrap(),
            ctx(EventKind::ManualDispatch, "master", None),
            &Config::default(),
            recorded.services(),
        );

        assert_eq!(scheduler.version().primary_tag, "abcdef0");
        assert_eq!(scheduler.version().legacy_tag, "latest-legacy");

        let report = scheduler.run().await.unwrap();
        assert!(report.is_success());
        assert_eq!(
            report.outcome_of("build-publish"),
            Some(InstanceOutcome::SkippedPublishGate)
        );
        assert_eq!(
            report.outcome_of("build-publish-legacy"),
            Some(InstanceOutcome::SkippedPublishGate)
        );
        assert_eq!(
            report.outcome_of("create-release"),
            Some(InstanceOutcome::SkippedPredicate)
        );
        assert!(recorded.registry.pushes().is_empty());

        // All six dist cells ran and published their bundles.
        let dist_count = report
            .instances
            .iter()
            .filter(|i| i.node_id == "dist")
            .count();
        assert_eq!(dist_count, 6);
        assert!(scheduler.relay().contains("dist-linux-x64"));
    }

    #[tokio::test]
    async fn test_stock_graph_tagged_dispatch_publishes_everything() {
        let recorded = Recorded::new(ScriptedExecutor::new());
        let scheduler = Scheduler::new(
            release_graph("acme/node").unwrap(),
            ctx(EventKind::ManualDispatch, "master", Some("v3.0.0")),
            &Config::default(),
            recorded.services(),
        );

        let report = scheduler.run().await.unwrap();
        assert!(report.is_success());
        assert_eq!(recorded.registry.pushes().len(), 2);
        assert_eq!(recorded.release.releases().len(), 1);
        assert_eq!(
            recorded.release.uploads().len(),
            crate::pipeline::release::DIST_PLATFORMS.len()
        );
        assert_eq!(recorded.coverage.reports().len(), 2);
    }
}

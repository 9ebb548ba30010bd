//! `shipline plan` - show the expanded plan without executing anything

use anyhow::{Context, Result};

use super::{PipelineArgs, TriggerArgs};
use super::run::{build_config, resolve_trigger};
use crate::infrastructure::Config;
use crate::pipeline::graph::JobGraph;
use crate::pipeline::matrix::expand_node;
use crate::pipeline::publish::should_publish;
use crate::pipeline::release::release_graph;
use crate::pipeline::trigger::TriggerContext;
use crate::pipeline::version::ResolvedVersion;

/// One planned instance line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedInstance {
    /// Instance id
    pub instance_id: String,
    /// Whether the run predicate holds for this trigger
    pub will_run: bool,
    /// Whether the publish gate would allow the side effect
    pub will_publish: Option<bool>,
}

/// Expands the graph against a trigger without executing anything.
///
/// Instances appear in deterministic topological order, matrix cells in
/// axis order.
///
/// # Errors
///
/// Returns an error when the graph is invalid.
pub fn plan_instances(
    graph: &JobGraph,
    ctx: &TriggerContext,
    config: &Config,
) -> Result<Vec<PlannedInstance>> {
    let gate_open = should_publish(ctx, &config.protected_branch);
    let order = graph.topo_order().context("invalid graph")?;

    let mut planned = Vec::new();
    for id in order {
        let node = graph.node(id).context("unknown node in order")?;
        let will_run = node.when.as_ref().is_none_or(|w| w.evaluate(ctx));
        for instance in expand_node(node) {
            planned.push(PlannedInstance {
                instance_id: instance.instance_id,
                will_run,
                will_publish: node.publish.as_ref().map(|_| gate_open && will_run),
            });
        }
    }
    Ok(planned)
}

/// Prints the plan for the stock release graph
pub fn print_plan(trigger: &TriggerArgs, pipeline: &PipelineArgs) -> Result<()> {
    let config = build_config(pipeline);
    let ctx = resolve_trigger(trigger)?;
    let graph = release_graph(&config.image).context("invalid release graph")?;
    let version = ResolvedVersion::derive(&ctx, &config.protected_branch);

    println!("trigger:  {ctx}");
    println!("primary:  {}", version.primary_tag);
    println!("legacy:   {}", version.legacy_tag);
    println!();

    for planned in plan_instances(&graph, &ctx, &config)? {
        let publish = match planned.will_publish {
            Some(true) => "  [publish]",
            Some(false) => "  [publish gated off]",
            None => "",
        };
        let run = if planned.will_run { "run " } else { "skip" };
        println!("{run}  {}{publish}", planned.instance_id);
    }

    Ok(())
}

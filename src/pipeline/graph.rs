//! Job nodes and the dependency graph
//!
//! The declarative job graph is an explicit in-memory DAG: nodes live in
//! an arena and reference each other by id, never by cyclic pointers.

#![allow(clippy::must_use_candidate, clippy::return_self_not_must_use)]

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use super::errors::ValidationError;
use super::matrix::PlatformAxis;
use super::publish::PublishSpec;
use super::steps::{OutputDecl, Step};
use super::trigger::{EventKind, TriggerContext};
use super::version::sanitize_ref;
use super::{Environment, Validate};

/// Run predicate for a job node, evaluated over the trigger context
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WhenCondition {
    /// Run only when the sanitized ref matches the given branch
    Branch {
        /// Branch name to match
        branch: String,
    },

    /// Run only when a user tag was explicitly supplied
    TagPresent,

    /// Run only for the given event kind
    Event {
        /// Event kind to match
        event: EventKind,
    },

    /// Negation of a condition
    Not {
        /// Condition to negate
        condition: Box<WhenCondition>,
    },

    /// All conditions must hold
    AllOf {
        /// List of conditions
        conditions: Vec<WhenCondition>,
    },

    /// At least one condition must hold
    AnyOf {
        /// List of conditions
        conditions: Vec<WhenCondition>,
    },
}

impl WhenCondition {
    /// Creates a branch condition
    pub fn branch(branch: impl Into<String>) -> Self {
        Self::Branch {
            branch: branch.into(),
        }
    }

    /// Creates an event condition
    pub fn event(event: EventKind) -> Self {
        Self::Event { event }
    }

    /// Negates a condition
    pub fn not(condition: WhenCondition) -> Self {
        Self::Not {
            condition: Box::new(condition),
        }
    }

    /// Creates an all-of condition
    pub fn all_of(conditions: Vec<WhenCondition>) -> Self {
        Self::AllOf { conditions }
    }

    /// Creates an any-of condition
    pub fn any_of(conditions: Vec<WhenCondition>) -> Self {
        Self::AnyOf { conditions }
    }

    /// Evaluates this condition against a trigger context
    #[must_use]
    pub fn evaluate(&self, ctx: &TriggerContext) -> bool {
        match self {
            Self::Branch { branch } => sanitize_ref(&ctx.ref_name) == *branch,
            Self::TagPresent => ctx.has_tag(),
            Self::Event { event } => ctx.event == *event,
            Self::Not { condition } => !condition.evaluate(ctx),
            Self::AllOf { conditions } => conditions.iter().all(|c| c.evaluate(ctx)),
            Self::AnyOf { conditions } => conditions.iter().any(|c| c.evaluate(ctx)),
        }
    }
}

/// A declared unit of work with dependencies and an optional platform axis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobNode {
    /// Job id, unique within the graph
    pub id: String,

    /// Ids of jobs this one depends on
    #[serde(skip_serializing_if = "BTreeSet::is_empty", default)]
    pub depends_on: BTreeSet<String>,

    /// Platform axis to expand over, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform_axis: Option<PlatformAxis>,

    /// Run predicate; absent means always run
    #[serde(skip_serializing_if = "Option::is_none")]
    pub when: Option<WhenCondition>,

    /// Publish side effect, if this is a publishing job
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publish: Option<PublishSpec>,

    /// Steps in the job body
    pub steps: Vec<Step>,

    /// Per-job environment variables
    #[serde(default)]
    pub env: Environment,

    /// Named outputs the job publishes into the artifact relay
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub outputs: Vec<OutputDecl>,

    /// Relay names the job reads from its dependencies
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub consumes: Vec<String>,

    /// Relay names forwarded to the coverage service after the body runs.
    /// Reporting failures are logged and never fail the instance.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub coverage_reports: Vec<String>,

    /// Whether a failure of this job is swallowed (best-effort reporting)
    #[serde(default)]
    pub best_effort: bool,
}

impl JobNode {
    /// Creates a job node builder
    pub fn builder(id: impl Into<String>) -> JobNodeBuilder {
        JobNodeBuilder::new(id)
    }

    /// Returns true if this job carries a publish side effect
    #[must_use]
    pub fn is_publishing(&self) -> bool {
        self.publish.is_some()
    }
}

impl Validate for JobNode {
    type Error = ValidationError;

    fn validate(&self) -> Result<(), Self::Error> {
        if self.id.is_empty() {
            return Err(ValidationError::EmptyJobId);
        }

        if self.steps.is_empty() {
            return Err(ValidationError::EmptyJob {
                id: self.id.clone(),
            });
        }

        if let Some(ref axis) = self.platform_axis {
            axis.validate_for(&self.id)?;
        }

        Ok(())
    }
}

impl fmt::Display for JobNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Job({}): {} steps", self.id, self.steps.len())
    }
}

/// Builder for job nodes
#[derive(Debug, Clone)]
pub struct JobNodeBuilder {
    node: JobNode,
}

impl JobNodeBuilder {
    /// Creates a new builder for the given job id
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            node: JobNode {
                id: id.into(),
                depends_on: BTreeSet::new(),
                platform_axis: None,
                when: None,
                publish: None,
                steps: Vec::new(),
                env: Environment::new(),
                outputs: Vec::new(),
                consumes: Vec::new(),
                coverage_reports: Vec::new(),
                best_effort: false,
            },
        }
    }

    /// Adds a dependency edge
    pub fn depends_on(mut self, id: impl Into<String>) -> Self {
        self.node.depends_on.insert(id.into());
        self
    }

    /// Sets the platform axis
    pub fn platform_axis(mut self, axis: PlatformAxis) -> Self {
        self.node.platform_axis = Some(axis);
        self
    }

    /// Sets the run predicate
    pub fn when(mut self, when: WhenCondition) -> Self {
        self.node.when = Some(when);
        self
    }

    /// Marks the job as publishing with the given side effect
    pub fn publish(mut self, spec: PublishSpec) -> Self {
        self.node.publish = Some(spec);
        self
    }

    /// Adds a step to the job body
    pub fn step(mut self, step: Step) -> Self {
        self.node.steps.push(step);
        self
    }

    /// Sets the job environment
    pub fn env(mut self, env: Environment) -> Self {
        self.node.env = env;
        self
    }

    /// Declares a named output
    pub fn output(mut self, name: impl Into<String>, path: impl Into<String>) -> Self {
        self.node.outputs.push(OutputDecl::new(name, path));
        self
    }

    /// Declares a consumed artifact name
    pub fn consumes(mut self, name: impl Into<String>) -> Self {
        self.node.consumes.push(name.into());
        self
    }

    /// Declares a relay artifact to forward to the coverage service
    pub fn report_coverage(mut self, name: impl Into<String>) -> Self {
        self.node.coverage_reports.push(name.into());
        self
    }

    /// Marks failures of this job as non-fatal for the run
    pub fn best_effort(mut self) -> Self {
        self.node.best_effort = true;
        self
    }

    /// Builds the node
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] when the node definition is invalid.
    pub fn build(self) -> Result<JobNode, ValidationError> {
        self.node.validate()?;
        Ok(self.node)
    }
}

/// Arena of job nodes indexed by id
#[derive(Debug, Clone, Default)]
pub struct JobGraph {
    nodes: Vec<JobNode>,
    index: AHashMap<String, usize>,
}

impl JobGraph {
    /// Creates an empty graph
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node to the graph.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::DuplicateJobId`] if a node with the same
    /// id already exists, or the node's own validation error.
    pub fn add_node(&mut self, node: JobNode) -> Result<(), ValidationError> {
        node.validate()?;
        if self.index.contains_key(&node.id) {
            return Err(ValidationError::DuplicateJobId { id: node.id });
        }
        self.index.insert(node.id.clone(), self.nodes.len());
        self.nodes.push(node);
        Ok(())
    }

    /// Looks up a node by id
    #[must_use]
    pub fn node(&self, id: &str) -> Option<&JobNode> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    /// Returns all nodes in declaration order
    #[must_use]
    pub fn nodes(&self) -> &[JobNode] {
        &self.nodes
    }

    /// Returns the number of nodes
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns true if the graph has no nodes
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns node ids in a deterministic topological order.
    ///
    /// Declaration order is the tie-break among independent nodes.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::DependencyCycle`] when the edges cycle.
    pub fn topo_order(&self) -> Result<Vec<&str>, ValidationError> {
        let mut in_degree: AHashMap<&str, usize> = self
            .nodes
            .iter()
            .map(|n| (n.id.as_str(), n.depends_on.len()))
            .collect();

        let mut order = Vec::with_capacity(self.nodes.len());
        let mut ready: Vec<&str> = self
            .nodes
            .iter()
            .filter(|n| n.depends_on.is_empty())
            .map(|n| n.id.as_str())
            .collect();

        while let Some(id) = ready.first().copied() {
            ready.remove(0);
            order.push(id);
            for node in &self.nodes {
                if node.depends_on.contains(id) {
                    let degree = in_degree
                        .get_mut(node.id.as_str())
                        .expect("node present in degree map");
                    *degree -= 1;
                    if *degree == 0 {
                        ready.push(node.id.as_str());
                    }
                }
            }
        }

        if order.len() != self.nodes.len() {
            let stuck = self
                .nodes
                .iter()
                .find(|n| !order.contains(&n.id.as_str()))
                .expect("at least one node outside the order");
            return Err(ValidationError::DependencyCycle {
                id: stuck.id.clone(),
            });
        }

        Ok(order)
    }
}

impl Validate for JobGraph {
    type Error = ValidationError;

    fn validate(&self) -> Result<(), Self::Error> {
        for node in &self.nodes {
            node.validate()?;
            for dep in &node.depends_on {
                if !self.index.contains_key(dep) {
                    return Err(ValidationError::UnknownDependency {
                        id: node.id.clone(),
                        dependency: dep.clone(),
                    });
                }
            }
        }

        self.topo_order().map(|_| ())
    }
}

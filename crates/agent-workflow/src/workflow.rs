//! Workflow definition and execution

use crate::context::WorkflowContext;
use crate::edge::{EdgeGroup, EdgeKind, SelectionFn};
use crate::error::{Result, WorkflowError};
use crate::event::{EventSink, WorkflowEvent};
use crate::executor::Executor;
use crate::message::WorkflowMessage;
use agent_core::Context;
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashSet, VecDeque};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{Instrument, debug, info, info_span, warn};

/// Default limit on supersteps per run
pub const DEFAULT_MAX_SUPERSTEPS: usize = 100;

/// A graph of executors connected by edges
///
/// A run starts by delivering the input to the start executor. Each
/// superstep then delivers every message sent during the previous one, in
/// the order they were sent. Messages sent by an executor without outgoing
/// edges become workflow outputs.
///
/// # Example
///
/// ```
/// use agent_workflow::{Executor, FunctionExecutor, WorkflowBuilder, WorkflowContext, WorkflowMessage};
/// use std::sync::Arc;
///
/// # async fn example() -> agent_workflow::Result<()> {
/// let upper: Arc<dyn Executor> = Arc::new(FunctionExecutor::new(
///     "upper",
///     |message: WorkflowMessage, ctx: &mut WorkflowContext<'_>| {
///         if let WorkflowMessage::Text(text) = message {
///             ctx.send_message(text.to_uppercase());
///         }
///         Ok(())
///     },
/// ));
///
/// let workflow = WorkflowBuilder::new("shout").set_start_executor(&upper).build()?;
/// let result = workflow.run("hello").await?;
/// assert_eq!(result.outputs, vec![serde_json::json!("HELLO")]);
/// # Ok(())
/// # }
/// ```
pub struct Workflow {
    id: String,
    name: Option<String>,
    description: Option<String>,
    start: String,
    executors: BTreeMap<String, Arc<dyn Executor>>,
    edge_groups: Vec<EdgeGroup>,
    max_supersteps: usize,
}

/// Events and outputs of a completed run
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowRunResult {
    /// Every event in emission order
    pub events: Vec<WorkflowEvent>,
    /// Workflow outputs in emission order
    pub outputs: Vec<Value>,
}

/// Serializable description of a workflow graph
#[derive(Debug, Clone, Serialize)]
pub struct WorkflowInfo {
    pub id: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub start_executor: String,
    pub executors: Vec<ExecutorInfo>,
    pub edges: Vec<EdgeInfo>,
    pub max_supersteps: usize,
}

/// One executor in a [`WorkflowInfo`]
#[derive(Debug, Clone, Serialize)]
pub struct ExecutorInfo {
    pub id: String,
    pub kind: &'static str,
}

/// One edge in a [`WorkflowInfo`]
#[derive(Debug, Clone, Serialize)]
pub struct EdgeInfo {
    pub source: String,
    pub target: String,
    pub kind: EdgeKind,
}

impl Workflow {
    /// Workflow id, used as the dev UI entity id
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Display name, falling back to the id
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }

    /// Optional description
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Start executor id
    pub fn start_executor(&self) -> &str {
        &self.start
    }

    /// Superstep limit
    pub fn max_supersteps(&self) -> usize {
        self.max_supersteps
    }

    /// Describe the graph
    pub fn describe(&self) -> WorkflowInfo {
        WorkflowInfo {
            id: self.id.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            start_executor: self.start.clone(),
            executors: self
                .executors
                .values()
                .map(|executor| ExecutorInfo {
                    id: executor.id().to_string(),
                    kind: executor.kind(),
                })
                .collect(),
            edges: self
                .edge_groups
                .iter()
                .flat_map(|group| {
                    group.targets().into_iter().map(move |target| EdgeInfo {
                        source: group.source().to_string(),
                        target: target.to_string(),
                        kind: group.kind(),
                    })
                })
                .collect(),
            max_supersteps: self.max_supersteps,
        }
    }

    /// Run to completion and collect events and outputs
    pub async fn run(&self, input: impl Into<WorkflowMessage>) -> Result<WorkflowRunResult> {
        let mut events = Vec::new();
        let outputs = self.run_with_sink(input.into(), &mut events).await?;
        Ok(WorkflowRunResult { events, outputs })
    }

    /// Run to completion, streaming events as they happen
    ///
    /// Returns the outputs; every event, including `Failed`, is sent on
    /// `events` first.
    pub async fn run_stream(
        &self,
        input: impl Into<WorkflowMessage>,
        mut events: UnboundedSender<WorkflowEvent>,
    ) -> Result<Vec<Value>> {
        self.run_with_sink(input.into(), &mut events).await
    }

    /// Run to completion, reporting events to any sink
    pub async fn run_with_sink(
        &self,
        input: WorkflowMessage,
        sink: &mut dyn EventSink,
    ) -> Result<Vec<Value>> {
        let run_id = uuid::Uuid::new_v4().to_string();
        let span = info_span!("workflow", id = %self.id, run_id = %run_id);

        async {
            sink.emit(WorkflowEvent::Started {
                workflow_id: self.id.clone(),
                run_id: run_id.clone(),
            });
            let mut state = Context::new()
                .with_workflow_id(self.id.clone())
                .with_run_id(run_id.clone());

            match self.execute(input, &mut state, sink).await {
                Ok((outputs, supersteps)) => {
                    info!(supersteps, outputs = outputs.len(), "Workflow completed");
                    sink.emit(WorkflowEvent::Completed { supersteps });
                    Ok(outputs)
                }
                Err(e) => {
                    warn!(error = %e, "Workflow failed");
                    sink.emit(WorkflowEvent::Failed {
                        error: e.to_string(),
                    });
                    Err(e)
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn execute(
        &self,
        input: WorkflowMessage,
        state: &mut Context,
        sink: &mut dyn EventSink,
    ) -> Result<(Vec<Value>, usize)> {
        let mut outputs = Vec::new();
        let mut pending = VecDeque::from([(self.start.clone(), input)]);
        let mut superstep = 0;

        while !pending.is_empty() {
            superstep += 1;
            if superstep > self.max_supersteps {
                return Err(WorkflowError::MaxSuperstepsExceeded(self.max_supersteps));
            }
            debug!(superstep, messages = pending.len(), "Superstep started");

            let mut next = VecDeque::new();
            for (executor_id, message) in pending.drain(..) {
                let executor = self
                    .executors
                    .get(&executor_id)
                    .ok_or_else(|| WorkflowError::UnknownExecutor(executor_id.clone()))?;

                sink.emit(WorkflowEvent::ExecutorInvoked {
                    executor_id: executor_id.clone(),
                    superstep,
                });

                let started = Instant::now();
                let mut ctx = WorkflowContext::new(executor_id.clone(), state);
                executor
                    .handle(message, &mut ctx)
                    .instrument(info_span!("executor", id = %executor_id))
                    .await
                    .map_err(|source| WorkflowError::Executor {
                        executor_id: executor_id.clone(),
                        source,
                    })?;
                let produced = ctx.into_produced();

                for event in produced.events {
                    sink.emit(event);
                }
                for output in produced.outputs {
                    self.record_output(&executor_id, output, &mut outputs, sink);
                }
                for message in produced.sent {
                    let targets = self.route(&executor_id, &message)?;
                    if targets.is_empty() && !self.has_outgoing(&executor_id) {
                        self.record_output(&executor_id, message.into_output(), &mut outputs, sink);
                        continue;
                    }
                    for target in targets {
                        next.push_back((target, message.clone()));
                    }
                }

                sink.emit(WorkflowEvent::ExecutorCompleted {
                    executor_id,
                    duration_ms: started.elapsed().as_millis() as u64,
                });
            }
            pending = next;
        }

        Ok((outputs, superstep))
    }

    fn record_output(
        &self,
        executor_id: &str,
        output: Value,
        outputs: &mut Vec<Value>,
        sink: &mut dyn EventSink,
    ) {
        sink.emit(WorkflowEvent::Output {
            executor_id: executor_id.to_string(),
            output: output.clone(),
        });
        outputs.push(output);
    }

    fn has_outgoing(&self, executor_id: &str) -> bool {
        self.edge_groups
            .iter()
            .any(|group| group.source() == executor_id)
    }

    fn route(&self, source: &str, message: &WorkflowMessage) -> Result<Vec<String>> {
        let mut targets = Vec::new();
        for group in self.edge_groups.iter().filter(|g| g.source() == source) {
            targets.extend(group.route(message)?);
        }
        Ok(targets)
    }
}

/// Builder for constructing workflows
///
/// Executors are registered by the edges that mention them. Problems such
/// as two different executors sharing an id are reported by [`build`].
///
/// [`build`]: WorkflowBuilder::build
pub struct WorkflowBuilder {
    id: String,
    name: Option<String>,
    description: Option<String>,
    start: Option<String>,
    executors: BTreeMap<String, Arc<dyn Executor>>,
    edge_groups: Vec<EdgeGroup>,
    max_supersteps: usize,
    problems: Vec<String>,
}

impl WorkflowBuilder {
    /// Create a new workflow builder
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            description: None,
            start: None,
            executors: BTreeMap::new(),
            edge_groups: Vec::new(),
            max_supersteps: DEFAULT_MAX_SUPERSTEPS,
            problems: Vec::new(),
        }
    }

    /// Set the display name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the superstep limit
    pub fn with_max_supersteps(mut self, max_supersteps: usize) -> Self {
        self.max_supersteps = max_supersteps;
        self
    }

    /// Set the executor receiving the run input
    pub fn set_start_executor(mut self, executor: &Arc<dyn Executor>) -> Self {
        self.start = Some(self.register(executor));
        self
    }

    /// Register an executor not otherwise mentioned by an edge
    pub fn add_executor(mut self, executor: &Arc<dyn Executor>) -> Self {
        self.register(executor);
        self
    }

    /// Connect `source` to `target`
    pub fn add_edge(mut self, source: &Arc<dyn Executor>, target: &Arc<dyn Executor>) -> Self {
        let source = self.register(source);
        let target = self.register(target);
        self.edge_groups.push(EdgeGroup::Single { source, target });
        self
    }

    /// Deliver every message from `source` to all `targets`
    pub fn add_fan_out_edges(mut self, source: &Arc<dyn Executor>, targets: &[Arc<dyn Executor>]) -> Self {
        let source = self.register(source);
        let targets = targets.iter().map(|t| self.register(t)).collect();
        self.edge_groups.push(EdgeGroup::FanOut { source, targets });
        self
    }

    /// Deliver each message from `source` to the targets `selection` picks
    ///
    /// `selection` receives the target ids in the order given here.
    pub fn add_multi_selection_edge_group<F>(
        mut self,
        source: &Arc<dyn Executor>,
        targets: &[Arc<dyn Executor>],
        selection: F,
    ) -> Self
    where
        F: Fn(&WorkflowMessage, &[String]) -> Vec<String> + Send + Sync + 'static,
    {
        let source = self.register(source);
        let targets = targets.iter().map(|t| self.register(t)).collect();
        let selector: SelectionFn = Arc::new(selection);
        self.edge_groups.push(EdgeGroup::MultiSelection {
            source,
            targets,
            selector,
        });
        self
    }

    fn register(&mut self, executor: &Arc<dyn Executor>) -> String {
        let id = executor.id().to_string();
        match self.executors.get(&id) {
            Some(existing) if !Arc::ptr_eq(existing, executor) => {
                self.problems
                    .push(format!("two different executors share the id '{id}'"));
            }
            Some(_) => {}
            None => {
                self.executors.insert(id.clone(), Arc::clone(executor));
            }
        }
        id
    }

    /// Validate the graph and build the workflow
    pub fn build(self) -> Result<Workflow> {
        let mut problems = self.problems;

        let start = self.start.unwrap_or_else(|| {
            problems.push("no start executor set".to_string());
            String::new()
        });

        let mut seen = HashSet::new();
        for group in &self.edge_groups {
            let targets = group.targets();
            if targets.is_empty() {
                problems.push(format!("edge group from '{}' has no targets", group.source()));
            }
            for target in targets {
                if !seen.insert((group.source().to_string(), target.to_string())) {
                    problems.push(format!(
                        "duplicate edge from '{}' to '{target}'",
                        group.source()
                    ));
                }
            }
        }

        if !problems.is_empty() {
            return Err(WorkflowError::Build(problems.join("; ")));
        }

        debug!(
            workflow_id = %self.id,
            executors = self.executors.len(),
            edge_groups = self.edge_groups.len(),
            "Workflow built"
        );
        Ok(Workflow {
            id: self.id,
            name: self.name,
            description: self.description,
            start,
            executors: self.executors,
            edge_groups: self.edge_groups,
            max_supersteps: self.max_supersteps,
        })
    }
}

//! Events emitted while a workflow runs

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::mpsc::UnboundedSender;

/// Something that happened during a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorkflowEvent {
    /// The run began
    Started { workflow_id: String, run_id: String },
    /// An executor received a message
    ExecutorInvoked { executor_id: String, superstep: usize },
    /// An executor finished handling a message
    ExecutorCompleted { executor_id: String, duration_ms: u64 },
    /// An agent executor produced a reply
    AgentRun { executor_id: String, text: String },
    /// An executor yielded a workflow output
    Output { executor_id: String, output: Value },
    /// Event added by executor code
    Custom { executor_id: String, data: Value },
    /// The run failed
    Failed { error: String },
    /// The run finished
    Completed { supersteps: usize },
}

impl WorkflowEvent {
    /// Timing events, only shown when tracing is enabled
    pub fn is_timing(&self) -> bool {
        matches!(self, Self::ExecutorCompleted { .. })
    }
}

/// Destination for workflow events
pub trait EventSink: Send {
    /// Record one event
    fn emit(&mut self, event: WorkflowEvent);
}

impl EventSink for Vec<WorkflowEvent> {
    fn emit(&mut self, event: WorkflowEvent) {
        self.push(event);
    }
}

impl EventSink for UnboundedSender<WorkflowEvent> {
    fn emit(&mut self, event: WorkflowEvent) {
        // A dropped receiver only means nobody is listening any more
        let _ = self.send(event);
    }
}

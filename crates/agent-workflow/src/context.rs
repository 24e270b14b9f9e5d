//! Per-invocation handle given to executors

use crate::event::WorkflowEvent;
use crate::message::WorkflowMessage;
use agent_core::Context;
use serde_json::Value;

/// What an executor can do while handling one message
///
/// Sent messages follow the executor's outgoing edges once the handler
/// returns. Run-wide state lives in the shared [`Context`].
pub struct WorkflowContext<'a> {
    executor_id: String,
    state: &'a mut Context,
    sent: Vec<WorkflowMessage>,
    outputs: Vec<Value>,
    events: Vec<WorkflowEvent>,
}

/// Everything an executor produced during one invocation
pub(crate) struct Produced {
    pub sent: Vec<WorkflowMessage>,
    pub outputs: Vec<Value>,
    pub events: Vec<WorkflowEvent>,
}

impl<'a> WorkflowContext<'a> {
    /// Create a handle for one executor invocation
    pub fn new(executor_id: impl Into<String>, state: &'a mut Context) -> Self {
        let executor_id = executor_id.into();
        state.set_executor_id(executor_id.clone());
        Self {
            executor_id,
            state,
            sent: Vec::new(),
            outputs: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Executor currently running
    pub fn executor_id(&self) -> &str {
        &self.executor_id
    }

    /// Send a message along this executor's outgoing edges
    pub fn send_message(&mut self, message: impl Into<WorkflowMessage>) {
        self.sent.push(message.into());
    }

    /// Emit a workflow output
    pub fn yield_output(&mut self, output: impl Into<Value>) {
        self.outputs.push(output.into());
    }

    /// Attach a custom event to the run
    pub fn add_event(&mut self, data: Value) {
        self.events.push(WorkflowEvent::Custom {
            executor_id: self.executor_id.clone(),
            data,
        });
    }

    pub(crate) fn push_event(&mut self, event: WorkflowEvent) {
        self.events.push(event);
    }

    /// Run-wide state shared by all executors
    pub fn state(&self) -> &Context {
        self.state
    }

    /// Mutable run-wide state
    pub fn state_mut(&mut self) -> &mut Context {
        self.state
    }

    pub(crate) fn into_produced(self) -> Produced {
        Produced {
            sent: self.sent,
            outputs: self.outputs,
            events: self.events,
        }
    }
}

//! Workflow graphs for agent orchestration
//!
//! A workflow is a graph of executors. Agent executors run an [`Agent`]
//! per request; function executors transform messages in plain Rust. Edges
//! deliver messages unconditionally, to several targets at once, or to the
//! targets a selection function picks for each message.
//!
//! [`Agent`]: agent_core::Agent

pub mod context;
pub mod edge;
pub mod error;
pub mod event;
pub mod executor;
pub mod message;
pub mod workflow;

// Re-export for convenience
pub use context::WorkflowContext;
pub use edge::{EdgeGroup, EdgeKind, SelectionFn};
pub use error::{Result, WorkflowError};
pub use event::{EventSink, WorkflowEvent};
pub use executor::{AgentExecutor, Executor, FunctionExecutor};
pub use message::{AgentExecutorRequest, AgentExecutorResponse, WorkflowMessage};
pub use workflow::{
    DEFAULT_MAX_SUPERSTEPS, EdgeInfo, ExecutorInfo, Workflow, WorkflowBuilder, WorkflowInfo,
    WorkflowRunResult,
};

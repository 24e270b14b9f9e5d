//! Workflow errors

use thiserror::Error;

/// Errors raised while building or running a workflow
#[derive(Error, Debug)]
pub enum WorkflowError {
    /// The graph description is inconsistent
    #[error("Invalid workflow: {0}")]
    Build(String),

    /// A message was routed to an executor that is not registered
    #[error("Unknown executor: {0}")]
    UnknownExecutor(String),

    /// The run did not settle within the superstep limit
    #[error("Workflow exceeded {0} supersteps")]
    MaxSuperstepsExceeded(usize),

    /// A selection function picked an id outside its targets
    #[error("Selection from '{source_id}' chose '{selected}', which is not one of its targets")]
    InvalidSelection {
        /// Executor whose message was being routed
        source_id: String,
        /// Id returned by the selection function
        selected: String,
    },

    /// An executor failed while handling a message
    #[error("Executor '{executor_id}' failed: {source}")]
    Executor {
        /// Failing executor
        executor_id: String,
        /// Underlying error
        #[source]
        source: agent_core::Error,
    },
}

impl From<WorkflowError> for agent_core::Error {
    fn from(err: WorkflowError) -> Self {
        match err {
            WorkflowError::Executor { source, .. } => source,
            other => agent_core::Error::ProcessingFailed(other.to_string()),
        }
    }
}

/// Result type for workflow operations
pub type Result<T> = std::result::Result<T, WorkflowError>;

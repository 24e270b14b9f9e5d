//! Execution context for agents
//!
//! The `Context` struct is a key-value store shared by every executor of a
//! single workflow run. The workflow runner records which run and executor
//! is active; agents and function executors may stash their own state.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Well-known context keys
pub mod keys {
    /// Workflow being executed
    pub const WORKFLOW_ID: &str = "workflow_id";
    /// Unique id of the current workflow run
    pub const RUN_ID: &str = "run_id";
    /// Executor currently handling a message
    pub const EXECUTOR_ID: &str = "executor_id";
}

/// Context passed to agents during execution
///
/// # Example
///
/// ```
/// use agent_core::Context;
///
/// let ctx = Context::new()
///     .with_workflow_id("workflow_basic")
///     .with_run_id("run-1");
///
/// assert_eq!(ctx.workflow_id(), Some("workflow_basic"));
/// assert_eq!(ctx.run_id(), Some("run-1"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Context {
    data: HashMap<String, serde_json::Value>,
}

impl Context {
    /// Create a new empty context
    pub fn new() -> Self {
        Self::default()
    }

    // =========== Builder Methods ===========

    /// Set the workflow id
    pub fn with_workflow_id(mut self, workflow_id: impl Into<String>) -> Self {
        self.insert(keys::WORKFLOW_ID, serde_json::json!(workflow_id.into()));
        self
    }

    /// Set the run id
    pub fn with_run_id(mut self, run_id: impl Into<String>) -> Self {
        self.insert(keys::RUN_ID, serde_json::json!(run_id.into()));
        self
    }

    // =========== Common Accessors ===========

    /// Get the workflow id
    pub fn workflow_id(&self) -> Option<&str> {
        self.get(keys::WORKFLOW_ID).and_then(|v| v.as_str())
    }

    /// Get the run id
    pub fn run_id(&self) -> Option<&str> {
        self.get(keys::RUN_ID).and_then(|v| v.as_str())
    }

    /// Get the executor currently handling a message
    pub fn executor_id(&self) -> Option<&str> {
        self.get(keys::EXECUTOR_ID).and_then(|v| v.as_str())
    }

    /// Record the executor currently handling a message
    pub fn set_executor_id(&mut self, executor_id: impl Into<String>) {
        self.insert(keys::EXECUTOR_ID, serde_json::json!(executor_id.into()));
    }

    // =========== Generic Key-Value Operations ===========

    /// Insert a value into the context
    pub fn insert(&mut self, key: impl Into<String>, value: serde_json::Value) {
        self.data.insert(key.into(), value);
    }

    /// Get a value from the context
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.data.get(key)
    }

    /// Insert a typed value into the context
    ///
    /// Serializes the value to JSON before storing.
    pub fn insert_typed<T: Serialize>(
        &mut self,
        key: impl Into<String>,
        value: &T,
    ) -> crate::Result<()> {
        let json_value = serde_json::to_value(value).map_err(|e| {
            crate::Error::ProcessingFailed(format!("Failed to serialize context value: {e}"))
        })?;
        self.data.insert(key.into(), json_value);
        Ok(())
    }

    /// Get a typed value from the context
    pub fn get_typed<T: for<'de> Deserialize<'de>>(&self, key: &str) -> crate::Result<Option<T>> {
        match self.data.get(key) {
            None => Ok(None),
            Some(value) => {
                let typed = serde_json::from_value(value.clone()).map_err(|e| {
                    crate::Error::ProcessingFailed(format!(
                        "Failed to deserialize context value: {e}"
                    ))
                })?;
                Ok(Some(typed))
            }
        }
    }

    /// Check if a key exists in the context
    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Remove a value from the context
    pub fn remove(&mut self, key: &str) -> Option<serde_json::Value> {
        self.data.remove(key)
    }

    /// Get the number of entries in the context
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the context is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

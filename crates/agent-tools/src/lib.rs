//! Tools that agents can call during a run
//!
//! Tools execute in-process: the agent loop forwards the model's tool call
//! to the registered `Tool` and returns its JSON result to the model.

pub mod registry;
pub mod tool;

pub use registry::ToolRegistry;
pub use tool::Tool;

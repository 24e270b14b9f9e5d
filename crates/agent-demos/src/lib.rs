//! Workflow demos
//!
//! Each module builds one workflow from agents created through a
//! [`ChatClient`](agent_runtime::ChatClient):
//!
//! - [`travel`]: a front desk agent whose suggestion a concierge reviews
//! - [`content`]: draft, review and publish a tutorial, branching on the
//!   review verdict
//! - [`simple`]: the smallest two-agent workflow, used to check a setup
//!
//! The binaries serve them through the dev UI. [`mcp`] is a console demo
//! of a single agent using tools from a remote MCP server.

pub mod cli;
pub mod content;
pub mod mcp;
pub mod simple;
pub mod travel;

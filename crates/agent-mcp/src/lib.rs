//! Model Context Protocol (MCP) tools for workflow agents
//!
//! Connects to an MCP server over HTTP, lists its tools and wraps each one
//! as an [`agent_tools::Tool`], so chat agents can call them like local
//! tools.
//!
//! # Example
//!
//! ```no_run
//! use agent_mcp::{HttpMCPClient, discover_tools};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = HttpMCPClient::new("https://learn.microsoft.com/api/mcp", Duration::from_secs(60))?;
//! let tools = discover_tools(Arc::new(client), &[]).await?;
//! println!("Discovered {} tools", tools.len());
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod error;
pub mod http;
pub mod tool;

pub use client::{MCPClient, MCPContent, MCPServerInfo, MCPToolDefinition, MCPToolResult};
pub use error::MCPError;
pub use http::HttpMCPClient;
pub use tool::{MCPTool, discover_tools};

/// Result type for MCP operations
pub type Result<T> = std::result::Result<T, MCPError>;

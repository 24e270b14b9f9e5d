//! Error types for MCP operations

use thiserror::Error;

/// Errors that can occur during MCP operations
#[derive(Error, Debug)]
pub enum MCPError {
    /// MCP connection failed
    #[error("MCP connection failed: {0}")]
    ConnectionFailed(String),

    /// Not connected to MCP server
    #[error("Not connected to MCP server")]
    NotConnected,

    /// MCP request failed
    #[error("MCP request failed: {0}")]
    RequestFailed(String),

    /// Server answered with a JSON-RPC error
    #[error("MCP server error for {method}: {error}")]
    ServerError {
        method: String,
        error: serde_json::Value,
    },

    /// MCP tool call failed
    #[error("MCP tool call failed: {0}")]
    ToolCallFailed(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<MCPError> for agent_core::Error {
    fn from(err: MCPError) -> Self {
        agent_core::Error::ProcessingFailed(err.to_string())
    }
}

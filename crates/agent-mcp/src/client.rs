//! MCP client abstraction and protocol types

use crate::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Connection to one MCP server
///
/// All methods take `&self` so a client can be shared through an `Arc` by
/// every tool it backs.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MCPClient: Send + Sync {
    /// Perform the initialize handshake
    async fn connect(&self) -> Result<()>;

    /// Whether the handshake has completed
    fn is_connected(&self) -> bool;

    /// List the tools the server offers
    async fn list_tools(&self) -> Result<Vec<MCPToolDefinition>>;

    /// Call a tool by name
    async fn call_tool(&self, name: &str, arguments: Value) -> Result<MCPToolResult>;

    /// Server info reported by the handshake
    async fn server_info(&self) -> Option<MCPServerInfo>;
}

/// Tool definition from `tools/list`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MCPToolDefinition {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

/// Result of `tools/call`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MCPToolResult {
    #[serde(default)]
    pub content: Vec<MCPContent>,
    #[serde(default, rename = "isError", skip_serializing_if = "Option::is_none")]
    pub is_error: Option<bool>,
}

impl MCPToolResult {
    /// Text blocks joined by newlines
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|block| match block {
                MCPContent::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Content block of a tool result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MCPContent {
    Text {
        text: String,
    },
    Image {
        data: String,
        #[serde(rename = "mimeType")]
        mime_type: String,
    },
    Resource {
        resource: Value,
    },
    /// Block types this client does not interpret, such as audio
    #[serde(other)]
    Unsupported,
}

/// Server identity from `initialize`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MCPServerInfo {
    pub name: String,
    pub version: String,
    pub protocol_version: String,
}

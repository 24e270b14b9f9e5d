//! MCP tools exposed through the agent `Tool` trait

use crate::client::{MCPClient, MCPContent, MCPToolDefinition};
use crate::{MCPError, Result};
use agent_tools::{Tool, ToolRegistry};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// One server tool, callable by an agent
pub struct MCPTool {
    definition: MCPToolDefinition,
    client: Arc<dyn MCPClient>,
}

impl MCPTool {
    pub fn new(definition: MCPToolDefinition, client: Arc<dyn MCPClient>) -> Self {
        Self { definition, client }
    }

    /// Flatten result blocks into the JSON handed back to the model
    fn convert_result(content: Vec<MCPContent>) -> Value {
        let mut text_parts = Vec::new();
        let mut attachments = Vec::new();

        for block in content {
            match block {
                MCPContent::Text { text } => text_parts.push(text),
                MCPContent::Image { data, mime_type } => attachments.push(json!({
                    "type": "image",
                    "mimeType": mime_type,
                    "dataLength": data.len(),
                })),
                MCPContent::Resource { resource } => attachments.push(json!({
                    "type": "resource",
                    "uri": resource["uri"],
                    "text": resource["text"],
                })),
                MCPContent::Unsupported => {}
            }
        }

        let mut result = json!({ "text": text_parts.join("\n") });
        if !attachments.is_empty() {
            result["attachments"] = Value::Array(attachments);
        }
        result
    }
}

#[async_trait]
impl Tool for MCPTool {
    async fn execute(&self, params: Value) -> agent_core::Result<Value> {
        let name = &self.definition.name;
        debug!(tool = %name, "Calling MCP tool");
        let result = self.client.call_tool(name, params).await?;

        if result.is_error.unwrap_or(false) {
            return Err(MCPError::ToolCallFailed(format!("'{name}' returned an error: {}", result.text())).into());
        }
        Ok(Self::convert_result(result.content))
    }

    fn name(&self) -> &str {
        &self.definition.name
    }

    fn description(&self) -> &str {
        self.definition
            .description
            .as_deref()
            .unwrap_or("No description available")
    }

    fn input_schema(&self) -> Value {
        self.definition.input_schema.clone()
    }
}

/// Register the server's tools, keeping only `allowed` ones when it is non-empty
///
/// Connects first if the client has not completed its handshake. Allowed
/// names the server does not offer are logged and skipped.
pub async fn discover_tools(client: Arc<dyn MCPClient>, allowed: &[String]) -> Result<ToolRegistry> {
    if !client.is_connected() {
        client.connect().await?;
    }

    let definitions = client.list_tools().await?;
    for name in allowed {
        if !definitions.iter().any(|definition| &definition.name == name) {
            warn!(tool = %name, "Allowed MCP tool not offered by the server");
        }
    }

    let mut registry = ToolRegistry::new();
    for definition in definitions {
        if !allowed.is_empty() && !allowed.contains(&definition.name) {
            continue;
        }
        registry.register(Arc::new(MCPTool::new(definition, Arc::clone(&client))));
    }

    info!(tools = ?registry.names(), "MCP tools registered");
    Ok(registry)
}

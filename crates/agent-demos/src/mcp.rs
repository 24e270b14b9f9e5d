//! Agent answering with tools from a remote MCP server
//!
//! The tools are listed from the server at startup and handed to the agent
//! for the run, so the model decides which documentation searches to make.

use agent_core::{Agent, Context};
use agent_mcp::{MCPClient, discover_tools};
use agent_runtime::{AgentOptions, ChatAgent, ChatClient};
use agent_tools::ToolRegistry;
use std::io::Write;
use std::sync::Arc;
use tracing::info;

pub const AGENT_NAME: &str = "MSLearnMCPAgent";
pub const INSTRUCTIONS: &str = "You are a helpful agent that can use MCP tools to assist users. Use the available MCP tools to answer questions and perform tasks.";

/// Microsoft Learn documentation server
pub const DEFAULT_SERVER_URL: &str = "https://learn.microsoft.com/api/mcp";
pub const DEFAULT_QUESTION: &str = "What's Foundry Local?";

pub fn learn_agent(client: &ChatClient, tools: ToolRegistry) -> ChatAgent {
    client.create_agent(AgentOptions {
        tools,
        ..AgentOptions::new(AGENT_NAME, INSTRUCTIONS)
            .with_description("Answers questions using documentation tools from an MCP server")
    })
}

/// List the server's tools, then answer `question` with them
///
/// `allowed` limits the tools given to the agent; empty means all. The tool
/// list and the answer are written to `out`.
pub async fn ask(
    client: &ChatClient,
    mcp: Arc<dyn MCPClient>,
    allowed: &[String],
    question: &str,
    out: &mut dyn Write,
) -> anyhow::Result<String> {
    let tools = discover_tools(mcp, allowed).await?;

    writeln!(out, "Available tools:")?;
    for tool in tools.list_tools() {
        writeln!(out, "  {}: {}", tool.name(), tool.description())?;
    }

    let agent = learn_agent(client, tools);
    info!(agent = AGENT_NAME, tools = ?agent.tool_names(), "Running agent");
    let answer = agent.process(question.to_string(), &mut Context::new()).await?;

    writeln!(out, "{answer}")?;
    Ok(answer)
}

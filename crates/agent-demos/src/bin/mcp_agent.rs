//! Ask an agent a question it answers with tools from an MCP server

use agent_demos::{cli, mcp};
use agent_mcp::HttpMCPClient;
use agent_runtime::ChatClient;
use clap::Parser;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "mcp-agent")]
#[command(about = "Answer a question with documentation tools from an MCP server", long_about = None)]
struct Cli {
    /// Question for the agent
    #[arg(default_value = mcp::DEFAULT_QUESTION)]
    question: String,

    /// MCP server endpoint
    #[arg(long, env = "MCP_SERVER_URL", default_value = mcp::DEFAULT_SERVER_URL)]
    server_url: String,

    /// Only give the agent this server tool; repeat for more
    #[arg(long = "allow-tool")]
    allowed_tools: Vec<String>,

    /// Timeout for each MCP request, in seconds
    #[arg(long, default_value_t = 60)]
    timeout_secs: u64,

    /// Load environment variables from this file instead of the nearest `.env`
    #[arg(long)]
    env_file: Option<PathBuf>,

    /// Log span timings
    #[arg(long)]
    tracing: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = cli::bootstrap(cli.env_file.as_deref(), cli.tracing)?;

    let client = ChatClient::from_settings(&settings)?;
    let server = HttpMCPClient::new(cli.server_url, Duration::from_secs(cli.timeout_secs))?;

    mcp::ask(
        &client,
        Arc::new(server),
        &cli.allowed_tools,
        &cli.question,
        &mut io::stdout().lock(),
    )
    .await?;
    Ok(())
}

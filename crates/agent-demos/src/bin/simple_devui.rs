//! Serve the simple two-agent workflow in the dev UI

use agent_demos::cli::{DemoArgs, DemoDefaults};
use agent_demos::simple;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "simple-devui")]
#[command(about = "TravelAgent and Reviewer workflow for checking a setup", long_about = None)]
struct Cli {
    #[command(flatten)]
    demo: DemoArgs,
}

const DEFAULTS: DemoDefaults = DemoDefaults {
    auto_open: false,
    tracing: false,
};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = cli
        .demo
        .bootstrap(DEFAULTS)
        .inspect_err(|e| tracing::error!("Error: {e:#}"))?;
    simple::launch(&settings, cli.demo.devui_config(DEFAULTS)).await
}

//! Serve the travel plan workflow in the dev UI

use agent_demos::cli::{DemoArgs, DemoDefaults};
use agent_demos::travel;
use agent_runtime::ChatClient;
use clap::Parser;
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "travel-devui")]
#[command(about = "FrontDesk and Concierge travel plan workflow", long_about = None)]
struct Cli {
    #[command(flatten)]
    demo: DemoArgs,
}

const DEFAULTS: DemoDefaults = DemoDefaults {
    auto_open: true,
    tracing: false,
};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = cli.demo.bootstrap(DEFAULTS)?;

    let client = ChatClient::from_settings(&settings)?;
    let workflow = travel::build_workflow(&client)?;

    info!("Starting Basic Workflow");
    agent_devui::serve(vec![Arc::new(workflow)], cli.demo.devui_config(DEFAULTS)).await?;
    Ok(())
}

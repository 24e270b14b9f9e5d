//! Serve the content review workflow in the dev UI

use agent_demos::cli::{DemoArgs, DemoDefaults};
use agent_demos::content;
use agent_runtime::ChatClient;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "content-devui")]
#[command(about = "Evangelist, ContentReviewer and Publisher content workflow", long_about = None)]
struct Cli {
    #[command(flatten)]
    demo: DemoArgs,

    /// Directory receiving published drafts
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,
}

const DEFAULTS: DemoDefaults = DemoDefaults {
    auto_open: true,
    tracing: true,
};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = cli.demo.bootstrap(DEFAULTS)?;

    let client = ChatClient::from_settings(&settings)?;
    let workflow = content::build_workflow(&client, &cli.output_dir)?;

    info!("Starting Content Workflow");
    info!(output_dir = %cli.output_dir.display(), "Published drafts are saved here");
    agent_devui::serve(vec![Arc::new(workflow)], cli.demo.devui_config(DEFAULTS)).await?;
    Ok(())
}

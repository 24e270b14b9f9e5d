//! Check that imports in Python notebooks are ordered

use anyhow::Context;
use clap::Parser;
use notebook_imports::{IsortCommand, run_checks};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "check-imports")]
#[command(about = "Validate import order in Python notebooks with isort", long_about = None)]
struct Args {
    /// Directory to search for notebooks
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Import sorter executable, called as `<sorter> --check-only --diff <file>`
    #[arg(long, default_value = "isort")]
    sorter: String,
}

fn main() -> anyhow::Result<ExitCode> {
    agent_utils::init_tracing_with(&agent_utils::LogConfig {
        default_filter: Some("warn".to_string()),
        ..Default::default()
    });

    let args = Args::parse();
    info!(root = %args.root.display(), sorter = %args.sorter, "Checking notebooks");

    let sorter = IsortCommand::new(args.sorter);
    let summary = run_checks(&args.root, &sorter, &mut io::stdout().lock())
        .context("failed to write the report")?;

    Ok(ExitCode::from(summary.exit_code()))
}

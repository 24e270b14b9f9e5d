//! Command line options shared by the demo binaries

use agent_devui::DevUiConfig;
use agent_utils::{LogConfig, ModelSettings, init_tracing_with, load_env};
use clap::Args;
use std::path::{Path, PathBuf};

/// Options every demo accepts
///
/// With no flags a demo serves on port 8090 and reads `.env` from the
/// current directory or one of its parents.
#[derive(Debug, Clone, Args)]
pub struct DemoArgs {
    /// Port for the dev UI
    #[arg(long, env = "DEVUI_PORT", default_value_t = agent_devui::config::DEFAULT_PORT)]
    pub port: u16,

    /// Interface to bind
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Load environment variables from this file instead of the nearest `.env`
    #[arg(long)]
    pub env_file: Option<PathBuf>,

    /// Return per-executor timings and log span timings
    #[arg(long)]
    pub tracing: bool,

    /// Do not print the URL to open at startup
    #[arg(long)]
    pub no_open: bool,
}

/// Per-demo defaults layered under the command line
#[derive(Debug, Clone, Copy, Default)]
pub struct DemoDefaults {
    /// Announce the URL unless `--no-open` is given
    pub auto_open: bool,
    /// Enable tracing even without `--tracing`
    pub tracing: bool,
}

impl DemoArgs {
    /// Whether tracing is on for this run
    pub fn tracing_enabled(&self, defaults: DemoDefaults) -> bool {
        self.tracing || defaults.tracing
    }

    /// Dev UI settings for this run
    pub fn devui_config(&self, defaults: DemoDefaults) -> DevUiConfig {
        DevUiConfig {
            host: self.host.clone(),
            port: self.port,
            auto_open: defaults.auto_open && !self.no_open,
            tracing_enabled: self.tracing_enabled(defaults),
        }
    }

    /// Set up logging, load `.env` and read the model settings
    pub fn bootstrap(&self, defaults: DemoDefaults) -> anyhow::Result<ModelSettings> {
        bootstrap(self.env_file.as_deref(), self.tracing_enabled(defaults))
    }
}

/// Set up logging, load environment variables and read the model settings
///
/// `env_file` replaces the search for the nearest `.env`.
pub fn bootstrap(env_file: Option<&Path>, tracing: bool) -> anyhow::Result<ModelSettings> {
    let log_config = if tracing {
        LogConfig::traced()
    } else {
        LogConfig::default()
    };
    init_tracing_with(&log_config);

    load_env(env_file)?;
    Ok(ModelSettings::from_env()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Debug, Parser)]
    struct TestCli {
        #[command(flatten)]
        demo: DemoArgs,
    }

    #[test]
    fn test_flagless_defaults() {
        let cli = TestCli::try_parse_from(["demo"]).unwrap();
        let config = cli.demo.devui_config(DemoDefaults {
            auto_open: true,
            tracing: false,
        });
        assert_eq!(config.port, 8090);
        assert!(config.auto_open);
        assert!(!config.tracing_enabled);
    }

    #[test]
    fn test_flags_override() {
        let cli =
            TestCli::try_parse_from(["demo", "--port", "9001", "--tracing", "--no-open"]).unwrap();
        let config = cli.demo.devui_config(DemoDefaults {
            auto_open: true,
            tracing: false,
        });
        assert_eq!(config.port, 9001);
        assert!(!config.auto_open);
        assert!(config.tracing_enabled);
    }

    #[test]
    fn test_demo_default_tracing() {
        let cli = TestCli::try_parse_from(["demo"]).unwrap();
        assert!(cli.demo.tracing_enabled(DemoDefaults {
            auto_open: true,
            tracing: true,
        }));
    }
}

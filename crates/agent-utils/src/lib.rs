//! Shared utilities for the workflow demos
//!
//! Logging setup and the `.env`-backed model configuration used by every
//! demo binary.

pub mod config;
pub mod logging;

pub use config::{ConfigError, ModelSettings, load_env};
pub use logging::{LogConfig, init_tracing_with};

//! Dev UI server
//!
//! Serves a set of workflows ("entities") over HTTP so they can be listed,
//! inspected and run from a browser or with curl.

pub mod config;
pub mod handlers;
pub mod server;
pub mod state;

pub use config::DevUiConfig;
pub use server::{app_config, serve};
pub use state::DevUiState;

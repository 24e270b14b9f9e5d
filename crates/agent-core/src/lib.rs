//! Core abstractions for the agent workflow demos
//!
//! This crate defines the `Agent` trait, the per-run `Context`, and the
//! error type shared by the agent and workflow crates.

pub mod agent;
pub mod context;
pub mod error;

pub use agent::Agent;
pub use context::Context;
pub use error::{Error, Result};

//! Agent runtime
//!
//! This crate turns a hosted chat model into agents: `ChatClient` holds the
//! connection, `ChatAgent` pairs it with instructions, tools and an output
//! format, and `AgentLoop` drives the LLM and tool-call exchange.

pub mod agent_loop;
pub mod chat_agent;
pub mod client;

// Re-export key types
pub use agent_loop::{AgentLoop, LoopConfig, LoopOutcome};
pub use chat_agent::{AgentOptions, AgentRunResponse, ChatAgent, parse_structured};
pub use client::ChatClient;

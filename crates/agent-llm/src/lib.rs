//! LLM provider abstraction layer
//!
//! This crate provides provider-agnostic abstractions for talking to chat
//! models. It includes:
//!
//! - Message types for LLM communication
//! - Completion request/response types
//! - Structured output (`response_format`) descriptions
//! - Tool definitions for function calling
//! - Provider trait and an OpenAI-compatible implementation

pub mod completion;
pub mod error;
pub mod messages;
pub mod provider;
pub mod providers;
pub mod response_format;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
pub mod tools;

// Re-export main types
pub use completion::{CompletionRequest, CompletionResponse, StopReason, TokenUsage};
pub use error::{LLMError, Result};
pub use messages::{ContentBlock, Message, MessageContent, Role};
pub use provider::LLMProvider;
pub use providers::{OpenAIConfig, OpenAIProvider};
pub use response_format::ResponseFormat;
pub use tools::ToolDefinition;

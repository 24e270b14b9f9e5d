//! Chat agents backed by a hosted model

use crate::agent_loop::{AgentLoop, LoopConfig};
use agent_core::{Agent, Context, Error, Result};
use agent_llm::{LLMProvider, Message, ResponseFormat, TokenUsage};
use agent_tools::{Tool, ToolRegistry};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::instrument;

/// Everything that defines an agent apart from the model connection
///
/// # Example
///
/// ```
/// use agent_runtime::AgentOptions;
/// use agent_llm::ResponseFormat;
///
/// let options = AgentOptions::new("FrontDesk", "You are a Front Desk Travel Agent.")
///     .with_description("Suggests one activity per answer")
///     .with_response_format(ResponseFormat::JsonObject);
/// assert_eq!(options.name, "FrontDesk");
/// ```
#[derive(Clone)]
pub struct AgentOptions {
    /// Agent name, also used as its default executor id
    pub name: String,
    /// System instructions
    pub instructions: String,
    /// Optional description for the dev UI
    pub description: Option<String>,
    /// Structured output requested from the model
    pub response_format: Option<ResponseFormat>,
    /// Tools the agent may call
    pub tools: ToolRegistry,
    /// Max tokens per completion
    pub max_tokens: usize,
    /// Sampling temperature
    pub temperature: Option<f32>,
    /// Maximum LLM calls per run
    pub max_iterations: usize,
}

impl AgentOptions {
    /// Options with the given name and instructions and default limits
    pub fn new(name: impl Into<String>, instructions: impl Into<String>) -> Self {
        let defaults = LoopConfig::default();
        Self {
            name: name.into(),
            instructions: instructions.into(),
            description: None,
            response_format: None,
            tools: ToolRegistry::new(),
            max_tokens: defaults.max_tokens,
            temperature: defaults.temperature,
            max_iterations: defaults.max_iterations,
        }
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Request structured output
    pub fn with_response_format(mut self, format: ResponseFormat) -> Self {
        self.response_format = Some(format);
        self
    }

    /// Add a tool
    pub fn with_tool(mut self, tool: Arc<dyn Tool>) -> Self {
        self.tools.register(tool);
        self
    }

    /// Set the sampling temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the iteration limit
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }
}

/// Output of one agent run
#[derive(Debug, Clone)]
pub struct AgentRunResponse {
    /// Messages produced during the run
    pub messages: Vec<Message>,
    /// Final assistant text
    pub text: String,
    /// Tokens used
    pub usage: TokenUsage,
}

impl AgentRunResponse {
    /// Validate the response text as JSON of type `T`
    pub fn parse<T: DeserializeOwned>(&self) -> Result<T> {
        parse_structured(&self.text)
    }
}

/// Validate model output as JSON of type `T`
///
/// Markdown code fences around the JSON are tolerated since some models add
/// them even in JSON mode.
pub fn parse_structured<T: DeserializeOwned>(text: &str) -> Result<T> {
    let trimmed = text.trim();
    let body = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .unwrap_or(trimmed)
        .trim();

    serde_json::from_str(body).map_err(|e| Error::InvalidOutput(format!("{e}: {body}")))
}

/// An agent answering through a chat model, optionally with tools
pub struct ChatAgent {
    name: String,
    description: Option<String>,
    agent_loop: AgentLoop,
}

impl ChatAgent {
    /// Create an agent from options and a provider
    pub fn new(provider: Arc<dyn LLMProvider>, model: impl Into<String>, options: AgentOptions) -> Self {
        let config = LoopConfig {
            max_iterations: options.max_iterations,
            model: model.into(),
            system_prompt: Some(options.instructions),
            max_tokens: options.max_tokens,
            temperature: options.temperature,
            response_format: options.response_format,
        };

        Self {
            name: options.name,
            description: options.description,
            agent_loop: AgentLoop::new(provider, Arc::new(options.tools), config),
        }
    }

    /// The agent's instructions
    pub fn instructions(&self) -> &str {
        self.agent_loop.config().system_prompt.as_deref().unwrap_or_default()
    }

    /// Structured output format, if any
    pub fn response_format(&self) -> Option<&ResponseFormat> {
        self.agent_loop.config().response_format.as_ref()
    }

    /// Names of the agent's tools
    pub fn tool_names(&self) -> Vec<String> {
        self.agent_loop.tools().names()
    }

    /// Run the agent over a conversation
    #[instrument(skip(self, messages), fields(agent = %self.name))]
    pub async fn run(&self, messages: Vec<Message>) -> Result<AgentRunResponse> {
        let outcome = self.agent_loop.run(messages).await?;
        Ok(AgentRunResponse {
            messages: outcome.messages,
            text: outcome.text,
            usage: outcome.usage,
        })
    }
}

#[async_trait]
impl Agent for ChatAgent {
    async fn process(&self, input: String, _context: &mut Context) -> Result<String> {
        Ok(self.run(vec![Message::user(input)]).await?.text)
    }

    async fn run_messages(
        &self,
        messages: Vec<Message>,
        _context: &mut Context,
    ) -> Result<Vec<Message>> {
        Ok(self.run(messages).await?.messages)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

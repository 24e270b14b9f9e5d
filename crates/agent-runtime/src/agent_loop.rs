//! Agent loop: LLM call, tool execution, repeat
//!
//! 1. Call the LLM with the conversation, available tools, and requested
//!    response format
//! 2. If it asks for tools, run them and append the results
//! 3. Otherwise return the final assistant text

use agent_core::{Error, Result};
use agent_llm::{
    CompletionRequest, ContentBlock, LLMProvider, Message, ResponseFormat, StopReason, TokenUsage,
    ToolDefinition,
};
use agent_tools::ToolRegistry;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Configuration for one agent's loop
#[derive(Debug, Clone)]
pub struct LoopConfig {
    /// Maximum number of LLM calls per run
    pub max_iterations: usize,

    /// Model to use
    pub model: String,

    /// System prompt (the agent's instructions)
    pub system_prompt: Option<String>,

    /// Max tokens per completion
    pub max_tokens: usize,

    /// Temperature
    pub temperature: Option<f32>,

    /// Structured output requested from the model
    pub response_format: Option<ResponseFormat>,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            max_iterations: 10,
            model: "openai/gpt-4o-mini".to_string(),
            system_prompt: None,
            max_tokens: 4096,
            temperature: None,
            response_format: None,
        }
    }
}

/// Result of one loop run
#[derive(Debug, Clone)]
pub struct LoopOutcome {
    /// Messages appended during the run (assistant turns and tool results)
    pub messages: Vec<Message>,
    /// Final assistant text
    pub text: String,
    /// Tokens summed over every LLM call
    pub usage: TokenUsage,
}

/// Runs the LLM → tool calls → LLM loop for one agent
pub struct AgentLoop {
    provider: Arc<dyn LLMProvider>,
    tool_registry: Arc<ToolRegistry>,
    config: LoopConfig,
}

impl AgentLoop {
    /// Create a new agent loop
    pub fn new(
        provider: Arc<dyn LLMProvider>,
        tool_registry: Arc<ToolRegistry>,
        config: LoopConfig,
    ) -> Self {
        Self {
            provider,
            tool_registry,
            config,
        }
    }

    /// Loop configuration
    pub fn config(&self) -> &LoopConfig {
        &self.config
    }

    /// Tools available to the model
    pub fn tools(&self) -> &Arc<ToolRegistry> {
        &self.tool_registry
    }

    /// Run the loop over a conversation
    pub async fn run(&self, conversation: Vec<Message>) -> Result<LoopOutcome> {
        let mut conversation = conversation;
        let start_len = conversation.len();
        let mut usage = TokenUsage::default();
        let tools = self.build_tool_definitions();

        for iteration in 1..=self.config.max_iterations {
            debug!(
                iteration = iteration,
                max_iterations = self.config.max_iterations,
                tool_count = tools.len(),
                "Agent iteration started"
            );

            let mut request_builder = CompletionRequest::builder(&self.config.model)
                .messages(conversation.clone())
                .max_tokens(self.config.max_tokens);

            if let Some(system) = &self.config.system_prompt {
                request_builder = request_builder.system(system.clone());
            }
            if let Some(temperature) = self.config.temperature {
                request_builder = request_builder.temperature(temperature);
            }
            if let Some(format) = &self.config.response_format {
                request_builder = request_builder.response_format(format.clone());
            }
            // Only add tools if we have any
            if !tools.is_empty() {
                request_builder = request_builder.tools(tools.clone());
            }

            let response = self
                .provider
                .complete(request_builder.build())
                .await
                .map_err(|e| Error::ProcessingFailed(e.to_string()))?;

            usage.input_tokens += response.usage.input_tokens;
            usage.output_tokens += response.usage.output_tokens;
            info!(
                stop_reason = ?response.stop_reason,
                input_tokens = response.usage.input_tokens,
                output_tokens = response.usage.output_tokens,
                "LLM response received"
            );

            conversation.push(response.message.clone());

            match response.stop_reason {
                StopReason::ToolUse => {
                    let tool_results = self.execute_tools(&response.message).await;
                    if tool_results.is_empty() {
                        return Err(Error::ProcessingFailed(
                            "Model requested tool use without any tool calls".to_string(),
                        ));
                    }
                    conversation.extend(tool_results);
                }
                StopReason::MaxTokens => {
                    warn!("Hit max tokens in LLM response");
                    return Ok(Self::finish(conversation, start_len, usage));
                }
                StopReason::EndTurn => {
                    return Ok(Self::finish(conversation, start_len, usage));
                }
            }
        }

        warn!(
            "Max iterations ({}) reached, stopping",
            self.config.max_iterations
        );
        Err(Error::ProcessingFailed(format!(
            "Max iterations ({}) reached without completion",
            self.config.max_iterations
        )))
    }

    fn finish(conversation: Vec<Message>, start_len: usize, usage: TokenUsage) -> LoopOutcome {
        let text = conversation
            .last()
            .and_then(Message::text)
            .unwrap_or_default()
            .to_string();
        LoopOutcome {
            messages: conversation.into_iter().skip(start_len).collect(),
            text,
            usage,
        }
    }

    fn build_tool_definitions(&self) -> Vec<ToolDefinition> {
        self.tool_registry
            .list_tools()
            .iter()
            .map(|tool| ToolDefinition::new(tool.name(), tool.description(), tool.input_schema()))
            .collect()
    }

    /// Execute tool calls; failures go back to the model as error results
    async fn execute_tools(&self, message: &Message) -> Vec<Message> {
        let mut results = Vec::new();

        for tool_use in message.tool_uses() {
            let ContentBlock::ToolUse { id, name, input } = tool_use else {
                continue;
            };

            let Some(tool) = self.tool_registry.get(name) else {
                warn!(tool_name = %name, "Model requested unknown tool");
                results.push(Message::tool_error(
                    id.clone(),
                    format!("Error: unknown tool '{name}'"),
                ));
                continue;
            };

            let start_time = Instant::now();
            match tool.execute(input.clone()).await {
                Ok(result) => {
                    info!(
                        tool_name = %name,
                        duration_ms = start_time.elapsed().as_millis() as u64,
                        "Tool execution succeeded"
                    );
                    results.push(Message::tool_result(id.clone(), result.to_string()));
                }
                Err(e) => {
                    warn!(
                        tool_name = %name,
                        duration_ms = start_time.elapsed().as_millis() as u64,
                        error = %e,
                        "Tool execution failed"
                    );
                    results.push(Message::tool_error(id.clone(), format!("Error: {e}")));
                }
            }
        }

        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent_llm::testing::ScriptedProvider;
    use agent_tools::Tool;
    use async_trait::async_trait;
    use serde_json::{Value, json};

    struct Upper;

    #[async_trait]
    impl Tool for Upper {
        async fn execute(&self, params: Value) -> Result<Value> {
            let text = params["text"].as_str().unwrap_or_default();
            Ok(json!({ "upper": text.to_uppercase() }))
        }

        fn name(&self) -> &str {
            "upper"
        }

        fn description(&self) -> &str {
            "Uppercase text"
        }

        fn input_schema(&self) -> Value {
            json!({"type": "object", "properties": {"text": {"type": "string"}}})
        }
    }

    fn agent_loop(provider: Arc<ScriptedProvider>, registry: ToolRegistry) -> AgentLoop {
        AgentLoop::new(
            provider,
            Arc::new(registry),
            LoopConfig {
                system_prompt: Some("Be brief".to_string()),
                ..LoopConfig::default()
            },
        )
    }

    #[tokio::test]
    async fn test_plain_completion() {
        let provider = Arc::new(ScriptedProvider::new());
        provider.push_text("Visit the Alfama at dawn.");

        let outcome = agent_loop(provider.clone(), ToolRegistry::new())
            .run(vec![Message::user("Lisbon?")])
            .await
            .unwrap();

        assert_eq!(outcome.text, "Visit the Alfama at dawn.");
        assert_eq!(outcome.messages.len(), 1);
        let requests = provider.requests();
        assert_eq!(requests[0].system.as_deref(), Some("Be brief"));
        assert!(requests[0].tools.is_none());
    }

    #[tokio::test]
    async fn test_tool_round_trip() {
        let provider = Arc::new(ScriptedProvider::new());
        provider
            .push_tool_call("call_1", "upper", json!({"text": "hi"}))
            .push_text("HI");

        let outcome = agent_loop(provider.clone(), ToolRegistry::new().with_tool(Arc::new(Upper)))
            .run(vec![Message::user("shout hi")])
            .await
            .unwrap();

        assert_eq!(outcome.text, "HI");
        // assistant tool call, tool result, final answer
        assert_eq!(outcome.messages.len(), 3);
        let second = &provider.requests()[1];
        assert_eq!(second.tools.as_ref().map(Vec::len), Some(1));
        assert_eq!(second.messages.len(), 3);
    }

    #[tokio::test]
    async fn test_unknown_tool_reported_to_model() {
        let provider = Arc::new(ScriptedProvider::new());
        provider
            .push_tool_call("call_1", "missing", json!({}))
            .push_text("sorry");

        let outcome = agent_loop(provider, ToolRegistry::new())
            .run(vec![Message::user("go")])
            .await
            .unwrap();

        assert_eq!(outcome.text, "sorry");
        let tool_message = &outcome.messages[1];
        assert!(format!("{tool_message:?}").contains("unknown tool"));
    }

    #[tokio::test]
    async fn test_max_iterations() {
        let provider = Arc::new(ScriptedProvider::new());
        provider
            .push_tool_call("c1", "upper", json!({"text": "a"}))
            .push_tool_call("c2", "upper", json!({"text": "b"}));

        let agent_loop = AgentLoop::new(
            provider,
            Arc::new(ToolRegistry::new().with_tool(Arc::new(Upper))),
            LoopConfig {
                max_iterations: 2,
                ..LoopConfig::default()
            },
        );

        let err = agent_loop.run(vec![Message::user("loop")]).await.unwrap_err();
        assert!(err.to_string().contains("Max iterations (2)"));
    }

    #[tokio::test]
    async fn test_provider_error_propagates() {
        let provider = Arc::new(ScriptedProvider::new());
        let err = agent_loop(provider, ToolRegistry::new())
            .run(vec![Message::user("hello")])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ProcessingFailed(_)));
    }
}

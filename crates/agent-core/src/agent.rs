//! Core Agent trait definition

use crate::{Context, Result};
use agent_llm::Message;
use async_trait::async_trait;

/// Core trait that all agents must implement
///
/// Input and output are plain text. Agents configured with a structured
/// response format return the model's JSON text unchanged; callers validate
/// it into their own types.
#[async_trait]
pub trait Agent: Send + Sync {
    /// Process input and return output
    async fn process(&self, input: String, context: &mut Context) -> Result<String>;

    /// Continue a conversation and return the messages this agent added
    ///
    /// The last returned message carries the agent's answer. The default
    /// joins the message texts into a single input for [`Agent::process`];
    /// chat agents override it to keep roles and tool turns.
    async fn run_messages(
        &self,
        messages: Vec<Message>,
        context: &mut Context,
    ) -> Result<Vec<Message>> {
        let input = messages
            .iter()
            .filter_map(Message::text)
            .collect::<Vec<_>>()
            .join("\n\n");
        let text = self.process(input, context).await?;
        Ok(vec![Message::assistant(text)])
    }

    /// Get the agent's name
    fn name(&self) -> &str;

    /// Short human readable description, shown by the dev UI
    fn description(&self) -> Option<&str> {
        None
    }
}

//! Chat client: one model connection shared by many agents

use crate::chat_agent::{AgentOptions, ChatAgent};
use agent_core::{Error, Result};
use agent_llm::{LLMProvider, OpenAIConfig, OpenAIProvider};
use agent_utils::ModelSettings;
use std::sync::Arc;
use tracing::info;

/// Connection to a chat model
///
/// Cloning is cheap; every clone shares the same provider.
#[derive(Clone)]
pub struct ChatClient {
    provider: Arc<dyn LLMProvider>,
    model_id: String,
}

impl ChatClient {
    /// Wrap an existing provider
    pub fn new(provider: Arc<dyn LLMProvider>, model_id: impl Into<String>) -> Self {
        Self {
            provider,
            model_id: model_id.into(),
        }
    }

    /// Connect to the OpenAI-compatible endpoint named by the settings
    pub fn from_settings(settings: &ModelSettings) -> Result<Self> {
        let config = OpenAIConfig::new(settings.token.clone()).with_api_base(&settings.endpoint);
        let provider = OpenAIProvider::with_config(config)
            .map_err(|e| Error::InitializationFailed(e.to_string()))?;

        info!(
            endpoint = %settings.endpoint,
            model = %settings.model_id,
            "Chat client ready"
        );
        Ok(Self::new(Arc::new(provider), settings.model_id.clone()))
    }

    /// Model used by agents created from this client
    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    /// Underlying provider
    pub fn provider(&self) -> Arc<dyn LLMProvider> {
        Arc::clone(&self.provider)
    }

    /// Create an agent bound to this client's model
    pub fn create_agent(&self, options: AgentOptions) -> ChatAgent {
        ChatAgent::new(self.provider(), self.model_id.clone(), options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent_core::Agent;
    use agent_llm::Message;
    use agent_llm::testing::ScriptedProvider;

    fn settings(token: &str) -> ModelSettings {
        ModelSettings {
            endpoint: "https://models.example.test/inference/".to_string(),
            token: token.to_string(),
            model_id: "openai/gpt-4o-mini".to_string(),
        }
    }

    #[test]
    fn test_from_settings() {
        let client = ChatClient::from_settings(&settings("secret")).unwrap();
        assert_eq!(client.model_id(), "openai/gpt-4o-mini");
        assert_eq!(client.provider().name(), "openai");
    }

    #[test]
    fn test_from_settings_rejects_empty_token() {
        let result = ChatClient::from_settings(&settings(""));
        assert!(matches!(result, Err(Error::InitializationFailed(_))));
    }

    #[tokio::test]
    async fn test_agents_share_model() {
        let provider = Arc::new(ScriptedProvider::new());
        provider.push_text("one").push_text("two");
        let client = ChatClient::new(provider.clone(), "test-model");

        let front_desk = client.create_agent(AgentOptions::new("FrontDesk", "a"));
        let concierge = client.create_agent(AgentOptions::new("Concierge", "b"));

        front_desk.run(vec![Message::user("hi")]).await.unwrap();
        concierge.run(vec![Message::user("hi")]).await.unwrap();

        let requests = provider.requests();
        assert!(requests.iter().all(|r| r.model == "test-model"));
        assert_eq!(concierge.name(), "Concierge");
    }
}

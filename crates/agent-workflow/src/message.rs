//! Messages passed along workflow edges

use agent_core::{Error, Result};
use agent_llm::Message;
use agent_runtime::parse_structured;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Request asking an agent executor to run its agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentExecutorRequest {
    /// Messages to add to the agent's conversation
    pub messages: Vec<Message>,
    /// Run the agent now, or only buffer the messages
    pub should_respond: bool,
}

impl AgentExecutorRequest {
    /// A single user message that should be answered
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::user(text)],
            should_respond: true,
        }
    }
}

/// Reply produced by an agent executor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentExecutorResponse {
    /// Executor that ran the agent
    pub executor_id: String,
    /// The agent's final text
    pub text: String,
    /// Conversation the agent saw, followed by its reply
    pub conversation: Vec<Message>,
}

impl AgentExecutorResponse {
    /// Validate the agent's structured output
    pub fn parse<T: DeserializeOwned>(&self) -> Result<T> {
        parse_structured(&self.text)
    }
}

/// A message travelling between executors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum WorkflowMessage {
    /// Input for an agent executor
    AgentRequest(AgentExecutorRequest),
    /// Output of an agent executor
    AgentResponse(AgentExecutorResponse),
    /// Typed data, serialized
    Data(Value),
    /// Plain text
    Text(String),
}

impl WorkflowMessage {
    /// Wrap a serializable value
    pub fn data<T: Serialize>(value: &T) -> Result<Self> {
        serde_json::to_value(value)
            .map(Self::Data)
            .map_err(|e| Error::ProcessingFailed(format!("Failed to serialize message: {e}")))
    }

    /// Read the message as `T`
    ///
    /// Data is converted directly; text and agent replies are validated as
    /// JSON.
    pub fn parse<T: DeserializeOwned>(&self) -> Result<T> {
        match self {
            Self::Data(value) => serde_json::from_value(value.clone())
                .map_err(|e| Error::InvalidOutput(format!("{e}: {value}"))),
            Self::Text(text) => parse_structured(text),
            Self::AgentResponse(response) => response.parse(),
            Self::AgentRequest(_) => Err(Error::InvalidOutput(
                "agent requests carry no data".to_string(),
            )),
        }
    }

    /// Short name of the variant, used in logs and errors
    pub fn kind(&self) -> &'static str {
        match self {
            Self::AgentRequest(_) => "agent_request",
            Self::AgentResponse(_) => "agent_response",
            Self::Data(_) => "data",
            Self::Text(_) => "text",
        }
    }

    /// Convert a message that left the graph into a workflow output
    pub fn into_output(self) -> Value {
        match self {
            Self::Text(text) => Value::String(text),
            Self::AgentResponse(response) => Value::String(response.text),
            Self::Data(value) => value,
            Self::AgentRequest(request) => {
                serde_json::to_value(request).unwrap_or(Value::Null)
            }
        }
    }
}

impl From<String> for WorkflowMessage {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for WorkflowMessage {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<AgentExecutorRequest> for WorkflowMessage {
    fn from(request: AgentExecutorRequest) -> Self {
        Self::AgentRequest(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Verdict {
        review_result: String,
    }

    #[test]
    fn test_data_roundtrip_through_parse() {
        let message = WorkflowMessage::data(&Verdict {
            review_result: "Yes".to_string(),
        })
        .unwrap();
        assert_eq!(message.kind(), "data");
        let verdict: Verdict = message.parse().unwrap();
        assert_eq!(verdict.review_result, "Yes");
    }

    #[test]
    fn test_agent_response_parse() {
        let message = WorkflowMessage::AgentResponse(AgentExecutorResponse {
            executor_id: "reviewer_agent".to_string(),
            text: r#"{"review_result":"No"}"#.to_string(),
            conversation: Vec::new(),
        });
        let verdict: Verdict = message.parse().unwrap();
        assert_eq!(verdict.review_result, "No");
    }

    #[test]
    fn test_request_has_no_data() {
        let message = WorkflowMessage::from(AgentExecutorRequest::user("hi"));
        assert!(message.parse::<Verdict>().is_err());
    }

    #[test]
    fn test_into_output() {
        assert_eq!(WorkflowMessage::from("done").into_output(), json!("done"));
        assert_eq!(
            WorkflowMessage::Data(json!({"file_path": "a.md"})).into_output(),
            json!({"file_path": "a.md"})
        );
    }
}

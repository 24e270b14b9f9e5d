//! Executors: the nodes of a workflow graph

use crate::context::WorkflowContext;
use crate::event::WorkflowEvent;
use crate::message::{AgentExecutorRequest, AgentExecutorResponse, WorkflowMessage};
use agent_core::{Agent, Error, Result};
use agent_llm::Message;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// A node that handles workflow messages
#[async_trait]
pub trait Executor: Send + Sync {
    /// Unique id within a workflow
    fn id(&self) -> &str;

    /// Kind shown by the dev UI
    fn kind(&self) -> &'static str {
        "executor"
    }

    /// Handle one incoming message
    async fn handle(&self, message: WorkflowMessage, ctx: &mut WorkflowContext<'_>) -> Result<()>;
}

const PENDING_PREFIX: &str = "agent_executor.pending.";

/// Runs an agent for each request it receives
///
/// Requests with `should_respond == false` are buffered for the current run
/// and prepended to the next request that asks for a reply. A plain text
/// message counts as one user message. An incoming agent response is
/// answered using its whole conversation, roles and tool turns included.
pub struct AgentExecutor {
    id: String,
    agent: Arc<dyn Agent>,
}

impl AgentExecutor {
    /// Wrap an agent, using its name as the executor id
    pub fn new(agent: Arc<dyn Agent>) -> Self {
        Self {
            id: agent.name().to_string(),
            agent,
        }
    }

    /// Wrap an agent under an explicit id
    pub fn with_id(id: impl Into<String>, agent: Arc<dyn Agent>) -> Self {
        Self {
            id: id.into(),
            agent,
        }
    }

    /// The wrapped agent
    pub fn agent(&self) -> &Arc<dyn Agent> {
        &self.agent
    }

    fn pending_key(&self) -> String {
        format!("{PENDING_PREFIX}{}", self.id)
    }

    async fn respond(&self, messages: Vec<Message>, ctx: &mut WorkflowContext<'_>) -> Result<()> {
        let key = self.pending_key();
        let mut conversation: Vec<Message> = ctx.state().get_typed(&key)?.unwrap_or_default();
        ctx.state_mut().remove(&key);
        conversation.extend(messages);

        debug!(executor_id = %self.id, messages = conversation.len(), "Running agent");
        let added = self
            .agent
            .run_messages(conversation.clone(), ctx.state_mut())
            .await?;
        let text = added
            .last()
            .and_then(Message::text)
            .unwrap_or_default()
            .to_string();
        conversation.extend(added);

        ctx.push_event(WorkflowEvent::AgentRun {
            executor_id: self.id.clone(),
            text: text.clone(),
        });
        ctx.send_message(WorkflowMessage::AgentResponse(AgentExecutorResponse {
            executor_id: self.id.clone(),
            text,
            conversation,
        }));
        Ok(())
    }
}

#[async_trait]
impl Executor for AgentExecutor {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> &'static str {
        "agent"
    }

    async fn handle(&self, message: WorkflowMessage, ctx: &mut WorkflowContext<'_>) -> Result<()> {
        match message {
            WorkflowMessage::AgentRequest(AgentExecutorRequest {
                messages,
                should_respond: true,
            }) => self.respond(messages, ctx).await,
            WorkflowMessage::AgentRequest(AgentExecutorRequest { messages, .. }) => {
                let key = self.pending_key();
                let mut pending: Vec<Message> = ctx.state().get_typed(&key)?.unwrap_or_default();
                pending.extend(messages);
                ctx.state_mut().insert_typed(key, &pending)
            }
            WorkflowMessage::Text(text) => self.respond(vec![Message::user(text)], ctx).await,
            WorkflowMessage::AgentResponse(previous) => {
                self.respond(previous.conversation, ctx).await
            }
            WorkflowMessage::Data(_) => Err(Error::ProcessingFailed(format!(
                "Agent executor '{}' cannot handle data messages",
                self.id
            ))),
        }
    }
}

type HandlerFn = dyn Fn(WorkflowMessage, &mut WorkflowContext<'_>) -> Result<()> + Send + Sync;

/// An executor backed by a plain function
///
/// # Example
///
/// ```
/// use agent_workflow::{FunctionExecutor, WorkflowContext, WorkflowMessage};
///
/// let shout = FunctionExecutor::new("shout", |message: WorkflowMessage, ctx: &mut WorkflowContext<'_>| {
///     if let WorkflowMessage::Text(text) = message {
///         ctx.send_message(text.to_uppercase());
///     }
///     Ok(())
/// });
/// ```
pub struct FunctionExecutor {
    id: String,
    handler: Box<HandlerFn>,
}

impl FunctionExecutor {
    /// Create an executor from a handler function
    pub fn new<F>(id: impl Into<String>, handler: F) -> Self
    where
        F: Fn(WorkflowMessage, &mut WorkflowContext<'_>) -> Result<()> + Send + Sync + 'static,
    {
        Self {
            id: id.into(),
            handler: Box::new(handler),
        }
    }
}

#[async_trait]
impl Executor for FunctionExecutor {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> &'static str {
        "function"
    }

    async fn handle(&self, message: WorkflowMessage, ctx: &mut WorkflowContext<'_>) -> Result<()> {
        (self.handler)(message, ctx)
    }
}

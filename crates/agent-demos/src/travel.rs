//! Travel plan workflow: FrontDesk suggests, Concierge reviews

use agent_runtime::{AgentOptions, ChatAgent, ChatClient};
use agent_workflow::{AgentExecutor, Executor, Workflow, WorkflowBuilder};
use std::sync::Arc;

/// Dev UI entity id
pub const WORKFLOW_ID: &str = "workflow_basic";

pub const FRONTDESK_NAME: &str = "FrontDesk";
pub const FRONTDESK_INSTRUCTIONS: &str = "\
You are a Front Desk Travel Agent with ten years of experience and are known for brevity as you deal with many customers.
The goal is to provide the best activities and locations for a traveler to visit.
Only provide a single recommendation per response.
You're laser focused on the goal at hand.
Don't waste time with chit chat.
Consider suggestions when refining an idea.";

pub const CONCIERGE_NAME: &str = "Concierge";
pub const CONCIERGE_INSTRUCTIONS: &str = "\
You are a hotel concierge who has opinions about providing the most local and authentic experiences for travelers.
The goal is to determine if the front desk travel agent has recommended the best non-touristy experience for a traveler.
If so, state that it is approved.
If not, provide insight on how to refine the recommendation without using a specific example.";

pub fn front_desk_agent(client: &ChatClient) -> ChatAgent {
    client.create_agent(
        AgentOptions::new(FRONTDESK_NAME, FRONTDESK_INSTRUCTIONS)
            .with_description("Suggests one activity or location per answer"),
    )
}

pub fn concierge_agent(client: &ChatClient) -> ChatAgent {
    client.create_agent(
        AgentOptions::new(CONCIERGE_NAME, CONCIERGE_INSTRUCTIONS)
            .with_description("Approves local, non-touristy suggestions or explains how to refine them"),
    )
}

/// Build the FrontDesk → Concierge workflow
pub fn build_workflow(client: &ChatClient) -> agent_workflow::Result<Workflow> {
    let front_desk: Arc<dyn Executor> =
        Arc::new(AgentExecutor::new(Arc::new(front_desk_agent(client))));
    let concierge: Arc<dyn Executor> =
        Arc::new(AgentExecutor::new(Arc::new(concierge_agent(client))));

    WorkflowBuilder::new(WORKFLOW_ID)
        .with_name("Travel Plan Workflow")
        .with_description("A front desk agent proposes an activity and a concierge reviews it")
        .set_start_executor(&front_desk)
        .add_edge(&front_desk, &concierge)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent_llm::Role;
    use agent_llm::testing::ScriptedProvider;
    use agent_workflow::WorkflowEvent;
    use serde_json::json;

    #[tokio::test]
    async fn test_concierge_reviews_front_desk_suggestion() {
        let provider = Arc::new(ScriptedProvider::new());
        provider
            .push_text("Take a fado evening in Mouraria.")
            .push_text("Approved.");
        let client = ChatClient::new(provider.clone(), "openai/gpt-4o-mini");

        let workflow = build_workflow(&client).unwrap();
        assert_eq!(workflow.id(), WORKFLOW_ID);

        let result = workflow.run("One day in Lisbon?").await.unwrap();
        assert_eq!(result.outputs, vec![json!("Approved.")]);

        let agents: Vec<_> = result
            .events
            .iter()
            .filter_map(|e| match e {
                WorkflowEvent::AgentRun { executor_id, .. } => Some(executor_id.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(agents, [FRONTDESK_NAME, CONCIERGE_NAME]);

        let requests = provider.requests();
        assert_eq!(requests[0].system.as_deref(), Some(FRONTDESK_INSTRUCTIONS));
        assert_eq!(requests[1].system.as_deref(), Some(CONCIERGE_INSTRUCTIONS));
        // The concierge sees the traveler's question and the suggestion as separate turns
        let concierge_input = &requests[1].messages;
        assert_eq!(concierge_input.len(), 2);
        assert_eq!(concierge_input[0].role, Role::User);
        assert_eq!(concierge_input[0].text(), Some("One day in Lisbon?"));
        assert_eq!(concierge_input[1].role, Role::Assistant);
        assert_eq!(concierge_input[1].text(), Some("Take a fado evening in Mouraria."));
    }
}

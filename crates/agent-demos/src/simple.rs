//! Smallest two-agent workflow, useful to check that a setup works

use agent_devui::DevUiConfig;
use agent_runtime::{AgentOptions, ChatClient};
use agent_utils::ModelSettings;
use agent_workflow::{AgentExecutor, Executor, Workflow, WorkflowBuilder};
use std::sync::Arc;
use tracing::{error, info};

/// Dev UI entity id
pub const WORKFLOW_ID: &str = "workflow_simple";

/// Build the TravelAgent → Reviewer workflow
pub fn build_workflow(client: &ChatClient) -> agent_workflow::Result<Workflow> {
    let travel_agent: Arc<dyn Executor> = Arc::new(AgentExecutor::new(Arc::new(
        client.create_agent(AgentOptions::new(
            "TravelAgent",
            "You are a helpful travel agent.",
        )),
    )));
    let reviewer: Arc<dyn Executor> = Arc::new(AgentExecutor::new(Arc::new(
        client.create_agent(AgentOptions::new("Reviewer", "You are a reviewer.")),
    )));

    WorkflowBuilder::new(WORKFLOW_ID)
        .with_name("Simple Workflow")
        .set_start_executor(&travel_agent)
        .add_edge(&travel_agent, &reviewer)
        .build()
}

/// Create the client and workflow, then serve them
///
/// Any failure is logged with its full cause chain before being returned.
pub async fn launch(settings: &ModelSettings, config: DevUiConfig) -> anyhow::Result<()> {
    serve_simple(settings, config)
        .await
        .inspect_err(|e| error!("Error: {e:#}"))
}

async fn serve_simple(settings: &ModelSettings, config: DevUiConfig) -> anyhow::Result<()> {
    let client = ChatClient::from_settings(settings)?;
    let workflow = build_workflow(&client)?;
    info!("Workflow created successfully");

    info!("Starting server...");
    agent_devui::serve(vec![Arc::new(workflow)], config).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent_llm::testing::ScriptedProvider;
    use serde_json::json;

    #[tokio::test]
    async fn test_reviewer_answers_last() {
        let provider = Arc::new(ScriptedProvider::new());
        provider.push_text("Kyoto in autumn.").push_text("Solid pick.");
        let client = ChatClient::new(provider, "m");

        let result = build_workflow(&client)
            .unwrap()
            .run("Where should I go?")
            .await
            .unwrap();
        assert_eq!(result.outputs, vec![json!("Solid pick.")]);
    }

    #[tokio::test]
    async fn test_launch_reports_bad_settings() {
        let settings = ModelSettings {
            endpoint: "https://models.example.test".to_string(),
            token: String::new(),
            model_id: "m".to_string(),
        };
        let err = launch(&settings, DevUiConfig::default()).await.unwrap_err();
        assert!(err.to_string().contains("API key"));
    }
}

//! Content review workflow
//!
//! The Evangelist drafts a tutorial, the ContentReviewer judges it and the
//! Publisher saves approved drafts as Markdown:
//!
//! ```text
//! evangelist_agent → to_evangelist_content_result → reviewer_agent → to_reviewer_result
//!                                                                        ├─ "No"  → handle_review
//!                                                                        └─ "Yes" → save_draft → publisher_agent
//! ```

use agent_core::{Error, Result};
use agent_llm::ResponseFormat;
use agent_llm::tools::schema;
use agent_runtime::{AgentOptions, ChatAgent, ChatClient};
use agent_tools::Tool;
use agent_workflow::{
    AgentExecutor, AgentExecutorRequest, Executor, FunctionExecutor, Workflow, WorkflowBuilder,
    WorkflowContext, WorkflowMessage,
};
use async_trait::async_trait;
use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::fs::{File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// Dev UI entity id
pub const WORKFLOW_ID: &str = "workflow_content";

pub const EVANGELIST_NAME: &str = "Evangelist";
pub const EVANGELIST_INSTRUCTIONS: &str = "\
You are a technology evangelist create a first draft for a technical tutorials.
1. Each knowledge point in the outline must include a link. Follow the link to access the content related to the knowledge point in the outline. Expand on that content.
2. Each knowledge point must be explained in detail.
3. Rewrite the content according to the entry requirements, including the title, outline, and corresponding content. It is not necessary to follow the outline in full order.
4. The content must be more than 200 words.
5. Always return JSON with draft_content (string).
6. Include the whole draft in draft_content.";

pub const REVIEWER_NAME: &str = "ContentReviewer";
pub const REVIEWER_INSTRUCTIONS: &str = "\
You are a content reviewer and need to check whether the tutorial's draft content meets the following requirements:
1. The draft content less than 200 words, set 'review_result' to 'No' and 'reason' to 'Content is too short'. If the draft content is more than 200 words, set 'review_result' to 'Yes' and 'reason' to 'The content is good'.
2. set 'draft_content' to the original draft content.
3. Always return result as JSON with fields 'review_result' ('Yes' or 'No') and 'reason' (string) and 'draft_content' (string).";

pub const PUBLISHER_NAME: &str = "Publisher";
pub const PUBLISHER_INSTRUCTIONS: &str = "\
You are the content publisher. Save the tutorial's draft content as a Markdown file by calling the save_markdown tool with the complete draft.
The tool names the file after the current date and time, such as 20240101123045.md.
Return JSON with file_path set to the path reported by the tool.";

/// Verdict of the content review
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReviewVerdict {
    Yes,
    No,
}

/// Structured output of the ContentReviewer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewResult {
    pub review_result: ReviewVerdict,
    pub reason: String,
    pub draft_content: String,
}

/// Structured output of the Evangelist
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvangelistDraft {
    pub draft_content: String,
}

/// Structured output of the Publisher
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublisherResult {
    pub file_path: String,
}

/// File name for a draft saved at `now`, e.g. `20240101123045.md`
pub fn timestamp_filename(now: &NaiveDateTime) -> String {
    now.format("%Y%m%d%H%M%S.md").to_string()
}

const MAX_SAVE_ATTEMPTS: usize = 5;

/// Saves Markdown content into a directory
pub struct SaveMarkdownTool {
    output_dir: PathBuf,
}

impl SaveMarkdownTool {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Create a new file named after the current second
    ///
    /// Existing drafts are never overwritten: when the name is taken, wait
    /// for the next second and try again.
    async fn create_draft_file(&self) -> Result<(PathBuf, File)> {
        for _ in 0..MAX_SAVE_ATTEMPTS {
            let now = Local::now();
            let path = self.output_dir.join(timestamp_filename(&now.naive_local()));
            match OpenOptions::new().write(true).create_new(true).open(&path).await {
                Ok(file) => return Ok((path, file)),
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    debug!(path = %path.display(), "Draft name taken, waiting for the next second");
                    let elapsed = u64::from(now.timestamp_subsec_millis().min(999));
                    sleep(Duration::from_millis(1000 - elapsed)).await;
                }
                Err(e) => {
                    return Err(Error::ProcessingFailed(format!(
                        "cannot create {}: {e}",
                        path.display()
                    )));
                }
            }
        }

        Err(Error::ProcessingFailed(format!(
            "no free draft name in {} after {MAX_SAVE_ATTEMPTS} attempts",
            self.output_dir.display()
        )))
    }
}

#[async_trait]
impl Tool for SaveMarkdownTool {
    async fn execute(&self, params: Value) -> Result<Value> {
        let content = params["content"]
            .as_str()
            .ok_or_else(|| Error::ProcessingFailed("missing string parameter 'content'".to_string()))?;

        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|e| Error::ProcessingFailed(format!("cannot create {}: {e}", self.output_dir.display())))?;

        let (path, mut file) = self.create_draft_file().await?;
        async {
            file.write_all(content.as_bytes()).await?;
            file.flush().await
        }
        .await
        .map_err(|e| Error::ProcessingFailed(format!("cannot write {}: {e}", path.display())))?;

        info!(path = %path.display(), bytes = content.len(), "Draft saved");
        Ok(json!({ "file_path": path.display().to_string() }))
    }

    fn name(&self) -> &str {
        "save_markdown"
    }

    fn description(&self) -> &str {
        "Save Markdown content to a file named after the current date and time"
    }

    fn input_schema(&self) -> Value {
        schema::object(
            json!({ "content": schema::string("Markdown content to save") }),
            vec!["content"],
        )
    }
}

pub fn evangelist_agent(client: &ChatClient) -> ChatAgent {
    client.create_agent(
        AgentOptions::new(EVANGELIST_NAME, EVANGELIST_INSTRUCTIONS)
            .with_description("Writes the first draft of a technical tutorial")
            .with_response_format(ResponseFormat::json_schema(
                "EvangelistDraft",
                schema::object(
                    json!({ "draft_content": schema::string("The complete tutorial draft") }),
                    vec!["draft_content"],
                ),
            )),
    )
}

pub fn reviewer_agent(client: &ChatClient) -> ChatAgent {
    client.create_agent(
        AgentOptions::new(REVIEWER_NAME, REVIEWER_INSTRUCTIONS)
            .with_description("Checks whether a draft is long enough to publish")
            .with_response_format(ResponseFormat::json_schema(
                "ReviewResult",
                schema::object(
                    json!({
                        "review_result": schema::string_enum("Whether the draft passed", &["Yes", "No"]),
                        "reason": schema::string("Why the draft passed or failed"),
                        "draft_content": schema::string("The original draft content"),
                    }),
                    vec!["review_result", "reason", "draft_content"],
                ),
            )),
    )
}

pub fn publisher_agent(client: &ChatClient, output_dir: impl Into<PathBuf>) -> ChatAgent {
    client.create_agent(
        AgentOptions::new(PUBLISHER_NAME, PUBLISHER_INSTRUCTIONS)
            .with_description("Saves approved drafts as Markdown files")
            .with_tool(Arc::new(SaveMarkdownTool::new(output_dir)))
            .with_response_format(ResponseFormat::json_schema(
                "PublisherResult",
                schema::object(
                    json!({ "file_path": schema::string("Path of the saved Markdown file") }),
                    vec!["file_path"],
                ),
            )),
    )
}

/// Turn the Evangelist's JSON into a request for the reviewer
pub fn to_evangelist_content_result(message: WorkflowMessage, ctx: &mut WorkflowContext<'_>) -> Result<()> {
    if let WorkflowMessage::AgentResponse(response) = &message {
        info!("Raw response from evangelist agent: {}", response.text);
    }
    let draft: EvangelistDraft = message.parse()?;
    ctx.send_message(AgentExecutorRequest::user(draft.draft_content));
    Ok(())
}

/// Validate the reviewer's JSON into a [`ReviewResult`]
pub fn to_reviewer_result(message: WorkflowMessage, ctx: &mut WorkflowContext<'_>) -> Result<()> {
    if let WorkflowMessage::AgentResponse(response) = &message {
        info!("Raw response from reviewer agent: {}", response.text);
    }
    let review: ReviewResult = message.parse()?;
    ctx.send_message(WorkflowMessage::data(&review)?);
    Ok(())
}

/// Route a review to `save_draft` when approved, otherwise to `handle_review`
///
/// `target_ids` is `[handle_review, save_draft]`.
pub fn select_targets(message: &WorkflowMessage, target_ids: &[String]) -> Vec<String> {
    let [handle_review_id, save_draft_id] = target_ids else {
        warn!(targets = ?target_ids, "Expected exactly two review targets");
        return Vec::new();
    };

    match message.parse::<ReviewResult>() {
        Ok(review) if review.review_result == ReviewVerdict::Yes => vec![save_draft_id.clone()],
        _ => vec![handle_review_id.clone()],
    }
}

/// Stop the run with a revision request for rejected drafts
pub fn handle_review(message: WorkflowMessage, ctx: &mut WorkflowContext<'_>) -> Result<()> {
    let review: ReviewResult = message.parse()?;
    match review.review_result {
        ReviewVerdict::No => {
            ctx.yield_output(format!(
                "Review failed: {}, please revise the draft.",
                review.reason
            ));
        }
        ReviewVerdict::Yes => {
            ctx.send_message(AgentExecutorRequest::user(review.draft_content));
        }
    }
    Ok(())
}

/// Hand an approved draft to the publisher
pub fn save_draft(message: WorkflowMessage, ctx: &mut WorkflowContext<'_>) -> Result<()> {
    let review: ReviewResult = message.parse()?;
    ctx.send_message(AgentExecutorRequest::user(review.draft_content));
    Ok(())
}

/// Build the content review workflow; published drafts go to `output_dir`
pub fn build_workflow(
    client: &ChatClient,
    output_dir: impl Into<PathBuf>,
) -> agent_workflow::Result<Workflow> {
    let evangelist: Arc<dyn Executor> = Arc::new(AgentExecutor::with_id(
        "evangelist_agent",
        Arc::new(evangelist_agent(client)),
    ));
    let reviewer: Arc<dyn Executor> = Arc::new(AgentExecutor::with_id(
        "reviewer_agent",
        Arc::new(reviewer_agent(client)),
    ));
    let publisher: Arc<dyn Executor> = Arc::new(AgentExecutor::with_id(
        "publisher_agent",
        Arc::new(publisher_agent(client, output_dir)),
    ));

    let to_evangelist: Arc<dyn Executor> = Arc::new(FunctionExecutor::new(
        "to_evangelist_content_result",
        to_evangelist_content_result,
    ));
    let to_reviewer: Arc<dyn Executor> =
        Arc::new(FunctionExecutor::new("to_reviewer_result", to_reviewer_result));
    let handle: Arc<dyn Executor> = Arc::new(FunctionExecutor::new("handle_review", handle_review));
    let save: Arc<dyn Executor> = Arc::new(FunctionExecutor::new("save_draft", save_draft));

    WorkflowBuilder::new(WORKFLOW_ID)
        .with_name("Content Review Workflow")
        .with_description("Draft a tutorial, review it and publish it when approved")
        .set_start_executor(&evangelist)
        .add_edge(&evangelist, &to_evangelist)
        .add_edge(&to_evangelist, &reviewer)
        .add_edge(&reviewer, &to_reviewer)
        .add_multi_selection_edge_group(&to_reviewer, &[handle, Arc::clone(&save)], select_targets)
        .add_edge(&save, &publisher)
        .build()
}

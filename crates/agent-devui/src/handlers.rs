//! HTTP handlers

use crate::state::DevUiState;
use actix_web::{HttpResponse, Responder, web};
use agent_workflow::{Workflow, WorkflowEvent};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::time::Instant;
use tracing::{error, info};

/// Body of a run request
#[derive(Debug, Deserialize)]
pub struct RunRequest {
    /// Text handed to the start executor
    pub input: String,
}

/// Result of a run
#[derive(Debug, Serialize, Deserialize)]
pub struct RunResponse {
    pub entity_id: String,
    pub outputs: Vec<Value>,
    pub events: Vec<WorkflowEvent>,
    pub duration_ms: u64,
}

#[derive(Debug, Serialize)]
struct EntitySummary<'a> {
    id: &'a str,
    name: &'a str,
    description: Option<&'a str>,
    #[serde(rename = "type")]
    kind: &'static str,
    start_executor: &'a str,
}

impl<'a> From<&'a Workflow> for EntitySummary<'a> {
    fn from(workflow: &'a Workflow) -> Self {
        Self {
            id: workflow.id(),
            name: workflow.name(),
            description: workflow.description(),
            kind: "workflow",
            start_executor: workflow.start_executor(),
        }
    }
}

fn not_found(id: &str) -> HttpResponse {
    HttpResponse::NotFound().json(json!({ "error": format!("Entity '{id}' not found") }))
}

pub async fn health(state: web::Data<DevUiState>) -> impl Responder {
    HttpResponse::Ok().json(json!({
        "status": "healthy",
        "entities": state.len(),
    }))
}

pub async fn list_entities(state: web::Data<DevUiState>) -> impl Responder {
    let entities: Vec<EntitySummary<'_>> = state.entities().map(|w| w.as_ref().into()).collect();
    HttpResponse::Ok().json(json!({ "entities": entities }))
}

pub async fn get_entity(state: web::Data<DevUiState>, path: web::Path<String>) -> impl Responder {
    let id = path.into_inner();
    match state.get(&id) {
        Some(workflow) => HttpResponse::Ok().json(workflow.describe()),
        None => not_found(&id),
    }
}

pub async fn run_entity(
    state: web::Data<DevUiState>,
    path: web::Path<String>,
    body: web::Json<RunRequest>,
) -> impl Responder {
    let id = path.into_inner();
    let Some(workflow) = state.get(&id) else {
        return not_found(&id);
    };

    info!(entity_id = %id, "Running entity");
    let started = Instant::now();
    match workflow.run(body.into_inner().input).await {
        Ok(result) => {
            let events = if state.tracing_enabled() {
                result.events
            } else {
                result.events.into_iter().filter(|e| !e.is_timing()).collect()
            };
            HttpResponse::Ok().json(RunResponse {
                entity_id: id,
                outputs: result.outputs,
                events,
                duration_ms: started.elapsed().as_millis() as u64,
            })
        }
        Err(e) => {
            error!(entity_id = %id, error = %e, "Entity run failed");
            HttpResponse::InternalServerError().json(json!({ "error": e.to_string() }))
        }
    }
}

pub async fn index(state: web::Data<DevUiState>) -> impl Responder {
    let mut items = String::new();
    for workflow in state.entities() {
        items.push_str(&format!(
            "<li><a href=\"/v1/entities/{id}\"><code>{id}</code></a> {name}</li>\n",
            id = escape(workflow.id()),
            name = escape(workflow.name()),
        ));
    }

    let page = format!(
        "<!doctype html>\n<html><head><title>Dev UI</title></head><body>\n\
         <h1>Entities</h1>\n<ul>\n{items}</ul>\n\
         <p>POST <code>/v1/entities/&lt;id&gt;/run</code> with <code>{{\"input\": \"...\"}}</code> to run one.</p>\n\
         </body></html>\n"
    );
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(page)
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape() {
        assert_eq!(escape("<a & \"b\">"), "&lt;a &amp; &quot;b&quot;&gt;");
    }
}

//! HTTP server exposing workflows to the dev UI

use crate::config::DevUiConfig;
use crate::handlers;
use crate::state::DevUiState;
use actix_web::{App, HttpServer, middleware, web};
use agent_workflow::Workflow;
use std::io;
use std::sync::Arc;
use tracing::info;

/// Register the dev UI routes
///
/// Expects a `web::Data<DevUiState>` on the app.
pub fn app_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(handlers::index))
        .route("/health", web::get().to(handlers::health))
        .service(
            web::scope("/v1")
                .route("/entities", web::get().to(handlers::list_entities))
                .route("/entities/{id}", web::get().to(handlers::get_entity))
                .route("/entities/{id}/run", web::post().to(handlers::run_entity)),
        );
}

/// Serve `entities` until the process is interrupted
pub async fn serve(entities: Vec<Arc<Workflow>>, config: DevUiConfig) -> io::Result<()> {
    let state = web::Data::new(DevUiState::new(entities, config.tracing_enabled));

    for workflow in state.entities() {
        info!("Entity ID: {}", workflow.id());
    }
    info!(
        host = %config.host,
        port = config.port,
        tracing = config.tracing_enabled,
        "Starting dev UI"
    );
    if config.auto_open {
        info!("Open {} in your browser", config.url());
    } else {
        info!("Available at: {}", config.url());
    }

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(middleware::Logger::default())
            .configure(app_config)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::RunResponse;
    use actix_web::{http::StatusCode, test};
    use agent_workflow::{Executor, FunctionExecutor, WorkflowBuilder, WorkflowContext, WorkflowEvent, WorkflowMessage};
    use serde_json::{Value, json};

    fn echo_workflow() -> Arc<Workflow> {
        let echo: Arc<dyn Executor> = Arc::new(FunctionExecutor::new(
            "echo",
            |message: WorkflowMessage, ctx: &mut WorkflowContext<'_>| {
                match message {
                    WorkflowMessage::Text(text) if text == "fail" => {
                        return Err(agent_core_error("refused"));
                    }
                    WorkflowMessage::Text(text) => ctx.yield_output(format!("echo: {text}")),
                    _ => {}
                }
                Ok(())
            },
        ));
        Arc::new(
            WorkflowBuilder::new("workflow_echo")
                .with_name("Echo")
                .set_start_executor(&echo)
                .build()
                .unwrap(),
        )
    }

    fn agent_core_error(message: &str) -> agent_core::Error {
        agent_core::Error::ProcessingFailed(message.to_string())
    }

    fn state(tracing_enabled: bool) -> web::Data<DevUiState> {
        web::Data::new(DevUiState::new(vec![echo_workflow()], tracing_enabled))
    }

    #[actix_web::test]
    async fn test_health_and_listing() {
        let app = test::init_service(App::new().app_data(state(false)).configure(app_config)).await;

        let req = test::TestRequest::get().uri("/health").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body, json!({"status": "healthy", "entities": 1}));

        let req = test::TestRequest::get().uri("/v1/entities").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["entities"][0]["id"], "workflow_echo");
        assert_eq!(body["entities"][0]["type"], "workflow");
    }

    #[actix_web::test]
    async fn test_entity_detail_and_missing() {
        let app = test::init_service(App::new().app_data(state(false)).configure(app_config)).await;

        let req = test::TestRequest::get().uri("/v1/entities/workflow_echo").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["start_executor"], "echo");

        let req = test::TestRequest::get().uri("/v1/entities/nope").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_run_hides_timing_without_tracing() {
        let app = test::init_service(App::new().app_data(state(false)).configure(app_config)).await;

        let req = test::TestRequest::post()
            .uri("/v1/entities/workflow_echo/run")
            .set_json(json!({"input": "hi"}))
            .to_request();
        let body: RunResponse = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.outputs, vec![json!("echo: hi")]);
        assert!(!body.events.iter().any(WorkflowEvent::is_timing));
    }

    #[actix_web::test]
    async fn test_run_with_tracing_includes_timing() {
        let app = test::init_service(App::new().app_data(state(true)).configure(app_config)).await;

        let req = test::TestRequest::post()
            .uri("/v1/entities/workflow_echo/run")
            .set_json(json!({"input": "hi"}))
            .to_request();
        let body: RunResponse = test::call_and_read_body_json(&app, req).await;
        assert!(body.events.iter().any(WorkflowEvent::is_timing));
    }

    #[actix_web::test]
    async fn test_run_failure_is_500() {
        let app = test::init_service(App::new().app_data(state(false)).configure(app_config)).await;

        let req = test::TestRequest::post()
            .uri("/v1/entities/workflow_echo/run")
            .set_json(json!({"input": "fail"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["error"].as_str().unwrap().contains("refused"));
    }

    #[actix_web::test]
    async fn test_index_lists_entities() {
        let app = test::init_service(App::new().app_data(state(false)).configure(app_config)).await;

        let req = test::TestRequest::get().uri("/").to_request();
        let body = test::call_and_read_body(&app, req).await;
        let html = String::from_utf8(body.to_vec()).unwrap();
        assert!(html.contains("workflow_echo"));
    }
}

// REST API for the travel orchestrator

use axum::{
    Router,
    extract::State,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use http::StatusCode;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::error::PlanError;
use crate::orchestrator::Orchestrator;

pub type AppState = Arc<Orchestrator>;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/chat", post(chat))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

fn status_for(err: &PlanError) -> StatusCode {
    match err {
        PlanError::Validation(_) => StatusCode::BAD_REQUEST,
        PlanError::Provider(_) => StatusCode::BAD_GATEWAY,
        PlanError::SchemaValidation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        PlanError::Pipeline { .. } | PlanError::Reasoning(_) | PlanError::Config(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for PlanError {
    fn into_response(self) -> Response {
        let status = status_for(&self);
        let message = match &self {
            PlanError::Validation(msg) => msg.clone(),
            other => other.to_string(),
        };
        (status, Json(json!({ "error": message, "kind": self.kind() }))).into_response()
    }
}

async fn chat(
    State(state): State<AppState>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<Value>, PlanError> {
    let timestamp = chrono::Utc::now().to_rfc3339();
    let message = payload.message.unwrap_or_default();
    let delivery = state
        .plan_trip(&message, &timestamp)
        .await
        .inspect_err(|e| warn!(kind = e.kind(), "chat request failed"))?;

    Ok(Json(json!({
        "response": delivery.rendered,
        "plan": delivery.plan,
        "run_id": delivery.run_id,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CrewConfig;
    use crate::error::PlanResult;
    use crate::pipeline::PipelineOptions;
    use crate::reasoner::{Reasoner, TaskRequest};
    use crate::tools::{ToolBelt, default_registry, testing::MockProvider};
    use async_trait::async_trait;
    use axum::body::{Body, to_bytes};
    use http::Request;
    use tower::ServiceExt;

    /// Answers every unit with the same canned text.
    struct CannedReasoner(PlanResult<String>);

    #[async_trait]
    impl Reasoner for CannedReasoner {
        async fn perform(&self, _request: TaskRequest<'_>, _tools: &ToolBelt<'_>) -> PlanResult<String> {
            self.0.clone()
        }
    }

    const PLAN: &str = r#"{"name":"Weekend","origin":"Lyon","destination":"Nice","total_cost":0,
        "day_plans":[{"date":"2025-05-01","activities":["Beach"],"restaurants":[]}]}"#;

    fn app(answer: PlanResult<String>) -> Router {
        let crew = CrewConfig::builtin().unwrap();
        let tools = default_registry(Arc::new(MockProvider::returning(json!({}))));
        let orch = Orchestrator::new(
            &crew,
            tools,
            Arc::new(CannedReasoner(answer)),
            PipelineOptions::default(),
        )
        .unwrap();
        create_router(Arc::new(orch))
    }

    async fn post_chat(app: Router, body: Value) -> (StatusCode, Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/chat")
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let response = app(Ok(PLAN.to_string()))
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_chat_returns_envelope_and_plan() {
        let (status, body) = post_chat(app(Ok(PLAN.to_string())), json!({ "message": "Nice" })).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["response"].as_str().unwrap().contains("Your Personalized Travel Plan"));
        assert_eq!(body["plan"]["destination"], "Nice");
    }

    #[tokio::test]
    async fn test_empty_message_is_bad_request() {
        let (status, body) = post_chat(app(Ok(PLAN.to_string())), json!({ "message": "  " })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "error": "No message provided", "kind": "validation" }));

        let (status, _) = post_chat(app(Ok(PLAN.to_string())), json!({})).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) =
            post_chat(app(Ok(PLAN.to_string())), json!({ "message": null })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "No message provided");
    }

    #[tokio::test]
    async fn test_error_kinds_map_to_status() {
        let (status, body) =
            post_chat(app(Err(PlanError::provider("operation timed out"))), json!({ "message": "Nice" })).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["kind"], "provider");

        let (status, body) =
            post_chat(app(Ok("not a plan".to_string())), json!({ "message": "Nice" })).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["kind"], "schema_validation");

        let (status, _) =
            post_chat(app(Err(PlanError::Reasoning("HTTP 401".to_string()))), json!({ "message": "Nice" })).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}

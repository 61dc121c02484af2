//! REST routes: chat, tools, sessions, config, health.

use agentura_core::error::{Error, FailureCause, SessionError};
use agentura_core::message::Turn;
use agentura_core::session::SessionSummary;
use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{delete, get, post},
};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::SharedState;

/// All gateway routes, without middleware.
pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/chat", post(chat_handler))
        .route("/tools", get(tools_handler))
        .route("/api/config", get(config_handler))
        .route("/api/sessions", get(list_sessions_handler))
        .route("/api/sessions/{id}", get(get_session_handler))
        .route(
            "/api/sessions/{id}/messages/{index}",
            delete(delete_pair_handler),
        )
        .route("/sessions", delete(clear_sessions_handler))
        .route("/sessions/{id}", delete(delete_session_handler))
        .with_state(state)
}

// ── Request / Response types ──────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub session_id: Option<String>,
    pub prompt: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub session_id: String,
    pub response: String,
    pub tool_used: Option<String>,
    pub tool_result: Option<String>,
    /// Seconds spent on the whole run
    pub response_time: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ToolInfo {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ToolListResponse {
    pub tools: Vec<ToolInfo>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionListResponse {
    pub sessions: Vec<SessionSummary>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionResponse {
    pub id: String,
    pub messages: Vec<Turn>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeletePairResponse {
    pub message: String,
    pub remaining: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ConfigResponse {
    pub provider: String,
    pub model: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Maps domain errors onto HTTP status codes.
pub struct ApiError(Error);

impl<E: Into<Error>> From<E> for ApiError {
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match &self.0 {
            Error::Session(
                SessionError::InvalidSessionId(_) | SessionError::IndexOutOfRange { .. },
            ) => StatusCode::BAD_REQUEST,
            Error::Orchestration(e) if matches!(e.cause(), FailureCause::Provider(_)) => {
                StatusCode::BAD_GATEWAY
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(status = status.as_u16(), error = %self.0, "Request failed");
        }
        (
            status,
            Json(ErrorResponse {
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}

// ── Handlers ──────────────────────────────────────────────────────────────

async fn root_handler(State(state): State<SharedState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "Agentura gateway is running",
        "provider": state.provider,
        "model": state.orchestrator.model().model_name(),
    }))
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn chat_handler(
    State(state): State<SharedState>,
    Json(payload): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    info!(session_id = ?payload.session_id, "chat request");

    let outcome = state
        .orchestrator
        .run(payload.session_id.as_deref(), &payload.prompt)
        .await?;

    let (tool_used, tool_result) = match outcome.tool {
        Some(tool) => (Some(tool.name), Some(tool.output)),
        None => (None, None),
    };

    Ok(Json(ChatResponse {
        session_id: outcome.session_id,
        response: outcome.response,
        tool_used,
        tool_result,
        response_time: outcome.elapsed.as_secs_f64(),
    }))
}

async fn tools_handler(State(state): State<SharedState>) -> Json<ToolListResponse> {
    let tools = state
        .orchestrator
        .tools()
        .list()
        .into_iter()
        .map(|d| ToolInfo {
            parameters: d.parameters.to_json_schema(),
            name: d.name,
            description: d.description,
        })
        .collect();
    Json(ToolListResponse { tools })
}

async fn config_handler(State(state): State<SharedState>) -> Json<ConfigResponse> {
    Json(ConfigResponse {
        provider: state.provider.clone(),
        model: state.orchestrator.model().model_name().to_string(),
    })
}

async fn list_sessions_handler(
    State(state): State<SharedState>,
) -> Result<Json<SessionListResponse>, ApiError> {
    let sessions = state.orchestrator.store().list_sessions().await?;
    Ok(Json(SessionListResponse { sessions }))
}

async fn get_session_handler(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<SessionResponse>, ApiError> {
    let messages = state.orchestrator.store().load(&id).await?;
    Ok(Json(SessionResponse { id, messages }))
}

async fn delete_pair_handler(
    State(state): State<SharedState>,
    Path((id, index)): Path<(String, usize)>,
) -> Result<Json<DeletePairResponse>, ApiError> {
    let remaining = state
        .orchestrator
        .store()
        .delete_turn_pair(&id, index)
        .await?;
    Ok(Json(DeletePairResponse {
        message: "Deleted".into(),
        remaining,
    }))
}

async fn delete_session_handler(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let removed = state.orchestrator.store().delete_session(&id).await?;
    let message = if removed {
        format!("Session '{id}' cleared")
    } else {
        format!("Session '{id}' not found")
    };
    Ok(Json(MessageResponse {
        message,
        deleted: None,
    }))
}

async fn clear_sessions_handler(
    State(state): State<SharedState>,
) -> Result<Json<MessageResponse>, ApiError> {
    let deleted = state.orchestrator.store().clear().await?;
    Ok(Json(MessageResponse {
        message: format!("Cleared {deleted} session(s)"),
        deleted: Some(deleted),
    }))
}

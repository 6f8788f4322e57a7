//! HTTP routes and handlers

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use moodtag_actions::{ActionResponse, Tracker, ACTION_RESPOND_TO_SENTIMENT};
use moodtag_classifiers::AnnotationOutcome;
use moodtag_core::Message;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, error, info};

use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
        .route("/model/parse", post(parse_message))
        .route("/webhooks/rest/webhook", post(rest_webhook))
        .route("/webhook", post(run_action))
        .fallback(fallback)
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

async fn metrics(State(state): State<AppState>) -> String {
    state.metrics_handle.render()
}

#[derive(Debug, Deserialize)]
struct ParseRequest {
    text: String,
}

/// Annotate a single message and return it
async fn parse_message(
    State(state): State<AppState>,
    Json(req): Json<ParseRequest>,
) -> Result<Json<Message>, AppError> {
    metrics::counter!("moodtag_requests_total", "route" => "parse").increment(1);

    let message = annotate(&state, Message::new(req.text)).await?;
    Ok(Json(message))
}

/// Message posted by the chat frontend
#[derive(Debug, Deserialize)]
struct RestMessage {
    #[serde(default = "default_sender")]
    sender: String,
    message: String,
}

fn default_sender() -> String {
    "default".to_string()
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct RestReply {
    pub recipient_id: String,
    pub text: String,
}

/// Chat channel: annotate the user's message and reply according to its emotion
async fn rest_webhook(
    State(state): State<AppState>,
    Json(req): Json<RestMessage>,
) -> Result<Json<Vec<RestReply>>, AppError> {
    metrics::counter!("moodtag_requests_total", "route" => "rest").increment(1);
    debug!(sender = %req.sender, "Received chat message");

    let message = annotate(&state, Message::new(req.message)).await?;
    let tracker = Tracker::new(req.sender.clone(), message);

    let response = state
        .actions
        .run(ACTION_RESPOND_TO_SENTIMENT, &tracker)
        .await?;

    let replies = response
        .responses
        .into_iter()
        .map(|m| RestReply {
            recipient_id: req.sender.clone(),
            text: m.text,
        })
        .collect();

    Ok(Json(replies))
}

/// Action server request
#[derive(Debug, Deserialize)]
struct ActionRequest {
    next_action: String,
    #[serde(default)]
    sender_id: String,
    #[serde(default)]
    tracker: Option<Tracker>,
}

/// Run a named action against the posted tracker
async fn run_action(
    State(state): State<AppState>,
    Json(req): Json<ActionRequest>,
) -> Result<Json<ActionResponse>, AppError> {
    if !state.actions.contains(&req.next_action) {
        return Err(AppError::ActionNotFound(req.next_action));
    }

    let mut tracker = req.tracker.unwrap_or_default();
    if tracker.sender_id.is_empty() {
        tracker.sender_id = req.sender_id;
    }

    info!(action = %req.next_action, sender = %tracker.sender_id, "Running action");
    metrics::counter!("moodtag_actions_total", "action" => req.next_action.clone()).increment(1);

    let response = state.actions.run(&req.next_action, &tracker).await?;
    Ok(Json(response))
}

/// Run the component off the async executor
///
/// A message without text passes through unannotated; a classification
/// failure becomes an error response.
async fn annotate(state: &AppState, message: Message) -> Result<Message, AppError> {
    let component = state.component.clone();
    let (mut messages, mut outcomes) = tokio::task::spawn_blocking(move || {
        let mut messages = vec![message];
        let outcomes = component.process_with_outcomes(&mut messages);
        (messages, outcomes)
    })
    .await?;

    if let Some(AnnotationOutcome::Failed(e)) = outcomes.pop() {
        return Err(e.into());
    }

    messages
        .pop()
        .ok_or_else(|| AppError::Internal("Annotator returned no message".to_string()))
}

async fn fallback() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "Not found")
}

/// Error handling
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Action '{0}' not found")]
    ActionNotFound(String),

    #[error(transparent)]
    Core(#[from] moodtag_core::Error),

    #[error("Background task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("{0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, kind) = match &self {
            AppError::ActionNotFound(_) => (StatusCode::NOT_FOUND, "action_not_found"),
            AppError::Core(moodtag_core::Error::Inference(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "inference_error")
            }
            AppError::Core(moodtag_core::Error::Action(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "action_failed")
            }
            AppError::Core(_) | AppError::Join(_) | AppError::Internal(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
            }
        };

        if status.is_server_error() {
            error!("Request failed: {}", self);
        }
        metrics::counter!("moodtag_errors_total", "type" => kind).increment(1);

        let body = json!({
            "error": {
                "message": self.to_string(),
                "type": kind,
            }
        });

        (status, Json(body)).into_response()
    }
}

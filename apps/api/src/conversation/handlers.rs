use axum::{
    extract::{Query, State},
    response::Html,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{error, info};
use uuid::Uuid;

use crate::conversation::router::{handle_turn, ChatReply, TURN_FAILED};
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    #[serde(flatten)]
    pub reply: ChatReply,
    pub session_id: String,
}

#[derive(Debug, Deserialize)]
pub struct SessionQuery {
    pub session_id: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetRequest {
    pub session_id: String,
}

/// GET /
pub async fn handle_index() -> Html<&'static str> {
    Html(include_str!("../../static/index.html"))
}

/// POST /chat
pub async fn handle_chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Json<ChatResponse> {
    let session_id = req
        .session_id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let mut conversation = state.sessions.checkout(&session_id).await;

    let reply = match handle_turn(state.llm.as_ref(), &mut conversation, &req.message).await {
        Ok(reply) => reply,
        Err(e) => {
            error!("Chat turn failed for session {session_id}: {e}");
            conversation.reset_gathering();
            ChatReply::message(TURN_FAILED)
        }
    };
    conversation.touch();

    Json(ChatResponse { reply, session_id })
}

/// GET /poll_job_posting?session_id=
pub async fn handle_poll(
    State(state): State<AppState>,
    Query(params): Query<SessionQuery>,
) -> Json<Value> {
    let Some(session) = state.sessions.get(&params.session_id).await else {
        return Json(json!({ "ready": false }));
    };

    let pending = session.lock().await.pending_result.take();
    match pending {
        Some(reply) => {
            let mut body = json!({ "ready": true });
            if let (Value::Object(target), Ok(Value::Object(fields))) =
                (&mut body, serde_json::to_value(&reply))
            {
                target.extend(fields);
            }
            Json(body)
        }
        None => Json(json!({ "ready": false })),
    }
}

/// POST /reset
pub async fn handle_reset(
    State(state): State<AppState>,
    Json(req): Json<ResetRequest>,
) -> Result<Json<Value>, AppError> {
    if req.session_id.trim().is_empty() {
        return Err(AppError::Validation("session_id must not be empty".to_string()));
    }
    if state.sessions.remove(&req.session_id).await {
        info!("Reset conversation session {}", req.session_id);
        Ok(Json(json!({ "reset": true, "session_id": req.session_id })))
    } else {
        Err(AppError::NotFound(format!("session {}", req.session_id)))
    }
}

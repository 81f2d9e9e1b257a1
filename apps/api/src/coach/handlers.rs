//! Axum route handler for the career coach chat.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use crate::coach::prompts::COACH_SYSTEM_PROMPT;
use crate::errors::AppError;
use crate::llm_client::ChatTurn;
use crate::state::AppState;

const INVALID_MESSAGES: &str = "Invalid messages format";

#[derive(Debug, Serialize)]
pub struct ChatReply {
    pub reply: String,
}

/// POST /api/v1/chat
///
/// Body: `{"messages": [{"role": "user" | "assistant", "content": "..."}]}`.
/// Returns the coach's next message.
pub async fn handle_chat(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ChatReply>, AppError> {
    let Json(body) =
        payload.map_err(|e| AppError::Validation(format!("Invalid JSON in request body: {}", e.body_text())))?;
    let turns = parse_messages(&body)?;

    let llm = state.analysis_llm.as_deref().ok_or_else(|| {
        AppError::NotConfigured("AI service not configured. Please set GROQ_API_KEY.".to_string())
    })?;

    info!("Coach chat: {} turns", turns.len());
    let reply = llm
        .converse(COACH_SYSTEM_PROMPT, &turns)
        .await
        .map_err(|e| AppError::Llm(format!("Failed to process chat request: {e}")))?;

    Ok(Json(ChatReply { reply }))
}

/// `messages` must be a non-empty array of well-formed turns.
fn parse_messages(body: &Value) -> Result<Vec<ChatTurn>, AppError> {
    let invalid = || AppError::Validation(INVALID_MESSAGES.to_string());

    let messages = body.get("messages").filter(|m| m.is_array()).ok_or_else(invalid)?;
    let turns: Vec<ChatTurn> = serde_json::from_value(messages.clone()).map_err(|_| invalid())?;
    if turns.is_empty() {
        return Err(invalid());
    }
    Ok(turns)
}

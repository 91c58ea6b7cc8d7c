use axum::{
    Json, Router,
    extract::{Query, State},
    routing::{get, post},
};
use serde::Deserialize;
use std::sync::Arc;

use crate::api::AppState;
use crate::models::chat::PairKey;
use crate::models::message::MessageView;
use crate::services::chat::find_chat;
use crate::services::message::{mark_all_read, mark_one_read, messages_for_chat};
use crate::utils::error::{AppError, AppResult};

#[derive(Deserialize)]
struct PairQuery {
    participant1: Option<String>,
    participant2: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct PairPayload {
    participant1: String,
    participant2: String,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct MessageIdPayload {
    #[serde(rename = "_id")]
    id: String,
}

async fn get_messages_for_chat(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PairQuery>,
) -> AppResult<Json<Vec<MessageView>>> {
    let (p1, p2) = match (query.participant1, query.participant2) {
        (Some(p1), Some(p2)) if !p1.is_empty() && !p2.is_empty() => (p1, p2),
        _ => {
            return Err(AppError::Validation(
                "Both participant1 and participant2 are required".to_string(),
            ));
        }
    };

    let pair = PairKey::new(p1, p2);
    let messages = messages_for_chat(&state.db, &pair).await?;

    Ok(Json(messages.into_iter().map(MessageView::from).collect()))
}

/// Marks everything participant2 sent to participant1 as read. The 404 when
/// no chat exists mirrors the message-listing gate.
async fn set_messages_to_read(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<PairPayload>,
) -> AppResult<Json<serde_json::Value>> {
    if payload.participant1.is_empty() || payload.participant2.is_empty() {
        return Err(AppError::Validation(
            "Both participant1 and participant2 are required".to_string(),
        ));
    }

    let pair = PairKey::new(payload.participant1.as_str(), payload.participant2.as_str());
    if find_chat(&state.db, &pair).await?.is_none() {
        return Err(AppError::NotFound("Chat not found".to_string()));
    }

    mark_all_read(&state.db, &payload.participant2, &payload.participant1).await?;

    Ok(Json(serde_json::json!({ "message": "Messages set to read" })))
}

async fn set_one_message_to_read(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<MessageIdPayload>,
) -> AppResult<Json<serde_json::Value>> {
    if payload.id.is_empty() {
        return Err(AppError::Validation("Message ID is required".to_string()));
    }

    mark_one_read(&state.db, &payload.id).await?;

    Ok(Json(serde_json::json!({ "message": "Message set to read" })))
}

pub fn routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/getMessagesForChat", get(get_messages_for_chat))
        .route("/setMessagesToRead", post(set_messages_to_read))
        .route("/setOneMessageToRead", post(set_one_message_to_read))
        .with_state(state)
}

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::api::AppState;
use crate::models::chat::{ChatView, PairKey};
use crate::services::chat::find_chat;
use crate::services::summary::{ChatOverview, chat_overviews_for_user};
use crate::utils::error::{AppError, AppResult};

#[derive(Deserialize)]
struct PairQuery {
    participant1: Option<String>,
    participant2: Option<String>,
}

#[derive(Deserialize)]
struct UsernameQuery {
    username: Option<String>,
}

impl PairQuery {
    fn into_pair(self) -> AppResult<PairKey> {
        match (self.participant1, self.participant2) {
            (Some(p1), Some(p2)) if !p1.is_empty() && !p2.is_empty() => {
                Ok(PairKey::new(p1, p2))
            }
            _ => Err(AppError::Validation(
                "Both participant1 and participant2 are required".to_string(),
            )),
        }
    }
}

/// Chat for an unordered pair; `null` when none exists. Either orientation
/// of the query parameters resolves to the same chat.
async fn get_chat_for_users(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PairQuery>,
) -> AppResult<Json<Option<ChatView>>> {
    let pair = query.into_pair()?;
    let chat = find_chat(&state.db, &pair).await?;

    Ok(Json(chat.map(ChatView::from)))
}

async fn get_chats_for_user(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UsernameQuery>,
) -> AppResult<Json<Vec<ChatOverview>>> {
    let username = query
        .username
        .ok_or_else(|| AppError::Validation("Username is required".to_string()))?;

    let overviews = chat_overviews_for_user(&state.db, &username).await?;

    Ok(Json(overviews))
}

pub fn routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/getChatForUsers", get(get_chat_for_users))
        .route("/getChatsForUser", get(get_chats_for_user))
        .with_state(state)
}

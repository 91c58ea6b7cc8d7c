use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::Deserialize;
use std::sync::Arc;

use crate::api::AppState;
use crate::models::user::UserProfile;
use crate::services::summary::{DirectoryEntry, directory_for_user};
use crate::services::user::{
    RegisterRequest, change_password, get_user_by_username, login_user, register_user,
    update_email, update_username,
};
use crate::utils::error::{AppError, AppResult};

#[derive(Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
struct LoginPayload {
    username: String,
    password: String,
}

#[derive(Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
struct UpdateUsernamePayload {
    username: String,
    new_username: String,
}

#[derive(Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
struct UpdateEmailPayload {
    username: String,
    new_email: String,
}

#[derive(Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
struct ChangePasswordPayload {
    username: String,
    old_password: String,
    new_password: String,
    repeat_new_password: String,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct UsernamePayload {
    username: String,
}

#[derive(Deserialize)]
struct UsernameQuery {
    username: Option<String>,
}

async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterRequest>,
) -> AppResult<impl IntoResponse> {
    register_user(&state.db, payload).await?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "message": "Registration successful" })),
    ))
}

async fn login(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<LoginPayload>,
) -> AppResult<Json<serde_json::Value>> {
    let user = login_user(&state.db, &payload.username, &payload.password).await?;

    Ok(Json(serde_json::json!({
        "message": "Login successful",
        "user": user,
    })))
}

async fn update_username_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<UpdateUsernamePayload>,
) -> AppResult<Json<serde_json::Value>> {
    update_username(&state.db, &payload.username, &payload.new_username).await?;

    Ok(Json(
        serde_json::json!({ "message": "Username updated successfully" }),
    ))
}

async fn update_email_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<UpdateEmailPayload>,
) -> AppResult<Json<serde_json::Value>> {
    update_email(&state.db, &payload.username, &payload.new_email).await?;

    Ok(Json(
        serde_json::json!({ "message": "Email updated successfully" }),
    ))
}

async fn change_password_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ChangePasswordPayload>,
) -> AppResult<Json<serde_json::Value>> {
    change_password(
        &state.db,
        &payload.username,
        &payload.old_password,
        &payload.new_password,
        &payload.repeat_new_password,
    )
    .await?;

    Ok(Json(
        serde_json::json!({ "message": "Password updated successfully" }),
    ))
}

async fn get_all_users_with_unread_messages(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<UsernamePayload>,
) -> AppResult<Json<Vec<DirectoryEntry>>> {
    let entries = directory_for_user(&state.db, &payload.username).await?;

    Ok(Json(entries))
}

async fn get_user_by_username_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UsernameQuery>,
) -> AppResult<Json<UserProfile>> {
    let username = query
        .username
        .ok_or_else(|| AppError::Validation("Username is required".to_string()))?;

    let user = get_user_by_username(&state.db, &username).await?;

    Ok(Json(user))
}

pub fn routes(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/updateUsername", post(update_username_handler))
        .route("/updateEmail", post(update_email_handler))
        .route("/changePassword", post(change_password_handler))
        .route(
            "/getAllUsersWithUnreadMessages",
            post(get_all_users_with_unread_messages),
        )
        .route("/getUserByUsername", get(get_user_by_username_handler))
        .with_state(state)
}

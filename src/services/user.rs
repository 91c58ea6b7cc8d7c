use serde::{Deserialize, Serialize};
use sqlx::Row;

use crate::database::DbPool;
use crate::models::user::{User, UserProfile};
use crate::utils::crypto::{hash_password, verify_password};
use crate::utils::error::{AppError, AppResult};
use crate::utils::validation::{validate_email, validate_password, validate_username};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub repeat_password: String,
    pub email: String,
}

pub async fn register_user(pool: &DbPool, request: RegisterRequest) -> AppResult<()> {
    validate_username(&request.username)?;
    validate_password(&request.password)?;

    if request.password != request.repeat_password {
        return Err(AppError::Validation("Passwords do not match".to_string()));
    }

    validate_email(&request.email)?;

    let username_exists = sqlx::query("SELECT COUNT(*) as count FROM users WHERE username = ?")
        .bind(&request.username)
        .fetch_one(pool.as_ref())
        .await?
        .get::<i64, _>("count");

    if username_exists > 0 {
        return Err(AppError::BadRequest(
            "Username is already taken".to_string(),
        ));
    }

    let password_hash = hash_password(&request.password)?;
    let user = User::new(request.username, password_hash, request.email);

    sqlx::query(
        "INSERT INTO users (username, password_hash, email, profile_photo, created_at)
         VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&user.username)
    .bind(&user.password_hash)
    .bind(&user.email)
    .bind(&user.profile_photo)
    .bind(&user.created_at)
    .execute(pool.as_ref())
    .await?;

    tracing::info!("User registered: {}", user.username);

    Ok(())
}

pub async fn login_user(pool: &DbPool, username: &str, password: &str) -> AppResult<UserProfile> {
    let user = find_user(pool, username).await?;

    // One message for both unknown user and wrong password, so a caller
    // cannot probe which field was wrong.
    let user = user.ok_or_else(|| {
        AppError::BadRequest("Invalid username or password".to_string())
    })?;

    if !verify_password(password, &user.password_hash)? {
        return Err(AppError::BadRequest(
            "Invalid username or password".to_string(),
        ));
    }

    Ok(user.into())
}

pub async fn update_username(pool: &DbPool, username: &str, new_username: &str) -> AppResult<()> {
    validate_username(new_username)?;

    let user = find_user(pool, username)
        .await?
        .ok_or_else(|| AppError::BadRequest("User not found".to_string()))?;

    let taken = sqlx::query("SELECT COUNT(*) as count FROM users WHERE username = ?")
        .bind(new_username)
        .fetch_one(pool.as_ref())
        .await?
        .get::<i64, _>("count");

    if taken > 0 {
        return Err(AppError::BadRequest(
            "Username is already taken".to_string(),
        ));
    }

    // Chats and messages keep the old username: identities are denormalized
    // with no referential integrity, matching the storage model.
    sqlx::query("UPDATE users SET username = ? WHERE username = ?")
        .bind(new_username)
        .bind(&user.username)
        .execute(pool.as_ref())
        .await?;

    tracing::info!("Username updated: {} -> {}", user.username, new_username);

    Ok(())
}

pub async fn update_email(pool: &DbPool, username: &str, new_email: &str) -> AppResult<()> {
    validate_email(new_email)?;

    let user = find_user(pool, username)
        .await?
        .ok_or_else(|| AppError::BadRequest("User not found".to_string()))?;

    sqlx::query("UPDATE users SET email = ? WHERE username = ?")
        .bind(new_email)
        .bind(&user.username)
        .execute(pool.as_ref())
        .await?;

    Ok(())
}

pub async fn change_password(
    pool: &DbPool,
    username: &str,
    old_password: &str,
    new_password: &str,
    repeat_new_password: &str,
) -> AppResult<()> {
    validate_password(new_password)?;

    if new_password != repeat_new_password {
        return Err(AppError::Validation(
            "New password and repeated password do not match".to_string(),
        ));
    }

    let user = find_user(pool, username)
        .await?
        .ok_or_else(|| AppError::BadRequest("User not found".to_string()))?;

    if !verify_password(old_password, &user.password_hash)? {
        return Err(AppError::BadRequest(
            "Old password is incorrect".to_string(),
        ));
    }

    let password_hash = hash_password(new_password)?;

    sqlx::query("UPDATE users SET password_hash = ? WHERE username = ?")
        .bind(&password_hash)
        .bind(&user.username)
        .execute(pool.as_ref())
        .await?;

    tracing::info!("Password changed for {}", user.username);

    Ok(())
}

pub async fn get_user_by_username(pool: &DbPool, username: &str) -> AppResult<UserProfile> {
    let user = find_user(pool, username)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(user.into())
}

/// All registered users except `username`, as public profiles.
pub async fn list_other_users(pool: &DbPool, username: &str) -> AppResult<Vec<UserProfile>> {
    let users = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username != ?")
        .bind(username)
        .fetch_all(pool.as_ref())
        .await?;

    Ok(users.into_iter().map(UserProfile::from).collect())
}

async fn find_user(pool: &DbPool, username: &str) -> AppResult<Option<User>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = ?")
        .bind(username)
        .fetch_optional(pool.as_ref())
        .await?;

    Ok(user)
}

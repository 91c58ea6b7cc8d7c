use sqlx::Row;

use crate::database::DbPool;
use crate::models::chat::{Chat, LastMessage, PairKey};
use crate::utils::error::{AppError, AppResult};

/// Order-independent chat lookup. `PairKey` normalizes the orientation, so
/// a single stored row matches both (A,B) and (B,A).
pub async fn find_chat(pool: &DbPool, pair: &PairKey) -> AppResult<Option<Chat>> {
    let chat = sqlx::query_as::<_, Chat>(
        "SELECT * FROM chats WHERE participant1 = ? AND participant2 = ?",
    )
    .bind(pair.first())
    .bind(pair.second())
    .fetch_optional(pool.as_ref())
    .await?;

    Ok(chat)
}

/// Creates the chat for the very first message between a pair. If the chat
/// already exists it is returned untouched (acceptance state included).
///
/// No lock is taken around the check-then-insert; two racing first messages
/// can both pass the check, and the unique pair index turns the loser into a
/// storage error rather than a duplicate row.
pub async fn ensure_chat_for_first_message(
    pool: &DbPool,
    pair: &PairKey,
    summary: &LastMessage,
) -> AppResult<Chat> {
    if let Some(existing) = find_chat(pool, pair).await? {
        return Ok(existing);
    }

    let chat = Chat::new(pair, summary);

    sqlx::query(
        "INSERT INTO chats (id, participant1, participant2, last_message_type, last_message_text, last_message_sent_at, is_accepted)
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&chat.id)
    .bind(&chat.participant1)
    .bind(&chat.participant2)
    .bind(&chat.last_message_type)
    .bind(&chat.last_message_text)
    .bind(&chat.last_message_sent_at)
    .bind(chat.is_accepted)
    .execute(pool.as_ref())
    .await?;

    tracing::info!(
        "Chat created: {} <-> {}",
        chat.participant1,
        chat.participant2
    );

    Ok(chat)
}

/// Overwrites the denormalized last-message summary. Used on every message
/// after the first.
pub async fn update_last_message(
    pool: &DbPool,
    pair: &PairKey,
    summary: &LastMessage,
) -> AppResult<Chat> {
    let result = sqlx::query(
        "UPDATE chats SET last_message_type = ?, last_message_text = ?, last_message_sent_at = ?
         WHERE participant1 = ? AND participant2 = ?",
    )
    .bind(&summary.message_type)
    .bind(&summary.text)
    .bind(&summary.sent_at)
    .bind(pair.first())
    .bind(pair.second())
    .execute(pool.as_ref())
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Chat not found".to_string()));
    }

    let chat = find_chat(pool, pair)
        .await?
        .ok_or_else(|| AppError::NotFound("Chat not found".to_string()))?;

    Ok(chat)
}

/// Flips the acceptance flag. Idempotent when already accepted.
pub async fn accept_chat(pool: &DbPool, pair: &PairKey) -> AppResult<()> {
    let result = sqlx::query(
        "UPDATE chats SET is_accepted = 1 WHERE participant1 = ? AND participant2 = ?",
    )
    .bind(pair.first())
    .bind(pair.second())
    .execute(pool.as_ref())
    .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Chat not found".to_string()));
    }

    Ok(())
}

/// Deletes the chat and every message between the pair, in both
/// orientations, as one logical unit. When no chat exists the operation
/// fails before any message is touched.
pub async fn reject_chat(pool: &DbPool, pair: &PairKey) -> AppResult<()> {
    let result = sqlx::query("DELETE FROM chats WHERE participant1 = ? AND participant2 = ?")
        .bind(pair.first())
        .bind(pair.second())
        .execute(pool.as_ref())
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Chat not found".to_string()));
    }

    sqlx::query(
        "DELETE FROM messages WHERE (sender = ? AND receiver = ?) OR (sender = ? AND receiver = ?)",
    )
    .bind(pair.first())
    .bind(pair.second())
    .bind(pair.second())
    .bind(pair.first())
    .execute(pool.as_ref())
    .await?;

    tracing::info!("Chat rejected: {} <-> {}", pair.first(), pair.second());

    Ok(())
}

/// All chats the user participates in, either side. Ordering is a client
/// concern and is not guaranteed here.
pub async fn list_chats_for_user(pool: &DbPool, username: &str) -> AppResult<Vec<Chat>> {
    let chats = sqlx::query_as::<_, Chat>(
        "SELECT * FROM chats WHERE participant1 = ? OR participant2 = ?",
    )
    .bind(username)
    .bind(username)
    .fetch_all(pool.as_ref())
    .await?;

    Ok(chats)
}

pub async fn chat_count(pool: &DbPool) -> AppResult<i64> {
    let count = sqlx::query("SELECT COUNT(*) as count FROM chats")
        .fetch_one(pool.as_ref())
        .await?
        .get::<i64, _>("count");

    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::create_test_pool;
    use crate::models::message::MessageKind;

    fn summary(text: &str) -> LastMessage {
        LastMessage::new(
            MessageKind::Text,
            Some(text),
            crate::utils::helpers::now_rfc3339(),
        )
    }

    #[tokio::test]
    async fn lookup_matches_both_orientations() {
        let pool = create_test_pool().await;
        let created =
            ensure_chat_for_first_message(&pool, &PairKey::new("alice", "bob"), &summary("hi"))
                .await
                .unwrap();

        let ab = find_chat(&pool, &PairKey::new("alice", "bob"))
            .await
            .unwrap()
            .unwrap();
        let ba = find_chat(&pool, &PairKey::new("bob", "alice"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(ab.id, created.id);
        assert_eq!(ba.id, created.id);
    }

    #[tokio::test]
    async fn sequential_ensure_creates_exactly_one_chat() {
        let pool = create_test_pool().await;
        let pair = PairKey::new("alice", "bob");
        let first = ensure_chat_for_first_message(&pool, &pair, &summary("hi"))
            .await
            .unwrap();
        let second =
            ensure_chat_for_first_message(&pool, &PairKey::new("bob", "alice"), &summary("again"))
                .await
                .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(chat_count(&pool).await.unwrap(), 1);
        // Second ensure leaves the existing record untouched.
        assert_eq!(second.last_message_text, "hi");
    }

    #[tokio::test]
    async fn ensure_does_not_reset_acceptance() {
        let pool = create_test_pool().await;
        let pair = PairKey::new("alice", "bob");
        ensure_chat_for_first_message(&pool, &pair, &summary("hi"))
            .await
            .unwrap();
        accept_chat(&pool, &pair).await.unwrap();

        let chat = ensure_chat_for_first_message(&pool, &pair, &summary("later"))
            .await
            .unwrap();
        assert_eq!(chat.is_accepted, 1);
    }

    #[tokio::test]
    async fn accept_is_idempotent() {
        let pool = create_test_pool().await;
        let pair = PairKey::new("alice", "bob");
        ensure_chat_for_first_message(&pool, &pair, &summary("hi"))
            .await
            .unwrap();

        accept_chat(&pool, &pair).await.unwrap();
        accept_chat(&pool, &pair).await.unwrap();

        let chat = find_chat(&pool, &pair).await.unwrap().unwrap();
        assert_eq!(chat.is_accepted, 1);
    }

    #[tokio::test]
    async fn accept_missing_chat_is_not_found() {
        let pool = create_test_pool().await;
        let err = accept_chat(&pool, &PairKey::new("alice", "bob"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn update_last_message_requires_existing_chat() {
        let pool = create_test_pool().await;
        let err = update_last_message(&pool, &PairKey::new("alice", "bob"), &summary("hi"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn reject_missing_chat_is_not_found() {
        let pool = create_test_pool().await;
        let err = reject_chat(&pool, &PairKey::new("alice", "bob"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn list_includes_chats_on_either_side() {
        let pool = create_test_pool().await;
        ensure_chat_for_first_message(&pool, &PairKey::new("alice", "bob"), &summary("hi"))
            .await
            .unwrap();
        ensure_chat_for_first_message(&pool, &PairKey::new("carol", "bob"), &summary("yo"))
            .await
            .unwrap();

        let chats = list_chats_for_user(&pool, "bob").await.unwrap();
        assert_eq!(chats.len(), 2);

        let chats = list_chats_for_user(&pool, "alice").await.unwrap();
        assert_eq!(chats.len(), 1);
    }
}

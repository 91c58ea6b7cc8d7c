use sqlx::Row;

use crate::database::DbPool;
use crate::models::chat::{LastMessage, PairKey};
use crate::models::message::{Message, MessageContent};
use crate::services::chat::{ensure_chat_for_first_message, find_chat, update_last_message};
use crate::utils::error::{AppError, AppResult};
use crate::utils::helpers::now_rfc3339;

/// The single message-append contract. The first message between a pair
/// creates the chat (unaccepted) with its summary; every later message
/// overwrites the summary. `sent_at` is assigned here, never by the caller.
pub async fn append_message(
    pool: &DbPool,
    sender: String,
    receiver: String,
    content: MessageContent,
) -> AppResult<Message> {
    let pair = PairKey::new(sender.as_str(), receiver.as_str());
    let sent_at = now_rfc3339();
    let summary = LastMessage::new(content.kind(), content.text(), sent_at.clone());

    match find_chat(pool, &pair).await? {
        Some(_) => {
            update_last_message(pool, &pair, &summary).await?;
        }
        None => {
            ensure_chat_for_first_message(pool, &pair, &summary).await?;
        }
    }

    let message = Message::new(
        sender,
        receiver,
        content.kind(),
        content.text().map(|t| t.to_string()),
        content.voice_url().map(|u| u.to_string()),
        content.voice_duration(),
        sent_at,
    );

    sqlx::query(
        "INSERT INTO messages (id, sender, receiver, message_type, text_message, voice_message_url, voice_message_duration, sent_at, is_read)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&message.id)
    .bind(&message.sender)
    .bind(&message.receiver)
    .bind(&message.message_type)
    .bind(&message.text_message)
    .bind(&message.voice_message_url)
    .bind(message.voice_message_duration)
    .bind(&message.sent_at)
    .bind(message.is_read)
    .execute(pool.as_ref())
    .await?;

    tracing::debug!(
        "Message appended: {} -> {} ({})",
        message.sender,
        message.receiver,
        message.message_type
    );

    Ok(message)
}

/// Both orientations merged, oldest first. There is no chat id on message
/// rows; membership is derived from the pair in either direction.
pub async fn list_for_pair(pool: &DbPool, pair: &PairKey) -> AppResult<Vec<Message>> {
    let messages = sqlx::query_as::<_, Message>(
        "SELECT * FROM messages
         WHERE (sender = ? AND receiver = ?) OR (sender = ? AND receiver = ?)
         ORDER BY sent_at ASC",
    )
    .bind(pair.first())
    .bind(pair.second())
    .bind(pair.second())
    .bind(pair.first())
    .fetch_all(pool.as_ref())
    .await?;

    Ok(messages)
}

/// Like `list_for_pair`, but 404s when no chat exists for the pair.
pub async fn messages_for_chat(pool: &DbPool, pair: &PairKey) -> AppResult<Vec<Message>> {
    if find_chat(pool, pair).await?.is_none() {
        return Err(AppError::NotFound("Chat not found".to_string()));
    }

    list_for_pair(pool, pair).await
}

pub async fn count_for_pair(pool: &DbPool, pair: &PairKey) -> AppResult<i64> {
    let count = sqlx::query(
        "SELECT COUNT(*) as count FROM messages
         WHERE (sender = ? AND receiver = ?) OR (sender = ? AND receiver = ?)",
    )
    .bind(pair.first())
    .bind(pair.second())
    .bind(pair.second())
    .bind(pair.first())
    .fetch_one(pool.as_ref())
    .await?
    .get::<i64, _>("count");

    Ok(count)
}

/// Unread messages in one direction only: sent by `sender`, not yet read by
/// `receiver`.
pub async fn count_unread_from_sender(
    pool: &DbPool,
    sender: &str,
    receiver: &str,
) -> AppResult<i64> {
    let count = sqlx::query(
        "SELECT COUNT(*) as count FROM messages
         WHERE sender = ? AND receiver = ? AND is_read = 0",
    )
    .bind(sender)
    .bind(receiver)
    .fetch_one(pool.as_ref())
    .await?
    .get::<i64, _>("count");

    Ok(count)
}

/// Marks everything `to_receiver` has from `from_sender` as read. The
/// reverse direction is untouched.
pub async fn mark_all_read(pool: &DbPool, from_sender: &str, to_receiver: &str) -> AppResult<()> {
    sqlx::query("UPDATE messages SET is_read = 1 WHERE sender = ? AND receiver = ? AND is_read = 0")
        .bind(from_sender)
        .bind(to_receiver)
        .execute(pool.as_ref())
        .await?;

    Ok(())
}

pub async fn mark_one_read(pool: &DbPool, message_id: &str) -> AppResult<()> {
    let result = sqlx::query("UPDATE messages SET is_read = 1 WHERE id = ?")
        .bind(message_id)
        .execute(pool.as_ref())
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Message not found".to_string()));
    }

    Ok(())
}

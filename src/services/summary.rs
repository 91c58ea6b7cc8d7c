use serde::Serialize;

use crate::database::DbPool;
use crate::models::chat::{ChatView, PairKey};
use crate::services::chat::list_chats_for_user;
use crate::services::message::{count_for_pair, count_unread_from_sender};
use crate::services::user::list_other_users;
use crate::utils::error::AppResult;

/// One chat of the viewer plus its message accounting.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatOverview {
    pub chat: ChatView,
    pub total_messages: i64,
    pub unread_messages: i64,
    pub is_accepted: bool,
}

/// A directory row: any other registered user, with counts when a chat
/// exists between them and the viewer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryEntry {
    pub username: String,
    pub email: String,
    pub profile_photo: String,
    pub total_messages: i64,
    pub unread_messages: i64,
    pub chat_exists: bool,
    pub is_accepted: bool,
}

/// The viewer's chat list with per-pair counts. Each chat issues its own two
/// count queries against the live message log, so the numbers reflect state
/// at call time rather than a cached snapshot.
pub async fn chat_overviews_for_user(
    pool: &DbPool,
    username: &str,
) -> AppResult<Vec<ChatOverview>> {
    let chats = list_chats_for_user(pool, username).await?;

    let mut overviews = Vec::with_capacity(chats.len());
    for chat in chats {
        let other = chat.counterpart(username).to_string();
        let pair = PairKey::new(username, other.as_str());

        let total_messages = count_for_pair(pool, &pair).await?;
        let unread_messages = count_unread_from_sender(pool, &other, username).await?;
        let is_accepted = chat.is_accepted != 0;

        overviews.push(ChatOverview {
            chat: chat.into(),
            total_messages,
            unread_messages,
            is_accepted,
        });
    }

    Ok(overviews)
}

/// Every other user, annotated with chat existence, acceptance and counts.
/// Users without a chat get zeros and `chatExists = false`.
pub async fn directory_for_user(pool: &DbPool, username: &str) -> AppResult<Vec<DirectoryEntry>> {
    let users = list_other_users(pool, username).await?;
    let chats = list_chats_for_user(pool, username).await?;

    let mut entries = Vec::with_capacity(users.len());
    for user in users {
        let chat = chats
            .iter()
            .find(|c| c.counterpart(username) == user.username);

        let entry = match chat {
            Some(chat) => {
                let pair = PairKey::new(username, user.username.as_str());
                let total_messages = count_for_pair(pool, &pair).await?;
                let unread_messages =
                    count_unread_from_sender(pool, &user.username, username).await?;

                DirectoryEntry {
                    username: user.username,
                    email: user.email,
                    profile_photo: user.profile_photo,
                    total_messages,
                    unread_messages,
                    chat_exists: true,
                    is_accepted: chat.is_accepted != 0,
                }
            }
            None => DirectoryEntry {
                username: user.username,
                email: user.email,
                profile_photo: user.profile_photo,
                total_messages: 0,
                unread_messages: 0,
                chat_exists: false,
                is_accepted: false,
            },
        };

        entries.push(entry);
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::create_test_pool;
    use crate::models::message::MessageContent;
    use crate::services::chat::accept_chat;
    use crate::services::message::{append_message, mark_all_read};
    use crate::services::user::{RegisterRequest, register_user};

    async fn seed_user(pool: &DbPool, username: &str) {
        register_user(
            pool,
            RegisterRequest {
                username: username.to_string(),
                password: "password".to_string(),
                repeat_password: "password".to_string(),
                email: format!("{}@example.com", username),
            },
        )
        .await
        .unwrap();
    }

    async fn send_text(pool: &DbPool, sender: &str, receiver: &str, text: &str) {
        append_message(
            pool,
            sender.to_string(),
            receiver.to_string(),
            MessageContent::Text {
                text: text.to_string(),
            },
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn chat_overviews_count_per_pair() {
        let pool = create_test_pool().await;
        send_text(&pool, "alice", "bob", "hi").await;
        send_text(&pool, "bob", "alice", "hello back").await;
        send_text(&pool, "carol", "bob", "yo").await;
        accept_chat(&pool, &PairKey::new("alice", "bob")).await.unwrap();

        let overviews = chat_overviews_for_user(&pool, "bob").await.unwrap();
        assert_eq!(overviews.len(), 2);

        let alice = overviews
            .iter()
            .find(|o| o.chat.participant1 == "alice" || o.chat.participant2 == "alice")
            .unwrap();
        assert_eq!(alice.total_messages, 2);
        assert_eq!(alice.unread_messages, 1);
        assert!(alice.is_accepted);

        let carol = overviews
            .iter()
            .find(|o| o.chat.participant1 == "carol" || o.chat.participant2 == "carol")
            .unwrap();
        assert_eq!(carol.total_messages, 1);
        assert_eq!(carol.unread_messages, 1);
        assert!(!carol.is_accepted);
    }

    #[tokio::test]
    async fn directory_includes_users_without_chats() {
        let pool = create_test_pool().await;
        seed_user(&pool, "alice").await;
        seed_user(&pool, "bobby").await;
        seed_user(&pool, "carol").await;
        send_text(&pool, "alice", "bobby", "hi").await;

        let directory = directory_for_user(&pool, "bobby").await.unwrap();
        assert_eq!(directory.len(), 2);

        let alice = directory.iter().find(|e| e.username == "alice").unwrap();
        assert!(alice.chat_exists);
        assert_eq!(alice.total_messages, 1);
        assert_eq!(alice.unread_messages, 1);

        let carol = directory.iter().find(|e| e.username == "carol").unwrap();
        assert!(!carol.chat_exists);
        assert_eq!(carol.total_messages, 0);
        assert_eq!(carol.unread_messages, 0);
        assert!(!carol.is_accepted);
    }

    #[tokio::test]
    async fn counts_reflect_live_state_after_mark_read() {
        let pool = create_test_pool().await;
        seed_user(&pool, "alice").await;
        seed_user(&pool, "bobby").await;
        send_text(&pool, "alice", "bobby", "one").await;
        send_text(&pool, "alice", "bobby", "two").await;

        let before = directory_for_user(&pool, "bobby").await.unwrap();
        assert_eq!(before[0].unread_messages, 2);

        mark_all_read(&pool, "alice", "bobby").await.unwrap();

        let after = directory_for_user(&pool, "bobby").await.unwrap();
        assert_eq!(after[0].unread_messages, 0);
        assert_eq!(after[0].total_messages, 2);
    }
}

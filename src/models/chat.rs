use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::message::MessageKind;

/// Canonical order-independent representation of a participant pair.
///
/// Every chat lookup and insert goes through this type, so (A,B) and (B,A)
/// always resolve to the same stored row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairKey {
    first: String,
    second: String,
}

impl PairKey {
    pub fn new(p1: impl Into<String>, p2: impl Into<String>) -> Self {
        let (mut first, mut second) = (p1.into(), p2.into());
        if first > second {
            std::mem::swap(&mut first, &mut second);
        }
        Self { first, second }
    }

    pub fn first(&self) -> &str {
        &self.first
    }

    pub fn second(&self) -> &str {
        &self.second
    }
}

/// Denormalized cache of the most recent message in a chat.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LastMessage {
    pub message_type: String,
    pub text: String,
    pub sent_at: String,
}

impl LastMessage {
    /// Summary text shown in chat lists: the text itself, or a placeholder
    /// for voice messages.
    pub fn new(kind: MessageKind, text: Option<&str>, sent_at: String) -> Self {
        let text = match kind {
            MessageKind::Text => text.unwrap_or_default().to_string(),
            MessageKind::Voice => "Voice message".to_string(),
        };
        Self {
            message_type: kind.as_str().to_string(),
            text,
            sent_at,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct Chat {
    pub id: String,
    pub participant1: String,
    pub participant2: String,
    pub last_message_type: String,
    pub last_message_text: String,
    pub last_message_sent_at: String,
    pub is_accepted: i64,
}

impl Chat {
    pub fn new(pair: &PairKey, last_message: &LastMessage) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            participant1: pair.first().to_string(),
            participant2: pair.second().to_string(),
            last_message_type: last_message.message_type.clone(),
            last_message_text: last_message.text.clone(),
            last_message_sent_at: last_message.sent_at.clone(),
            is_accepted: 0,
        }
    }

    /// The participant that is not `username`.
    pub fn counterpart(&self, username: &str) -> &str {
        if self.participant1 == username {
            &self.participant2
        } else {
            &self.participant1
        }
    }
}

/// Wire shape of a chat, with the last-message summary nested the way the
/// client expects it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatView {
    #[serde(rename = "_id")]
    pub id: String,
    pub participant1: String,
    pub participant2: String,
    pub last_message: LastMessage,
    pub is_accepted: bool,
}

impl From<Chat> for ChatView {
    fn from(chat: Chat) -> Self {
        Self {
            id: chat.id,
            participant1: chat.participant1,
            participant2: chat.participant2,
            last_message: LastMessage {
                message_type: chat.last_message_type,
                text: chat.last_message_text,
                sent_at: chat.last_message_sent_at,
            },
            is_accepted: chat.is_accepted != 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_key_is_order_independent() {
        assert_eq!(PairKey::new("bob", "alice"), PairKey::new("alice", "bob"));
        let key = PairKey::new("bob", "alice");
        assert_eq!(key.first(), "alice");
        assert_eq!(key.second(), "bob");
    }

    #[test]
    fn voice_summary_uses_placeholder_text() {
        let summary = LastMessage::new(MessageKind::Voice, Some("ignored"), "t".to_string());
        assert_eq!(summary.text, "Voice message");
        assert_eq!(summary.message_type, "voice");
    }
}

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Text,
    Voice,
}

impl MessageKind {
    pub fn as_str(&self) -> &str {
        match self {
            MessageKind::Text => "text",
            MessageKind::Voice => "voice",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "text" => Some(MessageKind::Text),
            "voice" => Some(MessageKind::Voice),
            _ => None,
        }
    }
}

/// Where the audio of a voice message comes from.
#[derive(Debug, Clone)]
pub enum VoiceSource {
    /// Base64-encoded audio submitted inline (optionally a `data:` URI).
    /// Decoded and persisted before the message row is written.
    Inline(String),
    /// An asset URL from a previous upload; stored as-is.
    Stored(String),
}

/// Kind-validated message content. Built at the transport boundary so the
/// storage layer never sees a voice message without audio or a text message
/// without text.
#[derive(Debug, Clone)]
pub enum MessageBody {
    Text {
        text: String,
    },
    Voice {
        duration: Option<f64>,
        source: VoiceSource,
    },
}

/// Message content once any inline audio has been persisted by the voice
/// asset store. This is what the message log accepts.
#[derive(Debug, Clone)]
pub enum MessageContent {
    Text {
        text: String,
    },
    Voice {
        duration: Option<f64>,
        url: String,
    },
}

impl MessageContent {
    pub fn kind(&self) -> MessageKind {
        match self {
            MessageContent::Text { .. } => MessageKind::Text,
            MessageContent::Voice { .. } => MessageKind::Voice,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            MessageContent::Text { text } => Some(text),
            MessageContent::Voice { .. } => None,
        }
    }

    pub fn voice_url(&self) -> Option<&str> {
        match self {
            MessageContent::Text { .. } => None,
            MessageContent::Voice { url, .. } => Some(url),
        }
    }

    pub fn voice_duration(&self) -> Option<f64> {
        match self {
            MessageContent::Text { .. } => None,
            MessageContent::Voice { duration, .. } => *duration,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct Message {
    pub id: String,
    pub sender: String,
    pub receiver: String,
    pub message_type: String,
    pub text_message: Option<String>,
    pub voice_message_url: Option<String>,
    pub voice_message_duration: Option<f64>,
    pub sent_at: String,
    pub is_read: i64,
}

impl Message {
    pub fn new(
        sender: String,
        receiver: String,
        kind: MessageKind,
        text_message: Option<String>,
        voice_message_url: Option<String>,
        voice_message_duration: Option<f64>,
        sent_at: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            sender,
            receiver,
            message_type: kind.as_str().to_string(),
            text_message,
            voice_message_url,
            voice_message_duration,
            sent_at,
            is_read: 0,
        }
    }
}

/// Wire shape of a message.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageView {
    #[serde(rename = "_id")]
    pub id: String,
    pub sender: String,
    pub receiver: String,
    pub message_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice_message_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice_message_duration: Option<f64>,
    pub sent_at: String,
    pub is_read: bool,
}

impl From<Message> for MessageView {
    fn from(message: Message) -> Self {
        Self {
            id: message.id,
            sender: message.sender,
            receiver: message.receiver,
            message_type: message.message_type,
            text_message: message.text_message,
            voice_message_url: message.voice_message_url,
            voice_message_duration: message.voice_message_duration,
            sent_at: message.sent_at,
            is_read: message.is_read != 0,
        }
    }
}

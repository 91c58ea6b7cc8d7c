use serde::{Deserialize, Serialize};

use crate::models::message::{MessageBody, MessageKind, MessageView, VoiceSource};
use crate::utils::error::{AppError, AppResult};

#[derive(Debug, Clone, Deserialize)]
pub struct Identity {
    pub username: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairPayload {
    pub participant1: String,
    pub participant2: String,
}

/// Raw message submission as it arrives over the socket. Kind-dependent
/// fields are optional here and checked in `into_parts`, so the rest of the
/// system only ever sees a well-formed `MessageBody`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomingMessage {
    pub sender: String,
    pub receiver: String,
    pub message_type: String,
    pub text_message: Option<String>,
    pub voice_message_url: Option<String>,
    pub voice_message_duration: Option<f64>,
    pub voice_message_data: Option<String>,
}

impl IncomingMessage {
    pub fn into_parts(self) -> AppResult<(String, String, MessageBody)> {
        if self.sender.is_empty() || self.receiver.is_empty() {
            return Err(AppError::Validation(
                "Sender and receiver are required".to_string(),
            ));
        }

        let kind = MessageKind::parse(&self.message_type).ok_or_else(|| {
            AppError::Validation(format!("Unknown message type: {}", self.message_type))
        })?;

        let body = match kind {
            MessageKind::Text => {
                let text = self
                    .text_message
                    .filter(|t| !t.is_empty())
                    .ok_or_else(|| {
                        AppError::Validation("Text message requires text".to_string())
                    })?;
                MessageBody::Text { text }
            }
            MessageKind::Voice => {
                let source = match (self.voice_message_data, self.voice_message_url) {
                    (Some(data), _) if !data.is_empty() => VoiceSource::Inline(data),
                    (_, Some(url)) if !url.is_empty() => VoiceSource::Stored(url),
                    _ => {
                        return Err(AppError::Validation(
                            "Voice message requires audio data or a URL".to_string(),
                        ));
                    }
                };
                MessageBody::Voice {
                    duration: self.voice_message_duration,
                    source,
                }
            }
        };

        Ok((self.sender, self.receiver, body))
    }
}

/// Client-to-server events. The `event` tag carries the event name the
/// mobile client uses.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum ClientEvent {
    UserLogin(Identity),
    UserLogout(Identity),
    InitialMessage(IncomingMessage),
    NewMessage(IncomingMessage),
    AcceptChat(PairPayload),
    RejectChat(PairPayload),
}

/// Server-to-client events. Sender and receiver get the same event and
/// payload; a client tells the two roles apart by the identities embedded in
/// the message, not by the event name.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum ServerEvent {
    InitialMessageSuccess(MessageView),
    NewMessageSuccess(MessageView),
    AcceptChatSuccess { success: bool },
    RejectChatSuccess { success: bool },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_events_deserialize_by_event_name() {
        let event: ClientEvent =
            serde_json::from_str(r#"{"event":"userLogin","username":"alice"}"#).unwrap();
        assert!(matches!(event, ClientEvent::UserLogin(Identity { username }) if username == "alice"));

        let event: ClientEvent = serde_json::from_str(
            r#"{"event":"acceptChat","participant1":"alice","participant2":"bob"}"#,
        )
        .unwrap();
        assert!(matches!(event, ClientEvent::AcceptChat(_)));
    }

    #[test]
    fn text_message_requires_text() {
        let incoming: IncomingMessage = serde_json::from_str(
            r#"{"sender":"alice","receiver":"bob","messageType":"text"}"#,
        )
        .unwrap();
        assert!(incoming.into_parts().is_err());

        let incoming: IncomingMessage = serde_json::from_str(
            r#"{"sender":"alice","receiver":"bob","messageType":"text","textMessage":"hi"}"#,
        )
        .unwrap();
        let (sender, receiver, body) = incoming.into_parts().unwrap();
        assert_eq!(sender, "alice");
        assert_eq!(receiver, "bob");
        assert!(matches!(body, MessageBody::Text { text } if text == "hi"));
    }

    #[test]
    fn voice_message_requires_audio() {
        let incoming: IncomingMessage = serde_json::from_str(
            r#"{"sender":"alice","receiver":"bob","messageType":"voice","voiceMessageDuration":2.5}"#,
        )
        .unwrap();
        assert!(incoming.into_parts().is_err());

        let incoming: IncomingMessage = serde_json::from_str(
            r#"{"sender":"alice","receiver":"bob","messageType":"voice","voiceMessageData":"QUJD"}"#,
        )
        .unwrap();
        let (_, _, body) = incoming.into_parts().unwrap();
        assert!(matches!(
            body,
            MessageBody::Voice {
                source: VoiceSource::Inline(_),
                ..
            }
        ));
    }

    #[test]
    fn server_events_carry_the_event_name() {
        let json = serde_json::to_value(ServerEvent::AcceptChatSuccess { success: true }).unwrap();
        assert_eq!(json["event"], "acceptChatSuccess");
        assert_eq!(json["success"], true);
    }
}

use axum::extract::ws::{Message as WsMessage, WebSocket};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

use super::events::{ClientEvent, IncomingMessage, PairPayload, ServerEvent};
use crate::api::AppState;
use crate::models::chat::PairKey;
use crate::models::message::{Message, MessageView};
use crate::services::chat::{accept_chat, reject_chat};
use crate::services::message::append_message;
use crate::services::voice_storage::resolve_body;
use crate::utils::error::AppResult;

/// Drives one socket from connect to disconnect.
///
/// Events from a single connection are handled strictly in receipt order:
/// each one is awaited to completion before the next frame is read. Ordering
/// across different connections is not guaranteed.
pub async fn handle_connection(socket: WebSocket, state: Arc<AppState>) {
    let (mut sink, mut stream) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerEvent>();
    let connection_id = Uuid::new_v4().to_string();

    tracing::debug!("Socket connected: {}", connection_id);

    let send_task = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            match serde_json::to_string(&event) {
                Ok(json) => {
                    if sink.send(WsMessage::Text(json)).await.is_err() {
                        break;
                    }
                }
                Err(e) => tracing::error!("Failed to serialize server event: {}", e),
            }
        }
    });

    // Unset until the client announces who it is.
    let mut identity: Option<String> = None;

    while let Some(Ok(frame)) = stream.next().await {
        let text = match frame {
            WsMessage::Text(text) => text,
            WsMessage::Close(_) => break,
            _ => continue,
        };

        let event = match serde_json::from_str::<ClientEvent>(&text) {
            Ok(event) => event,
            Err(e) => {
                tracing::debug!("Ignoring malformed client event: {}", e);
                continue;
            }
        };

        match event {
            ClientEvent::UserLogin(id) => {
                state
                    .presence
                    .bind(&id.username, &connection_id, tx.clone())
                    .await;
                identity = Some(id.username);
            }
            ClientEvent::UserLogout(id) => {
                let removed = state
                    .presence
                    .unbind_if_current(&id.username, &connection_id)
                    .await;
                if removed && identity.as_deref() == Some(id.username.as_str()) {
                    identity = None;
                }
            }
            ClientEvent::InitialMessage(incoming) => handle_message(&state, incoming, true).await,
            ClientEvent::NewMessage(incoming) => handle_message(&state, incoming, false).await,
            ClientEvent::AcceptChat(pair) => handle_accept(&state, pair).await,
            ClientEvent::RejectChat(pair) => handle_reject(&state, pair).await,
        }
    }

    // Transport went away: drop the presence entry if it still belongs to
    // this connection, so a newer login for the same user survives.
    if let Some(username) = identity {
        state
            .presence
            .unbind_if_current(&username, &connection_id)
            .await;
    }

    send_task.abort();
    tracing::debug!("Socket disconnected: {}", connection_id);
}

/// Shared path for `initialMessage` and `newMessage`: one append contract,
/// two success event names.
async fn handle_message(state: &AppState, incoming: IncomingMessage, initial: bool) {
    match append_from_socket(state, incoming).await {
        Ok(message) => {
            let sender = message.sender.clone();
            let receiver = message.receiver.clone();
            let view = MessageView::from(message);
            let event = if initial {
                ServerEvent::InitialMessageSuccess(view)
            } else {
                ServerEvent::NewMessageSuccess(view)
            };
            state.presence.emit_to_pair(&sender, &receiver, event).await;
        }
        // Socket-path failures are logged and dropped; the client gets no
        // error event.
        Err(e) => tracing::error!("Error sending message: {}", e),
    }
}

async fn append_from_socket(state: &AppState, incoming: IncomingMessage) -> AppResult<Message> {
    let (sender, receiver, body) = incoming.into_parts()?;
    let content = resolve_body(&state.config, &sender, &receiver, body).await?;
    append_message(&state.db, sender, receiver, content).await
}

async fn handle_accept(state: &AppState, pair: PairPayload) {
    let key = PairKey::new(pair.participant1.as_str(), pair.participant2.as_str());
    match accept_chat(&state.db, &key).await {
        Ok(()) => {
            state
                .presence
                .emit_to_pair(
                    &pair.participant1,
                    &pair.participant2,
                    ServerEvent::AcceptChatSuccess { success: true },
                )
                .await;
        }
        Err(e) => tracing::error!("Error accepting chat: {}", e),
    }
}

async fn handle_reject(state: &AppState, pair: PairPayload) {
    let key = PairKey::new(pair.participant1.as_str(), pair.participant2.as_str());
    match reject_chat(&state.db, &key).await {
        Ok(()) => {
            state
                .presence
                .emit_to_pair(
                    &pair.participant1,
                    &pair.participant2,
                    ServerEvent::RejectChatSuccess { success: true },
                )
                .await;
        }
        Err(e) => tracing::error!("Error rejecting chat: {}", e),
    }
}

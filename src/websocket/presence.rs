use std::collections::HashMap;
use tokio::sync::{RwLock, mpsc};

use super::events::ServerEvent;

pub type EventSender = mpsc::UnboundedSender<ServerEvent>;

struct PresenceEntry {
    connection_id: String,
    sender: EventSender,
}

/// In-process table mapping a username to its single live connection.
/// Not persisted: the table starts empty on every restart and clients
/// re-announce their identity.
#[derive(Default)]
pub struct PresenceRegistry {
    entries: RwLock<HashMap<String, PresenceEntry>>,
}

impl PresenceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds a username to a connection. A newer login for the same username
    /// overwrites the previous binding without closing it (last login wins).
    pub async fn bind(&self, username: &str, connection_id: &str, sender: EventSender) {
        let mut entries = self.entries.write().await;
        let previous = entries.insert(
            username.to_string(),
            PresenceEntry {
                connection_id: connection_id.to_string(),
                sender,
            },
        );

        match previous {
            Some(old) if old.connection_id != connection_id => {
                tracing::debug!(
                    "Presence rebound: {} ({} -> {})",
                    username,
                    old.connection_id,
                    connection_id
                );
            }
            _ => tracing::debug!("Presence bound: {} ({})", username, connection_id),
        }
    }

    /// Removes the binding only when it still points at this connection.
    /// A stale logout (or disconnect) racing a newer login is a no-op.
    pub async fn unbind_if_current(&self, username: &str, connection_id: &str) -> bool {
        let mut entries = self.entries.write().await;
        match entries.get(username) {
            Some(entry) if entry.connection_id == connection_id => {
                entries.remove(username);
                tracing::debug!("Presence unbound: {} ({})", username, connection_id);
                true
            }
            _ => false,
        }
    }

    /// Emits an event to one user's connection if present; absent users are
    /// skipped silently (no queuing, no retry).
    pub async fn send_to(&self, username: &str, event: ServerEvent) -> bool {
        let entries = self.entries.read().await;
        match entries.get(username) {
            Some(entry) => entry.sender.send(event).is_ok(),
            None => false,
        }
    }

    /// Fan-out of one event to both chat participants, each looked up
    /// independently.
    pub async fn emit_to_pair(&self, participant1: &str, participant2: &str, event: ServerEvent) {
        self.send_to(participant1, event.clone()).await;
        self.send_to(participant2, event).await;
    }

    pub async fn is_online(&self, username: &str) -> bool {
        self.entries.read().await.contains_key(username)
    }
}

//! Connection management for WebSocket clients.
//!
//! Tracks connected participants and their session membership, and fans out
//! outbound events. Sends are fire-and-forget: a full or closed channel is
//! logged and skipped, never awaited.

use std::collections::HashMap;

use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;

use rzutnik_shared::ServerMessage;

/// Information about a connected participant.
#[derive(Debug, Clone)]
pub struct ConnectionInfo {
    /// Unique ID for this connection.
    pub connection_id: Uuid,
    /// The session this connection participates in.
    pub session_id: String,
}

/// Manages all active WebSocket connections.
pub struct ConnectionManager {
    /// Map of connection_id -> (ConnectionInfo, sender channel)
    connections: RwLock<HashMap<Uuid, (ConnectionInfo, mpsc::Sender<ServerMessage>)>>,
}

impl ConnectionManager {
    /// Create a new connection manager.
    pub fn new() -> Self {
        Self {
            connections: RwLock::new(HashMap::new()),
        }
    }

    /// Register a new connection as a member of a session.
    pub async fn register(
        &self,
        connection_id: Uuid,
        session_id: String,
        sender: mpsc::Sender<ServerMessage>,
    ) {
        let info = ConnectionInfo {
            connection_id,
            session_id,
        };
        let mut connections = self.connections.write().await;
        connections.insert(connection_id, (info, sender));
        tracing::debug!(connection_id = %connection_id, "Connection registered");
    }

    /// Unregister a connection.
    pub async fn unregister(&self, connection_id: Uuid) {
        let mut connections = self.connections.write().await;
        if connections.remove(&connection_id).is_some() {
            tracing::debug!(connection_id = %connection_id, "Connection unregistered");
        }
    }

    /// Send a message to one connection.
    pub async fn send_to(&self, connection_id: Uuid, message: ServerMessage) {
        let connections = self.connections.read().await;
        if let Some((info, sender)) = connections.get(&connection_id) {
            if let Err(e) = sender.try_send(message) {
                tracing::warn!(
                    connection_id = %info.connection_id,
                    error = %e,
                    "Failed to send message"
                );
            }
        }
    }

    /// Broadcast a message to every connection in a session.
    pub async fn broadcast_to_session(&self, session_id: &str, message: ServerMessage) {
        self.broadcast_filtered(session_id, None, message).await;
    }

    /// Broadcast a message to every connection in a session except one
    /// (the sender, for relayed events and hidden-roll acknowledgments).
    pub async fn broadcast_to_session_except(
        &self,
        session_id: &str,
        except: Uuid,
        message: ServerMessage,
    ) {
        self.broadcast_filtered(session_id, Some(except), message)
            .await;
    }

    async fn broadcast_filtered(
        &self,
        session_id: &str,
        except: Option<Uuid>,
        message: ServerMessage,
    ) {
        let connections = self.connections.read().await;
        for (info, sender) in connections.values() {
            if info.session_id != session_id || Some(info.connection_id) == except {
                continue;
            }
            if let Err(e) = sender.try_send(message.clone()) {
                tracing::warn!(
                    connection_id = %info.connection_id,
                    error = %e,
                    "Failed to broadcast message"
                );
            }
        }
    }

    /// Number of connections currently in a session.
    pub async fn session_size(&self, session_id: &str) -> usize {
        let connections = self.connections.read().await;
        connections
            .values()
            .filter(|(info, _)| info.session_id == session_id)
            .count()
    }
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}

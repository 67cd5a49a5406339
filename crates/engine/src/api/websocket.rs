//! WebSocket handling for table participants.
//!
//! One connection = one participant in one session. On join the participant
//! immediately receives the session's history snapshot; afterwards inbound
//! events are dispatched one at a time: roll requests run the
//! sanitize -> resolve -> publish pipeline, session resets clear the shared
//! history, drawing events are relayed untouched to everyone else.

use std::sync::Arc;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query, State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;
use uuid::Uuid;

use rzutnik_domain::{publish, resolve, sanitize, RollRequest};
use rzutnik_shared::{ClientMessage, ServerMessage};

use crate::app::App;
use crate::sessions::{Session, DEFAULT_SESSION};

/// Buffer size for per-connection message channel.
const CONNECTION_CHANNEL_BUFFER: usize = 256;

/// Query parameters accepted on upgrade.
#[derive(Debug, Deserialize)]
pub struct WsParams {
    /// Session to join; the shared default table when absent.
    #[serde(default)]
    session: Option<String>,
}

/// WebSocket upgrade handler - entry point for new connections.
pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<WsParams>,
    State(app): State<Arc<App>>,
) -> Response {
    let session_id = params
        .session
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_SESSION.to_string());
    ws.on_upgrade(move |socket| handle_socket(socket, app, session_id))
}

/// Handle an individual WebSocket connection.
async fn handle_socket(socket: WebSocket, app: Arc<App>, session_id: String) {
    let (mut ws_sender, mut ws_receiver) = socket.split();

    let connection_id = Uuid::new_v4();
    let session = app.sessions.get_or_create(&session_id);

    // Create a bounded channel for sending messages to this client
    let (tx, mut rx) = mpsc::channel::<ServerMessage>(CONNECTION_CHANNEL_BUFFER);

    app.connections
        .register(connection_id, session_id.clone(), tx.clone())
        .await;

    tracing::info!(
        connection_id = %connection_id,
        session_id = %session_id,
        "WebSocket connection established"
    );

    // Bring the newcomer up to date before anything else is delivered.
    let entries = session.history.lock().await.snapshot();
    if tx.send(ServerMessage::History { entries }).await.is_err() {
        tracing::warn!(connection_id = %connection_id, "Connection closed before history snapshot");
    }

    // Spawn a task to forward messages from the channel to the WebSocket
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if let Ok(json) = serde_json::to_string(&msg) {
                if ws_sender.send(Message::Text(json.into())).await.is_err() {
                    break;
                }
            }
        }
    });

    // Handle incoming messages
    while let Some(result) = ws_receiver.next().await {
        match result {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientMessage>(&text) {
                Ok(msg) => {
                    if let Some(response) =
                        handle_message(msg, &app, connection_id, &session, &session_id).await
                    {
                        if tx.try_send(response).is_err() {
                            tracing::warn!(
                                connection_id = %connection_id,
                                "Failed to send response, channel full or closed"
                            );
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(connection_id = %connection_id, error = %e, "Failed to parse message");
                    let error = ServerMessage::Error {
                        code: "PARSE_ERROR".to_string(),
                        message: format!("Invalid message format: {}", e),
                    };
                    let _ = tx.try_send(error);
                }
            },
            Ok(Message::Close(_)) => {
                tracing::info!(connection_id = %connection_id, "WebSocket closed by client");
                break;
            }
            Err(e) => {
                tracing::error!(connection_id = %connection_id, error = %e, "WebSocket error");
                break;
            }
            _ => {}
        }
    }

    // Clean up
    app.connections.unregister(connection_id).await;
    send_task.abort();

    tracing::info!(connection_id = %connection_id, "WebSocket connection terminated");
}

/// Dispatch a parsed client message to the appropriate handler.
async fn handle_message(
    msg: ClientMessage,
    app: &App,
    connection_id: Uuid,
    session: &Session,
    session_id: &str,
) -> Option<ServerMessage> {
    match msg {
        ClientMessage::Heartbeat => Some(ServerMessage::Pong),

        ClientMessage::Roll(raw) => {
            handle_roll(app, connection_id, session, session_id, raw).await;
            None
        }

        ClientMessage::SessionNew => {
            handle_session_new(app, session, session_id).await;
            None
        }

        // Drawing events are opaque: relay to everyone else in the session.
        ClientMessage::DrawStroke { stroke } => {
            app.connections
                .broadcast_to_session_except(
                    session_id,
                    connection_id,
                    ServerMessage::DrawStroke { stroke },
                )
                .await;
            None
        }
        ClientMessage::DrawRemove { id } => {
            app.connections
                .broadcast_to_session_except(
                    session_id,
                    connection_id,
                    ServerMessage::DrawRemove { id },
                )
                .await;
            None
        }
        ClientMessage::DrawClear => {
            app.connections
                .broadcast_to_session_except(session_id, connection_id, ServerMessage::DrawClear)
                .await;
            None
        }
        ClientMessage::DrawBg { data_url } => {
            app.connections
                .broadcast_to_session_except(
                    session_id,
                    connection_id,
                    ServerMessage::DrawBg { data_url },
                )
                .await;
            None
        }
    }
}

/// Run the roll pipeline and deliver each audience its view.
///
/// The session history lock is held across publish and fan-out, so two
/// rolls against the same session can never interleave their history
/// update and broadcast.
async fn handle_roll(
    app: &App,
    connection_id: Uuid,
    session: &Session,
    session_id: &str,
    raw: RollRequest,
) {
    let safe = sanitize(&raw);
    let result = resolve(&safe, app.dice.as_ref());

    tracing::debug!(
        connection_id = %connection_id,
        session_id = %session_id,
        player = %result.player_name,
        hidden = result.hidden,
        final_successes = result.final_successes,
        "Roll resolved"
    );

    let mut history = session.history.lock().await;
    let publication = publish(result, &mut history);

    app.connections
        .send_to(
            connection_id,
            ServerMessage::RollNew {
                roll: publication.to_requester,
            },
        )
        .await;
    app.connections
        .broadcast_to_session_except(
            session_id,
            connection_id,
            ServerMessage::RollNew {
                roll: publication.to_others,
            },
        )
        .await;
}

/// Clear the shared history and tell everyone, sender included.
async fn handle_session_new(app: &App, session: &Session, session_id: &str) {
    let mut history = session.history.lock().await;
    history.reset();
    tracing::info!(session_id = %session_id, "Session history reset");

    app.connections
        .broadcast_to_session(session_id, ServerMessage::History { entries: vec![] })
        .await;
}

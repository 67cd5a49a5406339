//! WebSocket message types.
//!
//! Internally tagged on `"type"` with the table's event names. Drawing
//! payloads are opaque `serde_json::Value`s - the engine relays them without
//! interpretation.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use rzutnik_domain::{HistoryEntry, RollRequest};

/// Messages a participant sends to the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    /// Keepalive ping.
    #[serde(rename = "heartbeat")]
    Heartbeat,
    /// Submit a roll. Fields are the untrusted [`RollRequest`] shape.
    #[serde(rename = "roll:request")]
    Roll(RollRequest),
    /// Start a fresh session: clears the shared history for everyone.
    #[serde(rename = "session:new")]
    SessionNew,
    /// Add a stroke on the shared drawing board.
    #[serde(rename = "draw:stroke")]
    DrawStroke { stroke: Value },
    /// Remove a stroke by id.
    #[serde(rename = "draw:remove")]
    DrawRemove { id: Value },
    /// Clear the drawing board.
    #[serde(rename = "draw:clear")]
    DrawClear,
    /// Replace the board background.
    #[serde(rename = "draw:bg")]
    DrawBg {
        #[serde(rename = "dataUrl")]
        data_url: Value,
    },
}

/// Messages the engine sends to participants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ServerMessage {
    /// Keepalive reply.
    #[serde(rename = "pong")]
    Pong,
    /// Full history snapshot, newest first. Sent on join and after a reset.
    #[serde(rename = "history")]
    History { entries: Vec<HistoryEntry> },
    /// A freshly resolved roll, full or redacted per the visibility policy.
    #[serde(rename = "roll:new")]
    RollNew { roll: HistoryEntry },
    /// Relayed stroke from another participant.
    #[serde(rename = "draw:stroke")]
    DrawStroke { stroke: Value },
    /// Relayed stroke removal.
    #[serde(rename = "draw:remove")]
    DrawRemove { id: Value },
    /// Relayed board clear.
    #[serde(rename = "draw:clear")]
    DrawClear,
    /// Relayed background replacement.
    #[serde(rename = "draw:bg")]
    DrawBg {
        #[serde(rename = "dataUrl")]
        data_url: Value,
    },
    /// The inbound event could not be handled; the event was dropped.
    #[serde(rename = "error")]
    Error { code: String, message: String },
}

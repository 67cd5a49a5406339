//! Per-session shared state.
//!
//! A session is the scope of one shared history and one set of connected
//! participants. Sessions are created on first join and live for the
//! process lifetime; nothing is persisted.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;

use rzutnik_domain::SessionHistory;

/// Session joined when a client does not name one.
pub const DEFAULT_SESSION: &str = "main";

/// Shared state of one table session.
///
/// The history sits behind a single mutex: each inbound event for the
/// session is handled to completion while holding it, which serializes roll
/// resolutions against the same store.
pub struct Session {
    pub history: Mutex<SessionHistory>,
}

impl Session {
    fn new() -> Self {
        Self {
            history: Mutex::new(SessionHistory::new()),
        }
    }
}

/// All live sessions, keyed by name.
pub struct SessionRegistry {
    sessions: DashMap<String, Arc<Session>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }

    /// Fetch a session, creating it empty on first join.
    pub fn get_or_create(&self, session_id: &str) -> Arc<Session> {
        self.sessions
            .entry(session_id.to_string())
            .or_insert_with(|| Arc::new(Session::new()))
            .clone()
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

//! Application composition.

use std::sync::Arc;

use rzutnik_domain::DieSource;

use crate::api::connections::ConnectionManager;
use crate::sessions::SessionRegistry;

/// Everything the handlers need, wired together once at startup.
pub struct App {
    pub connections: Arc<ConnectionManager>,
    pub sessions: Arc<SessionRegistry>,
    pub dice: Arc<dyn DieSource>,
}

impl App {
    /// Compose the application around the given die source.
    ///
    /// Production passes the thread-RNG adapter; tests pass a scripted
    /// source to make every roll deterministic.
    pub fn new(dice: Arc<dyn DieSource>) -> Self {
        Self {
            connections: Arc::new(ConnectionManager::new()),
            sessions: Arc::new(SessionRegistry::new()),
            dice,
        }
    }
}

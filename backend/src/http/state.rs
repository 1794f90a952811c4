//! Application state for the HTTP server.

use std::sync::Arc;

use crate::db::repository::DocumentRepository;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Document store, opened at startup and closed on shutdown
    pub repository: Arc<dyn DocumentRepository>,
}

impl AppState {
    pub fn new(repository: Arc<dyn DocumentRepository>) -> Self {
        Self { repository }
    }
}

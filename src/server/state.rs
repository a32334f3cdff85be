//! Shared application state for the HTTP server.

use crate::providers::ChatClient;
use crate::storage::SqliteStorage;

/// State shared across request handlers
///
/// Built once in main and handed to the router behind an `Arc`; the
/// provider client and storage are both read-only from the handlers'
/// point of view.
pub struct AppState {
    /// Conversation persistence
    pub storage: SqliteStorage,
    /// Provider adapter used for all LLM calls
    pub chat: ChatClient,
}

impl AppState {
    /// Create application state from its parts
    pub fn new(storage: SqliteStorage, chat: ChatClient) -> Self {
        Self { storage, chat }
    }
}

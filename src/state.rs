use crate::config::Config;
use crate::db::DbPool;
use crate::services::ai_client::GeminiClient;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Server-side token store mapping bearer tokens to user ids. Tokens are
/// invalidated by a restart.
pub type SessionStore = Arc<Mutex<HashMap<String, i64>>>;

#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    pub config: Arc<Config>,
    pub sessions: SessionStore,
    pub ai: GeminiClient,
}

impl AppState {
    pub fn session_user(&self, token: &str) -> Option<i64> {
        self.sessions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(token)
            .copied()
    }

    pub fn insert_session(&self, token: String, user_id: i64) {
        self.sessions
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(token, user_id);
    }
}

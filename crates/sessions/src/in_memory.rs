//! In-memory session store — useful for testing and ephemeral runs.

use agentura_core::error::SessionError;
use agentura_core::message::Turn;
use agentura_core::session::{
    SessionStore, SessionSummary, check_append, remove_turn_pair, session_title, sort_by_recency,
    validate_session_id,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Transcripts held in a map. Nothing survives the process.
pub struct InMemorySessionStore {
    sessions: Arc<RwLock<HashMap<String, Vec<Turn>>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn load(&self, session_id: &str) -> Result<Vec<Turn>, SessionError> {
        validate_session_id(session_id)?;
        Ok(self
            .sessions
            .read()
            .await
            .get(session_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn append(&self, session_id: &str, turn: Turn) -> Result<(), SessionError> {
        validate_session_id(session_id)?;
        let mut sessions = self.sessions.write().await;
        let existing = sessions.get(session_id).map(Vec::as_slice).unwrap_or_default();
        check_append(session_id, existing, &turn)?;
        sessions.entry(session_id.to_string()).or_default().push(turn);
        Ok(())
    }

    async fn delete_turn_pair(
        &self,
        session_id: &str,
        user_turn_index: usize,
    ) -> Result<usize, SessionError> {
        validate_session_id(session_id)?;
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(session_id) {
            Some(turns) => {
                remove_turn_pair(session_id, turns, user_turn_index)?;
                Ok(turns.len())
            }
            None => Err(SessionError::IndexOutOfRange {
                session_id: session_id.to_string(),
                index: user_turn_index,
                len: 0,
            }),
        }
    }

    async fn delete_session(&self, session_id: &str) -> Result<bool, SessionError> {
        validate_session_id(session_id)?;
        Ok(self.sessions.write().await.remove(session_id).is_some())
    }

    async fn clear(&self) -> Result<usize, SessionError> {
        let mut sessions = self.sessions.write().await;
        let removed = sessions.len();
        sessions.clear();
        Ok(removed)
    }

    async fn list_sessions(&self) -> Result<Vec<SessionSummary>, SessionError> {
        let sessions = self.sessions.read().await;
        let mut summaries: Vec<SessionSummary> = sessions
            .iter()
            .map(|(id, turns)| SessionSummary {
                id: id.clone(),
                title: session_title(turns),
                turn_count: turns.len(),
            })
            .collect();
        sort_by_recency(&mut summaries);
        Ok(summaries)
    }
}

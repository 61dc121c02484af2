//! SessionStore trait — durable transcripts keyed by session id.
//!
//! The store is the only writer of turn data. Every mutating operation is
//! atomic from the caller's point of view: a reader never observes a
//! half-applied change.

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::SessionError;
use crate::message::{Role, Turn};

/// Maximum characters of the first user turn used as a session title.
pub const TITLE_MAX_CHARS: usize = 30;

const MAX_SESSION_ID_LEN: usize = 128;

/// A session as shown in listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub id: String,
    pub title: String,
    pub turn_count: usize,
}

/// The core SessionStore trait.
///
/// Implementations: file-backed (one JSON document per session) and
/// in-memory (for tests and ephemeral runs).
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// The backend name (e.g., "file", "memory").
    fn name(&self) -> &str;

    /// Full ordered transcript; empty if the session was never written.
    async fn load(&self, session_id: &str) -> Result<Vec<Turn>, SessionError>;

    /// Append one turn, enforcing the alternation invariant.
    async fn append(&self, session_id: &str, turn: Turn) -> Result<(), SessionError>;

    /// Remove the user turn at `user_turn_index` and the assistant turn right
    /// after it, if any. Returns the number of turns remaining.
    async fn delete_turn_pair(
        &self,
        session_id: &str,
        user_turn_index: usize,
    ) -> Result<usize, SessionError>;

    /// Remove a whole transcript. Returns whether anything was removed.
    async fn delete_session(&self, session_id: &str) -> Result<bool, SessionError>;

    /// Remove every transcript. Returns how many were removed.
    async fn clear(&self) -> Result<usize, SessionError>;

    /// All sessions, most recent first.
    async fn list_sessions(&self) -> Result<Vec<SessionSummary>, SessionError>;
}

/// Reject ids that are empty, too long, or not safe as a file stem.
pub fn validate_session_id(session_id: &str) -> Result<(), SessionError> {
    let valid = !session_id.is_empty()
        && session_id.len() <= MAX_SESSION_ID_LEN
        && session_id != "."
        && session_id != ".."
        && session_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));

    if valid {
        Ok(())
    } else {
        Err(SessionError::InvalidSessionId(session_id.to_string()))
    }
}

/// Derive a session id from the current time plus a random suffix.
///
/// Lexical order of generated ids follows creation order down to the
/// millisecond; the suffix keeps ids minted in the same millisecond apart.
pub fn generate_session_id() -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("{}-{}", Utc::now().format("%Y%m%d-%H%M%S-%3f"), &suffix[..8])
}

/// Check that `turn` may follow `existing`.
///
/// A user turn may always be appended; an assistant turn must directly
/// follow a user turn.
pub fn check_append(session_id: &str, existing: &[Turn], turn: &Turn) -> Result<(), SessionError> {
    if turn.role == Role::User {
        return Ok(());
    }
    match existing.last() {
        Some(last) if last.role == Role::User => Ok(()),
        Some(_) => Err(SessionError::InvalidSequence {
            session_id: session_id.to_string(),
            reason: "assistant turn cannot follow another assistant turn".into(),
        }),
        None => Err(SessionError::InvalidSequence {
            session_id: session_id.to_string(),
            reason: "transcript must start with a user turn".into(),
        }),
    }
}

/// Remove a turn pair from `turns` in place.
pub fn remove_turn_pair(
    session_id: &str,
    turns: &mut Vec<Turn>,
    user_turn_index: usize,
) -> Result<(), SessionError> {
    let points_at_user = turns
        .get(user_turn_index)
        .is_some_and(|t| t.role == Role::User);
    if !points_at_user {
        return Err(SessionError::IndexOutOfRange {
            session_id: session_id.to_string(),
            index: user_turn_index,
            len: turns.len(),
        });
    }

    turns.remove(user_turn_index);
    if turns
        .get(user_turn_index)
        .is_some_and(|t| t.role == Role::Assistant)
    {
        turns.remove(user_turn_index);
    }
    Ok(())
}

/// Listing title: the first user turn, truncated.
pub fn session_title(turns: &[Turn]) -> String {
    turns
        .iter()
        .find(|t| t.role == Role::User)
        .map(|t| t.message.chars().take(TITLE_MAX_CHARS).collect())
        .unwrap_or_else(|| "Empty".to_string())
}

/// Sort summaries most recent first (ids are timestamp-derived).
pub fn sort_by_recency(summaries: &mut [SessionSummary]) {
    summaries.sort_by(|a, b| b.id.cmp(&a.id));
}

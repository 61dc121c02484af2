//! File-based session store — one pretty JSON document per session.
//!
//! Storage location: `~/.agentura/sessions/<session_id>.json`
//!
//! Every mutation rewrites the whole transcript into a temporary file in the
//! same directory and renames it over the target, so a crash mid-write never
//! leaves a truncated transcript behind.

use agentura_core::error::SessionError;
use agentura_core::lock::KeyedLocks;
use agentura_core::message::Turn;
use agentura_core::session::{
    SessionStore, SessionSummary, check_append, remove_turn_pair, session_title, sort_by_recency,
    validate_session_id,
};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};
use uuid::Uuid;

const EXTENSION: &str = "json";

/// A directory of `<id>.json` transcripts.
pub struct FileSessionStore {
    dir: PathBuf,
    locks: KeyedLocks,
}

impl FileSessionStore {
    /// Create a store rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        debug!(dir = %dir.display(), "File session store ready");
        Self {
            dir,
            locks: KeyedLocks::new(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, session_id: &str) -> PathBuf {
        self.dir.join(format!("{session_id}.{EXTENSION}"))
    }

    /// Read a transcript; a missing file is an empty transcript.
    async fn read(&self, session_id: &str) -> Result<Vec<Turn>, SessionError> {
        let content = match tokio::fs::read_to_string(self.path_for(session_id)).await {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(SessionError::Storage(format!(
                    "Failed to read session '{session_id}': {e}"
                )));
            }
        };

        serde_json::from_str(&content).map_err(|e| SessionError::Corrupted {
            session_id: session_id.to_string(),
            reason: e.to_string(),
        })
    }

    /// Atomically replace a transcript on disk.
    async fn write(&self, session_id: &str, turns: &[Turn]) -> Result<(), SessionError> {
        tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
            SessionError::Storage(format!("Failed to create sessions directory: {e}"))
        })?;

        let content = serde_json::to_string_pretty(turns).map_err(|e| {
            SessionError::Storage(format!("Failed to serialize session '{session_id}': {e}"))
        })?;

        let tmp = self.dir.join(format!(".{session_id}.{}.tmp", Uuid::new_v4()));
        if let Err(e) = write_synced(&tmp, content.as_bytes()).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(SessionError::Storage(format!(
                "Failed to write session '{session_id}': {e}"
            )));
        }

        if let Err(e) = tokio::fs::rename(&tmp, self.path_for(session_id)).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(SessionError::Storage(format!(
                "Failed to replace session '{session_id}': {e}"
            )));
        }

        Ok(())
    }

    /// Every `*.json` file in the directory.
    async fn transcript_files(&self) -> Result<Vec<PathBuf>, SessionError> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(SessionError::Storage(format!(
                    "Failed to list sessions directory: {e}"
                )));
            }
        };

        let mut files = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| SessionError::Storage(e.to_string()))?
        {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some(EXTENSION) {
                files.push(path);
            }
        }
        Ok(files)
    }

    /// Ids of every transcript file whose stem is a valid session id.
    async fn session_ids(&self) -> Result<Vec<String>, SessionError> {
        Ok(self
            .transcript_files()
            .await?
            .iter()
            .filter_map(|path| valid_stem(path))
            .collect())
    }
}

fn valid_stem(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .filter(|stem| validate_session_id(stem).is_ok())
        .map(str::to_string)
}

async fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = tokio::fs::File::create(path).await?;
    file.write_all(bytes).await?;
    file.sync_all().await
}

#[async_trait]
impl SessionStore for FileSessionStore {
    fn name(&self) -> &str {
        "file"
    }

    async fn load(&self, session_id: &str) -> Result<Vec<Turn>, SessionError> {
        validate_session_id(session_id)?;
        self.read(session_id).await
    }

    async fn append(&self, session_id: &str, turn: Turn) -> Result<(), SessionError> {
        validate_session_id(session_id)?;
        let _guard = self.locks.lock(session_id).await;

        let mut turns = self.read(session_id).await?;
        check_append(session_id, &turns, &turn)?;
        turns.push(turn);
        self.write(session_id, &turns).await?;

        debug!(session_id, turns = turns.len(), "Turn appended");
        Ok(())
    }

    async fn delete_turn_pair(
        &self,
        session_id: &str,
        user_turn_index: usize,
    ) -> Result<usize, SessionError> {
        validate_session_id(session_id)?;
        let _guard = self.locks.lock(session_id).await;

        let mut turns = self.read(session_id).await?;
        remove_turn_pair(session_id, &mut turns, user_turn_index)?;
        self.write(session_id, &turns).await?;

        debug!(session_id, index = user_turn_index, remaining = turns.len(), "Turn pair deleted");
        Ok(turns.len())
    }

    async fn delete_session(&self, session_id: &str) -> Result<bool, SessionError> {
        validate_session_id(session_id)?;
        let _guard = self.locks.lock(session_id).await;

        match tokio::fs::remove_file(self.path_for(session_id)).await {
            Ok(()) => {
                debug!(session_id, "Session deleted");
                Ok(true)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(SessionError::Storage(format!(
                "Failed to delete session '{session_id}': {e}"
            ))),
        }
    }

    async fn clear(&self) -> Result<usize, SessionError> {
        let mut removed = 0;
        for path in self.transcript_files().await? {
            let deleted = match valid_stem(&path) {
                Some(id) => self.delete_session(&id).await?,
                None => {
                    // Not addressable by id, but still a transcript file.
                    warn!(path = %path.display(), "Removing transcript with invalid session id");
                    match tokio::fs::remove_file(&path).await {
                        Ok(()) => true,
                        Err(e) if e.kind() == ErrorKind::NotFound => false,
                        Err(e) => {
                            return Err(SessionError::Storage(format!(
                                "Failed to delete {}: {e}",
                                path.display()
                            )));
                        }
                    }
                }
            };
            if deleted {
                removed += 1;
            }
        }
        debug!(removed, "All sessions cleared");
        Ok(removed)
    }

    async fn list_sessions(&self) -> Result<Vec<SessionSummary>, SessionError> {
        let mut summaries = Vec::new();
        for id in self.session_ids().await? {
            match self.read(&id).await {
                Ok(turns) => summaries.push(SessionSummary {
                    title: session_title(&turns),
                    turn_count: turns.len(),
                    id,
                }),
                Err(e) => warn!(session_id = %id, error = %e, "Skipping unreadable session"),
            }
        }
        sort_by_recency(&mut summaries);
        Ok(summaries)
    }
}

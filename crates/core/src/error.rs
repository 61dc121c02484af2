//! Error types for the Agentura domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context (registry, store, model, orchestration) has its own enum.

use thiserror::Error;

/// The top-level error type for all Agentura operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Provider errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Session store errors ---
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    // --- Tool errors ---
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    // --- Orchestration ---
    #[error(transparent)]
    Orchestration(#[from] OrchestrationError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// Failures of the language-model capability.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("Model timed out: {0}")]
    ModelTimeout(String),
}

/// Failures of the tool registry.
#[derive(Debug, Clone, Error)]
pub enum ToolError {
    #[error("Tool already registered: {0}")]
    DuplicateName(String),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid parameters for {tool_name}: {reason}")]
    InvalidParameters { tool_name: String, reason: String },

    #[error("Tool execution failed: {tool_name} — {reason}")]
    ExecutionFailed { tool_name: String, reason: String },
}

impl ToolError {
    /// Shorthand used by tool implementations to report a failed run.
    pub fn failed(tool_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ExecutionFailed {
            tool_name: tool_name.into(),
            reason: reason.into(),
        }
    }
}

/// Failures of the session store.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Invalid turn sequence in session '{session_id}': {reason}")]
    InvalidSequence { session_id: String, reason: String },

    #[error("Turn index {index} out of range for session '{session_id}' ({len} turns)")]
    IndexOutOfRange {
        session_id: String,
        index: usize,
        len: usize,
    },

    #[error("Invalid session id: '{0}'")]
    InvalidSessionId(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Corrupted transcript for session '{session_id}': {reason}")]
    Corrupted { session_id: String, reason: String },
}

/// The stage of a run that failed unrecoverably.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Received,
    SelectingTool,
    Composing,
    Completed,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Received => "received",
            Stage::SelectingTool => "selecting_tool",
            Stage::Composing => "composing",
            Stage::Completed => "completed",
        };
        f.write_str(name)
    }
}

/// Cause of an unrecoverable orchestration failure.
#[derive(Debug, Error)]
pub enum FailureCause {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Raised when an orchestration run ends in the `Failed` state.
#[derive(Debug, Error)]
pub enum OrchestrationError {
    #[error("Orchestration failed at {stage}: {source}")]
    Failed {
        stage: Stage,
        #[source]
        source: FailureCause,
    },
}

impl OrchestrationError {
    pub fn failed(stage: Stage, source: impl Into<FailureCause>) -> Self {
        Self::Failed {
            stage,
            source: source.into(),
        }
    }

    /// The stage at which the run failed.
    pub fn stage(&self) -> Stage {
        match self {
            Self::Failed { stage, .. } => *stage,
        }
    }

    /// The underlying cause.
    pub fn cause(&self) -> &FailureCause {
        match self {
            Self::Failed { source, .. } => source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_displays_correctly() {
        let err = Error::Provider(ProviderError::ModelTimeout("stage 2 after 30s".into()));
        assert!(err.to_string().contains("timed out"));
        assert!(err.to_string().contains("30s"));
    }

    #[test]
    fn tool_error_displays_correctly() {
        let err = Error::Tool(ToolError::InvalidParameters {
            tool_name: "shell".into(),
            reason: "missing required parameter 'command'".into(),
        });
        assert!(err.to_string().contains("shell"));
        assert!(err.to_string().contains("command"));
    }

    #[test]
    fn orchestration_error_keeps_stage_and_cause() {
        let err = OrchestrationError::failed(
            Stage::Composing,
            ProviderError::ModelUnavailable("connection refused".into()),
        );
        assert_eq!(err.stage(), Stage::Composing);
        assert!(matches!(
            err.cause(),
            FailureCause::Provider(ProviderError::ModelUnavailable(_))
        ));
        assert!(err.to_string().contains("composing"));
    }
}

//! Turn and chat-message domain types.
//!
//! A [`Turn`] is what the session store persists; a [`ChatMessage`] is what
//! the orchestrator sends to the language model. Turns are converted into
//! chat messages when transcript context is assembled.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// The author of a persisted turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The end user
    User,
    /// The AI assistant
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => f.write_str("user"),
            Role::Assistant => f.write_str("assistant"),
        }
    }
}

/// Metadata recorded on an assistant turn when a tool fired.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInvocation {
    /// Name of the invoked tool
    pub name: String,

    /// Parameters the tool was invoked with
    #[serde(default)]
    pub parameters: serde_json::Map<String, serde_json::Value>,

    /// Raw tool output, or the failure summary when `success` is false
    pub output: String,

    /// Whether the tool completed without error
    #[serde(default = "default_true")]
    pub success: bool,
}

fn default_true() -> bool {
    true
}

/// A single message in a session transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    /// Who sent this turn
    #[serde(rename = "from", alias = "from_")]
    pub role: Role,

    /// The text content
    pub message: String,

    /// Creation time
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub timestamp: DateTime<Utc>,

    /// Model that produced the turn (assistant turns only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Tool invocation metadata, if a tool fired for this turn
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool: Option<ToolInvocation>,
}

impl Turn {
    /// Create a new user turn stamped with the current time.
    pub fn user(message: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            message: message.into(),
            timestamp: Utc::now(),
            model: None,
            tool: None,
        }
    }

    /// Create a new assistant turn stamped with the current time.
    pub fn assistant(message: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            message: message.into(),
            timestamp: Utc::now(),
            model: Some(model.into()),
            tool: None,
        }
    }

    /// Attach tool invocation metadata.
    pub fn with_tool(mut self, tool: ToolInvocation) -> Self {
        self.tool = Some(tool);
        self
    }

    /// Convert into a chat message for model context.
    pub fn to_chat_message(&self) -> ChatMessage {
        let role = match self.role {
            Role::User => ChatRole::User,
            Role::Assistant => ChatRole::Assistant,
        };
        ChatMessage {
            role,
            content: self.message.clone(),
        }
    }
}

/// Accepts RFC 3339 timestamps and the offset-less ISO form written by
/// older history files (interpreted as UTC).
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    if let Ok(ts) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(serde::de::Error::custom)
}

/// Role of a message sent to the language model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::System => "system",
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        }
    }
}

/// A role-tagged message string sent to the language model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

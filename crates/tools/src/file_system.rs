//! File system tool — read file contents inside a sandbox root.

use agentura_core::error::ToolError;
use agentura_core::schema::{ParamKind, ParameterSchema};
use agentura_core::tool::Tool;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::path::PathBuf;
use tracing::debug;

const TRUNCATION_NOTICE: &str = "\n\n... (file truncated, too large)";

pub struct FileSystemTool {
    /// Every read must resolve inside this directory.
    root: PathBuf,
    /// Contents beyond this many bytes are truncated.
    max_bytes: usize,
}

impl FileSystemTool {
    pub fn new(root: impl Into<PathBuf>, max_bytes: usize) -> Self {
        Self {
            root: root.into(),
            max_bytes,
        }
    }
}

/// Cut `content` to at most `max_bytes`, backing off to a char boundary.
fn truncate(mut content: String, max_bytes: usize) -> String {
    if content.len() <= max_bytes {
        return content;
    }
    let mut end = max_bytes;
    while !content.is_char_boundary(end) {
        end -= 1;
    }
    content.truncate(end);
    content.push_str(TRUNCATION_NOTICE);
    content
}

#[async_trait]
impl Tool for FileSystemTool {
    fn name(&self) -> &str {
        "file_system"
    }

    fn description(&self) -> &str {
        "Read files from the server filesystem. Use for viewing code, configs, logs."
    }

    fn parameters(&self) -> ParameterSchema {
        ParameterSchema::new()
            .required("action", ParamKind::String, "Action to perform")
            .one_of(&["read"])
            .required("path", ParamKind::String, "File path to read")
    }

    async fn execute(&self, parameters: Map<String, Value>) -> Result<String, ToolError> {
        let action = parameters.get("action").and_then(Value::as_str).unwrap_or("");
        if action != "read" {
            return Err(ToolError::failed(
                "file_system",
                format!("Only 'read' action is supported, got '{action}'"),
            ));
        }

        let path = parameters
            .get("path")
            .and_then(Value::as_str)
            .ok_or_else(|| ToolError::failed("file_system", "missing 'path'"))?;

        let resolved = agentura_security::validate_path(path, &self.root)
            .map_err(|e| ToolError::failed("file_system", e.to_string()))?;

        debug!(path = %resolved.display(), "Reading file");
        let content = tokio::fs::read_to_string(&resolved)
            .await
            .map_err(|e| ToolError::failed("file_system", format!("Failed to read file: {e}")))?;

        Ok(truncate(content, self.max_bytes))
    }
}

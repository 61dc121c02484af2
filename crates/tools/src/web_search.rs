//! Web search tool — placeholder without a search backend.
//!
//! Answers with a deterministic notice so the two-stage flow can be
//! exercised end-to-end without network access.

use agentura_core::error::ToolError;
use agentura_core::schema::{ParamKind, ParameterSchema};
use agentura_core::tool::Tool;
use async_trait::async_trait;
use serde_json::{Map, Value};

const DEFAULT_LIMIT: u64 = 3;

pub struct WebSearchTool;

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &str {
        "web_search"
    }

    fn description(&self) -> &str {
        "Search the web for current information, news, documentation"
    }

    fn parameters(&self) -> ParameterSchema {
        ParameterSchema::new()
            .required("query", ParamKind::String, "Search query")
            .optional("limit", ParamKind::Integer, "Number of results (default: 3)")
    }

    async fn execute(&self, parameters: Map<String, Value>) -> Result<String, ToolError> {
        let query = parameters
            .get("query")
            .and_then(Value::as_str)
            .ok_or_else(|| ToolError::failed("web_search", "missing 'query'"))?;
        let limit = parameters
            .get("limit")
            .and_then(Value::as_u64)
            .unwrap_or(DEFAULT_LIMIT);

        Ok(format!(
            "Web search for '{query}' would return {limit} results. (No search backend configured)"
        ))
    }
}

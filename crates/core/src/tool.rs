//! Tool trait — the abstraction over agent capabilities.
//!
//! Tools give the agent the ability to act: run shell commands, read files,
//! search the web. Each tool describes its parameters with a
//! [`ParameterSchema`]; the registry validates parameters before a tool ever
//! runs.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use tracing::debug;

use crate::error::ToolError;
use crate::schema::ParameterSchema;

/// The core Tool trait.
///
/// Each tool (shell, file_system, web_search, ...) implements this trait and
/// is registered once at startup.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The unique name of this tool (e.g., "shell", "file_system").
    fn name(&self) -> &str;

    /// A description of what this tool does (sent to the LLM).
    fn description(&self) -> &str;

    /// The parameters this tool accepts.
    fn parameters(&self) -> ParameterSchema;

    /// Execute the tool with already-validated parameters.
    ///
    /// Omitted optional parameters are absent from the map; the tool applies
    /// its own default.
    async fn execute(&self, parameters: Map<String, Value>) -> Result<String, ToolError>;

    /// Describe this tool for listings and prompts.
    fn describe(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters(),
        }
    }
}

/// A tool's public description: name, description, and parameter schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub parameters: ParameterSchema,
}

/// A registry of available tools, in registration order.
///
/// Registration happens once at startup; afterwards the registry is only
/// read, so it is shared behind an `Arc` without locking.
pub struct ToolRegistry {
    tools: Vec<Box<dyn Tool>>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Register a tool. Fails if a tool with the same name already exists.
    pub fn register(&mut self, tool: Box<dyn Tool>) -> Result<(), ToolError> {
        let name = tool.name().to_string();
        if self.index.contains_key(&name) {
            return Err(ToolError::DuplicateName(name));
        }
        self.index.insert(name, self.tools.len());
        self.tools.push(tool);
        Ok(())
    }

    /// All tool descriptors, in registration order.
    pub fn list(&self) -> Vec<ToolDescriptor> {
        self.tools.iter().map(|t| t.describe()).collect()
    }

    /// Get a tool descriptor by name.
    pub fn get(&self, name: &str) -> Result<ToolDescriptor, ToolError> {
        self.lookup(name).map(|t| t.describe())
    }

    /// List all registered tool names, in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    fn lookup(&self, name: &str) -> Result<&dyn Tool, ToolError> {
        self.index
            .get(name)
            .map(|&i| self.tools[i].as_ref())
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))
    }

    /// Check that `name` exists and `parameters` satisfy its schema.
    ///
    /// `null` is accepted as an empty parameter map.
    pub fn validate(&self, name: &str, parameters: &Value) -> Result<Map<String, Value>, ToolError> {
        let tool = self.lookup(name)?;
        let params = match parameters {
            Value::Null => Map::new(),
            Value::Object(map) => map.clone(),
            other => {
                return Err(ToolError::InvalidParameters {
                    tool_name: name.to_string(),
                    reason: format!("parameters must be an object, got {other}"),
                });
            }
        };

        tool.parameters()
            .validate(&params)
            .map_err(|reason| ToolError::InvalidParameters {
                tool_name: name.to_string(),
                reason,
            })?;

        Ok(params)
    }

    /// Validate and then execute a tool, returning its text output.
    ///
    /// Nothing is executed if validation fails.
    pub async fn invoke(&self, name: &str, parameters: &Value) -> Result<String, ToolError> {
        let params = self.validate(name, parameters)?;
        let tool = self.lookup(name)?;
        debug!(tool = %name, "Invoking tool");
        tool.execute(params).await
    }

    /// Render the tool list for the tool-selection prompt.
    ///
    /// Output depends only on registry contents, so identical registries
    /// always render byte-identical text.
    pub fn render_for_prompt(&self) -> String {
        self.tools
            .iter()
            .map(|t| {
                let schema = t.parameters().to_json_schema();
                format!(
                    "- {}: {}\n  Parameters: {}",
                    t.name(),
                    t.description(),
                    serde_json::to_string(&schema).unwrap_or_default()
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

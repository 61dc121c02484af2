//! Shared test helpers for orchestrator tests.

use agentura_core::error::{ProviderError, ToolError};
use agentura_core::message::ChatMessage;
use agentura_core::provider::LanguageModel;
use agentura_core::schema::{ParamKind, ParameterSchema};
use agentura_core::tool::{Tool, ToolRegistry};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// One scripted model reply.
pub enum Reply {
    Text(String),
    Fail(ProviderError),
    /// Never answers within any reasonable deadline.
    Hang,
}

/// A mock model that answers with a sequence of scripted replies and
/// records every request it receives.
///
/// Panics if more calls are made than replies provided.
pub struct ScriptedModel {
    replies: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedModel {
    pub fn new(replies: Vec<Reply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Selection reply followed by the final answer.
    pub fn texts(replies: &[&str]) -> Self {
        Self::new(replies.iter().map(|r| Reply::Text(r.to_string())).collect())
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Messages sent on the `n`th call.
    pub fn request(&self, n: usize) -> Vec<ChatMessage> {
        self.requests.lock().unwrap()[n].clone()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    fn name(&self) -> &str {
        "scripted"
    }

    fn model_name(&self) -> &str {
        "mock-model"
    }

    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, ProviderError> {
        self.requests.lock().unwrap().push(messages.to_vec());
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .expect("ScriptedModel: no more replies");
        match reply {
            Reply::Text(text) => Ok(text),
            Reply::Fail(e) => Err(e),
            Reply::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(String::new())
            }
        }
    }
}

/// A `file_system`-shaped tool that returns a fixed listing.
pub struct ListingTool {
    pub calls: Arc<AtomicUsize>,
}

#[async_trait]
impl Tool for ListingTool {
    fn name(&self) -> &str {
        "file_system"
    }
    fn description(&self) -> &str {
        "Read files"
    }
    fn parameters(&self) -> ParameterSchema {
        ParameterSchema::new()
            .required("action", ParamKind::String, "Action to perform")
            .one_of(&["read"])
            .required("path", ParamKind::String, "File path")
    }
    async fn execute(&self, parameters: Map<String, Value>) -> Result<String, ToolError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let path = parameters["path"].as_str().unwrap_or_default();
        Ok(format!("{path}/a.txt\n{path}/b.txt"))
    }
}

/// A tool that always fails.
pub struct BrokenTool;

#[async_trait]
impl Tool for BrokenTool {
    fn name(&self) -> &str {
        "shell"
    }
    fn description(&self) -> &str {
        "Run commands"
    }
    fn parameters(&self) -> ParameterSchema {
        ParameterSchema::new().required("command", ParamKind::String, "Command")
    }
    async fn execute(&self, _parameters: Map<String, Value>) -> Result<String, ToolError> {
        Err(ToolError::failed("shell", "permission denied"))
    }
}

/// A tool that never finishes.
pub struct SlowTool;

#[async_trait]
impl Tool for SlowTool {
    fn name(&self) -> &str {
        "web_search"
    }
    fn description(&self) -> &str {
        "Search"
    }
    fn parameters(&self) -> ParameterSchema {
        ParameterSchema::new().required("query", ParamKind::String, "Query")
    }
    async fn execute(&self, _parameters: Map<String, Value>) -> Result<String, ToolError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(String::new())
    }
}

/// Registry with the listing, broken and slow tools.
pub fn test_registry() -> (Arc<ToolRegistry>, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut registry = ToolRegistry::new();
    registry
        .register(Box::new(ListingTool { calls: calls.clone() }))
        .unwrap();
    registry.register(Box::new(BrokenTool)).unwrap();
    registry.register(Box::new(SlowTool)).unwrap();
    (Arc::new(registry), calls)
}

//! The orchestration run: select, invoke, compose, record.

use agentura_config::AgentConfig;
use agentura_core::error::{Error, OrchestrationError, ProviderError, Stage, ToolError};
use agentura_core::lock::KeyedLocks;
use agentura_core::message::{ChatMessage, ToolInvocation, Turn};
use agentura_core::provider::LanguageModel;
use agentura_core::session::{SessionStore, generate_session_id, validate_session_id};
use agentura_core::tool::ToolRegistry;
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::decision::ToolDecision;
use crate::prompt::{self, ToolContext};

const DEFAULT_HISTORY_WINDOW: usize = 6;
const NO_RESPONSE: &str = "No response generated";

/// States of one orchestration run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Received,
    SelectingTool,
    ToolSkipped,
    ToolInvoking,
    Composing,
    Completed,
    Failed,
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RunState::Received => "received",
            RunState::SelectingTool => "selecting_tool",
            RunState::ToolSkipped => "tool_skipped",
            RunState::ToolInvoking => "tool_invoking",
            RunState::Composing => "composing",
            RunState::Completed => "completed",
            RunState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Tracks and logs state transitions of a single run.
struct Run<'a> {
    session_id: &'a str,
    state: RunState,
}

impl<'a> Run<'a> {
    fn start(session_id: &'a str) -> Self {
        debug!(session_id, state = %RunState::Received, "Run state");
        Self {
            session_id,
            state: RunState::Received,
        }
    }

    fn advance(&mut self, next: RunState) {
        debug!(session_id = self.session_id, from = %self.state, to = %next, "Run state");
        self.state = next;
    }

    /// Move to `Failed` and build the error for `stage`.
    fn fail(
        &mut self,
        stage: Stage,
        cause: impl Into<agentura_core::error::FailureCause>,
    ) -> Error {
        let err = OrchestrationError::failed(stage, cause);
        warn!(session_id = self.session_id, stage = %stage, error = %err.cause(), "Run failed");
        self.advance(RunState::Failed);
        err.into()
    }
}

/// Result of a completed run.
#[derive(Debug, Clone)]
pub struct OrchestrationOutcome {
    pub session_id: String,
    /// Final assistant text
    pub response: String,
    /// Tool that fired, if any (output or failure summary included)
    pub tool: Option<ToolInvocation>,
    /// Wall-clock duration of the run
    pub elapsed: Duration,
}

/// Drives the two-stage protocol for every prompt.
pub struct Orchestrator {
    model: Arc<dyn LanguageModel>,
    tools: Arc<ToolRegistry>,
    store: Arc<dyn SessionStore>,
    /// Serializes runs of one session
    run_locks: KeyedLocks,
    history_window: usize,
    deadline: Option<Duration>,
}

impl Orchestrator {
    pub fn new(
        model: Arc<dyn LanguageModel>,
        tools: Arc<ToolRegistry>,
        store: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            model,
            tools,
            store,
            run_locks: KeyedLocks::new(),
            history_window: DEFAULT_HISTORY_WINDOW,
            deadline: None,
        }
    }

    /// Apply the `[agent]` config section.
    pub fn with_config(self, config: &AgentConfig) -> Self {
        let with_window = self.with_history_window(config.history_window);
        if config.request_timeout_secs > 0 {
            with_window.with_deadline(Duration::from_secs(config.request_timeout_secs))
        } else {
            with_window
        }
    }

    /// Number of prior turns sent as context (minimum 1).
    pub fn with_history_window(mut self, turns: usize) -> Self {
        self.history_window = turns.max(1);
        self
    }

    /// Bound every model call and the tool call by `deadline`.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn model(&self) -> &Arc<dyn LanguageModel> {
        &self.model
    }

    pub fn tools(&self) -> &Arc<ToolRegistry> {
        &self.tools
    }

    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    /// Process one prompt. A missing session id starts a new session.
    ///
    /// An invalid session id fails with a session error before anything is
    /// recorded. Model and store failures fail with
    /// [`OrchestrationError`]; the user turn is kept in that case.
    pub async fn run(
        &self,
        session_id: Option<&str>,
        prompt: &str,
    ) -> Result<OrchestrationOutcome, Error> {
        let session_id = match session_id {
            Some(id) => {
                validate_session_id(id)?;
                id.to_string()
            }
            None => generate_session_id(),
        };

        let started = Instant::now();
        let _guard = self.run_locks.lock(&session_id).await;
        let mut run = Run::start(&session_id);
        info!(session_id = %session_id, "Processing prompt");

        // Received: load the prior transcript, then record the prompt.
        let history = self
            .store
            .load(&session_id)
            .await
            .map_err(|e| run.fail(Stage::Received, e))?;
        self.store
            .append(&session_id, Turn::user(prompt))
            .await
            .map_err(|e| run.fail(Stage::Received, e))?;
        let context = prompt::history_window(&history, self.history_window);

        // SelectingTool
        run.advance(RunState::SelectingTool);
        let selection = prompt::build_messages(
            prompt::selection_system_prompt(&self.tools),
            context,
            prompt,
        );
        let reply = self
            .complete(&selection)
            .await
            .map_err(|e| run.fail(Stage::SelectingTool, e))?;
        let decision = ToolDecision::parse(&reply);

        // Branch
        let mut invocation = None;
        let mut tool_context = None;
        match self.validated_tool(decision) {
            Ok(Some((tool_name, parameters))) => {
                run.advance(RunState::ToolInvoking);
                let result = self.invoke(&tool_name, &parameters).await;
                let (ctx, tool) = match result {
                    Ok(output) => (
                        ToolContext::Output {
                            tool_name: tool_name.clone(),
                            output: output.clone(),
                        },
                        ToolInvocation {
                            name: tool_name,
                            parameters,
                            output,
                            success: true,
                        },
                    ),
                    Err(e) => {
                        warn!(session_id = %session_id, tool = %tool_name, error = %e, "Tool execution failed");
                        let reason = failure_summary(&e);
                        (
                            ToolContext::Failure {
                                tool_name: tool_name.clone(),
                                reason: reason.clone(),
                            },
                            ToolInvocation {
                                name: tool_name,
                                parameters,
                                output: reason,
                                success: false,
                            },
                        )
                    }
                };
                tool_context = Some(ctx);
                invocation = Some(tool);
            }
            Ok(None) => run.advance(RunState::ToolSkipped),
            Err(e) => {
                warn!(session_id = %session_id, error = %e, "Skipping tool");
                run.advance(RunState::ToolSkipped);
            }
        }

        // Composing
        run.advance(RunState::Composing);
        let composing = prompt::build_messages(
            prompt::composing_system_prompt(tool_context.as_ref()),
            context,
            prompt,
        );
        let reply = self
            .complete(&composing)
            .await
            .map_err(|e| run.fail(Stage::Composing, e))?;

        let response = if reply.trim().is_empty() {
            match &invocation {
                Some(tool) if tool.success => tool.output.clone(),
                _ => NO_RESPONSE.to_string(),
            }
        } else {
            reply
        };

        // Completed
        let mut turn = Turn::assistant(&response, self.model.model_name());
        if let Some(tool) = &invocation {
            turn = turn.with_tool(tool.clone());
        }
        self.store
            .append(&session_id, turn)
            .await
            .map_err(|e| run.fail(Stage::Completed, e))?;
        run.advance(RunState::Completed);

        let elapsed = started.elapsed();
        info!(
            session_id = %session_id,
            tool = invocation.as_ref().map(|t| t.name.as_str()).unwrap_or("none"),
            elapsed_ms = elapsed.as_millis() as u64,
            "Prompt completed"
        );

        Ok(OrchestrationOutcome {
            session_id,
            response,
            tool: invocation,
            elapsed,
        })
    }

    /// Resolve a decision to a registered tool with valid parameters.
    fn validated_tool(
        &self,
        decision: ToolDecision,
    ) -> Result<Option<(String, Map<String, Value>)>, ToolError> {
        match decision {
            ToolDecision::NoTool => Ok(None),
            ToolDecision::Use {
                tool_name,
                parameters,
            } => {
                let params = self.tools.validate(&tool_name, &parameters)?;
                Ok(Some((tool_name, params)))
            }
        }
    }

    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, ProviderError> {
        match self.deadline {
            Some(deadline) => tokio::time::timeout(deadline, self.model.complete(messages))
                .await
                .unwrap_or_else(|_| {
                    Err(ProviderError::ModelTimeout(format!(
                        "no reply from {} within {}s",
                        self.model.model_name(),
                        deadline.as_secs_f64()
                    )))
                }),
            None => self.model.complete(messages).await,
        }
    }

    async fn invoke(
        &self,
        tool_name: &str,
        parameters: &Map<String, Value>,
    ) -> Result<String, ToolError> {
        let parameters = Value::Object(parameters.clone());
        match self.deadline {
            Some(deadline) => {
                tokio::time::timeout(deadline, self.tools.invoke(tool_name, &parameters))
                    .await
                    .unwrap_or_else(|_| {
                        Err(ToolError::failed(
                            tool_name,
                            format!("timed out after {}s", deadline.as_secs_f64()),
                        ))
                    })
            }
            None => self.tools.invoke(tool_name, &parameters).await,
        }
    }
}

/// The part of a tool error worth showing the model and the user.
fn failure_summary(err: &ToolError) -> String {
    match err {
        ToolError::ExecutionFailed { reason, .. } => reason.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{Reply, ScriptedModel, test_registry};
    use agentura_core::error::{FailureCause, SessionError};
    use agentura_core::message::Role;
    use agentura_sessions::{FileSessionStore, InMemorySessionStore};
    use std::sync::atomic::Ordering;

    const NO_TOOL: &str = r#"{"use_tool": false, "tool_name": null, "parameters": null}"#;
    const LIST_TMP: &str = r#"{"use_tool": true, "tool_name": "file_system", "parameters": {"action": "read", "path": "/tmp"}}"#;

    fn orchestrator(model: ScriptedModel) -> (Orchestrator, Arc<ScriptedModel>, Arc<InMemorySessionStore>) {
        let model = Arc::new(model);
        let store = Arc::new(InMemorySessionStore::new());
        let (tools, _) = test_registry();
        let orch = Orchestrator::new(model.clone(), tools, store.clone());
        (orch, model, store)
    }

    #[tokio::test]
    async fn tool_selected_invoked_and_recorded() {
        let model = Arc::new(ScriptedModel::texts(&[LIST_TMP, "Your /tmp holds a.txt and b.txt."]));
        let store = Arc::new(InMemorySessionStore::new());
        let (tools, calls) = test_registry();
        let orch = Orchestrator::new(model.clone(), tools, store.clone());

        let outcome = orch.run(Some("s1"), "list files in /tmp").await.unwrap();

        assert_eq!(outcome.response, "Your /tmp holds a.txt and b.txt.");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        let tool = outcome.tool.unwrap();
        assert_eq!(tool.name, "file_system");
        assert!(tool.success);

        let turns = store.load("s1").await.unwrap();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].role, Role::User);
        assert_eq!(turns[1].model.as_deref(), Some("mock-model"));
        let recorded = turns[1].tool.as_ref().unwrap();
        assert_eq!(recorded.parameters["path"], "/tmp");
        assert_eq!(recorded.output, "/tmp/a.txt\n/tmp/b.txt");

        // Stage 2 saw the tool output
        let stage2 = model.request(1);
        assert!(stage2[0].content.contains("/tmp/a.txt"));
    }

    #[tokio::test]
    async fn no_tool_answers_directly() {
        let (orch, model, store) = orchestrator(ScriptedModel::texts(&[NO_TOOL, "Hello there!"]));

        let outcome = orch.run(Some("s1"), "hello").await.unwrap();

        assert_eq!(outcome.response, "Hello there!");
        assert!(outcome.tool.is_none());
        assert_eq!(model.call_count(), 2);
        let turns = store.load("s1").await.unwrap();
        assert_eq!(turns.len(), 2);
        assert!(turns[1].tool.is_none());
    }

    #[tokio::test]
    async fn unknown_tool_is_skipped() {
        let decision = r#"{"use_tool": true, "tool_name": "teleport", "parameters": {}}"#;
        let (orch, _, store) = orchestrator(ScriptedModel::texts(&[decision, "I can't do that."]));

        let outcome = orch.run(Some("s1"), "beam me up").await.unwrap();

        assert_eq!(outcome.response, "I can't do that.");
        assert!(outcome.tool.is_none());
        assert_eq!(store.load("s1").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn composing_timeout_keeps_user_turn() {
        let (orch, _, store) = orchestrator(ScriptedModel::new(vec![
            Reply::Text(NO_TOOL.into()),
            Reply::Fail(ProviderError::ModelTimeout("stage 2".into())),
        ]));

        let err = orch.run(Some("s1"), "hello").await.unwrap_err();

        match err {
            Error::Orchestration(e) => {
                assert_eq!(e.stage(), Stage::Composing);
                assert!(matches!(
                    e.cause(),
                    FailureCause::Provider(ProviderError::ModelTimeout(_))
                ));
            }
            other => panic!("Expected OrchestrationFailed, got: {other}"),
        }
        let turns = store.load("s1").await.unwrap();
        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0].role, Role::User);
    }

    #[tokio::test]
    async fn stage_one_failure_fails_run() {
        let (orch, model, store) = orchestrator(ScriptedModel::new(vec![Reply::Fail(
            ProviderError::ModelUnavailable("connection refused".into()),
        )]));

        let err = orch.run(Some("s1"), "hello").await.unwrap_err();
        assert!(matches!(err, Error::Orchestration(ref e) if e.stage() == Stage::SelectingTool));
        assert_eq!(model.call_count(), 1);
        assert_eq!(store.load("s1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn tool_failure_reaches_stage_two() {
        let decision = r#"{"use_tool": true, "tool_name": "shell", "parameters": {"command": "cat /root/secret"}}"#;
        let (orch, model, store) =
            orchestrator(ScriptedModel::texts(&[decision, "Sorry, the command failed."]));

        let outcome = orch.run(Some("s1"), "show the secret").await.unwrap();

        assert_eq!(outcome.response, "Sorry, the command failed.");
        let tool = outcome.tool.unwrap();
        assert!(!tool.success);
        assert_eq!(tool.output, "permission denied");

        let stage2 = model.request(1);
        assert!(stage2[0].content.contains("TOOL FAILURE (shell): permission denied"));
        assert!(store.load("s1").await.unwrap()[1].tool.is_some());
    }

    #[tokio::test]
    async fn invalid_parameters_skip_tool() {
        let decision = r#"{"use_tool": true, "tool_name": "file_system", "parameters": {"path": "/tmp"}}"#;
        let model = Arc::new(ScriptedModel::texts(&[decision, "ok"]));
        let (tools, calls) = test_registry();
        let orch = Orchestrator::new(model, tools, Arc::new(InMemorySessionStore::new()));

        let outcome = orch.run(Some("s1"), "list /tmp").await.unwrap();
        assert!(outcome.tool.is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn garbage_selection_reply_is_no_tool() {
        let (orch, _, _) = orchestrator(ScriptedModel::texts(&["I think no tool {oops", "Hi"]));
        let outcome = orch.run(Some("s1"), "hello").await.unwrap();
        assert!(outcome.tool.is_none());
        assert_eq!(outcome.response, "Hi");
    }

    #[tokio::test]
    async fn empty_reply_falls_back_to_tool_output() {
        let (orch, _, _) = orchestrator(ScriptedModel::texts(&[LIST_TMP, "   "]));
        let outcome = orch.run(Some("s1"), "list /tmp").await.unwrap();
        assert_eq!(outcome.response, "/tmp/a.txt\n/tmp/b.txt");
    }

    #[tokio::test]
    async fn empty_reply_without_tool() {
        let (orch, _, store) = orchestrator(ScriptedModel::texts(&[NO_TOOL, ""]));
        let outcome = orch.run(Some("s1"), "hello").await.unwrap();
        assert_eq!(outcome.response, NO_RESPONSE);
        assert_eq!(store.load("s1").await.unwrap()[1].message, NO_RESPONSE);
    }

    #[tokio::test]
    async fn history_window_limits_context() {
        let (orch, model, _) = orchestrator(ScriptedModel::texts(&[
            NO_TOOL, "a1", NO_TOOL, "a2", NO_TOOL, "a3",
        ]));
        let orch = orch.with_history_window(2);

        orch.run(Some("s1"), "q1").await.unwrap();
        orch.run(Some("s1"), "q2").await.unwrap();
        orch.run(Some("s1"), "q3").await.unwrap();

        // system + 2 prior turns + prompt
        let last_stage2 = model.request(5);
        assert_eq!(last_stage2.len(), 4);
        assert_eq!(last_stage2[1].content, "q2");
        assert_eq!(last_stage2[2].content, "a2");
        assert_eq!(last_stage2[3].content, "q3");
    }

    #[tokio::test]
    async fn missing_session_id_is_generated() {
        let (orch, _, store) = orchestrator(ScriptedModel::texts(&[NO_TOOL, "hi"]));
        let outcome = orch.run(None, "hello").await.unwrap();
        assert!(validate_session_id(&outcome.session_id).is_ok());
        assert_eq!(store.load(&outcome.session_id).await.unwrap().len(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_anonymous_runs_get_separate_sessions() {
        let model = Arc::new(ScriptedModel::texts(&["answer"; 8]));
        let store = Arc::new(InMemorySessionStore::new());
        let (tools, _) = test_registry();
        let orch = Arc::new(Orchestrator::new(model.clone(), tools, store.clone()));

        let runs = (0..4).map(|i| {
            let orch = orch.clone();
            tokio::spawn(async move { orch.run(None, &format!("private prompt {i}")).await })
        });
        let ids: Vec<String> = futures::future::join_all(runs)
            .await
            .into_iter()
            .map(|r| r.unwrap().unwrap().session_id)
            .collect();

        let distinct: std::collections::HashSet<&String> = ids.iter().collect();
        assert_eq!(distinct.len(), 4);
        for id in &ids {
            assert_eq!(store.load(id).await.unwrap().len(), 2);
        }
        // No run saw another run's prompt as history
        for n in 0..8 {
            assert_eq!(model.request(n).len(), 2);
        }
    }

    #[tokio::test]
    async fn invalid_session_id_rejected_before_model_call() {
        let (orch, model, _) = orchestrator(ScriptedModel::texts(&[]));
        let err = orch.run(Some("../etc"), "hello").await.unwrap_err();
        assert!(matches!(err, Error::Session(SessionError::InvalidSessionId(_))));
        assert_eq!(model.call_count(), 0);
    }

    #[tokio::test]
    async fn deadline_turns_hung_model_into_timeout() {
        let (orch, _, store) = orchestrator(ScriptedModel::new(vec![Reply::Hang]));
        let orch = orch.with_deadline(Duration::from_millis(50));

        let err = orch.run(Some("s1"), "hello").await.unwrap_err();
        match err {
            Error::Orchestration(e) => assert!(matches!(
                e.cause(),
                FailureCause::Provider(ProviderError::ModelTimeout(_))
            )),
            other => panic!("Expected OrchestrationFailed, got: {other}"),
        }
        assert_eq!(store.load("s1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn deadline_turns_hung_tool_into_failure_notice() {
        let decision = r#"{"use_tool": true, "tool_name": "web_search", "parameters": {"query": "rust"}}"#;
        let (orch, model, _) = orchestrator(ScriptedModel::texts(&[decision, "Search timed out."]));
        let orch = orch.with_deadline(Duration::from_millis(50));

        let outcome = orch.run(Some("s1"), "search rust").await.unwrap();
        let tool = outcome.tool.unwrap();
        assert!(!tool.success);
        assert!(tool.output.contains("timed out"));
        assert!(model.request(1)[0].content.contains("TOOL FAILURE (web_search)"));
    }

    #[tokio::test]
    async fn concurrent_runs_on_one_session_stay_paired() {
        let dir = tempfile::tempdir().unwrap();
        let replies: Vec<&str> = (0..8).flat_map(|_| [NO_TOOL, "answer"]).collect();
        let model = Arc::new(ScriptedModel::texts(&replies));
        let store = Arc::new(FileSessionStore::new(dir.path()));
        let (tools, _) = test_registry();
        let orch = Arc::new(Orchestrator::new(model, tools, store.clone()));

        let runs = (0..4).map(|i| {
            let orch = orch.clone();
            tokio::spawn(async move { orch.run(Some("shared"), &format!("q{i}")).await })
        });
        for result in futures::future::join_all(runs).await {
            result.unwrap().unwrap();
        }

        let turns = store.load("shared").await.unwrap();
        assert_eq!(turns.len(), 8);
        for pair in turns.chunks(2) {
            assert_eq!(pair[0].role, Role::User);
            assert_eq!(pair[1].role, Role::Assistant);
        }
    }
}

//! The two-stage orchestrator — the heart of Agentura.
//!
//! Every prompt goes through the same cycle:
//!
//! 1. **Receive** the prompt and record the user turn
//! 2. **Select** a tool: the language model answers with a JSON decision
//! 3. **Invoke** the chosen tool, if the decision names a valid one
//! 4. **Compose** the final answer with the tool result as context
//! 5. **Complete** by recording the assistant turn
//!
//! At most one tool runs per prompt. Tool problems degrade to a plain
//! answer; model and store failures fail the run.

pub mod bootstrap;
pub mod decision;
pub mod orchestrator;
pub mod prompt;

pub use bootstrap::build_from_config;
pub use decision::ToolDecision;
pub use orchestrator::{OrchestrationOutcome, Orchestrator, RunState};
pub use prompt::ToolContext;

#[cfg(test)]
pub(crate) mod test_helpers;

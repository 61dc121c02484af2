//! LanguageModel trait — the abstraction over LLM backends.
//!
//! A language model takes an ordered list of role-tagged messages and returns
//! generated text. It is stateless: transcript context is assembled by the
//! caller on every request. No retry or streaming guarantees are assumed.
//!
//! Implementations: OpenAI-compatible endpoints and native Ollama.

use async_trait::async_trait;

use crate::error::ProviderError;
use crate::message::ChatMessage;

/// The core LanguageModel trait.
///
/// The orchestrator calls `complete()` twice per run (tool selection, then
/// the final answer) without knowing which backend is behind it.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// A human-readable provider name (e.g., "ollama", "openai").
    fn name(&self) -> &str;

    /// The model identifier recorded on assistant turns.
    fn model_name(&self) -> &str;

    /// Send the context messages and get the generated text back.
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, ProviderError>;
}

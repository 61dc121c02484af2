//! Language-model provider implementations for Agentura.
//!
//! All providers implement the `agentura_core::LanguageModel` trait.
//! The router builds the configured provider at startup.

mod http;
pub mod ollama;
pub mod openai_compat;
pub mod router;

pub use ollama::OllamaProvider;
pub use openai_compat::OpenAiCompatProvider;
pub use router::{build_from_config, build_provider, default_base_url};

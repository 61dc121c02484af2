//! # Agentura Core
//!
//! Domain types, traits, and error definitions for the Agentura chat gateway.
//! This crate has **no framework dependencies** — it defines the domain model
//! that every other crate implements against.
//!
//! ## Design Philosophy
//!
//! Each collaborator of the orchestrator is a trait here:
//! - [`LanguageModel`] — the opaque text-completion backend
//! - [`Tool`] — a schema-described capability, held by the [`ToolRegistry`]
//! - [`SessionStore`] — the durable transcript store
//!
//! Implementations live in their respective crates, so tests can swap in
//! scripted models and in-memory stores.

pub mod error;
pub mod lock;
pub mod message;
pub mod provider;
pub mod schema;
pub mod session;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use error::{
    Error, FailureCause, OrchestrationError, ProviderError, Result, SessionError, Stage, ToolError,
};
pub use lock::KeyedLocks;
pub use message::{ChatMessage, ChatRole, Role, ToolInvocation, Turn};
pub use provider::LanguageModel;
pub use schema::{ParamKind, ParameterSchema, ParameterSpec};
pub use session::{SessionStore, SessionSummary, generate_session_id, validate_session_id};
pub use tool::{Tool, ToolDescriptor, ToolRegistry};

//! Security helpers for Agentura tools.
//!
//! Provides:
//! - **Path validation**: keeps filesystem tools inside a configured root

pub mod path;

pub use path::{PathValidationError, validate_path};

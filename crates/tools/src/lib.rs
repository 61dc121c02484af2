//! Built-in tool implementations for Agentura.
//!
//! Tools give the orchestrator the ability to act on the host: run shell
//! commands, read files, and search the web.

pub mod file_system;
pub mod shell;
pub mod web_search;

use agentura_config::ToolsConfig;
use agentura_core::error::ToolError;
use agentura_core::tool::ToolRegistry;
use std::path::PathBuf;
use std::time::Duration;

pub use file_system::FileSystemTool;
pub use shell::ShellTool;
pub use web_search::WebSearchTool;

/// Create a registry with the three built-in tools, in prompt order:
/// `shell`, `file_system`, `web_search`.
///
/// The file root defaults to the process working directory.
pub fn default_registry(config: &ToolsConfig) -> Result<ToolRegistry, ToolError> {
    let file_root = match &config.file_root {
        Some(root) => root.clone(),
        None => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    };

    let mut registry = ToolRegistry::new();
    registry.register(Box::new(
        ShellTool::new(config.shell_allowed_commands.clone())
            .with_timeout(Duration::from_secs(config.shell_timeout_secs)),
    ))?;
    registry.register(Box::new(FileSystemTool::new(file_root, config.max_file_bytes)))?;
    registry.register(Box::new(WebSearchTool))?;
    Ok(registry)
}

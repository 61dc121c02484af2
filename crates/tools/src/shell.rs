//! Shell tool — execute system commands.
//!
//! Supports command allowlisting and a per-command timeout.

use agentura_core::error::ToolError;
use agentura_core::schema::{ParamKind, ParameterSchema};
use agentura_core::tool::Tool;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const NO_OUTPUT: &str = "Command executed with no output";

/// Execute shell commands with safety constraints.
pub struct ShellTool {
    /// If non-empty, only these commands are allowed.
    allowed_commands: Vec<String>,
    timeout: Duration,
}

impl ShellTool {
    pub fn new(allowed_commands: Vec<String>) -> Self {
        Self {
            allowed_commands,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn is_command_allowed(&self, command: &str) -> bool {
        if self.allowed_commands.is_empty() {
            return true; // No allowlist = all commands allowed
        }

        // Extract the base command (first word)
        let base_cmd = command.split_whitespace().next().unwrap_or("").trim();

        self.allowed_commands.iter().any(|a| a == base_cmd)
    }
}

#[async_trait]
impl Tool for ShellTool {
    fn name(&self) -> &str {
        "shell"
    }

    fn description(&self) -> &str {
        "Execute shell commands on the server (ls, pwd, grep, etc.)"
    }

    fn parameters(&self) -> ParameterSchema {
        ParameterSchema::new().required("command", ParamKind::String, "Shell command to execute")
    }

    async fn execute(&self, parameters: Map<String, Value>) -> Result<String, ToolError> {
        let command = parameters
            .get("command")
            .and_then(Value::as_str)
            .ok_or_else(|| ToolError::failed("shell", "missing 'command'"))?;

        if !self.is_command_allowed(command) {
            return Err(ToolError::failed(
                "shell",
                format!(
                    "Command '{}' not in allowlist",
                    command.split_whitespace().next().unwrap_or("")
                ),
            ));
        }

        debug!(command = %command, "Executing shell command");

        let mut cmd = if cfg!(target_os = "windows") {
            let mut c = Command::new("cmd");
            c.args(["/C", command]);
            c
        } else {
            let mut c = Command::new("sh");
            c.args(["-c", command]);
            c
        };
        cmd.kill_on_drop(true);

        let output = match tokio::time::timeout(self.timeout, cmd.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => return Err(ToolError::failed("shell", e.to_string())),
            Err(_) => {
                warn!(command = %command, timeout_secs = self.timeout.as_secs(), "Command timed out");
                return Err(ToolError::failed(
                    "shell",
                    format!("Command execution timed out after {}s", self.timeout.as_secs()),
                ));
            }
        };

        if !output.status.success() {
            debug!(command = %command, exit_code = output.status.code().unwrap_or(-1), "Command exited non-zero");
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        let text = if !stdout.is_empty() {
            stdout.into_owned()
        } else if !stderr.is_empty() {
            stderr.into_owned()
        } else {
            NO_OUTPUT.to_string()
        };
        Ok(text)
    }
}

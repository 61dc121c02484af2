//! Prompt construction for both orchestration stages.

use agentura_core::message::{ChatMessage, Turn};
use agentura_core::tool::ToolRegistry;

const ASSISTANT_PERSONA: &str = "You are a helpful AI assistant with access to various tools.";

/// What the composing stage learns about the tool step.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolContext {
    /// The tool ran and produced output.
    Output { tool_name: String, output: String },
    /// The tool was invoked but failed.
    Failure { tool_name: String, reason: String },
}

impl ToolContext {
    fn render(&self) -> String {
        match self {
            Self::Output { tool_name, output } => format!(
                "TOOL RESULT ({tool_name}):\n```\n{output}\n```\n\nExplain the tool result to the user in a helpful way."
            ),
            Self::Failure { tool_name, reason } => format!(
                "TOOL FAILURE ({tool_name}): {reason}\n\nThe tool could not complete. Tell the user it failed and answer as well as you can without it."
            ),
        }
    }
}

/// System prompt for the selection stage.
pub fn selection_system_prompt(tools: &ToolRegistry) -> String {
    format!(
        r#"You are a tool selection system. Decide if the user's request requires using a tool.

AVAILABLE TOOLS:
{tools}

RULES:
- Use a tool only when the request needs information or an action the tool provides
- DO NOT use tools for: greetings, general questions, math, explanations, chat
- Parameters must match the tool's schema exactly

RESPOND WITH ONLY THIS JSON (no other text):
{{"use_tool": true, "tool_name": "<tool name>", "parameters": {{...}}}}
or
{{"use_tool": false, "tool_name": null, "parameters": null}}"#,
        tools = tools.render_for_prompt()
    )
}

/// System prompt for the composing stage.
pub fn composing_system_prompt(tool: Option<&ToolContext>) -> String {
    match tool {
        Some(ctx) => format!("{ASSISTANT_PERSONA}\n\n{}", ctx.render()),
        None => ASSISTANT_PERSONA.to_string(),
    }
}

/// The last `window` turns of `history`.
pub fn history_window(history: &[Turn], window: usize) -> &[Turn] {
    &history[history.len().saturating_sub(window)..]
}

/// System message, then the history window, then the prompt.
pub fn build_messages(system: String, history: &[Turn], prompt: &str) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(ChatMessage::system(system));
    messages.extend(history.iter().map(Turn::to_chat_message));
    messages.push(ChatMessage::user(prompt));
    messages
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentura_core::message::ChatRole;

    fn turns(n: usize) -> Vec<Turn> {
        (0..n)
            .map(|i| {
                if i % 2 == 0 {
                    Turn::user(format!("t{i}"))
                } else {
                    Turn::assistant(format!("t{i}"), "m")
                }
            })
            .collect()
    }

    #[test]
    fn window_keeps_most_recent() {
        let history = turns(10);
        let window = history_window(&history, 6);
        assert_eq!(window.len(), 6);
        assert_eq!(window[0].message, "t4");
        assert_eq!(history_window(&history[..3], 6).len(), 3);
    }

    #[test]
    fn messages_are_system_history_prompt() {
        let history = turns(2);
        let messages = build_messages("sys".into(), &history, "now");
        let roles: Vec<ChatRole> = messages.iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![ChatRole::System, ChatRole::User, ChatRole::Assistant, ChatRole::User]
        );
        assert_eq!(messages[3].content, "now");
    }

    #[test]
    fn selection_prompt_lists_tools() {
        let prompt = selection_system_prompt(&ToolRegistry::new());
        assert!(prompt.contains("AVAILABLE TOOLS"));
        assert!(prompt.contains(r#"{"use_tool": false, "tool_name": null, "parameters": null}"#));
    }

    #[test]
    fn composing_prompt_variants() {
        assert_eq!(composing_system_prompt(None), ASSISTANT_PERSONA);

        let ok = ToolContext::Output {
            tool_name: "shell".into(),
            output: "a.txt".into(),
        };
        let text = composing_system_prompt(Some(&ok));
        assert!(text.contains("TOOL RESULT (shell)"));
        assert!(text.contains("a.txt"));

        let failed = ToolContext::Failure {
            tool_name: "shell".into(),
            reason: "timed out".into(),
        };
        let text = composing_system_prompt(Some(&failed));
        assert!(text.contains("TOOL FAILURE (shell): timed out"));
    }
}

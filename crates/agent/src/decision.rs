//! Parsing of the tool-selection reply.

use serde::Deserialize;
use serde_json::Value;

/// What the model decided at the selection stage.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolDecision {
    Use { tool_name: String, parameters: Value },
    NoTool,
}

#[derive(Deserialize)]
struct RawDecision {
    #[serde(default)]
    use_tool: bool,
    #[serde(default)]
    tool_name: Option<String>,
    #[serde(default)]
    parameters: Value,
}

impl ToolDecision {
    /// Decode a selection reply.
    ///
    /// Models often wrap the JSON in prose or code fences, so the text from
    /// the first `{` to the last `}` is decoded. Anything malformed is
    /// `NoTool`.
    pub fn parse(raw: &str) -> Self {
        let (Some(start), Some(end)) = (raw.find('{'), raw.rfind('}')) else {
            return Self::NoTool;
        };
        if end < start {
            return Self::NoTool;
        }

        let Ok(decision) = serde_json::from_str::<RawDecision>(&raw[start..=end]) else {
            return Self::NoTool;
        };

        match decision.tool_name {
            Some(name) if decision.use_tool && !name.trim().is_empty() => Self::Use {
                tool_name: name.trim().to_string(),
                parameters: decision.parameters,
            },
            _ => Self::NoTool,
        }
    }

    pub fn is_tool(&self) -> bool {
        matches!(self, Self::Use { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn plain_json() {
        let d = ToolDecision::parse(
            r#"{"use_tool": true, "tool_name": "shell", "parameters": {"command": "ls"}}"#,
        );
        assert_eq!(
            d,
            ToolDecision::Use {
                tool_name: "shell".into(),
                parameters: json!({"command": "ls"})
            }
        );
    }

    #[test]
    fn json_inside_prose_and_fences() {
        let raw = "Sure! Here is my decision:\n```json\n{\"use_tool\": true, \"tool_name\": \"file_system\", \"parameters\": {\"action\": \"read\", \"path\": \"main.rs\"}}\n```\nHope that helps.";
        assert!(matches!(
            ToolDecision::parse(raw),
            ToolDecision::Use { ref tool_name, .. } if tool_name == "file_system"
        ));
    }

    #[test]
    fn explicit_no_tool() {
        let d = ToolDecision::parse(r#"{"use_tool": false, "tool_name": null, "parameters": null}"#);
        assert_eq!(d, ToolDecision::NoTool);
    }

    #[test]
    fn use_tool_without_name_is_no_tool() {
        assert_eq!(ToolDecision::parse(r#"{"use_tool": true}"#), ToolDecision::NoTool);
        assert_eq!(
            ToolDecision::parse(r#"{"use_tool": true, "tool_name": "  "}"#),
            ToolDecision::NoTool
        );
    }

    #[test]
    fn missing_parameters_become_null() {
        let d = ToolDecision::parse(r#"{"use_tool": true, "tool_name": "web_search"}"#);
        assert_eq!(
            d,
            ToolDecision::Use {
                tool_name: "web_search".into(),
                parameters: Value::Null
            }
        );
    }

    #[test]
    fn garbage_degrades_to_no_tool() {
        for raw in [
            "",
            "I don't think a tool is needed.",
            "} backwards {",
            "{not json at all}",
            r#"{"use_tool": "yes", "tool_name": "shell"}"#,
            "[1, 2, 3]",
        ] {
            assert_eq!(ToolDecision::parse(raw), ToolDecision::NoTool, "input: {raw}");
        }
    }
}

//! Task descriptors and the `<kind>:<payload>` task grammar
//!
//! ```text
//! shell:<verbatim-shell-command>
//! gui:<action>:<json-object-or-omitted>
//! web:<action>:<json-object-or-omitted>
//! ```
//!
//! Parsing never panics: unknown kinds, missing actions, and bad JSON all
//! come back as `GearError` values so the caller can record them.

use std::fmt;
use std::str::FromStr;

use serde_json::{Map, Value};

use crate::error::{GearError, Result};

/// Parameter mapping carried by GUI and Web tasks
pub type Params = Map<String, Value>;

/// The closed set of task kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    Shell,
    Gui,
    Web,
}

impl TaskKind {
    /// Grammar prefix for this kind
    pub fn prefix(&self) -> &'static str {
        match self {
            TaskKind::Shell => "shell",
            TaskKind::Gui => "gui",
            TaskKind::Web => "web",
        }
    }

    fn from_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            "shell" => Some(TaskKind::Shell),
            "gui" => Some(TaskKind::Gui),
            "web" => Some(TaskKind::Web),
            _ => None,
        }
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// One atomic instruction for the agent
#[derive(Debug, Clone, PartialEq)]
pub enum Task {
    /// Run a command through the shell backend
    Shell { command: String },
    /// Named desktop GUI action
    Gui { action: String, params: Params },
    /// Named browser action
    Web { action: String, params: Params },
}

impl Task {
    /// Parse a single task line.
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.trim();
        let (prefix, rest) = text.split_once(':').unwrap_or((text, ""));
        let kind = TaskKind::from_prefix(prefix.trim())
            .ok_or_else(|| GearError::UnknownTaskKind(prefix.trim().to_string()))?;

        match kind {
            TaskKind::Shell => {
                let command = rest.trim();
                if command.is_empty() {
                    return Err(GearError::MalformedTask("empty shell command".to_string()));
                }
                Ok(Task::Shell {
                    command: command.to_string(),
                })
            }
            TaskKind::Gui => {
                let (action, params) = parse_action(kind, rest)?;
                Ok(Task::Gui { action, params })
            }
            TaskKind::Web => {
                let (action, params) = parse_action(kind, rest)?;
                Ok(Task::Web { action, params })
            }
        }
    }

    /// Convenience constructor for web tasks built from a `json!` object
    pub fn web(action: impl Into<String>, params: Value) -> Self {
        Task::Web {
            action: action.into(),
            params: into_params(params),
        }
    }

    /// Convenience constructor for GUI tasks built from a `json!` object
    pub fn gui(action: impl Into<String>, params: Value) -> Self {
        Task::Gui {
            action: action.into(),
            params: into_params(params),
        }
    }

    pub fn shell(command: impl Into<String>) -> Self {
        Task::Shell {
            command: command.into(),
        }
    }

    pub fn kind(&self) -> TaskKind {
        match self {
            Task::Shell { .. } => TaskKind::Shell,
            Task::Gui { .. } => TaskKind::Gui,
            Task::Web { .. } => TaskKind::Web,
        }
    }

    /// Action name for GUI/Web tasks, `None` for shell tasks
    pub fn action(&self) -> Option<&str> {
        match self {
            Task::Shell { .. } => None,
            Task::Gui { action, .. } | Task::Web { action, .. } => Some(action),
        }
    }

    /// The `command` column written to the knowledge log
    pub fn command_label(&self) -> String {
        match self {
            Task::Shell { command } => command.clone(),
            Task::Gui { action, .. } => format!("gui:{}", action),
            Task::Web { action, .. } => format!("web:{}", action),
        }
    }
}

impl FromStr for Task {
    type Err = GearError;

    fn from_str(s: &str) -> Result<Self> {
        Task::parse(s)
    }
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Task::Shell { command } => write!(f, "shell:{}", command),
            Task::Gui { action, params } | Task::Web { action, params } => {
                let json = serde_json::to_string(params).map_err(|_| fmt::Error)?;
                write!(f, "{}:{}:{}", self.kind(), action, json)
            }
        }
    }
}

/// Split `<action>:<json>` on the first `:` and decode the parameters.
fn parse_action(kind: TaskKind, rest: &str) -> Result<(String, Params)> {
    let (action, raw_params) = match rest.split_once(':') {
        Some((action, params)) => (action.trim(), params.trim()),
        None => (rest.trim(), ""),
    };

    if action.is_empty() {
        return Err(GearError::MalformedTask(format!("missing {} action name", kind)));
    }

    let raw_params = if raw_params.is_empty() { "{}" } else { raw_params };
    let value: Value = serde_json::from_str(raw_params).map_err(|e| GearError::ParameterParse {
        kind: kind.to_string(),
        message: e.to_string(),
    })?;

    match value {
        Value::Object(params) => Ok((action.to_string(), params)),
        other => Err(GearError::ParameterParse {
            kind: kind.to_string(),
            message: format!("expected a JSON object, found {}", json_type_name(&other)),
        }),
    }
}

fn into_params(value: Value) -> Params {
    match value {
        Value::Object(map) => map,
        _ => Params::new(),
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_shell_trims_payload() {
        let task = Task::parse("shell:   echo hello   ").unwrap();
        assert_eq!(task, Task::shell("echo hello"));
        assert_eq!(task.kind(), TaskKind::Shell);
    }

    #[test]
    fn test_parse_shell_keeps_colons() {
        let task = Task::parse("shell:echo a:b:c").unwrap();
        assert_eq!(task, Task::shell("echo a:b:c"));
    }

    #[test]
    fn test_parse_empty_shell_command() {
        let err = Task::parse("shell:   ").unwrap_err();
        assert!(matches!(err, GearError::MalformedTask(_)));
    }

    #[test]
    fn test_parse_web_with_params() {
        let task = Task::parse(r#"web:navigate:{"url": "https://www.google.com"}"#).unwrap();
        match task {
            Task::Web { action, params } => {
                assert_eq!(action, "navigate");
                assert_eq!(params["url"], "https://www.google.com");
            }
            other => panic!("Expected web task, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_tolerates_spaces_around_parts() {
        let task = Task::parse(r#"web: launch: {"headless": false}"#).unwrap();
        assert_eq!(task, Task::web("launch", json!({"headless": false})));
    }

    #[test]
    fn test_parse_gui_without_params_defaults_to_empty() {
        let task = Task::parse("gui:close").unwrap();
        assert_eq!(task, Task::gui("close", json!({})));
    }

    #[test]
    fn test_parse_gui_with_trailing_colon() {
        let task = Task::parse("gui:print_identifiers:").unwrap();
        assert_eq!(task.action(), Some("print_identifiers"));
    }

    #[test]
    fn test_parse_malformed_json() {
        let err = Task::parse("gui:click:{not json").unwrap_err();
        match err {
            GearError::ParameterParse { kind, .. } => assert_eq!(kind, "gui"),
            other => panic!("Expected ParameterParse, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_non_object_params() {
        let err = Task::parse("web:click:[1, 2]").unwrap_err();
        assert!(err.to_string().contains("expected a JSON object, found an array"));
    }

    #[test]
    fn test_parse_missing_action() {
        let err = Task::parse("web::{}").unwrap_err();
        assert!(matches!(err, GearError::MalformedTask(_)));
    }

    #[test]
    fn test_parse_unknown_kind() {
        let err = Task::parse("ftp:get file").unwrap_err();
        match err {
            GearError::UnknownTaskKind(kind) => assert_eq!(kind, "ftp"),
            other => panic!("Expected UnknownTaskKind, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_no_separator_is_unknown_kind() {
        let err = Task::parse("Search the web").unwrap_err();
        assert!(matches!(err, GearError::UnknownTaskKind(_)));
    }

    #[test]
    fn test_display_reparses_to_same_task() {
        let task = Task::web("type", json!({"selector": "textarea[name=q]", "text": "say \"hi\""}));
        let text = task.to_string();
        assert!(text.starts_with("web:type:"));
        assert_eq!(Task::parse(&text).unwrap(), task);
    }

    #[test]
    fn test_command_label() {
        assert_eq!(Task::shell("ls -la").command_label(), "ls -la");
        assert_eq!(Task::gui("click", json!({})).command_label(), "gui:click");
        assert_eq!(Task::web("close", json!({})).command_label(), "web:close");
    }

    #[test]
    fn test_from_str() {
        let task: Task = "shell:pwd".parse().unwrap();
        assert_eq!(task, Task::shell("pwd"));
    }
}

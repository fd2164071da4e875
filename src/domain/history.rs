//! History entries - one record per executed task
//!
//! Entries are append-only: created once after execution, never mutated,
//! and eventually folded into an episode by the summarizer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::generate_record_id;

/// Outcome status of an executed task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskStatus {
    Success,
    Failure,
}

impl TaskStatus {
    pub fn from_success(success: bool) -> Self {
        if success { TaskStatus::Success } else { TaskStatus::Failure }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, TaskStatus::Success)
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskStatus::Success => f.write_str("Success"),
            TaskStatus::Failure => f.write_str("Failure"),
        }
    }
}

/// One knowledge-log record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Unique identifier (timestamp + random suffix)
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub goal: String,
    /// Task text as it was chosen (before parsing)
    pub task: String,
    /// Concrete command: the shell command, or `gui:<action>` / `web:<action>`
    pub command: String,
    pub status: TaskStatus,
    #[serde(default)]
    pub stdout: String,
    #[serde(default)]
    pub stderr: String,
    #[serde(default)]
    pub learning: String,
}

impl HistoryEntry {
    /// Create a new entry with a fresh id and the current time
    pub fn new(
        goal: impl Into<String>,
        task: impl Into<String>,
        command: impl Into<String>,
        status: TaskStatus,
    ) -> Self {
        Self {
            id: generate_record_id(),
            timestamp: Utc::now(),
            goal: goal.into(),
            task: task.into(),
            command: command.into(),
            status,
            stdout: String::new(),
            stderr: String::new(),
            learning: String::new(),
        }
    }

    /// Attach captured output streams
    pub fn with_output(mut self, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        self.stdout = stdout.into();
        self.stderr = stderr.into();
        self
    }

    /// Attach the learning sentence
    pub fn with_learning(mut self, learning: impl Into<String>) -> Self {
        self.learning = learning.into();
        self
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_from_success() {
        assert_eq!(TaskStatus::from_success(true), TaskStatus::Success);
        assert_eq!(TaskStatus::from_success(false), TaskStatus::Failure);
    }

    #[test]
    fn test_status_serializes_capitalized() {
        assert_eq!(serde_json::to_string(&TaskStatus::Success).unwrap(), "\"Success\"");
        assert_eq!(serde_json::to_string(&TaskStatus::Failure).unwrap(), "\"Failure\"");
    }

    #[test]
    fn test_entry_builder() {
        let entry = HistoryEntry::new("goal", "shell:ls", "ls", TaskStatus::Success)
            .with_output("a\nb", "")
            .with_learning("Executed a direct shell command.");

        assert_eq!(entry.goal, "goal");
        assert_eq!(entry.command, "ls");
        assert_eq!(entry.stdout, "a\nb");
        assert!(entry.stderr.is_empty());
        assert!(entry.is_success());
        assert!(!entry.id.is_empty());
    }

    #[test]
    fn test_entry_missing_optional_fields_deserialize() {
        let json = r#"{"id":"1","timestamp":"2025-01-01T00:00:00Z","goal":"g","task":"shell:ls","command":"ls","status":"Failure"}"#;
        let entry: HistoryEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.status, TaskStatus::Failure);
        assert!(entry.stdout.is_empty());
        assert!(entry.learning.is_empty());
    }
}

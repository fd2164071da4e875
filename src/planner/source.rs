//! Task sources - where the agent loop gets its next task text
//!
//! - GoalPlan: the search planner over a free-text goal
//! - Checklist: the first unchecked `- [ ] <task>` line of a Markdown file

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use log::{debug, info};
use regex::Regex;

use super::search::Planner;
use crate::domain::{Goal, HistoryEntry};
use crate::error::{GearError, Result};

static UNCHECKED_RE: OnceLock<Regex> = OnceLock::new();

/// Supplies the next task for the agent loop
pub trait TaskSource: Send {
    /// Goal text recorded with every history entry
    fn goal(&self) -> &str;

    /// Next task text, or `None` when there is nothing left to do
    fn next_task(&mut self, history: &[HistoryEntry]) -> Result<Option<String>>;

    /// Called after `task` has been recorded as a success
    fn task_succeeded(&mut self, _task: &str) -> Result<()> {
        Ok(())
    }
}

/// Planner-driven source for a single goal
#[derive(Debug, Clone)]
pub struct GoalPlan {
    goal: Goal,
    planner: Planner,
}

impl GoalPlan {
    pub fn new(goal: Goal, planner: Planner) -> Self {
        Self { goal, planner }
    }
}

impl TaskSource for GoalPlan {
    fn goal(&self) -> &str {
        self.goal.as_str()
    }

    fn next_task(&mut self, history: &[HistoryEntry]) -> Result<Option<String>> {
        Ok(self
            .planner
            .decide(self.goal.as_str(), history)
            .map(|task| task.to_string()))
    }
}

/// Markdown checklist source: executes unchecked items top to bottom
#[derive(Debug, Clone)]
pub struct Checklist {
    path: PathBuf,
    goal: String,
}

impl Checklist {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let goal = format!("Complete checklist {}", path.display());
        Self { path, goal }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<String> {
        fs::read_to_string(&self.path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => GearError::Store(format!(
                "checklist {} not found. Please create it.",
                self.path.display()
            )),
            _ => GearError::Io(e),
        })
    }
}

fn unchecked_re() -> &'static Regex {
    UNCHECKED_RE.get_or_init(|| Regex::new(r"(?m)^\s*- \[ \] (.*)$").expect("checklist pattern is valid"))
}

/// First unchecked item in checklist content
pub fn find_next_item(content: &str) -> Option<String> {
    unchecked_re()
        .captures_iter(content)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .find(|item| !item.is_empty())
}

/// Tick the first unchecked line whose item is `item`.
///
/// Lines are matched the same way `find_next_item` reads them, so extra
/// spacing around the item still ticks the line it came from.
pub fn check_item(content: &str, item: &str) -> Option<String> {
    let line = unchecked_re()
        .captures_iter(content)
        .find(|caps| caps.get(1).is_some_and(|m| m.as_str().trim() == item))?
        .get(0)?;
    let box_start = line.start() + line.as_str().find("- [ ]")? + 2;

    let mut updated = String::with_capacity(content.len());
    updated.push_str(&content[..box_start]);
    updated.push_str("[x]");
    updated.push_str(&content[box_start + 3..]);
    Some(updated)
}

impl TaskSource for Checklist {
    fn goal(&self) -> &str {
        &self.goal
    }

    fn next_task(&mut self, _history: &[HistoryEntry]) -> Result<Option<String>> {
        let content = self.read()?;
        let next = find_next_item(&content);
        if next.is_none() {
            info!("All checklist items in {} are complete", self.path.display());
        }
        Ok(next)
    }

    fn task_succeeded(&mut self, task: &str) -> Result<()> {
        let content = self.read()?;
        let updated = check_item(&content, task).ok_or_else(|| {
            GearError::Store(format!(
                "no unchecked item '{}' left to tick in {}",
                task,
                self.path.display()
            ))
        })?;
        fs::write(&self.path, updated)?;
        debug!("Checked off '{}' in {}", task, self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TaskStatus;
    use crate::planner::search::PlannerConfig;
    use tempfile::TempDir;

    const TODO: &str = "# ToDo\n\n- [x] shell:echo done\n  - [ ] shell:echo next  \n- [ ] web:close\n";

    #[test]
    fn test_find_next_item() {
        assert_eq!(find_next_item(TODO), Some("shell:echo next".to_string()));
    }

    #[test]
    fn test_find_next_item_none() {
        assert_eq!(find_next_item("- [x] shell:ls\nplain text\n"), None);
        assert_eq!(find_next_item(""), None);
    }

    #[test]
    fn test_check_item_only_first_occurrence() {
        let content = "- [ ] shell:ls\n- [ ] shell:ls\n";
        let updated = check_item(content, "shell:ls").unwrap();
        assert_eq!(updated, "- [x] shell:ls\n- [ ] shell:ls\n");
    }

    #[test]
    fn test_check_item_extra_spacing() {
        let content = "# ToDo\n  - [ ]  shell:echo once  \n- [ ] web:close\n";
        let item = find_next_item(content).unwrap();
        let updated = check_item(content, &item).unwrap();
        assert_eq!(updated, "# ToDo\n  - [x]  shell:echo once  \n- [ ] web:close\n");
        assert_eq!(find_next_item(&updated).as_deref(), Some("web:close"));
    }

    #[test]
    fn test_check_item_missing() {
        assert!(check_item("- [x] shell:ls\n", "shell:ls").is_none());
    }

    #[test]
    fn test_checklist_walks_items() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("ToDo.md");
        fs::write(&path, "- [ ] shell:echo one\n- [ ] shell:echo two\n").unwrap();

        let mut checklist = Checklist::new(&path);
        assert_eq!(checklist.next_task(&[]).unwrap().as_deref(), Some("shell:echo one"));
        checklist.task_succeeded("shell:echo one").unwrap();
        assert_eq!(checklist.next_task(&[]).unwrap().as_deref(), Some("shell:echo two"));
        checklist.task_succeeded("shell:echo two").unwrap();
        assert_eq!(checklist.next_task(&[]).unwrap(), None);

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "- [x] shell:echo one\n- [x] shell:echo two\n");
    }

    #[test]
    fn test_checklist_untickable_item_is_an_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("ToDo.md");
        fs::write(&path, "- [x] shell:echo one\n").unwrap();

        let mut checklist = Checklist::new(&path);
        let err = checklist.task_succeeded("shell:echo one").unwrap_err();
        assert!(matches!(err, GearError::Store(_)));
    }

    #[test]
    fn test_checklist_missing_file() {
        let temp = TempDir::new().unwrap();
        let mut checklist = Checklist::new(temp.path().join("ToDo.md"));
        let err = checklist.next_task(&[]).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_goal_plan_emits_task_text() {
        let goal = Goal::new("search google for rust ownership").unwrap();
        let mut source = GoalPlan::new(goal, Planner::new(PlannerConfig::default()));
        assert_eq!(source.goal(), "search google for rust ownership");

        let first = source.next_task(&[]).unwrap().unwrap();
        assert_eq!(first, r#"web:launch:{"headless":false}"#);

        let history = vec![HistoryEntry::new(source.goal(), &first, "web:launch", TaskStatus::Success)];
        let second = source.next_task(&history).unwrap().unwrap();
        assert!(second.starts_with("web:navigate:"));
    }
}

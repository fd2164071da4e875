//! Search-goal planner - a closed, five-state rule table
//!
//! ```text
//! Init --launch--> Launched --navigate--> Navigated --type--> Typed --click--> Done
//! ```
//!
//! The state is never stored. It is inferred on every decision from the most
//! recent successful task in history, so a restarted agent resumes where the
//! log says it left off. Only goals that mention both "search" and "google"
//! have a plan; every other goal completes immediately with a warning.
//! Failures are the agent loop's concern, not the planner's: there are no
//! error or retry states here.

use std::sync::OnceLock;

use log::{debug, info, warn};
use regex::Regex;
use serde_json::json;

use crate::domain::{HistoryEntry, Task};

/// Query used when the goal names no search terms
pub const DEFAULT_QUERY: &str = "large language models";

static QUERY_RE: OnceLock<Regex> = OnceLock::new();

/// Targets used by the search plan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannerConfig {
    pub search_url: String,
    pub query_selector: String,
    pub submit_selector: String,
    /// Passed through to the `web:launch` task
    pub headless: bool,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            search_url: "https://www.google.com".to_string(),
            query_selector: "textarea[name=q]".to_string(),
            submit_selector: "input[name=btnK]".to_string(),
            headless: false,
        }
    }
}

/// Position in the search plan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchState {
    Init,
    Launched,
    Navigated,
    Typed,
    Done,
}

impl SearchState {
    /// Infer the state from the last successful task.
    ///
    /// `None` means that task is not a step of the search plan.
    pub fn infer(last_task: Option<&str>) -> Option<Self> {
        let Some(text) = last_task else {
            return Some(SearchState::Init);
        };
        match Task::parse(text) {
            Ok(Task::Web { action, .. }) => match action.as_str() {
                "launch" => Some(SearchState::Launched),
                "navigate" => Some(SearchState::Navigated),
                "type" => Some(SearchState::Typed),
                "click" => Some(SearchState::Done),
                _ => None,
            },
            _ => None,
        }
    }
}

/// Task text of the most recent successful entry, scanning newest to oldest
pub fn last_successful_task(history: &[HistoryEntry]) -> Option<&str> {
    history
        .iter()
        .rev()
        .find(|entry| entry.is_success())
        .map(|entry| entry.task.as_str())
}

/// Whether the goal is one the rule table knows how to plan
pub fn is_search_goal(goal: &str) -> bool {
    let goal = goal.to_lowercase();
    goal.contains("search") && goal.contains("google")
}

/// Pull the query out of "search [google] for <query>"
pub fn extract_query(goal: &str) -> String {
    let re = QUERY_RE.get_or_init(|| {
        Regex::new(r"(?i)\bsearch\b(?:\s+\w+)?\s+for\s+(.+)").expect("query pattern is valid")
    });
    re.captures(goal)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|q| !q.is_empty())
        .unwrap_or_else(|| DEFAULT_QUERY.to_string())
}

/// Decides the single next task for a goal
#[derive(Debug, Clone, Default)]
pub struct Planner {
    config: PlannerConfig,
}

impl Planner {
    pub fn new(config: PlannerConfig) -> Self {
        Self { config }
    }

    /// Next task for `goal` given the full history, or `None` when done
    pub fn decide(&self, goal: &str, history: &[HistoryEntry]) -> Option<Task> {
        self.next_task(goal, last_successful_task(history))
    }

    /// Pure rule table over (goal, last successful task)
    pub fn next_task(&self, goal: &str, last_task: Option<&str>) -> Option<Task> {
        info!("Determining next step for goal: '{}'", goal);
        debug!("Last successful task was: {:?}", last_task);

        let state = if is_search_goal(goal) {
            SearchState::infer(last_task)
        } else {
            None
        };

        match state {
            Some(SearchState::Init) => Some(Task::web("launch", json!({"headless": self.config.headless}))),
            Some(SearchState::Launched) => Some(Task::web("navigate", json!({"url": self.config.search_url}))),
            Some(SearchState::Navigated) => Some(Task::web(
                "type",
                json!({"selector": self.config.query_selector, "text": extract_query(goal)}),
            )),
            Some(SearchState::Typed) => Some(Task::web("click", json!({"selector": self.config.submit_selector}))),
            Some(SearchState::Done) => {
                info!("Planner concludes the goal is complete.");
                None
            }
            None => {
                warn!(
                    "Planner has no next step for goal '{}' with last task {:?}",
                    goal, last_task
                );
                None
            }
        }
    }
}

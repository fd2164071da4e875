//! Episodic summarizer - folds the raw knowledge log into one episode
//!
//! This is the only path that shrinks working memory: after a successful
//! summary the raw log is emptied.

use log::{info, warn};

use crate::domain::{EpisodicSummary, HistoryEntry, TaskStatus};
use crate::error::Result;
use crate::storage::{EpisodicStore, KnowledgeStore};

const UNKNOWN_GOAL: &str = "Unknown Goal";
const NO_ERROR_FOUND: &str = "No specific error message found.";
const SUCCESS_NARRATIVE: &str = "The agent successfully completed the goal by executing a series of tasks.";

/// Fold a full history into one episode. `None` for an empty history.
pub fn build_summary(history: &[HistoryEntry]) -> Option<EpisodicSummary> {
    let last = history.last()?;

    let goal = history
        .iter()
        .map(|e| e.goal.trim())
        .find(|g| !g.is_empty())
        .unwrap_or(UNKNOWN_GOAL);

    let narrative = match last.status {
        TaskStatus::Success => SUCCESS_NARRATIVE.to_string(),
        TaskStatus::Failure => {
            let error = last.stderr.trim();
            let error = if error.is_empty() { NO_ERROR_FOUND } else { error };
            format!("The agent failed to complete the goal. The final error was: {}", error)
        }
    };

    Some(EpisodicSummary::new(goal, last.status, history.len(), narrative))
}

/// Consolidates working memory into the episodic store
#[derive(Debug, Clone)]
pub struct Summarizer {
    knowledge: KnowledgeStore,
    episodes: EpisodicStore,
}

impl Summarizer {
    pub fn new(knowledge: KnowledgeStore, episodes: EpisodicStore) -> Self {
        Self { knowledge, episodes }
    }

    /// Summarize and clear the raw log.
    ///
    /// An empty log is a no-op returning `Ok(None)`. The raw log is only
    /// cleared once the episode has been written.
    pub fn summarize(&self) -> Result<Option<EpisodicSummary>> {
        let history = self.knowledge.read_history()?;
        let Some(summary) = build_summary(&history) else {
            if self.knowledge.has_content()? {
                warn!(
                    "Knowledge log {} holds no readable records; clearing it",
                    self.knowledge.path().display()
                );
                self.knowledge.clear()?;
            } else {
                info!("Knowledge log is empty. No summary generated.");
            }
            return Ok(None);
        };

        self.episodes.append(&summary)?;
        self.knowledge.clear()?;

        info!(
            "Episodic memory updated ({} steps, {}) and working memory cleared",
            summary.step_count, summary.outcome
        );
        Ok(Some(summary))
    }
}

//! Episodic summary - one compacted record per agent run

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::history::TaskStatus;
use crate::id::generate_episode_id;

/// Compacted narrative of a full knowledge log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodicSummary {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub goal: String,
    /// Status of the last entry in the folded log
    pub outcome: TaskStatus,
    pub step_count: usize,
    pub narrative: String,
}

impl EpisodicSummary {
    pub fn new(
        goal: impl Into<String>,
        outcome: TaskStatus,
        step_count: usize,
        narrative: impl Into<String>,
    ) -> Self {
        Self {
            id: generate_episode_id(),
            timestamp: Utc::now(),
            goal: goal.into(),
            outcome,
            step_count,
            narrative: narrative.into(),
        }
    }
}

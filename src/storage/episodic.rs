//! Episodic store - long-lived summaries of past runs

use std::path::{Path, PathBuf};

use super::jsonl::JsonlLog;
use crate::domain::EpisodicSummary;
use crate::error::Result;

#[derive(Debug, Clone)]
pub struct EpisodicStore {
    log: JsonlLog<EpisodicSummary>,
}

impl EpisodicStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            log: JsonlLog::new(path),
        }
    }

    pub fn path(&self) -> &Path {
        self.log.path()
    }

    pub fn append(&self, summary: &EpisodicSummary) -> Result<()> {
        self.log.append(summary)
    }

    pub fn episodes(&self) -> Result<Vec<EpisodicSummary>> {
        self.log.read_all()
    }
}

//! Knowledge store - the append-only working-memory log of executed tasks

use std::path::{Path, PathBuf};

use log::{debug, error};

use super::jsonl::JsonlLog;
use crate::domain::HistoryEntry;
use crate::error::{GearError, Result};

/// Working memory: one `HistoryEntry` per executed task, in execution order
#[derive(Debug, Clone)]
pub struct KnowledgeStore {
    log: JsonlLog<HistoryEntry>,
}

impl KnowledgeStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            log: JsonlLog::new(path),
        }
    }

    pub fn path(&self) -> &Path {
        self.log.path()
    }

    /// Append one record.
    ///
    /// Failures are logged and returned; callers decide whether to carry on.
    pub fn record(&self, entry: &HistoryEntry) -> Result<()> {
        self.log.append(entry).map_err(|e| {
            error!("Error writing to knowledge base {}: {}", self.path().display(), e);
            GearError::Store(format!("failed to record {}: {}", entry.id, e))
        })?;
        debug!("Recorded {} ({}) for task: {}", entry.id, entry.status, entry.task);
        Ok(())
    }

    /// Parse the whole log. An absent log is an empty history.
    pub fn read_history(&self) -> Result<Vec<HistoryEntry>> {
        self.log.read_all().map_err(|e| {
            error!("Error reading knowledge base {}: {}", self.path().display(), e);
            GearError::Store(format!("failed to read history: {}", e))
        })
    }

    /// True when the log file holds any bytes, even if none of them parse
    pub fn has_content(&self) -> Result<bool> {
        self.log.has_content()
    }

    /// Empty the log after consolidation
    pub fn clear(&self) -> Result<()> {
        self.log.truncate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TaskStatus;
    use tempfile::TempDir;

    fn create_test_store() -> (KnowledgeStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = KnowledgeStore::new(temp_dir.path().join("assets").join("knowledge.jsonl"));
        (store, temp_dir)
    }

    #[test]
    fn test_absent_store_is_empty_history() {
        let (store, _temp) = create_test_store();
        assert!(store.read_history().unwrap().is_empty());
    }

    #[test]
    fn test_record_round_trip() {
        let (store, _temp) = create_test_store();
        let first = HistoryEntry::new("goal", "shell:ls", "ls", TaskStatus::Success)
            .with_output("a.txt", "")
            .with_learning("Executed a direct shell command.");
        let second = HistoryEntry::new("goal", "web:bogus:{}", "web:bogus", TaskStatus::Failure)
            .with_output("", "Unsupported Web action: bogus");

        store.record(&first).unwrap();
        store.record(&second).unwrap();

        let history = store.read_history().unwrap();
        assert_eq!(history, vec![first, second]);
    }

    #[test]
    fn test_ids_are_unique() {
        let (store, _temp) = create_test_store();
        for _ in 0..5 {
            store
                .record(&HistoryEntry::new("g", "shell:true", "true", TaskStatus::Success))
                .unwrap();
        }
        let history = store.read_history().unwrap();
        let mut ids: Vec<_> = history.iter().map(|e| e.id.clone()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 5);
    }

    #[test]
    fn test_record_failure_is_reported() {
        let temp_dir = TempDir::new().unwrap();
        // A directory where the log file should be
        let store = KnowledgeStore::new(temp_dir.path());
        let result = store.record(&HistoryEntry::new("g", "shell:true", "true", TaskStatus::Success));
        assert!(matches!(result, Err(GearError::Store(_))));
    }

    #[test]
    fn test_torn_record_does_not_hide_history() {
        use std::io::Write;

        let (store, _temp) = create_test_store();
        let first = HistoryEntry::new("goal", "shell:ls", "ls", TaskStatus::Success);
        let second = HistoryEntry::new("goal", "shell:pwd", "pwd", TaskStatus::Success);
        store.record(&first).unwrap();
        {
            let mut file = std::fs::OpenOptions::new().append(true).open(store.path()).unwrap();
            file.write_all(b"{\"id\":\"trunc\",\"goal\":\"caf\xc3\n").unwrap();
        }
        store.record(&second).unwrap();

        let history = store.read_history().unwrap();
        assert_eq!(history, vec![first, second]);
    }

    #[test]
    fn test_clear() {
        let (store, _temp) = create_test_store();
        store
            .record(&HistoryEntry::new("g", "shell:true", "true", TaskStatus::Success))
            .unwrap();
        store.clear().unwrap();
        assert!(store.read_history().unwrap().is_empty());
    }
}

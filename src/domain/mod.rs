//! Domain types for Gear
//!
//! This module contains the core data contracts:
//! - Task: parsed `<kind>:<payload>` instruction (Shell, Gui, Web)
//! - HistoryEntry: one knowledge-log record per executed task
//! - EpisodicSummary: a compacted record of a whole run
//! - Goal: the free-text objective read at loop start

pub mod episode;
pub mod goal;
pub mod history;
pub mod task;

pub use episode::EpisodicSummary;
pub use goal::Goal;
pub use history::{HistoryEntry, TaskStatus};
pub use task::{Params, Task, TaskKind};

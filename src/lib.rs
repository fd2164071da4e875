//! G.E.A.R. - a goal-driven desktop and browser automation agent
//!
//! The agent turns a free-text goal into a sequence of `shell:`, `gui:` and
//! `web:` tasks, executes them one at a time, and keeps a persistent log of
//! every outcome that later runs plan from and consolidate into episodes.

pub mod backend;
pub mod dispatch;
pub mod domain;
pub mod error;
pub mod id;
pub mod memory;
pub mod planner;
pub mod runner;
pub mod storage;

pub use error::{GearError, Result};

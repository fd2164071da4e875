//! Agent loop implementation - observe, decide, act, record, repeat.
//!
//! Each iteration:
//! 1. Reads the full history from the knowledge store (fresh observation)
//! 2. Asks the task source for the next task; `None` ends the run as Done
//! 3. Parses and executes the task through the executor
//! 4. Records the outcome
//! 5. On failure: stops (fail-fast, no retries)
//! 6. On success: pauses, then starts the next iteration
//!
//! A hard iteration ceiling stops runaway plans.

use std::time::Duration;

use log::{error, info, warn};

use crate::dispatch::{TaskExecutor, TaskOutcome};
use crate::domain::{HistoryEntry, Task};
use crate::planner::TaskSource;
use crate::storage::KnowledgeStore;

/// Why a run stopped before its source reported completion
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// A task was recorded as Failure
    TaskFailed { task: String, error: String },
    /// The iteration ceiling was reached
    LoopLimit(u32),
    /// The task source could not produce a task or note a success
    SourceFailed(String),
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StopReason::TaskFailed { task, error } => write!(f, "task '{}' failed: {}", task, error),
            StopReason::LoopLimit(limit) => write!(f, "loop limit of {} iterations reached", limit),
            StopReason::SourceFailed(message) => write!(f, "task source failed: {}", message),
        }
    }
}

/// Lifecycle of an agent run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentState {
    /// Not started
    Idle,
    /// Iterating
    Running,
    /// The task source reported completion
    Done,
    /// Halted early
    Stopped(StopReason),
}

impl AgentState {
    /// Returns true if the run has ended
    pub fn is_terminal(&self) -> bool {
        matches!(self, AgentState::Done | AgentState::Stopped(_))
    }
}

/// Configuration for the AgentLoop.
#[derive(Debug, Clone)]
pub struct AgentLoopConfig {
    /// Hard ceiling on executed tasks per run
    pub max_iterations: u32,
    /// Pause between iterations to let external UI state settle
    pub iteration_delay: Duration,
}

impl Default for AgentLoopConfig {
    fn default() -> Self {
        Self {
            max_iterations: 10,
            iteration_delay: Duration::from_secs(2),
        }
    }
}

/// What a finished run did
#[derive(Debug, Clone)]
pub struct RunReport {
    pub state: AgentState,
    /// Entries produced by this run, in execution order
    pub steps: Vec<HistoryEntry>,
}

/// Drives one task source against one executor, recording into one store
pub struct AgentLoop<S, E>
where
    S: TaskSource,
    E: TaskExecutor,
{
    source: S,
    executor: E,
    knowledge: KnowledgeStore,
    config: AgentLoopConfig,
    state: AgentState,
}

impl<S, E> AgentLoop<S, E>
where
    S: TaskSource,
    E: TaskExecutor,
{
    pub fn new(source: S, executor: E, knowledge: KnowledgeStore) -> Self {
        Self::with_config(source, executor, knowledge, AgentLoopConfig::default())
    }

    pub fn with_config(source: S, executor: E, knowledge: KnowledgeStore, config: AgentLoopConfig) -> Self {
        Self {
            source,
            executor,
            knowledge,
            config,
            state: AgentState::Idle,
        }
    }

    pub fn state(&self) -> &AgentState {
        &self.state
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Run until Done or Stopped.
    ///
    /// Backend resources are released on every exit path; a panic unwinding
    /// out of here still drops the executor and its backends.
    pub async fn run(&mut self) -> RunReport {
        self.state = AgentState::Running;
        info!("Agent run started for goal: '{}'", self.source.goal());

        let mut steps = Vec::new();
        let state = self.drive(&mut steps).await;

        self.executor.release().await;
        match &state {
            AgentState::Done => info!("Agent run complete after {} steps", steps.len()),
            AgentState::Stopped(reason) => warn!("Agent run stopped after {} steps: {}", steps.len(), reason),
            _ => {}
        }

        self.state = state.clone();
        RunReport { state, steps }
    }

    async fn drive(&mut self, steps: &mut Vec<HistoryEntry>) -> AgentState {
        let limit = self.config.max_iterations;

        for iteration in 0..limit {
            let history = match self.knowledge.read_history() {
                Ok(history) => history,
                Err(e) => {
                    warn!("Planning without history: {}", e);
                    Vec::new()
                }
            };

            let task_text = match self.source.next_task(&history) {
                Ok(Some(task)) => task,
                Ok(None) => return AgentState::Done,
                Err(e) => return AgentState::Stopped(StopReason::SourceFailed(e.to_string())),
            };

            info!("Iteration {}/{}: executing task: {}", iteration + 1, limit, task_text);
            let outcome = match Task::parse(&task_text) {
                Ok(task) => self.executor.execute(&task).await,
                Err(e) => TaskOutcome::rejected(&task_text, &e),
            };

            let entry = outcome.to_entry(self.source.goal(), &task_text);
            if let Err(e) = self.knowledge.record(&entry) {
                error!("Task outcome not persisted, later planning will not see it: {}", e);
            }
            info!("Task status: {}", entry.status);
            steps.push(entry);

            if !outcome.success {
                return AgentState::Stopped(StopReason::TaskFailed {
                    task: task_text,
                    error: outcome.stderr,
                });
            }

            // A source that cannot note progress would hand out the same task again
            if let Err(e) = self.source.task_succeeded(&task_text) {
                return AgentState::Stopped(StopReason::SourceFailed(e.to_string()));
            }

            if iteration + 1 < limit && !self.config.iteration_delay.is_zero() {
                tokio::time::sleep(self.config.iteration_delay).await;
            }
        }

        // The last allowed task may have been the final one
        let history = self.knowledge.read_history().unwrap_or_default();
        match self.source.next_task(&history) {
            Ok(None) => AgentState::Done,
            _ => AgentState::Stopped(StopReason::LoopLimit(limit)),
        }
    }
}

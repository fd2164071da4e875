//! Agent runner module - the observe/decide/act/record loop.
//!
//! - AgentLoop drives a TaskSource against a TaskExecutor
//! - AgentState / StopReason describe how a run ended
//! - RunReport carries the entries a run produced

mod agent_loop;

pub use agent_loop::{AgentLoop, AgentLoopConfig, AgentState, RunReport, StopReason};

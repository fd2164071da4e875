//! Action executor dispatch
//!
//! Turns a parsed `Task` into exactly one backend call and normalizes the
//! result into a `TaskOutcome` of (success, command, stdout, stderr).

pub mod actions;
mod dispatcher;

pub use actions::{GuiCommand, WebCommand};
pub use dispatcher::{Dispatcher, TaskExecutor, TaskOutcome};

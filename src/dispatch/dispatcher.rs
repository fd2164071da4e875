//! Task dispatcher - routes a parsed task to the shell, GUI, or Web backend
//!
//! Nothing escapes this layer: backend errors, `Ok(false)` answers, unknown
//! actions, bad parameters, and panics all come back as a `TaskOutcome`
//! with `success = false` and a non-empty `stderr`.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::FutureExt;
use log::{debug, warn};

use super::actions::{GuiCommand, WebCommand};
use crate::backend::{GuiBackend, ShellBackend, WebBackend};
use crate::domain::{HistoryEntry, Task, TaskStatus};
use crate::error::GearError;

/// Normalized result of executing one task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskOutcome {
    pub success: bool,
    /// Concrete command that ran: the shell command or `gui:<action>` / `web:<action>`
    pub command: String,
    pub stdout: String,
    pub stderr: String,
    pub learning: String,
}

impl TaskOutcome {
    pub fn succeeded(command: impl Into<String>, stdout: impl Into<String>) -> Self {
        Self {
            success: true,
            command: command.into(),
            stdout: stdout.into(),
            stderr: String::new(),
            learning: String::new(),
        }
    }

    pub fn failed(command: impl Into<String>, stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            success: false,
            command: command.into(),
            stdout: stdout.into(),
            stderr: stderr.into(),
            learning: String::new(),
        }
    }

    /// Outcome for task text that never reached a backend
    pub fn rejected(task_text: &str, error: &GearError) -> Self {
        Self::failed(task_text.trim(), "", error.to_string())
            .with_learning(format!("Failed to parse task: {}", error))
    }

    pub fn with_learning(mut self, learning: impl Into<String>) -> Self {
        self.learning = learning.into();
        self
    }

    /// A failure must never be recorded with a blank stderr.
    pub fn ensure_stderr(mut self) -> Self {
        if !self.success && self.stderr.trim().is_empty() {
            self.stderr = if self.stdout.trim().is_empty() {
                format!("{} failed without an error message", self.command)
            } else {
                self.stdout.trim().to_string()
            };
        }
        self
    }

    pub fn status(&self) -> TaskStatus {
        TaskStatus::from_success(self.success)
    }

    /// Build the knowledge-log entry for this outcome
    pub fn to_entry(&self, goal: &str, task_text: &str) -> HistoryEntry {
        HistoryEntry::new(goal, task_text.trim(), &self.command, self.status())
            .with_output(self.stdout.trim(), self.stderr.trim())
            .with_learning(&self.learning)
    }
}

/// Executes parsed tasks and owns the lifetime of backend resources
#[async_trait]
pub trait TaskExecutor: Send + Sync {
    async fn execute(&self, task: &Task) -> TaskOutcome;

    /// Release held backend resources; called once when a run ends
    async fn release(&self) {}
}

/// Routes tasks to the three collaborator backends
pub struct Dispatcher {
    gui: Arc<dyn GuiBackend>,
    web: Arc<dyn WebBackend>,
    shell: Arc<dyn ShellBackend>,
}

impl Dispatcher {
    pub fn new(gui: Arc<dyn GuiBackend>, web: Arc<dyn WebBackend>, shell: Arc<dyn ShellBackend>) -> Self {
        Self { gui, web, shell }
    }

    async fn run_shell(&self, command: &str) -> TaskOutcome {
        let learning = "Executed a direct shell command.";
        match guarded("shell", self.shell.run(command)).await {
            Ok(output) if output.success => TaskOutcome {
                success: true,
                command: command.to_string(),
                stdout: output.stdout,
                stderr: output.stderr,
                learning: learning.to_string(),
            },
            Ok(output) => TaskOutcome::failed(command, output.stdout, output.stderr).with_learning(learning),
            Err(message) => TaskOutcome::failed(command, "", message).with_learning(learning),
        }
    }

    async fn run_gui(&self, cmd: GuiCommand) -> TaskOutcome {
        let label = format!("gui:{}", cmd.name());
        let gui = &self.gui;
        let result = match &cmd {
            GuiCommand::Start(locator) => guarded(&label, gui.start_application(locator)).await,
            GuiCommand::Close => guarded(&label, gui.close_current()).await,
            GuiCommand::CloseByName { app_name } => guarded(&label, gui.close_by_name(app_name)).await,
            GuiCommand::Click { control_identifiers } => guarded(&label, gui.click(control_identifiers)).await,
            GuiCommand::Type {
                control_identifiers,
                text,
            } => guarded(&label, gui.type_text(control_identifiers, text)).await,
            GuiCommand::Keys { keys } => guarded(&label, gui.send_keys(keys)).await,
            GuiCommand::PrintIdentifiers => {
                guarded(&label, async { gui.print_identifiers().await.map(|_| true) }).await
            }
        };
        settle(label, result, cmd.messages(), cmd.learning())
    }

    async fn run_web(&self, cmd: WebCommand) -> TaskOutcome {
        let label = format!("web:{}", cmd.name());
        let web = &self.web;
        let result = match &cmd {
            WebCommand::Launch { browser_type, headless } => guarded(&label, web.launch(browser_type, *headless)).await,
            WebCommand::Navigate { url } => guarded(&label, web.navigate(url)).await,
            WebCommand::Type { selector, text } => guarded(&label, web.type_text(selector, text)).await,
            WebCommand::Click { selector } => guarded(&label, web.click(selector)).await,
            WebCommand::Wait {
                selector,
                state,
                timeout_ms,
            } => guarded(&label, web.wait_for(selector, *state, Duration::from_millis(*timeout_ms))).await,
            WebCommand::Close => guarded(&label, web.close()).await,
        };
        settle(label, result, cmd.messages(), cmd.learning())
    }
}

#[async_trait]
impl TaskExecutor for Dispatcher {
    async fn execute(&self, task: &Task) -> TaskOutcome {
        debug!("Dispatching task: {}", task);
        let outcome = match task {
            Task::Shell { command } => self.run_shell(command).await,
            Task::Gui { action, params } => match GuiCommand::from_task(action, params) {
                Ok(cmd) => self.run_gui(cmd).await,
                Err(e) => not_dispatched(task, e),
            },
            Task::Web { action, params } => match WebCommand::from_task(action, params) {
                Ok(cmd) => self.run_web(cmd).await,
                Err(e) => not_dispatched(task, e),
            },
        };
        outcome.ensure_stderr()
    }

    async fn release(&self) {
        if let Err(message) = guarded("web release", self.web.release()).await {
            warn!("{}", message);
        }
        if let Err(message) = guarded("gui release", self.gui.release()).await {
            warn!("{}", message);
        }
    }
}

fn not_dispatched(task: &Task, error: GearError) -> TaskOutcome {
    let learning = match &error {
        GearError::UnsupportedAction { surface, action } => {
            format!("Action '{}' is not in the {} action table.", action, surface)
        }
        other => format!("Task was not dispatched: {}", other),
    };
    TaskOutcome::failed(task.command_label(), "", error.to_string()).with_learning(learning)
}

fn settle(
    label: String,
    result: Result<bool, String>,
    (ok_message, fail_message): (&str, &str),
    learning: String,
) -> TaskOutcome {
    match result {
        Ok(true) => TaskOutcome::succeeded(label, ok_message).with_learning(learning),
        Ok(false) => TaskOutcome::failed(label, fail_message, "").with_learning(learning),
        Err(message) => TaskOutcome::failed(label, fail_message, message).with_learning(learning),
    }
}

/// Await a backend call, converting both errors and panics into a message.
async fn guarded<T, F>(what: &str, call: F) -> Result<T, String>
where
    F: Future<Output = eyre::Result<T>>,
{
    match AssertUnwindSafe(call).catch_unwind().await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(format!("{} failed: {:#}", what, e)),
        Err(panic) => Err(format!("{} panicked: {}", what, panic_message(panic.as_ref()))),
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

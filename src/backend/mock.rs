//! Scriptable in-memory backends for tests and dry runs
//!
//! Each mock records the calls it receives and answers according to a
//! per-method `Behaviour` (succeed by default).

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use eyre::eyre;

use super::{AppLocator, GuiBackend, ShellBackend, ShellOutput, WaitState, WebBackend};
use crate::domain::Params;

/// How a mocked method answers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behaviour {
    /// `Ok(true)`
    Succeed,
    /// `Ok(false)`
    Fail,
    /// `Err(..)`
    Error,
    /// Panics inside the call
    Panic,
}

#[derive(Debug, Default)]
struct Script {
    behaviours: HashMap<&'static str, Behaviour>,
    calls: Mutex<Vec<String>>,
    released: AtomicBool,
}

impl Script {
    fn set(&mut self, method: &'static str, behaviour: Behaviour) {
        self.behaviours.insert(method, behaviour);
    }

    fn invoke(&self, method: &'static str, call: String) -> eyre::Result<bool> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
        match self.behaviours.get(method).copied().unwrap_or(Behaviour::Succeed) {
            Behaviour::Succeed => Ok(true),
            Behaviour::Fail => Ok(false),
            Behaviour::Error => Err(eyre!("mock {} error", method)),
            Behaviour::Panic => panic!("mock {} panicked", method),
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn release(&self) {
        self.released.store(true, Ordering::SeqCst);
    }

    fn released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }
}

/// Mock desktop GUI backend
#[derive(Debug, Default)]
pub struct MockGui {
    script: Script,
}

impl MockGui {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script how `method` answers (`start`, `close`, `close_by_name`, `click`, `type`, `keys`, `print_identifiers`)
    pub fn with(mut self, method: &'static str, behaviour: Behaviour) -> Self {
        self.script.set(method, behaviour);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.script.calls()
    }

    pub fn released(&self) -> bool {
        self.script.released()
    }
}

#[async_trait]
impl GuiBackend for MockGui {
    async fn start_application(&self, locator: &AppLocator) -> eyre::Result<bool> {
        let target = locator.path.as_deref().or(locator.aumid.as_deref()).unwrap_or("");
        self.script.invoke("start", format!("start {}", target))
    }

    async fn close_current(&self) -> eyre::Result<bool> {
        self.script.invoke("close", "close".to_string())
    }

    async fn close_by_name(&self, name: &str) -> eyre::Result<bool> {
        self.script.invoke("close_by_name", format!("close_by_name {}", name))
    }

    async fn click(&self, identifiers: &Params) -> eyre::Result<bool> {
        self.script.invoke("click", format!("click {}", serde_json::Value::Object(identifiers.clone())))
    }

    async fn type_text(&self, identifiers: &Params, text: &str) -> eyre::Result<bool> {
        let target = serde_json::Value::Object(identifiers.clone());
        self.script.invoke("type", format!("type {} {}", target, text))
    }

    async fn send_keys(&self, keys: &str) -> eyre::Result<bool> {
        self.script.invoke("keys", format!("keys {}", keys))
    }

    async fn print_identifiers(&self) -> eyre::Result<()> {
        self.script.invoke("print_identifiers", "print_identifiers".to_string()).map(|_| ())
    }

    async fn release(&self) -> eyre::Result<()> {
        self.script.release();
        Ok(())
    }
}

/// Mock browser backend
#[derive(Debug, Default)]
pub struct MockWeb {
    script: Script,
}

impl MockWeb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script how `method` answers (`launch`, `navigate`, `type`, `click`, `wait`, `close`)
    pub fn with(mut self, method: &'static str, behaviour: Behaviour) -> Self {
        self.script.set(method, behaviour);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.script.calls()
    }

    pub fn released(&self) -> bool {
        self.script.released()
    }
}

#[async_trait]
impl WebBackend for MockWeb {
    async fn launch(&self, browser_type: &str, headless: bool) -> eyre::Result<bool> {
        self.script.invoke("launch", format!("launch {} headless={}", browser_type, headless))
    }

    async fn navigate(&self, url: &str) -> eyre::Result<bool> {
        self.script.invoke("navigate", format!("navigate {}", url))
    }

    async fn type_text(&self, selector: &str, text: &str) -> eyre::Result<bool> {
        self.script.invoke("type", format!("type {} {}", selector, text))
    }

    async fn click(&self, selector: &str) -> eyre::Result<bool> {
        self.script.invoke("click", format!("click {}", selector))
    }

    async fn wait_for(&self, selector: &str, state: WaitState, timeout: Duration) -> eyre::Result<bool> {
        self.script
            .invoke("wait", format!("wait {} {} {}ms", selector, state, timeout.as_millis()))
    }

    async fn close(&self) -> eyre::Result<bool> {
        self.script.invoke("close", "close".to_string())
    }

    async fn release(&self) -> eyre::Result<()> {
        self.script.release();
        Ok(())
    }
}

/// Mock shell backend: echoes the command on stdout unless scripted otherwise
#[derive(Debug, Default)]
pub struct MockShell {
    outputs: HashMap<String, ShellOutput>,
    calls: Mutex<Vec<String>>,
}

impl MockShell {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the output returned for an exact command
    pub fn with_output(mut self, command: impl Into<String>, output: ShellOutput) -> Self {
        self.outputs.insert(command.into(), output);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl ShellBackend for MockShell {
    async fn run(&self, command: &str) -> eyre::Result<ShellOutput> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(command.to_string());
        }
        Ok(self.outputs.get(command).cloned().unwrap_or_else(|| ShellOutput {
            success: true,
            stdout: command.to_string(),
            stderr: String::new(),
        }))
    }
}

//! Collaborator capability interfaces
//!
//! The agent never talks to a window system, browser, or process table
//! directly. It goes through three traits:
//! - GuiBackend: desktop application control
//! - WebBackend: a single browser page
//! - ShellBackend: one-shot shell commands
//!
//! Every method reports faults through `eyre::Result`; the dispatcher turns
//! those (and panics) into ordinary failure outcomes. Blocking waits inside an
//! implementation must be bounded by a timeout and report expiry as `Ok(false)`
//! or an error, never hang.

mod detached;
mod shell;

#[cfg(feature = "browser")]
mod chrome;

pub mod mock;

pub use detached::{DetachedGui, DetachedWeb};
pub use shell::{ShellConfig, SystemShell};

#[cfg(feature = "browser")]
pub use chrome::ChromeWeb;

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::Params;

/// How to find or launch a desktop application
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AppLocator {
    /// Executable path (classic desktop apps)
    #[serde(default)]
    pub path: Option<String>,
    /// Regex for the main window title to wait for
    #[serde(default)]
    pub title: Option<String>,
    /// Application user model id (packaged apps)
    #[serde(default)]
    pub aumid: Option<String>,
}

/// Element state to wait for on a web page
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WaitState {
    /// Present in the DOM
    Attached,
    /// Absent from the DOM
    Detached,
    /// Absent, or present without a rendered box
    Hidden,
    /// Present with a non-empty box and not hidden by style
    #[default]
    Visible,
}

impl WaitState {
    /// Whether an element observed as (`attached`, `visible`) is in this state
    pub fn is_satisfied(&self, attached: bool, visible: bool) -> bool {
        match self {
            WaitState::Attached => attached,
            WaitState::Detached => !attached,
            WaitState::Hidden => !attached || !visible,
            WaitState::Visible => attached && visible,
        }
    }
}

impl std::fmt::Display for WaitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            WaitState::Attached => "attached",
            WaitState::Detached => "detached",
            WaitState::Hidden => "hidden",
            WaitState::Visible => "visible",
        };
        f.write_str(name)
    }
}

/// Captured result of a shell command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShellOutput {
    /// True when the process exited with status zero
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
}

/// Desktop GUI automation capability
#[async_trait]
pub trait GuiBackend: Send + Sync {
    /// Launch an application and attach to it as the current application
    async fn start_application(&self, locator: &AppLocator) -> eyre::Result<bool>;

    /// Close the current application
    async fn close_current(&self) -> eyre::Result<bool>;

    /// Close every running instance of an executable
    async fn close_by_name(&self, name: &str) -> eyre::Result<bool>;

    /// Click the control matching the identifiers
    async fn click(&self, identifiers: &Params) -> eyre::Result<bool>;

    /// Type text into the control matching the identifiers
    async fn type_text(&self, identifiers: &Params, text: &str) -> eyre::Result<bool>;

    /// Send a key sequence to the current application
    async fn send_keys(&self, keys: &str) -> eyre::Result<bool>;

    /// Dump the control tree of the current application to the console
    async fn print_identifiers(&self) -> eyre::Result<()>;

    /// Release any held application handles
    async fn release(&self) -> eyre::Result<()> {
        Ok(())
    }
}

/// Browser automation capability over a single page
#[async_trait]
pub trait WebBackend: Send + Sync {
    async fn launch(&self, browser_type: &str, headless: bool) -> eyre::Result<bool>;

    async fn navigate(&self, url: &str) -> eyre::Result<bool>;

    /// Fill the element matching `selector` with `text`
    async fn type_text(&self, selector: &str, text: &str) -> eyre::Result<bool>;

    async fn click(&self, selector: &str) -> eyre::Result<bool>;

    /// Wait until `selector` reaches `state`; expiry is `Ok(false)`
    async fn wait_for(&self, selector: &str, state: WaitState, timeout: Duration) -> eyre::Result<bool>;

    async fn close(&self) -> eyre::Result<bool>;

    /// Release the browser session if one is still open
    async fn release(&self) -> eyre::Result<()> {
        self.close().await.map(|_| ())
    }
}

/// Shell execution capability
#[async_trait]
pub trait ShellBackend: Send + Sync {
    async fn run(&self, command: &str) -> eyre::Result<ShellOutput>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_locator_from_params() {
        let locator: AppLocator =
            serde_json::from_value(serde_json::json!({"path": "notepad.exe", "title": ".*Notepad"})).unwrap();
        assert_eq!(locator.path.as_deref(), Some("notepad.exe"));
        assert_eq!(locator.title.as_deref(), Some(".*Notepad"));
        assert!(locator.aumid.is_none());
    }

    #[test]
    fn test_wait_state_default_and_parse() {
        assert_eq!(WaitState::default(), WaitState::Visible);
        let state: WaitState = serde_json::from_str("\"detached\"").unwrap();
        assert_eq!(state, WaitState::Detached);
        assert_eq!(state.to_string(), "detached");
    }

    #[test]
    fn test_wait_state_visibility_rules() {
        // (attached, visible) observations
        assert!(WaitState::Visible.is_satisfied(true, true));
        assert!(!WaitState::Visible.is_satisfied(true, false));
        assert!(!WaitState::Visible.is_satisfied(false, false));

        assert!(WaitState::Hidden.is_satisfied(true, false));
        assert!(WaitState::Hidden.is_satisfied(false, false));
        assert!(!WaitState::Hidden.is_satisfied(true, true));

        assert!(WaitState::Attached.is_satisfied(true, false));
        assert!(!WaitState::Attached.is_satisfied(false, false));
        assert!(WaitState::Detached.is_satisfied(false, false));
        assert!(!WaitState::Detached.is_satisfied(true, true));
    }

    #[test]
    fn test_wait_state_rejects_unknown() {
        assert!(serde_json::from_str::<WaitState>("\"sideways\"").is_err());
    }
}

//! Typed GUI and Web action tables
//!
//! Action names map one-to-one onto enum variants. Anything outside the table
//! is `UnsupportedAction`; parameters that do not fit the chosen variant are
//! `InvalidParameters`.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::backend::{AppLocator, WaitState};
use crate::domain::Params;
use crate::error::{GearError, Result};

/// Default wait timeout for `web:wait`, in milliseconds
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 30_000;

/// Desktop GUI actions
#[derive(Debug, Clone, PartialEq)]
pub enum GuiCommand {
    Start(AppLocator),
    Close,
    CloseByName { app_name: String },
    Click { control_identifiers: Params },
    Type { control_identifiers: Params, text: String },
    Keys { keys: String },
    PrintIdentifiers,
}

#[derive(Deserialize)]
struct CloseByNameParams {
    app_name: String,
}

#[derive(Deserialize)]
struct ClickParams {
    control_identifiers: Params,
}

#[derive(Deserialize)]
struct TypeParams {
    control_identifiers: Params,
    text: String,
}

#[derive(Deserialize)]
struct KeysParams {
    keys: String,
}

impl GuiCommand {
    /// Look up `action` in the GUI table and decode its parameters
    pub fn from_task(action: &str, params: &Params) -> Result<Self> {
        let label = format!("gui:{}", action);
        match action {
            "start" => Ok(GuiCommand::Start(decode(&label, params)?)),
            "close" => Ok(GuiCommand::Close),
            "close_by_name" => {
                let p: CloseByNameParams = decode(&label, params)?;
                Ok(GuiCommand::CloseByName { app_name: p.app_name })
            }
            "click" => {
                let p: ClickParams = decode(&label, params)?;
                Ok(GuiCommand::Click {
                    control_identifiers: p.control_identifiers,
                })
            }
            "type" => {
                let p: TypeParams = decode(&label, params)?;
                Ok(GuiCommand::Type {
                    control_identifiers: p.control_identifiers,
                    text: p.text,
                })
            }
            "keys" => {
                let p: KeysParams = decode(&label, params)?;
                Ok(GuiCommand::Keys { keys: p.keys })
            }
            "print_identifiers" => Ok(GuiCommand::PrintIdentifiers),
            other => Err(GearError::UnsupportedAction {
                surface: "Gui",
                action: other.to_string(),
            }),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            GuiCommand::Start(_) => "start",
            GuiCommand::Close => "close",
            GuiCommand::CloseByName { .. } => "close_by_name",
            GuiCommand::Click { .. } => "click",
            GuiCommand::Type { .. } => "type",
            GuiCommand::Keys { .. } => "keys",
            GuiCommand::PrintIdentifiers => "print_identifiers",
        }
    }

    /// Stdout sentences for (success, failure)
    pub fn messages(&self) -> (&'static str, &'static str) {
        match self {
            GuiCommand::Start(_) => ("Application started successfully.", "Failed to start application."),
            GuiCommand::Close | GuiCommand::CloseByName { .. } => {
                ("Application closed successfully.", "Failed to close application.")
            }
            GuiCommand::Click { .. } => ("Clicked successfully.", "Element not found or click failed."),
            GuiCommand::Type { .. } => ("Text typed successfully.", "Failed to type text."),
            GuiCommand::Keys { .. } => ("Keys sent successfully.", "Failed to send keys."),
            GuiCommand::PrintIdentifiers => {
                ("Control identifiers printed to console.", "Failed to print control identifiers.")
            }
        }
    }

    pub fn learning(&self) -> String {
        match self {
            GuiCommand::Start(_) => "Attempted to start application.".to_string(),
            GuiCommand::Close => "Attempted to close application.".to_string(),
            GuiCommand::CloseByName { app_name } => {
                format!("Attempted to close application by name: {}", app_name)
            }
            GuiCommand::Click { .. } => "Attempted to click GUI element.".to_string(),
            GuiCommand::Type { .. } => "Attempted to type text in GUI element.".to_string(),
            GuiCommand::Keys { .. } => "Attempted to send keys.".to_string(),
            GuiCommand::PrintIdentifiers => "Printed control identifiers.".to_string(),
        }
    }
}

/// Browser actions
#[derive(Debug, Clone, PartialEq)]
pub enum WebCommand {
    Launch { browser_type: String, headless: bool },
    Navigate { url: String },
    Type { selector: String, text: String },
    Click { selector: String },
    Wait { selector: String, state: WaitState, timeout_ms: u64 },
    Close,
}

fn default_browser_type() -> String {
    "chromium".to_string()
}

fn default_headless() -> bool {
    true
}

fn default_wait_timeout() -> u64 {
    DEFAULT_WAIT_TIMEOUT_MS
}

#[derive(Deserialize)]
struct LaunchParams {
    #[serde(default = "default_browser_type")]
    browser_type: String,
    #[serde(default = "default_headless")]
    headless: bool,
}

#[derive(Deserialize)]
struct NavigateParams {
    url: String,
}

#[derive(Deserialize)]
struct SelectorTextParams {
    selector: String,
    text: String,
}

#[derive(Deserialize)]
struct SelectorParams {
    selector: String,
}

#[derive(Deserialize)]
struct WaitParams {
    selector: String,
    #[serde(default)]
    state: WaitState,
    #[serde(default = "default_wait_timeout")]
    timeout: u64,
}

impl WebCommand {
    /// Look up `action` in the Web table and decode its parameters
    pub fn from_task(action: &str, params: &Params) -> Result<Self> {
        let label = format!("web:{}", action);
        match action {
            "launch" => {
                let p: LaunchParams = decode(&label, params)?;
                Ok(WebCommand::Launch {
                    browser_type: p.browser_type,
                    headless: p.headless,
                })
            }
            "navigate" => {
                let p: NavigateParams = decode(&label, params)?;
                Ok(WebCommand::Navigate { url: p.url })
            }
            "type" => {
                let p: SelectorTextParams = decode(&label, params)?;
                Ok(WebCommand::Type {
                    selector: p.selector,
                    text: p.text,
                })
            }
            "click" => {
                let p: SelectorParams = decode(&label, params)?;
                Ok(WebCommand::Click { selector: p.selector })
            }
            "wait" => {
                let p: WaitParams = decode(&label, params)?;
                Ok(WebCommand::Wait {
                    selector: p.selector,
                    state: p.state,
                    timeout_ms: p.timeout,
                })
            }
            "close" => Ok(WebCommand::Close),
            other => Err(GearError::UnsupportedAction {
                surface: "Web",
                action: other.to_string(),
            }),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            WebCommand::Launch { .. } => "launch",
            WebCommand::Navigate { .. } => "navigate",
            WebCommand::Type { .. } => "type",
            WebCommand::Click { .. } => "click",
            WebCommand::Wait { .. } => "wait",
            WebCommand::Close => "close",
        }
    }

    /// Stdout sentences for (success, failure)
    pub fn messages(&self) -> (&'static str, &'static str) {
        match self {
            WebCommand::Launch { .. } => ("Browser launched successfully.", "Failed to launch browser."),
            WebCommand::Navigate { .. } => ("Navigated successfully.", "Failed to navigate."),
            WebCommand::Type { .. } => ("Text typed successfully.", "Failed to type text."),
            WebCommand::Click { .. } => ("Clicked successfully.", "Element not found or click failed."),
            WebCommand::Wait { .. } => ("Selector reached the expected state.", "Timed out waiting for selector."),
            WebCommand::Close => ("Browser closed successfully.", "Failed to close browser."),
        }
    }

    pub fn learning(&self) -> String {
        match self {
            WebCommand::Launch { browser_type, .. } => format!("Attempted to launch {} browser.", browser_type),
            WebCommand::Navigate { url } => format!("Attempted to navigate to URL: {}", url),
            WebCommand::Type { .. } => "Attempted to type text in web element.".to_string(),
            WebCommand::Click { .. } => "Attempted to click web element.".to_string(),
            WebCommand::Wait { selector, state, .. } => {
                format!("Attempted to wait for selector '{}' to be {}.", selector, state)
            }
            WebCommand::Close => "Attempted to close browser.".to_string(),
        }
    }
}

fn decode<T: DeserializeOwned>(label: &str, params: &Params) -> Result<T> {
    serde_json::from_value(Value::Object(params.clone())).map_err(|e| GearError::InvalidParameters {
        action: label.to_string(),
        message: e.to_string(),
    })
}

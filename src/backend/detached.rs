//! Detached backends used when no automation driver is available
//!
//! Every capability call reports a fault, so tasks routed here are recorded as
//! ordinary failures and the run stops cleanly.

use std::time::Duration;

use async_trait::async_trait;
use eyre::eyre;

use super::{AppLocator, GuiBackend, WaitState, WebBackend};
use crate::domain::Params;

/// GUI backend with no desktop automation driver behind it
#[derive(Debug, Clone, Copy, Default)]
pub struct DetachedGui;

fn no_gui() -> eyre::Report {
    eyre!("no desktop automation backend available")
}

#[async_trait]
impl GuiBackend for DetachedGui {
    async fn start_application(&self, _locator: &AppLocator) -> eyre::Result<bool> {
        Err(no_gui())
    }

    async fn close_current(&self) -> eyre::Result<bool> {
        Err(no_gui())
    }

    async fn close_by_name(&self, _name: &str) -> eyre::Result<bool> {
        Err(no_gui())
    }

    async fn click(&self, _identifiers: &Params) -> eyre::Result<bool> {
        Err(no_gui())
    }

    async fn type_text(&self, _identifiers: &Params, _text: &str) -> eyre::Result<bool> {
        Err(no_gui())
    }

    async fn send_keys(&self, _keys: &str) -> eyre::Result<bool> {
        Err(no_gui())
    }

    async fn print_identifiers(&self) -> eyre::Result<()> {
        Err(no_gui())
    }
}

/// Web backend used when the crate is built without a browser driver
#[derive(Debug, Clone, Copy, Default)]
pub struct DetachedWeb;

fn no_browser() -> eyre::Report {
    eyre!("no browser backend available (build with the `browser` feature)")
}

#[async_trait]
impl WebBackend for DetachedWeb {
    async fn launch(&self, _browser_type: &str, _headless: bool) -> eyre::Result<bool> {
        Err(no_browser())
    }

    async fn navigate(&self, _url: &str) -> eyre::Result<bool> {
        Err(no_browser())
    }

    async fn type_text(&self, _selector: &str, _text: &str) -> eyre::Result<bool> {
        Err(no_browser())
    }

    async fn click(&self, _selector: &str) -> eyre::Result<bool> {
        Err(no_browser())
    }

    async fn wait_for(&self, _selector: &str, _state: WaitState, _timeout: Duration) -> eyre::Result<bool> {
        Err(no_browser())
    }

    async fn close(&self) -> eyre::Result<bool> {
        Err(no_browser())
    }

    async fn release(&self) -> eyre::Result<()> {
        Ok(())
    }
}

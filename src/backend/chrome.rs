//! Web backend driving a Chrome/Chromium page through `headless_chrome`
//!
//! Requires the `browser` feature and a local Chrome or Chromium install.
//! `headless_chrome` is synchronous, so every page operation runs on the
//! blocking pool and element waits are bounded by the configured timeout.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use eyre::eyre;
use headless_chrome::{Browser, Element, LaunchOptions, Tab};
use log::{debug, warn};

use super::{WaitState, WebBackend};

const POLL_INTERVAL: Duration = Duration::from_millis(250);

const VISIBILITY_JS: &str = "function() { \
    const style = window.getComputedStyle(this); \
    const rect = this.getBoundingClientRect(); \
    return style.display !== 'none' && style.visibility !== 'hidden' \
        && rect.width > 0 && rect.height > 0; }";

struct ChromeSession {
    // Dropping the browser kills the Chrome process
    _browser: Browser,
    tab: Arc<Tab>,
}

/// Single-page Chrome backend
pub struct ChromeWeb {
    element_timeout: Duration,
    session: Mutex<Option<ChromeSession>>,
}

impl ChromeWeb {
    /// `element_timeout` bounds the wait for elements targeted by `type` and `click`
    pub fn new(element_timeout: Duration) -> Self {
        Self {
            element_timeout,
            session: Mutex::new(None),
        }
    }

    fn current_tab(&self) -> eyre::Result<Option<Arc<Tab>>> {
        let session = self.session.lock().map_err(|e| eyre!("browser session lock poisoned: {}", e))?;
        Ok(session.as_ref().map(|s| s.tab.clone()))
    }

    /// Run a blocking page operation against the current tab.
    ///
    /// Returns `Ok(false)` when no page is open and when the operation fails.
    async fn on_tab<F>(&self, what: &str, op: F) -> eyre::Result<bool>
    where
        F: FnOnce(Arc<Tab>) -> Result<(), String> + Send + 'static,
    {
        let Some(tab) = self.current_tab()? else {
            warn!("No page available for {}. Launch browser first.", what);
            return Ok(false);
        };

        match tokio::task::spawn_blocking(move || op(tab)).await? {
            Ok(()) => {
                debug!("Browser {} succeeded", what);
                Ok(true)
            }
            Err(e) => {
                warn!("Browser {} failed: {}", what, e);
                Ok(false)
            }
        }
    }
}

/// Rendered with a non-empty box and not hidden by computed style
fn is_visible(element: &Element<'_>) -> bool {
    element
        .call_js_fn(VISIBILITY_JS, vec![], false)
        .ok()
        .and_then(|result| result.value)
        .and_then(|value| value.as_bool())
        .unwrap_or(false)
}

#[async_trait]
impl WebBackend for ChromeWeb {
    async fn launch(&self, browser_type: &str, headless: bool) -> eyre::Result<bool> {
        if !matches!(browser_type, "chromium" | "chrome") {
            warn!("Unsupported browser type: {}", browser_type);
            return Ok(false);
        }

        let timeout = self.element_timeout;
        let session = tokio::task::spawn_blocking(move || -> Result<ChromeSession, String> {
            let options = LaunchOptions::default_builder()
                .headless(headless)
                .build()
                .map_err(|e| e.to_string())?;
            let browser = Browser::new(options).map_err(|e| e.to_string())?;
            let tab = browser.new_tab().map_err(|e| e.to_string())?;
            tab.set_default_timeout(timeout);
            Ok(ChromeSession { _browser: browser, tab })
        })
        .await?
        .map_err(|e| eyre!("Error launching browser: {}", e))?;

        let mut slot = self.session.lock().map_err(|e| eyre!("browser session lock poisoned: {}", e))?;
        *slot = Some(session);
        debug!("Launched {} browser (headless={})", browser_type, headless);
        Ok(true)
    }

    async fn navigate(&self, url: &str) -> eyre::Result<bool> {
        let url = url.to_string();
        self.on_tab("navigate", move |tab| {
            tab.navigate_to(&url)
                .and_then(|t| t.wait_until_navigated())
                .map(|_| ())
                .map_err(|e| e.to_string())
        })
        .await
    }

    async fn type_text(&self, selector: &str, text: &str) -> eyre::Result<bool> {
        let (selector, text) = (selector.to_string(), text.to_string());
        self.on_tab("type", move |tab| {
            let element = tab.wait_for_element(&selector).map_err(|e| e.to_string())?;
            element.click().map_err(|e| e.to_string())?;
            element.type_into(&text).map(|_| ()).map_err(|e| e.to_string())
        })
        .await
    }

    async fn click(&self, selector: &str) -> eyre::Result<bool> {
        let selector = selector.to_string();
        self.on_tab("click", move |tab| {
            let element = tab.wait_for_element(&selector).map_err(|e| e.to_string())?;
            element.click().map(|_| ()).map_err(|e| e.to_string())
        })
        .await
    }

    async fn wait_for(&self, selector: &str, state: WaitState, timeout: Duration) -> eyre::Result<bool> {
        let selector = selector.to_string();
        self.on_tab("wait", move |tab| {
            let deadline = Instant::now() + timeout;
            loop {
                let (attached, visible) = match tab.find_element(&selector) {
                    Ok(element) => (true, is_visible(&element)),
                    Err(_) => (false, false),
                };
                if state.is_satisfied(attached, visible) {
                    return Ok(());
                }
                if Instant::now() >= deadline {
                    return Err(format!(
                        "'{}' not {} after {}ms",
                        selector,
                        state,
                        timeout.as_millis()
                    ));
                }
                std::thread::sleep(POLL_INTERVAL);
            }
        })
        .await
    }

    async fn close(&self) -> eyre::Result<bool> {
        let session = self
            .session
            .lock()
            .map_err(|e| eyre!("browser session lock poisoned: {}", e))?
            .take();
        if session.is_some() {
            debug!("Browser closed");
        }
        Ok(true)
    }
}

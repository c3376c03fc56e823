//! Headless-Chromium implementation of [`PageSession`].
//!
//! `headless_chrome` is a blocking CDP client, so every tab interaction is
//! wrapped in `tokio::task::spawn_blocking`. DOM reads go through a
//! `JSON.stringify` round trip in the page, so values come back to us as
//! plain JSON primitives instead of remote object handles.

use std::ffi::OsStr;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use headless_chrome::{Browser, LaunchOptions, Tab};
use shared_utils::env::optional_env_var;
use tokio::task;
use tracing::debug;

use crate::session::{PageSession, SessionFactory, errors::SessionError};

const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Launch-time knobs for the real browser session.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Run without a visible window.
    pub headless: bool,
    /// Viewport size; the portal lays out differently below desktop width.
    pub window: (u32, u32),
    /// User agent presented to the portal.
    pub user_agent: String,
    /// How long the browser may sit idle before the client gives up on it.
    /// A full cycle sleeps between airports, so this must comfortably exceed
    /// the configured inter-airport delay.
    pub idle_timeout: Duration,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            headless: true,
            window: (1920, 1080),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            idle_timeout: Duration::from_secs(300),
        }
    }
}

/// Launches one Chromium per session.
///
/// Honors `FLIGHT_CHROME_PATH` for containers where the binary is not on
/// the default search path.
pub struct ChromeLauncher {
    options: SessionOptions,
}

impl ChromeLauncher {
    /// Creates a launcher with the given options.
    pub fn new(options: SessionOptions) -> Self {
        Self { options }
    }
}

#[async_trait]
impl SessionFactory for ChromeLauncher {
    async fn open(&self) -> Result<Box<dyn PageSession>, SessionError> {
        let options = self.options.clone();
        let launched = task::spawn_blocking(move || -> Result<_, anyhow::Error> {
            let chrome_path = optional_env_var("FLIGHT_CHROME_PATH").map(PathBuf::from);
            let launch = LaunchOptions::default_builder()
                .headless(options.headless)
                .window_size(Some(options.window))
                .idle_browser_timeout(options.idle_timeout)
                .path(chrome_path)
                .args(vec![
                    OsStr::new("--no-sandbox"),
                    OsStr::new("--disable-setuid-sandbox"),
                    OsStr::new("--disable-dev-shm-usage"),
                ])
                .build()
                .map_err(|e| anyhow::anyhow!("bad launch options: {e}"))?;
            let browser = Browser::new(launch)?;
            let tab = browser.new_tab()?;
            tab.set_user_agent(&options.user_agent, Some("ko-KR"), None)?;
            Ok((browser, tab))
        })
        .await
        .map_err(|e| SessionError::Browser {
            message: format!("browser launch task failed: {e}"),
        })?
        .map_err(|e| SessionError::Browser {
            message: format!("failed to launch browser: {e}"),
        })?;

        let (browser, tab) = launched;
        debug!("browser session opened");
        Ok(Box::new(ChromeSession {
            tab,
            browser: Mutex::new(Some(browser)),
        }))
    }
}

/// A live Chromium tab behind the [`PageSession`] contract.
pub struct ChromeSession {
    tab: Arc<Tab>,
    // Held so the browser process outlives the session; `close` takes it
    // out and drops it, which kills the child process.
    browser: Mutex<Option<Browser>>,
}

impl ChromeSession {
    async fn blocking<T, F>(&self, operation: &'static str, f: F) -> Result<T, SessionError>
    where
        T: Send + 'static,
        F: FnOnce(Arc<Tab>) -> Result<T, anyhow::Error> + Send + 'static,
    {
        let tab = Arc::clone(&self.tab);
        task::spawn_blocking(move || f(tab))
            .await
            .map_err(|e| SessionError::Browser {
                message: format!("{operation} task failed: {e}"),
            })?
            .map_err(|e| classify(operation, e))
    }

    /// Evaluates a JS expression that resolves to a string primitive.
    async fn eval_string(
        &self,
        operation: &'static str,
        expression: String,
    ) -> Result<String, SessionError> {
        self.blocking(operation, move |tab| {
            let result = tab.evaluate(&expression, false)?;
            match result.value {
                Some(serde_json::Value::String(s)) => Ok(s),
                other => Err(anyhow::anyhow!("expected string result, got {other:?}")),
            }
        })
        .await
    }
}

/// Timeouts inside `headless_chrome` surface as stringly-typed anyhow
/// errors; anything mentioning a timeout becomes our timeout variant so the
/// orchestrator can classify the airport failure.
fn classify(operation: &str, e: anyhow::Error) -> SessionError {
    let message = e.to_string();
    if message.to_lowercase().contains("timed out") || message.to_lowercase().contains("timeout") {
        SessionError::Timeout {
            operation: operation.to_string(),
        }
    } else {
        SessionError::Browser { message }
    }
}

/// Quotes a Rust string as a JS string literal.
fn js_string(s: &str) -> String {
    serde_json::Value::String(s.to_string()).to_string()
}

#[async_trait]
impl PageSession for ChromeSession {
    async fn navigate(&self, url: &str) -> Result<(), SessionError> {
        let url = url.to_string();
        let target = url.clone();
        self.blocking("loading the page", move |tab| {
            tab.navigate_to(&url)?;
            Ok(())
        })
        .await
        .map_err(|e| match e {
            SessionError::Browser { message } => SessionError::Navigation {
                message: format!("{target}: {message}"),
            },
            other => other,
        })
    }

    async fn wait_for_quiescence(&self, timeout: Duration) -> Result<(), SessionError> {
        self.blocking("waiting for the page to settle", move |tab| {
            tab.set_default_timeout(timeout);
            tab.wait_until_navigated()?;
            Ok(())
        })
        .await
    }

    async fn select_option(&self, selector: &str, value: &str) -> Result<(), SessionError> {
        let expression = format!(
            r#"(() => {{
                const el = document.querySelector({sel});
                if (!el) return "missing";
                const opt = Array.from(el.options || []).find(
                    o => o.value === {val} || o.text.trim() === {val}
                );
                if (!opt) return "invalid";
                el.value = opt.value;
                el.dispatchEvent(new Event("change", {{ bubbles: true }}));
                return "ok";
            }})()"#,
            sel = js_string(selector),
            val = js_string(value),
        );
        match self
            .eval_string("selecting an option", expression)
            .await?
            .as_str()
        {
            "ok" => Ok(()),
            "missing" => Err(SessionError::MissingElement {
                selector: selector.to_string(),
            }),
            "invalid" => Err(SessionError::InvalidOption {
                selector: selector.to_string(),
                value: value.to_string(),
            }),
            other => Err(SessionError::Browser {
                message: format!("unexpected select result: {other}"),
            }),
        }
    }

    async fn click(&self, selector: &str) -> Result<(), SessionError> {
        let selector_owned = selector.to_string();
        let missing = selector.to_string();
        self.blocking("clicking", move |tab| {
            let element = tab.find_element(&selector_owned)?;
            element.click()?;
            Ok(())
        })
        .await
        .map_err(|e| match e {
            // `find_element` reports absence as a generic error.
            SessionError::Browser { message } if message.contains("No element found") => {
                SessionError::MissingElement { selector: missing }
            }
            other => other,
        })
    }

    async fn query_rows(&self, row_selector: &str) -> Result<Vec<Vec<String>>, SessionError> {
        let expression = format!(
            r#"JSON.stringify(
                Array.from(document.querySelectorAll({sel})).map(row =>
                    Array.from(row.querySelectorAll("td")).map(
                        cell => (cell.innerText || "").trim()
                    )
                )
            )"#,
            sel = js_string(row_selector),
        );
        let json = self.eval_string("querying result rows", expression).await?;
        serde_json::from_str(&json).map_err(|e| SessionError::Browser {
            message: format!("malformed row payload: {e}"),
        })
    }

    async fn page_text(&self) -> Result<String, SessionError> {
        self.eval_string(
            "reading page text",
            r#"document.body ? document.body.innerText : """#.to_string(),
        )
        .await
    }

    async fn close(&self) -> Result<(), SessionError> {
        let browser = self
            .browser
            .lock()
            .map_err(|_| SessionError::Browser {
                message: "browser handle poisoned".to_string(),
            })?
            .take();
        if let Some(browser) = browser {
            // Dropping the handle kills the child process; do it off the
            // async threads.
            task::spawn_blocking(move || drop(browser))
                .await
                .map_err(|e| SessionError::Browser {
                    message: format!("browser shutdown task failed: {e}"),
                })?;
            debug!("browser session closed");
        }
        Ok(())
    }
}

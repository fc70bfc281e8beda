//! Chromium-based renderer using chromiumoxide.

use super::{NavigationResult, RenderContext, Renderer};
use crate::config::{BrowserOptions, CHROMIUM_PATH_ENV};
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;

/// Find the Chromium binary path.
pub fn find_chromium() -> Option<PathBuf> {
    // 1. COVID_COUNTERS_CHROMIUM_PATH env
    if let Ok(p) = std::env::var(CHROMIUM_PATH_ENV) {
        let path = PathBuf::from(&p);
        if path.exists() {
            return Some(path);
        }
    }

    // 2. ~/.covid-counters/chromium/
    if let Some(home) = dirs::home_dir() {
        let candidates = if cfg!(target_os = "macos") {
            vec![
                home.join(".covid-counters/chromium/chrome-mac-arm64/Google Chrome for Testing.app/Contents/MacOS/Google Chrome for Testing"),
                home.join(".covid-counters/chromium/chrome-mac-x64/Google Chrome for Testing.app/Contents/MacOS/Google Chrome for Testing"),
                home.join(".covid-counters/chromium/chrome"),
            ]
        } else {
            vec![
                home.join(".covid-counters/chromium/chrome-linux64/chrome"),
                home.join(".covid-counters/chromium/chrome"),
            ]
        };
        for c in candidates {
            if c.exists() {
                return Some(c);
            }
        }
    }

    // 3. System PATH
    for name in ["google-chrome", "chromium", "chromium-browser", "chrome"] {
        if let Ok(path) = which::which(name) {
            return Some(path);
        }
    }

    // 4. Common macOS location
    if cfg!(target_os = "macos") {
        let common =
            PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome");
        if common.exists() {
            return Some(common);
        }
    }

    None
}

/// Script returning `JSON.stringify({found, text})` for the first XPath match.
///
/// The result is a string so it comes back by value regardless of how the
/// CDP evaluation is configured.
fn xpath_text_script(xpath: &str) -> Result<String> {
    let literal = serde_json::to_string(xpath).context("failed to quote XPath")?;
    Ok(format!(
        "(() => {{\
            const node = document.evaluate({literal}, document, null, \
                XPathResult.FIRST_ORDERED_NODE_TYPE, null).singleNodeValue;\
            if (!node) return JSON.stringify({{ found: false, text: null }});\
            return JSON.stringify({{ found: true, text: node.innerText ?? node.textContent ?? '' }});\
        }})()"
    ))
}

fn parse_xpath_result(raw: &str) -> Result<Option<String>> {
    let value: serde_json::Value =
        serde_json::from_str(raw).context("XPath script returned malformed JSON")?;
    if !value.get("found").and_then(|v| v.as_bool()).unwrap_or(false) {
        return Ok(None);
    }
    Ok(Some(
        value
            .get("text")
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string(),
    ))
}

/// Chromium-based renderer.
pub struct ChromiumRenderer {
    browser: Browser,
    handler: JoinHandle<()>,
}

impl ChromiumRenderer {
    /// Launch a Chromium instance, headless unless `options.headed`.
    pub async fn launch(options: &BrowserOptions) -> Result<Self> {
        let chrome_path = crate::config::resolve_chromium_path(options.chromium_path.as_deref())
            .with_context(|| {
                format!("Chromium not found. Pass --chromium or set {CHROMIUM_PATH_ENV}.")
            })?;
        tracing::debug!("launching Chromium at {}", chrome_path.display());

        let mut builder = BrowserConfig::builder()
            .chrome_executable(chrome_path)
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-extensions")
            .arg("--disable-background-networking");
        if options.headed {
            builder = builder.with_head();
        } else {
            builder = builder.arg("--headless=new");
        }
        let config = builder
            .build()
            .map_err(|e| anyhow::anyhow!("failed to build browser config: {e}"))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .context("failed to launch Chromium")?;

        // Spawn the handler task
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                let _ = event;
            }
        });

        Ok(Self { browser, handler })
    }
}

#[async_trait]
impl Renderer for ChromiumRenderer {
    async fn new_context(&self) -> Result<Box<dyn RenderContext>> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .context("failed to create new page")?;

        Ok(Box::new(ChromiumContext { page }))
    }

    async fn shutdown(self: Box<Self>) -> Result<()> {
        let ChromiumRenderer {
            mut browser,
            handler,
        } = *self;

        let result = terminate(&mut browser, SHUTDOWN_GRACE).await;
        handler.abort();
        result
    }
}

/// Upper bound on each teardown step (CDP close, process exit).
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

/// The process-level half of a browser, as seen by teardown.
#[async_trait]
trait BrowserProcess: Send {
    /// Ask the browser to exit over CDP.
    async fn request_close(&mut self) -> Result<()>;
    /// Kill the child process.
    async fn kill_process(&mut self) -> Result<()>;
    /// Wait for the child process to exit.
    async fn wait_exit(&mut self) -> Result<()>;
}

#[async_trait]
impl BrowserProcess for Browser {
    async fn request_close(&mut self) -> Result<()> {
        Browser::close(self)
            .await
            .context("failed to close Chromium")?;
        Ok(())
    }

    async fn kill_process(&mut self) -> Result<()> {
        match Browser::kill(self).await {
            Some(result) => result.context("failed to kill Chromium"),
            None => Ok(()),
        }
    }

    async fn wait_exit(&mut self) -> Result<()> {
        let status = Browser::wait(self)
            .await
            .context("failed to wait for Chromium")?;
        tracing::debug!("Chromium exited: {status:?}");
        Ok(())
    }
}

/// Close the browser and reap its process without ever blocking unbounded.
///
/// A failed or stalled close falls back to killing the process; a process
/// that outlives `grace` after that is killed again and left to the OS.
/// Returns the close error, if any.
async fn terminate(process: &mut dyn BrowserProcess, grace: Duration) -> Result<()> {
    let closed = match tokio::time::timeout(grace, process.request_close()).await {
        Ok(result) => result,
        Err(_) => Err(anyhow::anyhow!(
            "Chromium did not acknowledge close within {grace:?}"
        )),
    };

    if let Err(e) = &closed {
        tracing::debug!("{e:#}; killing the process");
        if let Err(e) = process.kill_process().await {
            tracing::debug!("{e:#}");
        }
    }

    match tokio::time::timeout(grace, process.wait_exit()).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::debug!("{e:#}"),
        Err(_) => {
            tracing::warn!("Chromium still running {grace:?} after close; killing it");
            if let Err(e) = process.kill_process().await {
                tracing::debug!("{e:#}");
            }
        }
    }

    closed
}

/// A single Chromium page context.
pub struct ChromiumContext {
    page: Page,
}

#[async_trait]
impl RenderContext for ChromiumContext {
    async fn navigate(&mut self, url: &str, timeout_ms: u64) -> Result<NavigationResult> {
        let start = Instant::now();

        let result =
            tokio::time::timeout(Duration::from_millis(timeout_ms), self.page.goto(url)).await;

        let load_time_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(Ok(_)) => {
                let final_url = self
                    .page
                    .url()
                    .await
                    .unwrap_or_default()
                    .unwrap_or_else(|| url.to_string());

                Ok(NavigationResult {
                    final_url,
                    load_time_ms,
                })
            }
            Ok(Err(e)) => bail!("navigation failed: {e}"),
            Err(_) => bail!("navigation timed out after {timeout_ms}ms"),
        }
    }

    async fn text_at_xpath(&self, xpath: &str) -> Result<Option<String>> {
        let script = xpath_text_script(xpath)?;
        let result = self
            .page
            .evaluate(script.as_str())
            .await
            .with_context(|| format!("XPath evaluation failed for {xpath}"))?;

        let raw: String = result
            .into_value()
            .map_err(|e| anyhow::anyhow!("failed to convert XPath result: {e:?}"))?;

        parse_xpath_result(&raw)
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.page.close().await.context("failed to close page")?;
        Ok(())
    }
}

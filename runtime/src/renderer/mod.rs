//! Renderer abstraction for browser-based page reads.
//!
//! Defines the `Renderer` and `RenderContext` traits that abstract over
//! the browser engine (currently Chromium via chromiumoxide).

pub mod chromium;

use anyhow::Result;
use async_trait::async_trait;

/// Result of navigating to a URL.
#[derive(Debug, Clone)]
pub struct NavigationResult {
    /// The final URL after any redirects.
    pub final_url: String,
    /// Time taken to load the page in milliseconds.
    pub load_time_ms: u64,
}

/// A running browser that can open page contexts.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Open a new page context (tab).
    async fn new_context(&self) -> Result<Box<dyn RenderContext>>;
    /// Shut the browser down. Consumes the renderer, so it runs at most once.
    async fn shutdown(self: Box<Self>) -> Result<()>;
}

/// A single page context (tab).
#[async_trait]
pub trait RenderContext: Send + Sync {
    /// Navigate to a URL with a timeout.
    async fn navigate(&mut self, url: &str, timeout_ms: u64) -> Result<NavigationResult>;
    /// Visible text of the first node matching `xpath`, or `None` if nothing matches.
    async fn text_at_xpath(&self, xpath: &str) -> Result<Option<String>>;
    /// Close this context.
    async fn close(self: Box<Self>) -> Result<()>;
}

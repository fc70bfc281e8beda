//! Rendered retrieval: drive a browser to the page and read the counters
//! from the live DOM.
//!
//! The browser is a scoped resource. [`fetch_rendered_with`] shuts it down
//! exactly once whether extraction succeeds, fails, or panics.

use crate::config::ScrapeConfig;
use crate::error::{ScrapeError, ScrapeResult};
use crate::renderer::chromium::ChromiumRenderer;
use crate::renderer::{RenderContext, Renderer};
use crate::snapshot::{MetricSnapshot, FIELDS};
use futures::FutureExt;
use std::panic::AssertUnwindSafe;

/// XPath of each counter's value, in page order (cases, deaths, recovered).
pub const COUNTER_XPATHS: [&str; 3] = [
    r#"(//div[contains(@class,"maincounter-number")]/span)[1]"#,
    r#"(//div[contains(@class,"maincounter-number")]/span)[2]"#,
    r#"(//div[contains(@class,"maincounter-number")]/span)[3]"#,
];

/// Launch Chromium per `config.browser` and read the counters.
pub async fn fetch_rendered(config: &ScrapeConfig) -> ScrapeResult<MetricSnapshot> {
    let renderer = ChromiumRenderer::launch(&config.browser)
        .await
        .map_err(ScrapeError::browser)?;
    tracing::info!("rendered fetch: Chromium launched");
    fetch_rendered_with(Box::new(renderer), config).await
}

/// Read the counters through an already running renderer, then shut it down.
pub async fn fetch_rendered_with(
    renderer: Box<dyn Renderer>,
    config: &ScrapeConfig,
) -> ScrapeResult<MetricSnapshot> {
    let outcome = AssertUnwindSafe(read_counters(renderer.as_ref(), config))
        .catch_unwind()
        .await;

    let shutdown = renderer.shutdown().await;

    let result = match outcome {
        Ok(result) => result,
        Err(panic) => {
            if let Err(e) = shutdown {
                tracing::warn!("browser shutdown failed: {e:#}");
            }
            std::panic::resume_unwind(panic);
        }
    };

    match (result, shutdown) {
        (Ok(snapshot), Err(e)) => {
            tracing::warn!("browser shutdown failed after a successful read: {e:#}");
            Ok(snapshot)
        }
        (Err(err), Err(e)) => {
            tracing::warn!("browser shutdown failed: {e:#}");
            Err(err)
        }
        (result, Ok(())) => {
            tracing::debug!("rendered fetch: browser shut down");
            result
        }
    }
}

async fn read_counters(
    renderer: &dyn Renderer,
    config: &ScrapeConfig,
) -> ScrapeResult<MetricSnapshot> {
    let mut ctx = renderer.new_context().await.map_err(ScrapeError::browser)?;
    let result = read_in_context(ctx.as_mut(), config).await;
    if let Err(e) = ctx.close().await {
        tracing::debug!("page close failed: {e:#}");
    }
    result
}

async fn read_in_context(
    ctx: &mut dyn RenderContext,
    config: &ScrapeConfig,
) -> ScrapeResult<MetricSnapshot> {
    tracing::info!("rendered fetch: {}", config.url);
    let nav = ctx
        .navigate(&config.url, config.nav_timeout.as_millis() as u64)
        .await
        .map_err(ScrapeError::browser)?;
    tracing::debug!(
        "rendered fetch: loaded {} in {}ms",
        nav.final_url,
        nav.load_time_ms
    );

    let mut texts: Vec<String> = Vec::with_capacity(COUNTER_XPATHS.len());
    for (field, xpath) in FIELDS.into_iter().zip(COUNTER_XPATHS) {
        let text = ctx
            .text_at_xpath(xpath)
            .await
            .map_err(ScrapeError::browser)?
            .ok_or_else(|| ScrapeError::ElementNotFound {
                field,
                xpath: xpath.to_string(),
            })?;
        tracing::debug!("{field} at {xpath}: {text:?}");
        texts.push(text);
    }

    let snapshot = MetricSnapshot::from_raw([&texts[0], &texts[1], &texts[2]])?;
    tracing::info!("rendered fetch: parsed {snapshot:?}");
    Ok(snapshot)
}

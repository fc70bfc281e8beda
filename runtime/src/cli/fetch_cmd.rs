//! `covid-counters [all|static|rendered]`: run retrieval paths and print results.

use crate::acquisition::{rendered_fetch, static_fetch};
use crate::config::ScrapeConfig;
use crate::error::{ScrapeError, ScrapeResult};
use crate::report::{self, OutputMode};
use crate::snapshot::{MetricSnapshot, Source};
use anyhow::{bail, Result};

/// Run one retrieval path.
pub async fn retrieve(source: Source, config: &ScrapeConfig) -> ScrapeResult<MetricSnapshot> {
    match source {
        Source::Static => static_fetch::fetch_static(config).await,
        Source::Rendered => rendered_fetch::fetch_rendered(config).await,
    }
}

/// User-facing line for a failed path, naming network trouble as such.
pub fn failure_message(source: Source, err: &ScrapeError) -> String {
    if err.is_transient() {
        format!("{source} retrieval: network unreachable: {err}")
    } else {
        format!("{source} retrieval: {err}")
    }
}

/// Run each path in order, printing a table or a failure for each.
///
/// A failing path does not stop the ones after it. Returns an error if any
/// path failed, after all of them have run.
pub async fn run(sources: &[Source], config: &ScrapeConfig, mode: OutputMode) -> Result<()> {
    let mut failed = 0usize;

    for &source in sources {
        match retrieve(source, config).await {
            Ok(snapshot) => report::print_snapshot(mode, source, &snapshot),
            Err(e) => {
                failed += 1;
                tracing::info!("{source} retrieval failed: {e:?}");
                report::print_failure(mode, source, &failure_message(source, &e));
            }
        }
    }

    if failed > 0 {
        bail!("{failed} of {} retrieval(s) failed", sources.len());
    }
    Ok(())
}

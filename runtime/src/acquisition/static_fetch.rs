//! Static retrieval: fetch the page over HTTP and read the counters from the
//! raw markup, without running any JavaScript.

use crate::acquisition::http_client::HttpClient;
use crate::config::ScrapeConfig;
use crate::error::{ScrapeError, ScrapeResult};
use crate::snapshot::MetricSnapshot;
use scraper::{Html, Selector};

/// Structural marker of each counter in the page markup.
pub const COUNTER_SELECTOR: &str = "div.maincounter-number";

const EXPECTED_COUNTERS: usize = 3;

/// Text of the first three counter elements, trimmed, in page order.
pub fn extract_counter_texts(html: &str) -> ScrapeResult<[String; 3]> {
    let document = Html::parse_document(html);
    let selector = Selector::parse(COUNTER_SELECTOR)
        .map_err(|e| ScrapeError::Config(format!("bad selector {COUNTER_SELECTOR}: {e}")))?;

    let texts: Vec<String> = document
        .select(&selector)
        .take(EXPECTED_COUNTERS)
        .map(|el| el.text().collect::<String>().trim().to_string())
        .collect();

    tracing::debug!("{COUNTER_SELECTOR} matched {} element(s)", texts.len());

    <[String; 3]>::try_from(texts).map_err(|found| ScrapeError::MissingCounters {
        found: found.len(),
        expected: EXPECTED_COUNTERS,
    })
}

/// Parse markup straight into a snapshot.
pub fn parse_snapshot(html: &str) -> ScrapeResult<MetricSnapshot> {
    let [cases, deaths, recovered] = extract_counter_texts(html)?;
    MetricSnapshot::from_raw([&cases, &deaths, &recovered])
}

/// Fetch `config.url` under the retry policy and parse the counters.
pub async fn fetch_static(config: &ScrapeConfig) -> ScrapeResult<MetricSnapshot> {
    let client = HttpClient::new(config.retry.timeout)?;
    fetch_static_with(&client, config).await
}

/// Same as [`fetch_static`] with a caller-supplied client.
pub async fn fetch_static_with(
    client: &HttpClient,
    config: &ScrapeConfig,
) -> ScrapeResult<MetricSnapshot> {
    tracing::info!("static fetch: {}", config.url);
    let resp = client.get_with_retry(&config.url, &config.retry).await?;
    tracing::debug!(
        "static fetch: {} from {} ({} bytes)",
        resp.status,
        resp.final_url,
        resp.body.len()
    );

    let snapshot = parse_snapshot(&resp.body)?;
    tracing::info!("static fetch: parsed {snapshot:?}");
    Ok(snapshot)
}

//! Async HTTP client wrapping reqwest.
//!
//! Not a browser, just plain GET requests with a per-request timeout and a
//! bounded retry loop on top.

use crate::acquisition::retry::retry_fixed;
use crate::config::RetryPolicy;
use crate::error::ScrapeResult;
use std::time::Duration;

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) \
                          AppleWebKit/537.36 (KHTML, like Gecko) \
                          Chrome/131.0.0.0 Safari/537.36";

/// Response from a successful GET.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// Final URL after redirects.
    pub final_url: String,
    /// HTTP status code (always 2xx).
    pub status: u16,
    /// Response body as text.
    pub body: String,
}

/// HTTP client for the static fetch.
#[derive(Clone)]
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    /// Create a client with a browser-like user agent.
    pub fn new(timeout: Duration) -> ScrapeResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(5))
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client })
    }

    /// One GET. Non-2xx statuses are errors.
    pub async fn get(&self, url: &str, timeout: Duration) -> Result<HttpResponse, reqwest::Error> {
        let resp = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await?
            .error_for_status()?;

        let status = resp.status().as_u16();
        let final_url = resp.url().to_string();
        let body = resp.text().await?;

        Ok(HttpResponse {
            final_url,
            status,
            body,
        })
    }

    /// GET under `policy`: up to `policy.attempts` tries, `policy.delay` apart.
    pub async fn get_with_retry(
        &self,
        url: &str,
        policy: &RetryPolicy,
    ) -> ScrapeResult<HttpResponse> {
        retry_fixed(policy, |attempt| {
            tracing::debug!("GET {url} (attempt {attempt}/{})", policy.attempts);
            self.get(url, policy.timeout)
        })
        .await
    }
}

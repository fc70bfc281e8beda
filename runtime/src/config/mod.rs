//! Configuration defaults and resolution.
//!
//! Every setting resolves as: explicit value > environment variable > default.

use crate::error::{ScrapeError, ScrapeResult};
use std::path::PathBuf;
use std::time::Duration;

/// Page the counters are read from.
pub const DEFAULT_URL: &str = "https://www.worldometers.info/coronavirus/";

/// Environment variable overriding the target URL.
pub const URL_ENV: &str = "COVID_COUNTERS_URL";

/// Environment variable pointing at a Chromium binary.
pub const CHROMIUM_PATH_ENV: &str = "COVID_COUNTERS_CHROMIUM_PATH";

pub const DEFAULT_ATTEMPTS: u32 = 5;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(5);
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_NAV_TIMEOUT: Duration = Duration::from_secs(30);

/// Bounded, fixed-delay retry for the static fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one. Always at least 1.
    pub attempts: u32,
    /// Pause between a failed attempt and the next one.
    pub delay: Duration,
    /// Timeout applied to each individual request.
    pub timeout: Duration,
}

impl RetryPolicy {
    pub fn new(attempts: u32, delay: Duration, timeout: Duration) -> ScrapeResult<Self> {
        if attempts == 0 {
            return Err(ScrapeError::Config(
                "attempts must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            attempts,
            delay,
            timeout: non_zero("timeout", timeout)?,
        })
    }
}

/// Reject a zero duration for a setting that bounds a wait.
pub fn non_zero(name: &str, value: Duration) -> ScrapeResult<Duration> {
    if value.is_zero() {
        return Err(ScrapeError::Config(format!("{name} must be greater than zero")));
    }
    Ok(value)
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: DEFAULT_ATTEMPTS,
            delay: DEFAULT_RETRY_DELAY,
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

/// Browser launch settings for the rendered fetch.
#[derive(Debug, Clone, Default)]
pub struct BrowserOptions {
    /// Explicit Chromium binary. `None` falls back to discovery.
    pub chromium_path: Option<PathBuf>,
    /// Show the browser window instead of running headless.
    pub headed: bool,
}

/// Everything one run needs.
#[derive(Debug, Clone)]
pub struct ScrapeConfig {
    pub url: String,
    pub retry: RetryPolicy,
    pub nav_timeout: Duration,
    pub browser: BrowserOptions,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            retry: RetryPolicy::default(),
            nav_timeout: DEFAULT_NAV_TIMEOUT,
            browser: BrowserOptions::default(),
        }
    }
}

/// Resolve the target URL and check that it is an absolute http(s) URL.
pub fn resolve_url(explicit: Option<&str>) -> ScrapeResult<String> {
    let env = std::env::var(URL_ENV).ok();
    resolve_url_from(explicit, env.as_deref())
}

fn resolve_url_from(explicit: Option<&str>, env: Option<&str>) -> ScrapeResult<String> {
    let raw = explicit
        .or(env.filter(|v| !v.trim().is_empty()))
        .unwrap_or(DEFAULT_URL);

    let parsed = url::Url::parse(raw)
        .map_err(|e| ScrapeError::Config(format!("invalid URL {raw:?}: {e}")))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed.to_string()),
        other => Err(ScrapeError::Config(format!(
            "unsupported URL scheme {other:?} in {raw:?}"
        ))),
    }
}

/// Resolve the Chromium binary: explicit path, then env, then discovery.
pub fn resolve_chromium_path(explicit: Option<&std::path::Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    crate::renderer::chromium::find_chromium()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_attempts_rejected() {
        let err = RetryPolicy::new(0, Duration::ZERO, Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, ScrapeError::Config(_)));
        assert!(RetryPolicy::new(1, Duration::ZERO, Duration::from_secs(1)).is_ok());
    }

    #[test]
    fn test_zero_timeouts_rejected() {
        let err = RetryPolicy::new(5, Duration::from_secs(5), Duration::ZERO).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid configuration: timeout must be greater than zero"
        );
        assert!(matches!(
            non_zero("nav-timeout", Duration::ZERO),
            Err(ScrapeError::Config(ref m)) if m == "nav-timeout must be greater than zero"
        ));
        assert_eq!(
            non_zero("nav-timeout", Duration::from_secs(30)).unwrap(),
            Duration::from_secs(30)
        );
    }

    #[test]
    fn test_default_policy_matches_constants() {
        let p = RetryPolicy::default();
        assert_eq!(p.attempts, 5);
        assert_eq!(p.delay, Duration::from_secs(5));
        assert_eq!(p.timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_url_precedence() {
        assert_eq!(
            resolve_url_from(Some("https://a.example/"), Some("https://b.example/")).unwrap(),
            "https://a.example/"
        );
        assert_eq!(
            resolve_url_from(None, Some("https://b.example/")).unwrap(),
            "https://b.example/"
        );
        assert_eq!(resolve_url_from(None, None).unwrap(), DEFAULT_URL);
        // blank env is ignored
        assert_eq!(resolve_url_from(None, Some("  ")).unwrap(), DEFAULT_URL);
    }

    #[test]
    fn test_url_validation() {
        assert!(matches!(
            resolve_url_from(Some("not a url"), None),
            Err(ScrapeError::Config(_))
        ));
        assert!(matches!(
            resolve_url_from(Some("ftp://example.com/"), None),
            Err(ScrapeError::Config(_))
        ));
    }

    #[test]
    fn test_explicit_chromium_path_wins() {
        let p = PathBuf::from("/opt/chrome/chrome");
        assert_eq!(resolve_chromium_path(Some(p.as_path())), Some(p.clone()));
    }
}

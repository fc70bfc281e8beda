//! Error taxonomy shared by both retrieval paths.

/// All errors a retrieval can end with.
///
/// Every variant is terminal for the path that produced it. The static and
/// rendered paths fail independently of each other.
#[derive(thiserror::Error, Debug)]
pub enum ScrapeError {
    /// Every HTTP attempt failed.
    #[error("failed to retrieve the webpage after {attempts} attempts: {last_error}")]
    RetriesExhausted { attempts: u32, last_error: String },

    /// The markup held fewer counter elements than expected.
    #[error("failed to extract the data from the webpage (found {found} of {expected} counters)")]
    MissingCounters { found: usize, expected: usize },

    /// An XPath matched nothing in the rendered page.
    #[error("element for {field} not found at {xpath}")]
    ElementNotFound { field: &'static str, xpath: String },

    /// A counter's text did not normalize to an integer.
    #[error("counter {field} is not a number: {raw:?}")]
    InvalidCounter { field: &'static str, raw: String },

    /// Browser launch or automation failure.
    #[error("browser automation error: {0}")]
    Browser(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl ScrapeError {
    /// Wrap a browser-seam error, keeping its full context chain.
    pub fn browser(e: anyhow::Error) -> Self {
        ScrapeError::Browser(format!("{e:#}"))
    }

    /// Whether this error came from the network rather than the page structure.
    pub fn is_transient(&self) -> bool {
        matches!(self, ScrapeError::RetriesExhausted { .. } | ScrapeError::Http(_))
    }
}

pub type ScrapeResult<T> = Result<T, ScrapeError>;

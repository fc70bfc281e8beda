//! The three counters read from the page, and their normalization.

use crate::error::{ScrapeError, ScrapeResult};
use serde::Serialize;

/// Field names, in page order.
pub const FIELDS: [&str; 3] = ["cases", "deaths", "recovered"];

/// Which retrieval path produced a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Static,
    Rendered,
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Source::Static => f.write_str("static"),
            Source::Rendered => f.write_str("rendered"),
        }
    }
}

/// Normalized counters from a single retrieval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetricSnapshot {
    pub cases: u64,
    pub deaths: u64,
    pub recovered: u64,
}

impl MetricSnapshot {
    /// Build a snapshot from raw counter text in page order
    /// (cases, deaths, recovered).
    pub fn from_raw(raw: [&str; 3]) -> ScrapeResult<Self> {
        let [cases, deaths, recovered] = raw;
        Ok(Self {
            cases: normalize_field(FIELDS[0], cases)?,
            deaths: normalize_field(FIELDS[1], deaths)?,
            recovered: normalize_field(FIELDS[2], recovered)?,
        })
    }

    /// Values grouped for display, in page order.
    pub fn formatted(&self) -> [String; 3] {
        [
            group_thousands(self.cases),
            group_thousands(self.deaths),
            group_thousands(self.recovered),
        ]
    }
}

/// Strip whitespace and thousands separators, then parse.
///
/// Returns `None` for empty or non-numeric text.
pub fn normalize_counter(raw: &str) -> Option<u64> {
    let digits: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ',')
        .collect();
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

fn normalize_field(field: &'static str, raw: &str) -> ScrapeResult<u64> {
    normalize_counter(raw).ok_or_else(|| ScrapeError::InvalidCounter {
        field,
        raw: raw.to_string(),
    })
}

/// Render an integer with a space between each group of three digits.
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(' ');
        }
        out.push(ch);
    }
    out
}

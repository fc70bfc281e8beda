//! Console rendering for a snapshot: a one-row table or a JSON object.

use crate::snapshot::{MetricSnapshot, Source};
use serde_json::{json, Value};

/// Column headers, in page order.
pub const COLUMNS: [&str; 3] = ["Total Cases", "Total Deaths", "Total Recovered"];

const COLUMN_GAP: &str = "  ";

/// Output style chosen on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    #[default]
    Table,
    Json,
}

/// Render the header row and the single value row, right-aligned.
pub fn render_table(snapshot: &MetricSnapshot) -> String {
    let values = snapshot.formatted();
    let widths: Vec<usize> = COLUMNS
        .iter()
        .zip(values.iter())
        .map(|(h, v)| h.chars().count().max(v.chars().count()))
        .collect();

    let header = COLUMNS
        .iter()
        .zip(widths.iter().copied())
        .map(|(h, w)| format!("{h:>w$}"))
        .collect::<Vec<_>>()
        .join(COLUMN_GAP);
    let row = values
        .iter()
        .zip(widths.iter().copied())
        .map(|(v, w)| format!("{v:>w$}"))
        .collect::<Vec<_>>()
        .join(COLUMN_GAP);

    format!("{header}\n{row}")
}

/// The full console block printed after a successful retrieval.
pub fn render_summary(snapshot: &MetricSnapshot) -> String {
    format!(
        "\nCleaned Dataframe:\n\nCOVID-19 Data\n{}",
        render_table(snapshot)
    )
}

/// Machine-readable form carrying both raw and grouped values.
pub fn to_json(source: Source, snapshot: &MetricSnapshot) -> Value {
    let [cases, deaths, recovered] = snapshot.formatted();
    json!({
        "source": source,
        "total_cases": snapshot.cases,
        "total_deaths": snapshot.deaths,
        "total_recovered": snapshot.recovered,
        "formatted": {
            "total_cases": cases,
            "total_deaths": deaths,
            "total_recovered": recovered,
        },
    })
}

/// Print a snapshot to stdout in the requested mode.
pub fn print_snapshot(mode: OutputMode, source: Source, snapshot: &MetricSnapshot) {
    match mode {
        OutputMode::Table => println!("{}", render_summary(snapshot)),
        OutputMode::Json => println!("{}", to_json(source, snapshot)),
    }
}

/// Print a failed retrieval in the requested mode.
pub fn print_failure(mode: OutputMode, source: Source, message: &str) {
    match mode {
        OutputMode::Table => println!("{message}"),
        OutputMode::Json => println!(
            "{}",
            json!({ "source": source, "error": true, "message": message })
        ),
    }
}

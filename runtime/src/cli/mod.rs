//! CLI subcommand implementations for the covid-counters binary.

pub mod doctor;
pub mod fetch_cmd;

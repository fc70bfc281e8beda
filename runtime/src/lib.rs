// Copyright 2026 covid-counters contributors
// SPDX-License-Identifier: Apache-2.0

//! covid-counters library: read the worldwide case, death and recovery
//! counters from a statistics page, either from raw HTML or from a driven
//! browser.
//!
//! This library crate exposes the core modules for integration testing.

pub mod acquisition;
pub mod cli;
pub mod config;
pub mod error;
pub mod renderer;
pub mod report;
pub mod snapshot;

pub use error::{ScrapeError, ScrapeResult};
pub use snapshot::{MetricSnapshot, Source};

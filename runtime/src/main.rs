// Copyright 2026 covid-counters contributors
// SPDX-License-Identifier: Apache-2.0

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;
use std::time::Duration;

use covid_counters::cli;
use covid_counters::config::{self, BrowserOptions, RetryPolicy, ScrapeConfig};
use covid_counters::report::OutputMode;
use covid_counters::Source;

#[derive(Parser)]
#[command(
    name = "covid-counters",
    about = "Read the worldwide COVID-19 counters over HTTP and through a driven browser",
    version,
    after_help = "Run with no command to try both retrieval paths in order."
)]
struct Cli {
    /// Page to read the counters from (also COVID_COUNTERS_URL)
    #[arg(long, global = true)]
    url: Option<String>,

    /// Total HTTP attempts for the static fetch
    #[arg(long, global = true, default_value_t = config::DEFAULT_ATTEMPTS)]
    attempts: u32,

    /// Seconds to wait between HTTP attempts
    #[arg(long, global = true, default_value_t = config::DEFAULT_RETRY_DELAY.as_secs())]
    retry_delay: u64,

    /// Per-request HTTP timeout in seconds
    #[arg(long, global = true, default_value_t = config::DEFAULT_REQUEST_TIMEOUT.as_secs())]
    timeout: u64,

    /// Browser navigation timeout in seconds
    #[arg(long, global = true, default_value_t = config::DEFAULT_NAV_TIMEOUT.as_secs())]
    nav_timeout: u64,

    /// Chromium binary (also COVID_COUNTERS_CHROMIUM_PATH)
    #[arg(long, global = true)]
    chromium: Option<PathBuf>,

    /// Show the browser window instead of running headless
    #[arg(long, global = true)]
    headed: bool,

    /// Output results as JSON (machine-readable)
    #[arg(long, global = true)]
    json: bool,

    /// Log level when RUST_LOG is unset (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the static retrieval, then the rendered one (default)
    All,
    /// Fetch the page over HTTP and parse the markup
    Static,
    /// Drive Chromium to the page and read the rendered DOM
    Rendered,
    /// Check Chromium availability and the target page
    Doctor,
    /// Generate shell completion scripts
    Completions {
        /// Shell type (bash, zsh, fish, powershell)
        shell: Shell,
    },
}

impl Cli {
    fn scrape_config(&self) -> Result<ScrapeConfig> {
        Ok(ScrapeConfig {
            url: config::resolve_url(self.url.as_deref())?,
            retry: RetryPolicy::new(
                self.attempts,
                Duration::from_secs(self.retry_delay),
                Duration::from_secs(self.timeout),
            )?,
            nav_timeout: config::non_zero(
                "nav-timeout",
                Duration::from_secs(self.nav_timeout),
            )?,
            browser: BrowserOptions {
                chromium_path: self.chromium.clone(),
                headed: self.headed,
            },
        })
    }
}

fn init_tracing(level: &str, json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn run(cli: &Cli, mode: OutputMode) -> Result<()> {
    let sources: &[Source] = match &cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = Cli::command();
            clap_complete::generate(*shell, &mut cmd, "covid-counters", &mut std::io::stdout());
            return Ok(());
        }
        Some(Commands::Doctor) => return cli::doctor::run(&cli.scrape_config()?).await,
        None | Some(Commands::All) => &[Source::Static, Source::Rendered],
        Some(Commands::Static) => &[Source::Static],
        Some(Commands::Rendered) => &[Source::Rendered],
    };

    cli::fetch_cmd::run(sources, &cli.scrape_config()?, mode).await
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level, cli.log_json);

    let mode = if cli.json {
        OutputMode::Json
    } else {
        OutputMode::Table
    };

    let result = run(&cli, mode).await;

    // Consistent exit codes: 0=success, 1=error
    if let Err(e) = &result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }

    result
}

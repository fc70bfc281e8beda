//! Environment readiness check.

use crate::acquisition::http_client::HttpClient;
use crate::acquisition::static_fetch;
use crate::config::ScrapeConfig;
use anyhow::Result;

/// Check Chromium availability and whether the target page still parses.
pub async fn run(config: &ScrapeConfig) -> Result<()> {
    println!("covid-counters doctor");
    println!("=====================");
    println!();

    println!("OS:   {}", std::env::consts::OS);
    println!("Arch: {}", std::env::consts::ARCH);
    println!("URL:  {}", config.url);
    println!();

    let chromium = crate::config::resolve_chromium_path(config.browser.chromium_path.as_deref());
    match &chromium {
        Some(path) => println!("[OK] Chromium found: {}", path.display()),
        None => println!(
            "[!!] Chromium NOT found. Pass --chromium or set {}.",
            crate::config::CHROMIUM_PATH_ENV
        ),
    }

    // One attempt only; doctor reports, it does not retry.
    let client = HttpClient::new(config.retry.timeout)?;
    let page_ok = match client.get(&config.url, config.retry.timeout).await {
        Ok(resp) => {
            println!("[OK] Page reachable: HTTP {}", resp.status);
            match static_fetch::extract_counter_texts(&resp.body) {
                Ok(texts) => {
                    println!("[OK] Counters found: {}", texts.join(" | "));
                    true
                }
                Err(e) => {
                    println!("[!!] Page structure changed: {e}");
                    false
                }
            }
        }
        Err(e) => {
            println!("[!!] Page unreachable: {e}");
            false
        }
    };

    println!();
    println!(
        "Static retrieval:   {}",
        if page_ok { "READY" } else { "NOT READY" }
    );
    println!(
        "Rendered retrieval: {}",
        if chromium.is_some() && page_ok {
            "READY"
        } else {
            "NOT READY"
        }
    );

    Ok(())
}

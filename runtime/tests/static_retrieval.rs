//! Static retrieval against a local HTTP server.
//!
//! Covers the retry bound, exhaustion, and structural failures end to end
//! through reqwest and the markup parser.

use covid_counters::acquisition::static_fetch::fetch_static;
use covid_counters::cli::fetch_cmd;
use covid_counters::config::{RetryPolicy, ScrapeConfig};
use covid_counters::report::OutputMode;
use covid_counters::{ScrapeError, Source};
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PAGE: &str = r#"<!DOCTYPE html>
<html><body>
<div class="content-inner">
  <div id="maincounter-wrap" style="margin-top:15px">
    <h1>Coronavirus Cases:</h1>
    <div class="maincounter-number"><span style="color:#aaa">1,234 </span></div>
  </div>
  <div id="maincounter-wrap" style="margin-top:15px">
    <h1>Deaths:</h1>
    <div class="maincounter-number"><span>56</span></div>
  </div>
  <div id="maincounter-wrap" style="margin-top:15px;">
    <h1>Recovered:</h1>
    <div class="maincounter-number" style="color:#8ACA2B "><span>789,000</span></div>
  </div>
</div>
</body></html>"#;

const PAGE_PATH: &str = "/coronavirus/";

fn config_for(server: &MockServer) -> ScrapeConfig {
    ScrapeConfig {
        url: format!("{}{PAGE_PATH}", server.uri()),
        retry: RetryPolicy {
            attempts: 5,
            delay: Duration::ZERO,
            timeout: Duration::from_secs(5),
        },
        ..ScrapeConfig::default()
    }
}

#[tokio::test]
async fn succeeds_on_fifth_attempt_after_four_failures() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(PAGE_PATH))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(4)
        .expect(4)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(PAGE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(PAGE))
        .expect(1)
        .mount(&server)
        .await;

    let snapshot = fetch_static(&config_for(&server)).await.unwrap();
    assert_eq!(snapshot.cases, 1234);
    assert_eq!(snapshot.deaths, 56);
    assert_eq!(snapshot.recovered, 789_000);
    assert_eq!(snapshot.formatted(), ["1 234", "56", "789 000"]);
}

#[tokio::test]
async fn gives_up_after_five_failed_attempts() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(PAGE_PATH))
        .respond_with(ResponseTemplate::new(500))
        .expect(5)
        .mount(&server)
        .await;

    let err = fetch_static(&config_for(&server)).await.unwrap_err();
    match err {
        ScrapeError::RetriesExhausted { attempts, last_error } => {
            assert_eq!(attempts, 5);
            assert!(last_error.contains("500"), "last error: {last_error}");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn connection_refused_counts_as_a_failed_attempt() {
    let config = ScrapeConfig {
        // nothing listens on port 1
        url: "http://127.0.0.1:1/coronavirus/".to_string(),
        retry: RetryPolicy {
            attempts: 2,
            delay: Duration::ZERO,
            timeout: Duration::from_secs(5),
        },
        ..ScrapeConfig::default()
    };

    let err = fetch_static(&config).await.unwrap_err();
    assert!(matches!(
        err,
        ScrapeError::RetriesExhausted { attempts: 2, .. }
    ));
}

#[tokio::test]
async fn missing_counters_fail_without_retrying() {
    let server = MockServer::start().await;
    let truncated = r#"<html><body>
        <div class="maincounter-number"><span>1,234</span></div>
        <div class="maincounter-number"><span>56</span></div>
    </body></html>"#;
    Mock::given(method("GET"))
        .and(path(PAGE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(truncated))
        .expect(1)
        .mount(&server)
        .await;

    let err = fetch_static(&config_for(&server)).await.unwrap_err();
    assert!(matches!(
        err,
        ScrapeError::MissingCounters {
            found: 2,
            expected: 3
        }
    ));
}

#[tokio::test]
async fn failed_path_makes_the_run_fail() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    let mut config = config_for(&server);
    config.retry.attempts = 1;

    let result = fetch_cmd::run(&[Source::Static], &config, OutputMode::Json).await;
    let message = format!("{:#}", result.unwrap_err());
    assert_eq!(message, "1 of 1 retrieval(s) failed");
}

#[tokio::test]
async fn failed_path_does_not_stop_the_next_one() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(PAGE_PATH))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(PAGE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(PAGE))
        .expect(1)
        .mount(&server)
        .await;
    let mut config = config_for(&server);
    config.retry.attempts = 1;

    let sources = [Source::Static, Source::Static];
    let result = fetch_cmd::run(&sources, &config, OutputMode::Json).await;

    let message = format!("{:#}", result.unwrap_err());
    assert_eq!(message, "1 of 2 retrieval(s) failed");
    let requests = server.received_requests().await.unwrap_or_default();
    assert_eq!(requests.len(), 2);
}

#[tokio::test]
async fn successful_path_makes_the_run_succeed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(PAGE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string(PAGE))
        .mount(&server)
        .await;

    fetch_cmd::run(&[Source::Static], &config_for(&server), OutputMode::Table)
        .await
        .unwrap();
}

use std::collections::VecDeque;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{NaiveDate, TimeDelta};
use pagecatch_core::{build_report, NoUpdateReason, SiteDescriptor, SiteOutcome};
use pagecatch_engine::{
    DirSnapshotStore, FailureKind, FetchError, Fetcher, Pipeline, RawDocument, SummarizeError,
    Summarizer,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

/// Serves queued bodies to `ok_agent` and rejects every other identity.
struct ScriptedFetcher {
    ok_agent: String,
    pages: Mutex<VecDeque<String>>,
    attempts: Mutex<Vec<String>>,
}

impl ScriptedFetcher {
    fn new(ok_agent: &str, pages: &[&str]) -> Self {
        Self {
            ok_agent: ok_agent.to_string(),
            pages: Mutex::new(pages.iter().map(|p| p.to_string()).collect()),
            attempts: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl Fetcher for ScriptedFetcher {
    async fn fetch(&self, url: &str, user_agent: &str) -> Result<RawDocument, FetchError> {
        self.attempts.lock().unwrap().push(user_agent.to_string());
        if user_agent != self.ok_agent {
            return Err(FetchError {
                kind: FailureKind::HttpStatus(403),
                message: "403 Forbidden".to_string(),
            });
        }
        let body = self.pages.lock().unwrap().pop_front().unwrap_or_default();
        Ok(RawDocument {
            bytes: body.into_bytes(),
            content_type: Some("text/html; charset=utf-8".to_string()),
            final_url: url.to_string(),
        })
    }
}

struct EchoSummarizer;

#[async_trait::async_trait]
impl Summarizer for EchoSummarizer {
    async fn summarize(&self, text: &str) -> Result<String, SummarizeError> {
        Ok(format!("要約: {text}"))
    }
}

struct BrokenSummarizer;

#[async_trait::async_trait]
impl Summarizer for BrokenSummarizer {
    async fn summarize(&self, _text: &str) -> Result<String, SummarizeError> {
        Err(SummarizeError::EmptyResponse)
    }
}

fn store(dir: &TempDir) -> Arc<DirSnapshotStore> {
    let calls = Arc::new(AtomicI64::new(0));
    let base = NaiveDate::from_ymd_opt(2024, 3, 1)
        .unwrap()
        .and_hms_opt(9, 0, 0)
        .unwrap();
    Arc::new(DirSnapshotStore::with_clock(
        dir.path().to_path_buf(),
        Arc::new(move || base + TimeDelta::seconds(calls.fetch_add(1, Ordering::SeqCst))),
    ))
}

fn agents(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn second_fetch_with_appended_text_is_an_update() {
    pagecatch_logging::initialize_for_tests();
    let temp = TempDir::new().unwrap();
    let fetcher = Arc::new(ScriptedFetcher::new(
        "A",
        &["<p>A B C</p>", "<p>A B C D E</p>"],
    ));
    let pipeline =
        Pipeline::new(fetcher, store(&temp), agents(&["A"])).with_summarizer(Arc::new(EchoSummarizer));
    let site = SiteDescriptor::new("site A", "https://a.example/");

    let first = pipeline.process_site(&site).await;
    assert_eq!(
        first.outcome,
        SiteOutcome::NoUpdate {
            name: "site A".to_string(),
            reason: NoUpdateReason::NoBaseline,
        }
    );

    let second = pipeline.process_site(&site).await;
    assert_eq!(
        second.outcome,
        SiteOutcome::Updated {
            name: "site A".to_string(),
            url: "https://a.example/".to_string(),
            diff: "A B C D E".to_string(),
            summary: Some("要約: A B C D E".to_string()),
        }
    );

    let report = build_report(
        &[second.outcome],
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
    );
    assert!(report.body.contains("## site A\nhttps://a.example/\n\nA B C D E\n"));
}

#[tokio::test]
async fn unchanged_page_is_not_an_update() {
    let temp = TempDir::new().unwrap();
    let fetcher = Arc::new(ScriptedFetcher::new(
        "A",
        &["<p>same</p><script>noise()</script>", "<p>same</p><script>other()</script>"],
    ));
    let pipeline = Pipeline::new(fetcher, store(&temp), agents(&["A"]));
    let site = SiteDescriptor::new("s", "https://s.example/");

    pipeline.process_site(&site).await;
    let run = pipeline.process_site(&site).await;
    assert_eq!(
        run.outcome,
        SiteOutcome::NoUpdate {
            name: "s".to_string(),
            reason: NoUpdateReason::Unchanged,
        }
    );
}

#[tokio::test]
async fn japanese_update_is_not_summarized() {
    let temp = TempDir::new().unwrap();
    let fetcher = Arc::new(ScriptedFetcher::new("A", &["<p>お知らせ</p>", "<p>新しいお知らせ</p>"]));
    let pipeline =
        Pipeline::new(fetcher, store(&temp), agents(&["A"])).with_summarizer(Arc::new(EchoSummarizer));
    let site = SiteDescriptor::new("jp", "https://jp.example/");

    pipeline.process_site(&site).await;
    match pipeline.process_site(&site).await.outcome {
        SiteOutcome::Updated { diff, summary, .. } => {
            assert_eq!(diff, "新しいお知らせ");
            assert_eq!(summary, None);
        }
        other => panic!("expected update, got {other:?}"),
    }
}

#[tokio::test]
async fn summarizer_failure_still_reports_update() {
    let temp = TempDir::new().unwrap();
    let fetcher = Arc::new(ScriptedFetcher::new("A", &["<p>Old news</p>", "<p>Fresh news today</p>"]));
    let pipeline = Pipeline::new(fetcher, store(&temp), agents(&["A"]))
        .with_summarizer(Arc::new(BrokenSummarizer));
    let site = SiteDescriptor::new("en", "https://en.example/");

    pipeline.process_site(&site).await;
    match pipeline.process_site(&site).await.outcome {
        SiteOutcome::Updated { diff, summary, .. } => {
            assert_eq!(diff, "Fresh news today");
            assert_eq!(summary, None);
        }
        other => panic!("expected update, got {other:?}"),
    }
}

#[tokio::test]
async fn identity_fallback_reports_used_identity() {
    let temp = TempDir::new().unwrap();
    let fetcher = Arc::new(ScriptedFetcher::new("Y", &["<p>x</p>"]));
    let pipeline = Pipeline::new(fetcher.clone(), store(&temp), agents(&["X", "Y"]));
    let site = SiteDescriptor::new("s", "https://s.example/").with_user_agent("X");

    let run = pipeline.process_site(&site).await;
    assert_eq!(run.used_user_agent.as_deref(), Some("Y"));
    assert_eq!(*fetcher.attempts.lock().unwrap(), agents(&["X", "Y"]));
}

#[tokio::test]
async fn exhausted_identities_become_a_failed_outcome() {
    let temp = TempDir::new().unwrap();
    let fetcher = Arc::new(ScriptedFetcher::new("nobody", &[]));
    let pipeline = Pipeline::new(fetcher, store(&temp), agents(&["X", "Y"]));
    let site = SiteDescriptor::new("down", "https://down.example/");

    let run = pipeline.process_site(&site).await;
    assert_eq!(run.used_user_agent, None);
    let report = build_report(
        std::slice::from_ref(&run.outcome),
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
    );
    match run.outcome {
        SiteOutcome::Failed { message, .. } => assert!(message.contains("http status 403")),
        other => panic!("expected failure, got {other:?}"),
    }
    assert!(report
        .body
        .contains("Error processing down (https://down.example/):"));
    assert!(!report.body.contains("# 更新なし\ndown"));
    assert!(!report.body.contains("## down"));
}

#[tokio::test]
async fn locator_limits_comparison_to_region() {
    let temp = TempDir::new().unwrap();
    let fetcher = Arc::new(ScriptedFetcher::new(
        "A",
        &[
            r#"<div id="ad">ad 1</div><div id="news">item</div>"#,
            r#"<div id="ad">ad 2</div><div id="news">item</div>"#,
        ],
    ));
    let pipeline = Pipeline::new(fetcher, store(&temp), agents(&["A"]));
    let site = SiteDescriptor::new("n", "https://n.example/").with_locator("#news");

    pipeline.process_site(&site).await;
    let run = pipeline.process_site(&site).await;
    assert!(matches!(
        run.outcome,
        SiteOutcome::NoUpdate {
            reason: NoUpdateReason::Unchanged,
            ..
        }
    ));
}

#[tokio::test]
async fn xpath_locator_limits_comparison_to_region() {
    let temp = TempDir::new().unwrap();
    let fetcher = Arc::new(ScriptedFetcher::new(
        "A",
        &[
            r#"<div id="ad">ad 1</div><div id="news">item</div>"#,
            r#"<div id="ad">ad 2</div><div id="news">item</div>"#,
        ],
    ));
    let pipeline = Pipeline::new(fetcher, store(&temp), agents(&["A"]));
    let site = SiteDescriptor::new("n", "https://n.example/").with_locator("//div[@id='news']");

    pipeline.process_site(&site).await;
    let run = pipeline.process_site(&site).await;
    assert!(matches!(
        run.outcome,
        SiteOutcome::NoUpdate {
            reason: NoUpdateReason::Unchanged,
            ..
        }
    ));
}

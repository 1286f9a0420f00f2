//! End-to-end pipeline tests with a stubbed collector and a mock model

use async_trait::async_trait;
use magpie_collector::{CollectError, IssueCollector, IssueQuery};
use magpie_domain::{Platform, RawIssue};
use magpie_extract::DefectExtractor;
use magpie_llm::MockProvider;
use magpie_pipeline::{Pipeline, PipelineError, RunRequest};
use magpie_store::DefectStore;
use std::sync::Mutex;

struct StubCollector {
    issues: Vec<RawIssue>,
    fail_with_status: Option<u16>,
    seen_queries: Mutex<Vec<IssueQuery>>,
}

impl StubCollector {
    fn with_issues(issues: Vec<RawIssue>) -> Self {
        Self {
            issues,
            fail_with_status: None,
            seen_queries: Mutex::new(Vec::new()),
        }
    }

    fn failing(status: u16) -> Self {
        Self {
            issues: Vec::new(),
            fail_with_status: Some(status),
            seen_queries: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl IssueCollector for StubCollector {
    fn platform(&self) -> Platform {
        Platform::Github
    }

    async fn fetch_recent(&self, query: &IssueQuery) -> Result<Vec<RawIssue>, CollectError> {
        self.seen_queries.lock().unwrap().push(query.clone());
        if let Some(status) = self.fail_with_status {
            return Err(CollectError::Status {
                platform: Platform::Github,
                page: 1,
                status,
            });
        }
        Ok(self.issues.clone())
    }
}

fn issue(issue_id: i64, body: &str) -> RawIssue {
    RawIssue {
        platform: Platform::Github,
        issue_id,
        global_id: None,
        title: format!("issue {issue_id}"),
        body: body.to_string(),
        created_at: "2024-02-01T00:00:00Z".to_string(),
        updated_at: None,
        state: "open".to_string(),
        url: format!("https://github.com/o/r/issues/{issue_id}"),
    }
}

fn request() -> RunRequest {
    RunRequest {
        owner: "o".to_string(),
        repo: "r".to_string(),
        platform: Platform::Github,
        state: "open".to_string(),
        since: Some("2024-01-01".to_string()),
        until: None,
        repo_id: "1123".to_string(),
    }
}

#[tokio::test]
async fn test_run_persists_every_new_issue() {
    let store = DefectStore::open_in_memory().unwrap();
    let provider = MockProvider::new(r#"{"title": "extracted", "severity": "Low"}"#);
    let mut pipeline = Pipeline::new(store, DefectExtractor::new(provider));

    let collector = StubCollector::with_issues(vec![
        issue(1, "crashes on save in v2.5.1"),
        issue(2, "freezes on load"),
    ]);

    let inserted = pipeline.run_with_collector(&collector, &request()).await.unwrap();
    assert_eq!(inserted, 2);
    assert_eq!(pipeline.store().defect_count().unwrap(), 2);
    assert!(pipeline.store().is_duplicate("1123", 1).unwrap());
    assert!(pipeline.store().is_duplicate("1123", 2).unwrap());
}

#[tokio::test]
async fn test_rerun_is_idempotent_and_saves_model_spend() {
    let store = DefectStore::open_in_memory().unwrap();
    let provider = MockProvider::new(r#"{"title": "extracted"}"#);
    let mut pipeline = Pipeline::new(store, DefectExtractor::new(provider.clone()));

    let collector = StubCollector::with_issues(vec![issue(1, "a body"), issue(2, "b body")]);

    assert_eq!(
        pipeline.run_with_collector(&collector, &request()).await.unwrap(),
        2
    );
    let calls_after_first = provider.call_count();

    // Same issues again: nothing inserted, no further model calls
    assert_eq!(
        pipeline.run_with_collector(&collector, &request()).await.unwrap(),
        0
    );
    assert_eq!(provider.call_count(), calls_after_first);
    assert_eq!(pipeline.store().defect_count().unwrap(), 2);
}

#[tokio::test]
async fn test_unparsable_model_output_still_persists() {
    let store = DefectStore::open_in_memory().unwrap();
    let provider = MockProvider::new("not json at all");
    let mut pipeline = Pipeline::new(store, DefectExtractor::new(provider));

    let collector = StubCollector::with_issues(vec![issue(
        9,
        "App crashes on startup\nEvery time, since the last update",
    )]);

    let inserted = pipeline.run_with_collector(&collector, &request()).await.unwrap();
    assert_eq!(inserted, 1);
    assert!(pipeline.store().is_duplicate("1123", 9).unwrap());
}

#[tokio::test]
async fn test_empty_repo_id_is_rejected_before_fetching() {
    let store = DefectStore::open_in_memory().unwrap();
    let provider = MockProvider::new("{}");
    let mut pipeline = Pipeline::new(store, DefectExtractor::new(provider));

    let collector = StubCollector::with_issues(vec![issue(1, "x")]);
    let mut bad_request = request();
    bad_request.repo_id = String::new();

    let err = pipeline
        .run_with_collector(&collector, &bad_request)
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::MissingRepoId));
    assert!(collector.seen_queries.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_request_window_reaches_the_collector() {
    let store = DefectStore::open_in_memory().unwrap();
    let provider = MockProvider::new("{}");
    let mut pipeline = Pipeline::new(store, DefectExtractor::new(provider));

    let collector = StubCollector::with_issues(Vec::new());
    let mut req = request();
    req.state = "closed".to_string();
    req.until = Some("2024-06-01".to_string());

    pipeline.run_with_collector(&collector, &req).await.unwrap();

    let queries = collector.seen_queries.lock().unwrap();
    assert_eq!(queries.len(), 1);
    assert_eq!(queries[0].state, "closed");
    assert_eq!(queries[0].since.as_deref(), Some("2024-01-01"));
    assert_eq!(queries[0].until.as_deref(), Some("2024-06-01"));
}

#[tokio::test]
async fn test_collector_failure_aborts_the_run() {
    let store = DefectStore::open_in_memory().unwrap();
    let provider = MockProvider::new("{}");
    let mut pipeline = Pipeline::new(store, DefectExtractor::new(provider));

    let collector = StubCollector::failing(502);
    let err = pipeline
        .run_with_collector(&collector, &request())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Collect(CollectError::Status { status: 502, .. })
    ));
    assert_eq!(pipeline.store().defect_count().unwrap(), 0);
}

//! Magpie Pipeline Runner
//!
//! Orchestrates one collection run: pick the collector for the requested
//! platform, fetch its issues, and for each issue — skip if already
//! stored, clean, extract (rules + LLM), merge, persist.
//!
//! # Architecture
//!
//! ```text
//! RunRequest ──► collector_for ──► fetch_recent
//!                                     │
//!                     for each issue (creation-time order):
//!                     is_duplicate? ─► clean ─► rules + LLM ─► merge ─► insert
//! ```
//!
//! Processing is sequential: the storage gateway owns a single
//! connection, and issue order mirrors the upstream's creation-time
//! ordering. The duplicate pre-check only saves model spend — the store's
//! uniqueness constraint is what makes re-runs safe.
//!
//! # Examples
//!
//! ```no_run
//! use magpie_extract::DefectExtractor;
//! use magpie_llm::{LlmConfig, OpenRouterProvider};
//! use magpie_pipeline::{Pipeline, RunRequest};
//! use magpie_store::DefectStore;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = DefectStore::open("magpie.db")?;
//! let provider = OpenRouterProvider::new(LlmConfig::with_api_key("sk-or-..."));
//! let mut pipeline = Pipeline::new(store, DefectExtractor::new(provider));
//!
//! let request = RunRequest {
//!     owner: "Tencent".to_string(),
//!     repo: "WeUI".to_string(),
//!     platform: "github".parse()?,
//!     state: "open".to_string(),
//!     since: Some("2024-01-01".to_string()),
//!     until: None,
//!     repo_id: "1123".to_string(),
//! };
//! let inserted = pipeline.run(&request).await?;
//! println!("{inserted} new defects");
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

use magpie_collector::{
    CollectError, GiteeCollector, GithubCollector, GitlabCollector, IssueCollector, IssueQuery,
};
use magpie_domain::{Platform, RawIssue, StandardizedDefect};
use magpie_extract::{merge, rules, DefectExtractor};
use magpie_llm::CompletionProvider;
use magpie_store::{DefectStore, StoreError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors surfaced by a pipeline run
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The run had no repository identifier to key records by
    #[error("repo_id is required and was empty")]
    MissingRepoId,

    /// Issue collection failed
    #[error(transparent)]
    Collect(#[from] CollectError),

    /// Token lookup, duplicate check or insert hit a storage failure
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Parameters for one collection run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRequest {
    /// Repository owner or organization
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// Tracker platform to collect from
    pub platform: Platform,
    /// Issue state filter (open/closed/all)
    pub state: String,
    /// Optional lower creation-time bound (YYYY-MM-DD or ISO-8601)
    pub since: Option<String>,
    /// Optional upper creation-time bound (YYYY-MM-DD or ISO-8601)
    pub until: Option<String>,
    /// Repository identifier records are keyed by
    pub repo_id: String,
}

/// Build the collector for a platform tag.
///
/// The only place platform dispatch happens; call sites hold a trait
/// object and never branch on the tag again.
pub fn collector_for(
    platform: Platform,
    token: Option<String>,
    owner: &str,
    repo: &str,
) -> Box<dyn IssueCollector> {
    match platform {
        Platform::Github => Box::new(GithubCollector::new(token, owner, repo)),
        Platform::Gitee => Box::new(GiteeCollector::new(token, owner, repo)),
        Platform::Gitlab => Box::new(GitlabCollector::new(token, owner, repo)),
    }
}

/// One-repository-at-a-time ingestion pipeline
pub struct Pipeline<P: CompletionProvider> {
    store: DefectStore,
    extractor: DefectExtractor<P>,
}

impl<P: CompletionProvider> Pipeline<P> {
    /// Create a pipeline over a store and an extractor
    pub fn new(store: DefectStore, extractor: DefectExtractor<P>) -> Self {
        Self { store, extractor }
    }

    /// Run one collection pass, building the collector from the request.
    ///
    /// The platform token comes from the store; its absence is fine for
    /// public repositories. Returns the number of newly inserted records.
    pub async fn run(&mut self, request: &RunRequest) -> Result<u32, PipelineError> {
        let token = self.store.get_token(request.platform)?;
        if token.is_none() {
            debug!(platform = %request.platform, "no active token, collecting unauthenticated");
        }
        let collector = collector_for(request.platform, token, &request.owner, &request.repo);
        self.run_with_collector(collector.as_ref(), request).await
    }

    /// Run one collection pass with a caller-supplied collector.
    pub async fn run_with_collector(
        &mut self,
        collector: &dyn IssueCollector,
        request: &RunRequest,
    ) -> Result<u32, PipelineError> {
        if request.repo_id.is_empty() {
            return Err(PipelineError::MissingRepoId);
        }

        let query = IssueQuery {
            state: request.state.clone(),
            page_size: 100,
            since: request.since.clone(),
            until: request.until.clone(),
        };

        info!(
            platform = %request.platform,
            owner = %request.owner,
            repo = %request.repo,
            "collecting issues"
        );
        let issues = collector.fetch_recent(&query).await?;
        info!(count = issues.len(), "issues fetched");

        let mut inserted: u32 = 0;
        for issue in &issues {
            // Spend optimization only; the UNIQUE constraint is the
            // correctness boundary
            if self.store.is_duplicate(&request.repo_id, issue.issue_id)? {
                debug!(issue_id = issue.issue_id, "already persisted, skipping");
                continue;
            }

            let mut record = self.process_issue(issue).await;
            record.repo_id = request.repo_id.clone();

            match self.store.insert_one(&record) {
                Ok(Some(row_id)) => {
                    inserted += 1;
                    debug!(issue_id = issue.issue_id, row_id, "inserted");
                }
                Ok(None) => {
                    debug!(issue_id = issue.issue_id, "lost insert race, already persisted");
                }
                Err(err @ (StoreError::MissingKey(_) | StoreError::InvalidData(_))) => {
                    // A bad record should not sink the rest of the batch
                    warn!(issue_id = issue.issue_id, error = %err, "skipping unpersistable record");
                }
                Err(err) => return Err(err.into()),
            }
        }

        info!(inserted, "collection run complete");
        Ok(inserted)
    }

    /// Clean, extract (both passes) and merge a single issue.
    async fn process_issue(&self, issue: &RawIssue) -> StandardizedDefect {
        let cleaned = magpie_normalize::clean(&issue.body);
        let rule_version = rules::extract_version(&cleaned);
        let rule_steps = rules::extract_steps(&cleaned);
        let llm_fields = self.extractor.extract(&cleaned).await;
        merge(issue, &cleaned, rule_version, rule_steps, llm_fields)
    }

    /// Access the underlying store (counts, token management)
    pub fn store(&self) -> &DefectStore {
        &self.store
    }

    /// Mutable access to the underlying store
    pub fn store_mut(&mut self) -> &mut DefectStore {
        &mut self.store
    }
}

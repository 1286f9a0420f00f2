//! GitHub-style collector (REST v3 issues API)

use crate::error::CollectError;
use crate::window::TimeWindow;
use crate::{item_time, text, text_opt, IssueCollector, IssueQuery, REQUEST_TIMEOUT_SECS};
use async_trait::async_trait;
use chrono::SecondsFormat;
use magpie_domain::{Platform, RawIssue};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

/// Default GitHub API endpoint
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// Collector for GitHub-style trackers
///
/// The issues endpoint mixes pull requests into its results and only
/// supports a lower time bound (`since`) server-side; PRs and the upper
/// bound are filtered here after each page arrives.
pub struct GithubCollector {
    api_base: String,
    token: Option<String>,
    owner: String,
    repo: String,
    client: reqwest::Client,
}

impl GithubCollector {
    /// Create a collector for `owner/repo`.
    ///
    /// `token` is optional; unauthenticated requests work against public
    /// repositories at a much lower rate limit.
    pub fn new(token: Option<String>, owner: impl Into<String>, repo: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent("magpie-collector")
            .build()
            .unwrap();

        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            token,
            owner: owner.into(),
            repo: repo.into(),
            client,
        }
    }

    /// Point the collector at a different API base (GitHub Enterprise)
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }
}

#[async_trait]
impl IssueCollector for GithubCollector {
    fn platform(&self) -> Platform {
        Platform::Github
    }

    async fn fetch_recent(&self, query: &IssueQuery) -> Result<Vec<RawIssue>, CollectError> {
        if self.owner.is_empty() || self.repo.is_empty() {
            return Err(CollectError::MissingRepository {
                platform: Platform::Github,
            });
        }
        let window = TimeWindow::parse(query.since.as_deref(), query.until.as_deref())?;

        let url = format!("{}/repos/{}/{}/issues", self.api_base, self.owner, self.repo);
        let mut all = Vec::new();
        let mut page: u32 = 1;

        loop {
            let mut params: Vec<(&str, String)> = vec![
                ("state", query.state.clone()),
                ("per_page", query.page_size.to_string()),
                ("page", page.to_string()),
                ("sort", "created".to_string()),
                ("direction", "asc".to_string()),
            ];
            if let Some(since) = window.since {
                // Lower bound is enforced upstream
                params.push(("since", since.to_rfc3339_opts(SecondsFormat::Secs, true)));
            }

            let mut request = self.client.get(&url).query(&params);
            if let Some(token) = &self.token {
                request = request.header("Authorization", format!("token {token}"));
            }

            debug!(page, url = %url, "fetching github issues page");
            let response = request.send().await.map_err(|source| CollectError::Request {
                platform: Platform::Github,
                page,
                source,
            })?;

            let status = response.status();
            if !status.is_success() {
                return Err(CollectError::Status {
                    platform: Platform::Github,
                    page,
                    status: status.as_u16(),
                });
            }

            let items: Vec<Value> =
                response.json().await.map_err(|source| CollectError::Decode {
                    platform: Platform::Github,
                    page,
                    source,
                })?;

            if items.is_empty() {
                break;
            }

            all.extend(sift_page(&items, &window, page)?);
            page += 1;
        }

        info!(owner = %self.owner, repo = %self.repo, count = all.len(), "github fetch complete");
        Ok(all)
    }
}

/// Keep the real issues on one page: drop pull requests, apply the upper
/// time bound client-side, map fields into [`RawIssue`].
fn sift_page(items: &[Value], window: &TimeWindow, page: u32) -> Result<Vec<RawIssue>, CollectError> {
    let mut issues = Vec::new();
    for item in items {
        // The issues endpoint returns PRs too; they carry a pull_request key
        if item.get("pull_request").is_some() {
            continue;
        }

        let created_raw = text(item, "created_at");
        let created = item_time(&created_raw, page)?;
        if let Some(until) = window.until {
            if created > until {
                continue;
            }
        }

        issues.push(RawIssue {
            platform: Platform::Github,
            issue_id: item.get("number").and_then(Value::as_i64).unwrap_or_default(),
            global_id: None,
            title: text(item, "title"),
            body: text(item, "body"),
            created_at: created_raw,
            updated_at: text_opt(item, "updated_at"),
            state: text(item, "state"),
            url: text(item, "html_url"),
        });
    }
    Ok(issues)
}

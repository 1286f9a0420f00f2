//! Gitee-style collector (API v5)

use crate::error::CollectError;
use crate::window::TimeWindow;
use crate::{item_time, text, text_opt, IssueCollector, IssueQuery, REQUEST_TIMEOUT_SECS};
use async_trait::async_trait;
use magpie_domain::{Platform, RawIssue};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

/// Default Gitee API endpoint
pub const DEFAULT_API_BASE: &str = "https://gitee.com/api/v5";

/// Pause between page requests; this upstream rate-limits aggressively
pub const PAGE_DELAY_MS: u64 = 500;

/// Collector for Gitee-style trackers
///
/// The upstream API has no server-side time filters, so both window bounds
/// are applied client-side. The token travels as an `access_token` query
/// parameter rather than a header.
pub struct GiteeCollector {
    api_base: String,
    token: Option<String>,
    owner: String,
    repo: String,
    client: reqwest::Client,
}

impl GiteeCollector {
    /// Create a collector for `owner/repo`
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

    /// Point the collector at a different API base
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }
}

#[async_trait]
impl IssueCollector for GiteeCollector {
    fn platform(&self) -> Platform {
        Platform::Gitee
    }

    async fn fetch_recent(&self, query: &IssueQuery) -> Result<Vec<RawIssue>, CollectError> {
        if self.owner.is_empty() || self.repo.is_empty() {
            return Err(CollectError::MissingRepository {
                platform: Platform::Gitee,
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
            if let Some(token) = &self.token {
                params.push(("access_token", token.clone()));
            }

            debug!(page, url = %url, "fetching gitee issues page");
            let response = self
                .client
                .get(&url)
                .query(&params)
                .send()
                .await
                .map_err(|source| CollectError::Request {
                    platform: Platform::Gitee,
                    page,
                    source,
                })?;

            let status = response.status();
            if !status.is_success() {
                return Err(CollectError::Status {
                    platform: Platform::Gitee,
                    page,
                    status: status.as_u16(),
                });
            }

            let items: Vec<Value> =
                response.json().await.map_err(|source| CollectError::Decode {
                    platform: Platform::Gitee,
                    page,
                    source,
                })?;

            if items.is_empty() {
                break;
            }

            all.extend(sift_page(&items, &window, page)?);
            page += 1;

            // Politeness throttle between pages
            tokio::time::sleep(Duration::from_millis(PAGE_DELAY_MS)).await;
        }

        info!(owner = %self.owner, repo = %self.repo, count = all.len(), "gitee fetch complete");
        Ok(all)
    }
}

/// Drop pull requests and apply BOTH window bounds client-side — the
/// upstream cannot do either.
fn sift_page(items: &[Value], window: &TimeWindow, page: u32) -> Result<Vec<RawIssue>, CollectError> {
    let mut issues = Vec::new();
    for item in items {
        if item.get("pull_request").is_some() {
            continue;
        }

        let created_raw = text(item, "created_at");
        let created = item_time(&created_raw, page)?;
        if !window.contains(created) {
            continue;
        }

        issues.push(RawIssue {
            platform: Platform::Gitee,
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

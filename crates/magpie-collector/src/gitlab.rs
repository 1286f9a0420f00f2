//! GitLab-style collector (API v4)

use crate::error::CollectError;
use crate::window::TimeWindow;
use crate::{item_time, text, text_opt, IssueCollector, IssueQuery, REQUEST_TIMEOUT_SECS};
use async_trait::async_trait;
use chrono::SecondsFormat;
use magpie_domain::{Platform, RawIssue};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

/// Default GitLab API endpoint
pub const DEFAULT_API_BASE: &str = "https://gitlab.com/api/v4";

/// GitLab caps per_page at 100
const MAX_PAGE_SIZE: u32 = 100;

/// Collector for GitLab-style trackers
///
/// Projects are addressed either by URL-encoded `owner/repo` path or by
/// numeric project id. Both window bounds are supported server-side via
/// `created_after`/`created_before`, so no client-side time filtering is
/// needed. Issues carry a tracker-global id alongside the per-project
/// `iid`; both are preserved.
pub struct GitlabCollector {
    api_base: String,
    token: Option<String>,
    project: String,
    client: reqwest::Client,
}

impl GitlabCollector {
    /// Create a collector for the project at `owner/repo`
    pub fn new(token: Option<String>, owner: impl Into<String>, repo: impl Into<String>) -> Self {
        let owner = owner.into();
        let repo = repo.into();
        let project = if owner.is_empty() || repo.is_empty() {
            String::new()
        } else {
            format!("{owner}/{repo}")
        };
        Self::for_project(token, project)
    }

    /// Create a collector for a numeric project id
    pub fn with_project_id(token: Option<String>, project_id: i64) -> Self {
        Self::for_project(token, project_id.to_string())
    }

    fn for_project(token: Option<String>, project: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent("magpie-collector")
            .build()
            .unwrap();

        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            token,
            project,
            client,
        }
    }

    /// Point the collector at a different API base (self-hosted GitLab)
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Issues URL with the project path percent-encoded as one segment
    /// (`owner/repo` becomes `owner%2Frepo`)
    fn issues_url(&self) -> Url {
        let mut url = Url::parse(&self.api_base).expect("api base must be an absolute URL");
        url.path_segments_mut()
            .expect("api base cannot be a base URL")
            .extend(["projects", self.project.as_str(), "issues"]);
        url
    }
}

/// Map the caller-facing state filter onto GitLab's vocabulary
fn upstream_state(state: &str) -> Option<&'static str> {
    match state {
        "open" | "opened" => Some("opened"),
        "closed" => Some("closed"),
        // "all" (and anything else) means no state filter upstream
        _ => None,
    }
}

#[async_trait]
impl IssueCollector for GitlabCollector {
    fn platform(&self) -> Platform {
        Platform::Gitlab
    }

    async fn fetch_recent(&self, query: &IssueQuery) -> Result<Vec<RawIssue>, CollectError> {
        if self.project.is_empty() {
            return Err(CollectError::MissingRepository {
                platform: Platform::Gitlab,
            });
        }
        let window = TimeWindow::parse(query.since.as_deref(), query.until.as_deref())?;

        let url = self.issues_url();
        let mut all = Vec::new();
        let mut page: u32 = 1;

        loop {
            let mut params: Vec<(&str, String)> = vec![
                ("per_page", query.page_size.min(MAX_PAGE_SIZE).to_string()),
                ("page", page.to_string()),
                ("order_by", "created_at".to_string()),
                ("sort", "asc".to_string()),
            ];
            if let Some(state) = upstream_state(&query.state) {
                params.push(("state", state.to_string()));
            }
            // Both bounds are enforced upstream
            if let Some(since) = window.since {
                params.push((
                    "created_after",
                    since.to_rfc3339_opts(SecondsFormat::Secs, true),
                ));
            }
            if let Some(until) = window.until {
                params.push((
                    "created_before",
                    until.to_rfc3339_opts(SecondsFormat::Secs, true),
                ));
            }

            let mut request = self.client.get(url.clone()).query(&params);
            if let Some(token) = &self.token {
                request = request.header("PRIVATE-TOKEN", token);
            }

            debug!(page, url = %url, "fetching gitlab issues page");
            let response = request.send().await.map_err(|source| CollectError::Request {
                platform: Platform::Gitlab,
                page,
                source,
            })?;

            let status = response.status();
            if !status.is_success() {
                return Err(CollectError::Status {
                    platform: Platform::Gitlab,
                    page,
                    status: status.as_u16(),
                });
            }

            let items: Vec<Value> =
                response.json().await.map_err(|source| CollectError::Decode {
                    platform: Platform::Gitlab,
                    page,
                    source,
                })?;

            if items.is_empty() {
                break;
            }

            all.extend(sift_page(&items, page)?);
            page += 1;
        }

        info!(project = %self.project, count = all.len(), "gitlab fetch complete");
        Ok(all)
    }
}

/// Map one page of GitLab issues; time filtering already happened upstream.
fn sift_page(items: &[Value], page: u32) -> Result<Vec<RawIssue>, CollectError> {
    let mut issues = Vec::new();
    for item in items {
        if item.get("pull_request").is_some() || item.get("merge_request").is_some() {
            continue;
        }

        let created_raw = text(item, "created_at");
        // Validate even though no client-side filter applies
        item_time(&created_raw, page)?;

        issues.push(RawIssue {
            platform: Platform::Gitlab,
            issue_id: item.get("iid").and_then(Value::as_i64).unwrap_or_default(),
            global_id: item.get("id").and_then(Value::as_i64),
            title: text(item, "title"),
            body: text(item, "description"),
            created_at: created_raw,
            updated_at: text_opt(item, "updated_at"),
            state: text(item, "state"),
            url: text(item, "web_url"),
        });
    }
    Ok(issues)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_issues_url_encodes_project_path() {
        let collector = GitlabCollector::new(None, "gnachman", "iterm2");
        assert_eq!(
            collector.issues_url().as_str(),
            "https://gitlab.com/api/v4/projects/gnachman%2Fiterm2/issues"
        );
    }

    #[test]
    fn test_issues_url_with_numeric_project_id() {
        let collector = GitlabCollector::with_project_id(None, 278964);
        assert!(collector
            .issues_url()
            .as_str()
            .ends_with("/projects/278964/issues"));
    }

    #[test]
    fn test_upstream_state_mapping() {
        assert_eq!(upstream_state("open"), Some("opened"));
        assert_eq!(upstream_state("opened"), Some("opened"));
        assert_eq!(upstream_state("closed"), Some("closed"));
        assert_eq!(upstream_state("all"), None);
    }

    #[test]
    fn test_sift_keeps_both_identifiers() {
        let items = vec![json!({
            "iid": 42,
            "id": 987654,
            "title": "crash",
            "description": "segfault on open",
            "created_at": "2024-04-01T10:00:00Z",
            "updated_at": "2024-04-02T10:00:00Z",
            "state": "opened",
            "web_url": "https://gitlab.com/o/r/-/issues/42"
        })];
        let issues = sift_page(&items, 1).unwrap();
        assert_eq!(issues[0].issue_id, 42);
        assert_eq!(issues[0].global_id, Some(987654));
        assert_eq!(issues[0].body, "segfault on open");
        assert_eq!(issues[0].url, "https://gitlab.com/o/r/-/issues/42");
    }

    #[test]
    fn test_missing_project_is_rejected() {
        let collector = GitlabCollector::new(None, "", "repo");
        let err = tokio_test::block_on(collector.fetch_recent(&IssueQuery::default()));
        assert!(matches!(
            err,
            Err(CollectError::MissingRepository { platform: Platform::Gitlab })
        ));
    }
}

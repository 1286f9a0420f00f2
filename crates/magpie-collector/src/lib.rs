//! Magpie Platform Collectors
//!
//! Paginated issue collection from the three supported tracker APIs.
//!
//! # Architecture
//!
//! One trait, three variants:
//!
//! - [`GithubCollector`] — `since` filtered server-side, `until` client-side
//! - [`GiteeCollector`] — no upstream time filters, both bounds client-side,
//!   paced page requests (the upstream rate-limits aggressively)
//! - [`GitlabCollector`] — both bounds server-side via
//!   `created_after`/`created_before`
//!
//! Shared contract: pagination runs from page 1 until the first empty page,
//! pull/merge requests are excluded, results ascend by creation time, and
//! network failures carry the page number they occurred on. Collectors do
//! not retry; the caller decides whether to re-run the whole fetch.
//!
//! # Examples
//!
//! ```no_run
//! use magpie_collector::{GithubCollector, IssueCollector, IssueQuery};
//!
//! # async fn example() -> Result<(), magpie_collector::CollectError> {
//! let collector = GithubCollector::new(Some("token".into()), "rust-lang", "rust");
//! let query = IssueQuery::default().with_since("2024-01-01");
//! let issues = collector.fetch_recent(&query).await?;
//! println!("fetched {} issues", issues.len());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod error;
mod gitee;
mod github;
mod gitlab;
mod window;

use async_trait::async_trait;
use magpie_domain::{Platform, RawIssue};
use serde_json::Value;

pub use error::CollectError;
pub use gitee::GiteeCollector;
pub use github::GithubCollector;
pub use gitlab::GitlabCollector;
pub use window::{parse_bound, TimeWindow};

/// Fixed per-request timeout for tracker API calls
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Query parameters for a collection run
#[derive(Debug, Clone)]
pub struct IssueQuery {
    /// Issue state filter (open/closed/all)
    pub state: String,
    /// Items requested per page
    pub page_size: u32,
    /// Optional lower bound on creation time (YYYY-MM-DD or ISO-8601)
    pub since: Option<String>,
    /// Optional upper bound on creation time (YYYY-MM-DD or ISO-8601)
    pub until: Option<String>,
}

impl Default for IssueQuery {
    fn default() -> Self {
        Self {
            state: "open".to_string(),
            page_size: 100,
            since: None,
            until: None,
        }
    }
}

impl IssueQuery {
    /// Set the state filter
    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = state.into();
        self
    }

    /// Set the page size
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Set the lower creation-time bound
    pub fn with_since(mut self, since: impl Into<String>) -> Self {
        self.since = Some(since.into());
        self
    }

    /// Set the upper creation-time bound
    pub fn with_until(mut self, until: impl Into<String>) -> Self {
        self.until = Some(until.into());
        self
    }
}

/// A paginated issue source for one tracker platform
#[async_trait]
pub trait IssueCollector: Send + Sync {
    /// The platform this collector talks to
    fn platform(&self) -> Platform;

    /// Fetch all issues matching `query`, ascending by creation time.
    ///
    /// Pull/merge requests are excluded. Pagination stops at the first
    /// empty page. Errors identify the page they occurred on.
    async fn fetch_recent(&self, query: &IssueQuery) -> Result<Vec<RawIssue>, CollectError>;
}

/// String field lookup on an upstream JSON item; absent or null becomes ""
pub(crate) fn text(item: &Value, key: &str) -> String {
    item.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Optional string field lookup on an upstream JSON item
pub(crate) fn text_opt(item: &Value, key: &str) -> Option<String> {
    item.get(key).and_then(Value::as_str).map(str::to_string)
}

/// Parse an item's created_at, reporting the page on failure
pub(crate) fn item_time(
    value: &str,
    page: u32,
) -> Result<chrono::DateTime<chrono::Utc>, CollectError> {
    chrono::DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&chrono::Utc))
        .map_err(|_| CollectError::InvalidItemTimestamp {
            page,
            value: value.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_text_helpers_tolerate_missing_and_null() {
        let item = json!({"title": "t", "body": null});
        assert_eq!(text(&item, "title"), "t");
        assert_eq!(text(&item, "body"), "");
        assert_eq!(text(&item, "absent"), "");
        assert_eq!(text_opt(&item, "body"), None);
        assert_eq!(text_opt(&item, "title"), Some("t".to_string()));
    }

    #[test]
    fn test_item_time_reports_page() {
        match item_time("not-a-time", 4) {
            Err(CollectError::InvalidItemTimestamp { page, value }) => {
                assert_eq!(page, 4);
                assert_eq!(value, "not-a-time");
            }
            other => panic!("expected InvalidItemTimestamp, got {other:?}"),
        }
    }
}

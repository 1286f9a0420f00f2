//! Raw issue records as fetched from an upstream tracker

use crate::platform::Platform;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One issue exactly as a collector fetched it, before any cleaning
///
/// Immutable once returned by a collector; the pipeline consumes it by
/// value. `created_at` keeps the upstream's ISO-8601 string so the original
/// timestamp is persisted verbatim — use [`RawIssue::created_time`] when a
/// parsed instant is needed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawIssue {
    /// Tracker the issue came from
    pub platform: Platform,

    /// Per-repository issue number (unique within platform + repository)
    pub issue_id: i64,

    /// Tracker-global identifier, distinct from the per-repo number.
    /// Only the GitLab variant supplies one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_id: Option<i64>,

    /// Issue title
    pub title: String,

    /// Raw body markup; empty string when the report has no body
    pub body: String,

    /// Creation time, ISO-8601 as returned by the upstream
    pub created_at: String,

    /// Last-update time, when the upstream supplies one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,

    /// Upstream state (open/closed/opened/...)
    pub state: String,

    /// Canonical browser URL for the issue
    pub url: String,
}

impl RawIssue {
    /// Parse `created_at` as a UTC instant.
    ///
    /// Accepts RFC 3339 with either a `Z` suffix or an explicit offset.
    pub fn created_time(&self) -> Result<DateTime<Utc>, chrono::ParseError> {
        DateTime::parse_from_rfc3339(&self.created_at).map(|dt| dt.with_timezone(&Utc))
    }
}

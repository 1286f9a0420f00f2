//! Structured defect shapes: the extraction schema and the persisted record

use crate::platform::Platform;
use crate::severity::Severity;
use serde::{Deserialize, Serialize};

/// Upper bound on any single string field after schema repair
pub const MAX_FIELD_CHARS: usize = 5000;

/// The fixed six-field extraction schema
///
/// Every extraction path — model success, schema repair, heuristic
/// fallback, hard default — produces exactly these six fields. There is no
/// constructor that yields a partial shape, and `steps_to_reproduce` is
/// always a sequence, never a bare string.
///
/// # Examples
///
/// ```
/// use magpie_domain::{DefectFields, Severity};
///
/// let fields = DefectFields::default();
/// assert!(fields.title.is_empty());
/// assert!(fields.steps_to_reproduce.is_empty());
/// assert_eq!(fields.severity, Severity::UnKnow);
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DefectFields {
    /// Defect title, concise summary
    pub title: String,

    /// Full description of the observed problem
    pub description: String,

    /// Software version the defect was observed in; empty when unstated
    pub version: String,

    /// Severity; `UnKnow` when the report does not state one
    pub severity: Severity,

    /// Ordered reproduction steps; empty when none were found
    pub steps_to_reproduce: Vec<String>,

    /// Stack trace text; empty when none was found
    pub stack_trace: String,
}

/// The merged, persistable defect record
///
/// Created once by the merge step; `repo_id` is attached by the pipeline
/// after merge. A record is never updated in place — re-ingesting the same
/// (repo_id, issue_id) pair is a storage-level no-op.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardizedDefect {
    /// Repository identifier, half of the composite key
    pub repo_id: String,

    /// Per-repository issue number, the other half of the composite key
    pub issue_id: i64,

    /// Tracker the defect was collected from
    pub platform: Platform,

    /// Defect title
    pub title: String,

    /// Defect description
    pub description: String,

    /// Affected version; empty when unstated
    pub version: String,

    /// Ordered reproduction steps
    pub steps_to_reproduce: Vec<String>,

    /// Defect severity
    pub severity: Severity,

    /// Stack trace text
    pub stack_trace: String,

    /// Canonical URL of the source issue
    pub url: String,

    /// Original creation time of the source issue (ISO-8601)
    pub created_at: String,
}

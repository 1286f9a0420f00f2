//! Defect severity vocabulary

use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of a reported defect
///
/// The variant labels are the wire vocabulary the LLM is instructed to use
/// and the exact strings persisted by the store — including the `UnKnow`
/// spelling, which must round-trip verbatim.
///
/// # Examples
///
/// ```
/// use magpie_domain::Severity;
///
/// assert_eq!(Severity::from_label("critical"), Severity::Critical);
/// assert_eq!(Severity::from_label("whatever"), Severity::UnKnow);
/// assert_eq!(Severity::UnKnow.to_string(), "UnKnow");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Severity {
    /// Data loss, crash, security impact
    Critical,
    /// Major function broken, no workaround
    High,
    /// Function impaired, workaround exists
    Medium,
    /// Cosmetic or minor annoyance
    Low,
    /// Not stated in the report — never guessed
    #[default]
    UnKnow,
}

impl Severity {
    /// The wire label for this severity
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
            Severity::Low => "Low",
            Severity::UnKnow => "UnKnow",
        }
    }

    /// Lenient parse: case-insensitive, anything unrecognized (including
    /// the empty string) maps to `UnKnow` rather than an error.
    pub fn from_label(label: &str) -> Severity {
        match label.trim().to_ascii_lowercase().as_str() {
            "critical" => Severity::Critical,
            "high" => Severity::High,
            "medium" => Severity::Medium,
            "low" => Severity::Low,
            _ => Severity::UnKnow,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

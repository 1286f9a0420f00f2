//! Magpie Domain Layer
//!
//! Core data model shared by every other magpie crate: the platform and
//! severity vocabularies, the raw issue record produced by collectors, and
//! the structured defect shapes produced by extraction and persisted by the
//! storage gateway.
//!
//! ## Key Concepts
//!
//! - **RawIssue**: one issue as fetched from an upstream tracker, untouched
//! - **DefectFields**: the fixed six-field extraction schema — every
//!   extraction path (model, repair, fallback, default) produces exactly
//!   this shape
//! - **StandardizedDefect**: the merged record keyed by (repo_id, issue_id)
//!
//! ## Architecture
//!
//! This crate holds no I/O. Collectors, the extractor and the store each
//! depend on it; it depends on none of them.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod defect;
pub mod issue;
pub mod platform;
pub mod severity;

// Re-exports for convenience
pub use defect::{DefectFields, StandardizedDefect, MAX_FIELD_CHARS};
pub use issue::RawIssue;
pub use platform::{Platform, UnknownPlatform};
pub use severity::Severity;

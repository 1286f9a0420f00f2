//! Magpie Extraction Layer
//!
//! Turns a cleaned issue body into the fixed six-field defect schema.
//!
//! # Architecture
//!
//! ```text
//! cleaned text ──► rules ─────────────┐
//!              └─► DefectExtractor ───┴─► merge ──► StandardizedDefect
//!                  (LLM + repair)
//! ```
//!
//! Two independent passes over the same text — a deterministic rule pass
//! ([`rules`]) and an LLM pass ([`DefectExtractor`]) — reconciled by
//! [`merge::merge`] with LLM-over-rules precedence. The LLM pass is total:
//! model failures degrade to a heuristic fallback or the default schema,
//! never to an error.
//!
//! # Examples
//!
//! ```
//! use magpie_extract::DefectExtractor;
//! use magpie_llm::MockProvider;
//!
//! # async fn example() {
//! let provider = MockProvider::new(r#"{"title": "login crash", "severity": "High"}"#);
//! let extractor = DefectExtractor::new(provider);
//!
//! let fields = extractor.extract("the login page crashes").await;
//! assert_eq!(fields.title, "login crash");
//! # }
//! ```

#![warn(missing_docs)]

mod extractor;
mod lang;
pub mod merge;
mod parser;
mod prompt;
mod repair;
pub mod rules;


pub use extractor::{DefectExtractor, FALLBACK_TITLE_CHARS};
pub use lang::{detect_language, Lang, CJK_RATIO_THRESHOLD};
pub use merge::{merge, DESCRIPTION_FALLBACK_CHARS};

//! Error types for the collectors

use magpie_domain::Platform;
use thiserror::Error;

/// Errors surfaced by a collector
///
/// The first two variants are caller mistakes (fix the request); the rest
/// are upstream failures and carry the page number on which they occurred
/// so a re-run can be judged against the tracker's state.
#[derive(Error, Debug)]
pub enum CollectError {
    /// Repository or project coordinates were not supplied
    #[error("{platform}: owner and repository (or project id) must be set")]
    MissingRepository {
        /// Platform whose collector was misconfigured
        platform: Platform,
    },

    /// A time bound in the request could not be parsed
    #[error("invalid timestamp '{0}' (expected YYYY-MM-DD or ISO-8601)")]
    InvalidWindow(String),

    /// An upstream item carried an unparsable creation timestamp
    #[error("page {page}: invalid created_at '{value}' in upstream item")]
    InvalidItemTimestamp {
        /// Page the item was fetched on
        page: u32,
        /// The offending timestamp text
        value: String,
    },

    /// The request itself failed (connect, DNS, timeout)
    #[error("page {page}: request to {platform} failed")]
    Request {
        /// Platform being queried
        platform: Platform,
        /// Page the request was for
        page: u32,
        /// Underlying transport error
        #[source]
        source: reqwest::Error,
    },

    /// The upstream answered with a non-success status
    #[error("page {page}: {platform} returned HTTP {status}")]
    Status {
        /// Platform being queried
        platform: Platform,
        /// Page the request was for
        page: u32,
        /// HTTP status code
        status: u16,
    },

    /// The upstream payload was not the expected JSON shape
    #[error("page {page}: could not decode {platform} payload")]
    Decode {
        /// Platform being queried
        platform: Platform,
        /// Page the payload came from
        page: u32,
        /// Underlying decode error
        #[source]
        source: reqwest::Error,
    },
}

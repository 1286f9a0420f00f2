//! Time-window parsing and filtering

use crate::error::CollectError;
use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};

/// An optional [since, until] filter over issue creation times
///
/// Bounds are inclusive. Either side may be open.
///
/// # Examples
///
/// ```
/// use magpie_collector::TimeWindow;
/// use chrono::{TimeZone, Utc};
///
/// let window = TimeWindow::parse(Some("2024-01-01"), Some("2024-06-01T12:00:00Z")).unwrap();
/// assert!(window.contains(Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()));
/// assert!(!window.contains(Utc.with_ymd_and_hms(2023, 12, 31, 23, 0, 0).unwrap()));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeWindow {
    /// Inclusive lower bound on creation time
    pub since: Option<DateTime<Utc>>,
    /// Inclusive upper bound on creation time
    pub until: Option<DateTime<Utc>>,
}

impl TimeWindow {
    /// Parse optional since/until strings into a window.
    ///
    /// Each bound accepts a plain calendar date (`YYYY-MM-DD`, read as UTC
    /// midnight) or a full ISO-8601 timestamp (trailing `Z` = UTC). An
    /// unparsable value yields [`CollectError::InvalidWindow`] naming it.
    pub fn parse(since: Option<&str>, until: Option<&str>) -> Result<TimeWindow, CollectError> {
        Ok(TimeWindow {
            since: since.map(parse_bound).transpose()?,
            until: until.map(parse_bound).transpose()?,
        })
    }

    /// Whether `instant` falls inside the window (inclusive on both sides)
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        if let Some(since) = self.since {
            if instant < since {
                return false;
            }
        }
        if let Some(until) = self.until {
            if instant > until {
                return false;
            }
        }
        true
    }
}

/// Parse one time bound: calendar date first, full timestamp second.
pub fn parse_bound(value: &str) -> Result<DateTime<Utc>, CollectError> {
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Ok(Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN)));
    }
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| CollectError::InvalidWindow(value.to_string()))
}

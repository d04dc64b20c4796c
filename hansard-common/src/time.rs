//! Date utilities
//!
//! Sitting dates are calendar dates without a time component. They are stored
//! as `YYYY-MM-DD` text so lexical order equals chronological order.

use chrono::{DateTime, Days, NaiveDate, Utc};

/// Storage format for sitting dates
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Current UTC calendar date
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Parse a date filter value.
///
/// Accepts `YYYY-MM-DD` or a full RFC 3339 timestamp (its UTC date is used).
/// Anything else yields `None`: malformed dates behave like an absent filter.
pub fn parse_filter_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, DATE_FORMAT) {
        return Some(date);
    }
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|ts| ts.with_timezone(&Utc).date_naive())
}

/// Format a date the way it is stored
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Trailing window length used when nothing is configured
pub const DEFAULT_TRAILING_DAYS: u32 = 18;

/// Most recent sitting days known when the sitting-day calendar was last updated
pub const LATEST_SITTING_DAYS: [&str; 18] = [
    "2025-10-09", "2025-10-08", "2025-10-07", "2025-09-04", "2025-09-03", "2025-09-02",
    "2025-09-01", "2025-08-28", "2025-08-27", "2025-08-26", "2025-08-25", "2025-07-31",
    "2025-07-30", "2025-07-29", "2025-07-28", "2025-06-24", "2025-06-23", "2025-06-22",
];

/// Dates that a speech-count time series is padded with
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackfillWindow {
    /// Every calendar day in `[today - n, today]`
    TrailingDays(u32),
    /// An explicit list of sitting days
    SittingDays(Vec<NaiveDate>),
}

impl Default for BackfillWindow {
    fn default() -> Self {
        BackfillWindow::TrailingDays(DEFAULT_TRAILING_DAYS)
    }
}

impl BackfillWindow {
    /// The built-in sitting-day calendar
    pub fn latest_sitting_days() -> Self {
        BackfillWindow::SittingDays(
            LATEST_SITTING_DAYS
                .iter()
                .filter_map(|raw| NaiveDate::parse_from_str(raw, DATE_FORMAT).ok())
                .collect(),
        )
    }

    /// Dates covered by the window, ascending and without duplicates
    pub fn dates(&self, today: NaiveDate) -> Vec<NaiveDate> {
        let mut dates: Vec<NaiveDate> = match self {
            BackfillWindow::TrailingDays(days) => (0..=*days)
                .filter_map(|offset| today.checked_sub_days(Days::new(u64::from(offset))))
                .collect(),
            BackfillWindow::SittingDays(days) => days.clone(),
        };
        dates.sort();
        dates.dedup();
        dates
    }
}

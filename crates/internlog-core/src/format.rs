//! Date formatting and blank-value detection shared by every output.
//!
//! Both renderers go through these helpers so a given day always prints the
//! same string and is suppressed by the same rule, whatever the encoding.

use chrono::{DateTime, NaiveDate};

use crate::Log;

/// Pattern used for every rendered date, e.g. `Mon, Jan 5, 2024`
pub const DATE_FORMAT: &str = "%a, %b %-d, %Y";

/// Render a day as a short date with weekday abbreviation.
///
/// chrono's formatter is locale independent, so the result only depends on
/// the date itself.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// True when the log is absent or every value is blank after trimming
pub fn is_log_empty(log: Option<&Log>) -> bool {
    log.map_or(true, |entries| entries.values().all(|value| value.trim().is_empty()))
}

/// Label of the week column, e.g. `Week 3`
pub fn week_label(week_number: u32) -> String {
    format!("Week {week_number}")
}

/// Label of a week's summary row, e.g. `Week 3 Summary`
pub fn summary_label(week_number: u32) -> String {
    format!("Week {week_number} Summary")
}

/// Parse a day from `YYYY-MM-DD` or an RFC 3339 timestamp
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
}

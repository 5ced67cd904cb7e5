//! # internlog-core
//!
//! Core domain model and traits for internlog.
//!
//! This crate provides:
//! - Domain types: `Internship`, `Week`, `Day`, `User`
//! - Date formatting and empty-log detection shared by every output
//! - The report aggregator that flattens an internship into ordered rows
//! - Core traits: `Renderer`, `SummaryProvider`
//! - Error types
//!
//! ## Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use internlog_core::{aggregate, Internship, Scope, User};
//!
//! let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//! let mut internship = Internship::new(
//!     "Acme Labs",
//!     start,
//!     2,
//!     vec!["Tasks Completed".into(), "Notes".into()],
//! );
//! internship.weeks[0].days[0].set("Tasks Completed", "Onboarding");
//!
//! let user = User::new("Ada Lovelace", "ada");
//! let report = aggregate(&internship, &user, Scope::Full).unwrap();
//! assert_eq!(report.rows.len(), 1);
//! ```

pub mod format;
pub mod report;
pub mod summary;

pub use format::{format_date, is_log_empty, parse_date, summary_label, week_label};
pub use report::{aggregate, DataRow, Report, ReportRow, Scope, SummaryRow, TitleBlock};
pub use summary::{activity_digest, resolve_summary, summary_prompt, SummaryError, SummaryProvider};

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

// ============================================================================
// Type Aliases
// ============================================================================

/// A day's activity log: log field name to free text
pub type Log = HashMap<String, String>;

/// Number of days in every internship week
pub const DAYS_PER_WEEK: u32 = 7;

// ============================================================================
// Domain Model
// ============================================================================

/// A single calendar day of the internship
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Day {
    #[serde(with = "day_format")]
    pub date: NaiveDate,
    #[serde(default)]
    pub log: Log,
}

impl Day {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            log: Log::new(),
        }
    }

    /// Create a day with every log field present and blank
    pub fn blank(date: NaiveDate, log_fields: &[String]) -> Self {
        Self {
            date,
            log: log_fields
                .iter()
                .map(|field| (field.clone(), String::new()))
                .collect(),
        }
    }

    /// Set a log entry in place
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<String>) {
        self.log.insert(field.into(), value.into());
    }

    /// Stored value for a field, empty when the field was never written
    pub fn value(&self, field: &str) -> &str {
        self.log.get(field).map(String::as_str).unwrap_or("")
    }

    pub fn is_empty(&self) -> bool {
        is_log_empty(Some(&self.log))
    }
}

/// One week of the internship with its optional narrative summary
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Week {
    pub week_number: u32,
    #[serde(default)]
    pub days: Vec<Day>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

impl Week {
    pub fn new(week_number: u32) -> Self {
        Self {
            week_number,
            days: Vec::new(),
            summary: None,
        }
    }

    /// Attach a summary (builder style)
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    /// Summary text, if one is present and not blank
    pub fn summary_text(&self) -> Option<&str> {
        self.summary
            .as_deref()
            .filter(|text| !text.trim().is_empty())
    }

    /// Days that carry at least one non-blank log value
    pub fn logged_days(&self) -> impl Iterator<Item = &Day> {
        self.days.iter().filter(|day| !day.is_empty())
    }
}

/// The internship aggregate: calendar, log schema and all logged data
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Internship {
    pub location: String,
    pub total_weeks: u32,
    #[serde(with = "day_format")]
    pub start_date: NaiveDate,
    pub log_fields: Vec<String>,
    #[serde(default)]
    pub weeks: Vec<Week>,
}

impl Internship {
    /// Build the pre-initialised calendar: `total_weeks` weeks of seven
    /// consecutive days, every log field present and blank
    pub fn new(
        location: impl Into<String>,
        start_date: NaiveDate,
        total_weeks: u32,
        log_fields: Vec<String>,
    ) -> Self {
        let weeks = (1..=total_weeks)
            .map(|week_number| {
                let first = add_days(start_date, week_offset(week_number));
                let mut week = Week::new(week_number);
                week.days = (0..DAYS_PER_WEEK)
                    .map(|offset| Day::blank(add_days(first, u64::from(offset)), &log_fields))
                    .collect();
                week
            })
            .collect();

        Self {
            location: location.into(),
            total_weeks,
            start_date,
            log_fields,
            weeks,
        }
    }

    /// Look up a week by its 1-based number
    pub fn week(&self, week_number: u32) -> Option<&Week> {
        self.weeks.iter().find(|w| w.week_number == week_number)
    }

    /// Last calendar day of the internship
    pub fn end_date(&self) -> NaiveDate {
        let days = u64::from(self.total_weeks) * u64::from(DAYS_PER_WEEK);
        add_days(self.start_date, days.saturating_sub(1))
    }

    /// First and last day of a week.
    ///
    /// Uses the week's own days when present, otherwise the calendar position
    /// derived from the start date.
    pub fn week_span(&self, week: &Week) -> (NaiveDate, NaiveDate) {
        match (week.days.first(), week.days.last()) {
            (Some(first), Some(last)) => (first.date, last.date),
            _ => {
                let first = add_days(self.start_date, week_offset(week.week_number));
                (first, add_days(first, u64::from(DAYS_PER_WEEK) - 1))
            }
        }
    }

    /// Check the structural invariants of the aggregate
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.total_weeks == 0 {
            return Err(ModelError::NoWeeks);
        }
        if self.log_fields.is_empty() {
            return Err(ModelError::NoLogFields);
        }

        let mut seen = HashSet::new();
        for (position, field) in self.log_fields.iter().enumerate() {
            if field.trim().is_empty() {
                return Err(ModelError::BlankLogField(position + 1));
            }
            if !seen.insert(field.as_str()) {
                return Err(ModelError::DuplicateLogField(field.clone()));
            }
        }

        if self.weeks.len() != self.total_weeks as usize {
            return Err(ModelError::WeekCount {
                declared: self.total_weeks,
                actual: self.weeks.len(),
            });
        }

        let mut previous: Option<NaiveDate> = None;
        for (index, week) in self.weeks.iter().enumerate() {
            if week.week_number as usize != index + 1 {
                return Err(ModelError::WeekNumbering {
                    position: index + 1,
                    found: week.week_number,
                });
            }
            if week.days.len() != DAYS_PER_WEEK as usize {
                return Err(ModelError::DayCount {
                    week: week.week_number,
                    days: week.days.len(),
                });
            }
            for day in &week.days {
                if let Some(prev) = previous {
                    if day.date <= prev {
                        return Err(ModelError::DateOrder {
                            previous: prev,
                            date: day.date,
                        });
                    }
                }
                previous = Some(day.date);

                let mut unknown: Vec<&String> =
                    day.log.keys().filter(|key| !seen.contains(key.as_str())).collect();
                unknown.sort();
                if let Some(field) = unknown.first() {
                    return Err(ModelError::UnknownField {
                        date: day.date,
                        field: (*field).clone(),
                    });
                }
            }
        }

        Ok(())
    }
}

/// Days from the internship start to the first day of a 1-based week
fn week_offset(week_number: u32) -> u64 {
    u64::from(week_number.saturating_sub(1)) * u64::from(DAYS_PER_WEEK)
}

/// Calendar arithmetic that saturates at the last representable date
fn add_days(date: NaiveDate, days: u64) -> NaiveDate {
    date.checked_add_days(Days::new(days)).unwrap_or(NaiveDate::MAX)
}

/// Display identity of the intern
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

impl User {
    pub fn new(full_name: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            full_name: Some(full_name.into()),
            username: Some(username.into()),
        }
    }

    /// Full name when set, otherwise the username
    pub fn display_name(&self) -> &str {
        self.full_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .or(self.username.as_deref())
            .unwrap_or("")
    }
}

/// Serde adapter for day-precision dates.
///
/// Reads `YYYY-MM-DD` or an RFC 3339 timestamp, writes `YYYY-MM-DD`.
mod day_format {
    use chrono::NaiveDate;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&date.format("%Y-%m-%d").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        crate::parse_date(&raw).ok_or_else(|| {
            de::Error::custom(format!(
                "invalid date '{raw}', expected YYYY-MM-DD or an RFC 3339 timestamp"
            ))
        })
    }
}

// ============================================================================
// Traits
// ============================================================================

/// Output rendering of an aggregated report
pub trait Renderer {
    type Output;

    /// Render the report rows into the output encoding
    fn render(&self, report: &Report) -> Result<Self::Output, RenderError>;

    /// File extension of the rendered artifact, without the dot
    fn extension(&self) -> &'static str;
}

// ============================================================================
// Errors
// ============================================================================

/// Structural problem in an internship document
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("Internship must span at least one week")]
    NoWeeks,

    #[error("Internship has no log fields")]
    NoLogFields,

    #[error("Log field {0} has a blank name")]
    BlankLogField(usize),

    #[error("Duplicate log field: {0}")]
    DuplicateLogField(String),

    #[error("Internship declares {declared} weeks but contains {actual}")]
    WeekCount { declared: u32, actual: usize },

    #[error("Week at position {position} is numbered {found}")]
    WeekNumbering { position: usize, found: u32 },

    #[error("Week {week} has {days} days, expected 7")]
    DayCount { week: u32, days: usize },

    #[error("Day {date} does not come after {previous}")]
    DateOrder { previous: NaiveDate, date: NaiveDate },

    #[error("Day {date} logs unknown field '{field}'")]
    UnknownField { date: NaiveDate, field: String },
}

/// Report aggregation error
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReportError {
    #[error("Week {week} not found (internship has {total_weeks} weeks)")]
    WeekNotFound { week: u32, total_weeks: u32 },
}

/// Rendering error
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Format error: {0}")]
    Format(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn fields() -> Vec<String> {
        vec!["Tasks Completed".into(), "Notes".into()]
    }

    #[test]
    fn new_internship_builds_blank_calendar() {
        let internship = Internship::new("Acme", date(2024, 1, 1), 3, fields());

        assert_eq!(internship.weeks.len(), 3);
        for (index, week) in internship.weeks.iter().enumerate() {
            assert_eq!(week.week_number as usize, index + 1);
            assert_eq!(week.days.len(), 7);
            assert!(week.summary.is_none());
            assert!(week.days.iter().all(Day::is_empty));
            assert!(week.days.iter().all(|d| d.log.len() == 2));
        }
        assert_eq!(internship.weeks[1].days[0].date, date(2024, 1, 8));
        assert_eq!(internship.weeks[2].days[6].date, date(2024, 1, 21));
        assert!(internship.validate().is_ok());
    }

    #[test]
    fn end_date_covers_all_weeks() {
        let internship = Internship::new("Acme", date(2024, 1, 1), 2, fields());
        assert_eq!(internship.end_date(), date(2024, 1, 14));
    }

    #[test]
    fn calendar_arithmetic_saturates() {
        let mut internship = Internship::new("Acme", date(2024, 1, 1), 1, fields());
        internship.total_weeks = 50_000_000;
        assert_eq!(internship.end_date(), NaiveDate::MAX);
        assert!(internship.validate().is_err());

        let far = Week::new(u32::MAX);
        let (first, last) = internship.week_span(&far);
        assert_eq!((first, last), (NaiveDate::MAX, NaiveDate::MAX));

        let late = Internship::new("Acme", NaiveDate::MAX, 1, fields());
        assert!(late.weeks[0].days.iter().all(|d| d.date == NaiveDate::MAX));
    }

    #[test]
    fn week_span_falls_back_to_calendar() {
        let internship = Internship::new("Acme", date(2024, 1, 1), 2, fields());
        let mut week = Week::new(2);
        assert_eq!(internship.week_span(&week), (date(2024, 1, 8), date(2024, 1, 14)));

        week.days.push(Day::new(date(2024, 1, 9)));
        week.days.push(Day::new(date(2024, 1, 10)));
        assert_eq!(internship.week_span(&week), (date(2024, 1, 9), date(2024, 1, 10)));
    }

    #[test]
    fn week_lookup_by_number() {
        let internship = Internship::new("Acme", date(2024, 1, 1), 2, fields());
        assert_eq!(internship.week(2).map(|w| w.week_number), Some(2));
        assert!(internship.week(3).is_none());
        assert!(internship.week(0).is_none());
    }

    #[test]
    fn blank_summary_is_absent() {
        assert_eq!(Week::new(1).with_summary("   ").summary_text(), None);
        assert_eq!(Week::new(1).with_summary("Busy").summary_text(), Some("Busy"));
    }

    #[test]
    fn display_name_prefers_full_name() {
        assert_eq!(User::new("Ada Lovelace", "ada").display_name(), "Ada Lovelace");

        let user = User {
            full_name: Some(String::new()),
            username: Some("ada".into()),
        };
        assert_eq!(user.display_name(), "ada");
        assert_eq!(User::default().display_name(), "");
    }

    #[test]
    fn validate_rejects_week_count_mismatch() {
        let mut internship = Internship::new("Acme", date(2024, 1, 1), 2, fields());
        internship.weeks.pop();
        assert_eq!(
            internship.validate(),
            Err(ModelError::WeekCount { declared: 2, actual: 1 })
        );
    }

    #[test]
    fn validate_rejects_unknown_field() {
        let mut internship = Internship::new("Acme", date(2024, 1, 1), 1, fields());
        internship.weeks[0].days[2].set("Mood", "good");
        assert_eq!(
            internship.validate(),
            Err(ModelError::UnknownField {
                date: date(2024, 1, 3),
                field: "Mood".into(),
            })
        );
    }

    #[test]
    fn validate_rejects_duplicate_fields_and_bad_order() {
        let internship = Internship::new("Acme", date(2024, 1, 1), 1, vec!["A".into(), "A".into()]);
        assert_eq!(internship.validate(), Err(ModelError::DuplicateLogField("A".into())));

        let mut internship = Internship::new("Acme", date(2024, 1, 1), 1, fields());
        internship.weeks[0].days.swap(1, 2);
        assert!(matches!(internship.validate(), Err(ModelError::DateOrder { .. })));

        let mut internship = Internship::new("Acme", date(2024, 1, 1), 2, fields());
        internship.weeks[1].week_number = 5;
        assert_eq!(
            internship.validate(),
            Err(ModelError::WeekNumbering { position: 2, found: 5 })
        );
    }

    #[test]
    fn loads_persisted_json_document() {
        let json = r#"{
            "location": "Acme Labs",
            "totalWeeks": 1,
            "startDate": "2024-01-01T00:00:00.000Z",
            "logFields": ["Tasks Completed", "Notes"],
            "weeks": [{
                "weekNumber": 1,
                "summary": "Productive week",
                "days": [
                    {"date": "2024-01-01", "log": {"Tasks Completed": "Reviewed PR", "Notes": ""}}
                ]
            }]
        }"#;

        let internship: Internship = serde_json::from_str(json).unwrap();
        assert_eq!(internship.start_date, date(2024, 1, 1));
        assert_eq!(internship.weeks[0].summary_text(), Some("Productive week"));
        assert_eq!(internship.weeks[0].days[0].value("Tasks Completed"), "Reviewed PR");
        assert_eq!(internship.weeks[0].days[0].value("Missing"), "");

        let round = serde_json::to_value(&internship).unwrap();
        assert_eq!(round["startDate"], "2024-01-01");
        assert_eq!(round["totalWeeks"], 1);
    }

    #[test]
    fn rejects_unparseable_date() {
        let json = r#"{"date": "yesterday", "log": {}}"#;
        let err = serde_json::from_str::<Day>(json).unwrap_err();
        assert!(err.to_string().contains("invalid date"));
    }
}

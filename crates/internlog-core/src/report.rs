//! Report aggregation
//!
//! Flattens the `Internship -> Week -> Day -> log` hierarchy into an ordered
//! list of rows that every renderer consumes unchanged:
//!
//! ```text
//! Scope::Full                          Scope::Week(2)
//! | Week   | Date        | Tasks | ... | Date        | Tasks | ...
//! | Week 1 Summary: ...  (full width)  | Week 2 Summary: ... (full width)
//! | Week 1 | Mon, Jan 1. | ...   |     | Mon, Jan 8. | ...   |
//! | Week 2 | Mon, Jan 8. | ...   |
//! ```
//!
//! Rows are emitted in ascending week order and chronological day order.
//! Days whose log is blank are skipped, and a week's summary row (when the
//! week has one) precedes that week's data rows.

use chrono::NaiveDate;

use crate::format::{format_date, week_label};
use crate::{Internship, ReportError, User, Week};

/// Heading of whole-internship reports
pub const OVERALL_HEADING: &str = "Internship Activity Report";

/// What part of the internship a report covers
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scope {
    /// Every week of the internship
    Full,
    /// A single week, by number
    Week(u32),
}

/// Title information printed above the table
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TitleBlock {
    pub heading: String,
    pub intern: String,
    pub location: String,
    /// First and last day covered by the report
    pub period: (NaiveDate, NaiveDate),
}

/// A week's narrative summary, rendered across the full table width
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SummaryRow {
    pub week_number: u32,
    pub text: String,
}

impl SummaryRow {
    /// Text of the full-width cell, e.g. `Week 2 Summary: Shipped the importer`
    pub fn caption(&self) -> String {
        format!("Week {} Summary: {}", self.week_number, self.text)
    }
}

/// One logged day
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DataRow {
    pub week_number: u32,
    /// Formatted date
    pub date: String,
    /// Log values in log-field order, empty string for unset fields
    pub values: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReportRow {
    Summary(SummaryRow),
    Data(DataRow),
}

/// Aggregated, scope-specific report ready for rendering
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Report {
    pub scope: Scope,
    pub title: TitleBlock,
    /// Table header: `Week`/`Date` as the scope dictates, then the log fields
    pub columns: Vec<String>,
    pub rows: Vec<ReportRow>,
}

impl Report {
    /// Whether the table carries a leading week column
    pub fn has_week_column(&self) -> bool {
        self.scope == Scope::Full
    }

    /// Number of leading non-log columns (week and/or date)
    pub fn fixed_columns(&self) -> usize {
        if self.has_week_column() {
            2
        } else {
            1
        }
    }

    /// Cells of a data row in column order for this report's scope
    pub fn cells(&self, row: &DataRow) -> Vec<String> {
        let mut cells = Vec::with_capacity(self.columns.len());
        if self.has_week_column() {
            cells.push(week_label(row.week_number));
        }
        cells.push(row.date.clone());
        cells.extend(row.values.iter().cloned());
        cells
    }

    pub fn data_rows(&self) -> impl Iterator<Item = &DataRow> {
        self.rows.iter().filter_map(|row| match row {
            ReportRow::Data(data) => Some(data),
            ReportRow::Summary(_) => None,
        })
    }

    pub fn summary_rows(&self) -> impl Iterator<Item = &SummaryRow> {
        self.rows.iter().filter_map(|row| match row {
            ReportRow::Summary(summary) => Some(summary),
            ReportRow::Data(_) => None,
        })
    }

    /// True when no row qualified; renderers still emit the title block
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Aggregate an internship into report rows for the given scope.
///
/// Fails only when `Scope::Week(n)` names a week the internship does not have.
pub fn aggregate(internship: &Internship, user: &User, scope: Scope) -> Result<Report, ReportError> {
    let (weeks, heading, period): (Vec<&Week>, String, (NaiveDate, NaiveDate)) = match scope {
        Scope::Full => {
            let mut weeks: Vec<&Week> = internship.weeks.iter().collect();
            weeks.sort_by_key(|w| w.week_number);
            (
                weeks,
                OVERALL_HEADING.to_string(),
                (internship.start_date, internship.end_date()),
            )
        }
        Scope::Week(number) => {
            let week = internship.week(number).ok_or(ReportError::WeekNotFound {
                week: number,
                total_weeks: internship.total_weeks,
            })?;
            (
                vec![week],
                format!("Weekly Report - Week {number}"),
                internship.week_span(week),
            )
        }
    };

    let mut columns = Vec::with_capacity(internship.log_fields.len() + 2);
    if scope == Scope::Full {
        columns.push("Week".to_string());
    }
    columns.push("Date".to_string());
    columns.extend(internship.log_fields.iter().cloned());

    let mut rows = Vec::new();
    for week in weeks {
        push_week_rows(&mut rows, week, &internship.log_fields);
    }

    Ok(Report {
        scope,
        title: TitleBlock {
            heading,
            intern: user.display_name().to_string(),
            location: internship.location.clone(),
            period,
        },
        columns,
        rows,
    })
}

fn push_week_rows(rows: &mut Vec<ReportRow>, week: &Week, log_fields: &[String]) {
    if let Some(text) = week.summary_text() {
        rows.push(ReportRow::Summary(SummaryRow {
            week_number: week.week_number,
            text: text.to_string(),
        }));
    }

    let mut days: Vec<_> = week.logged_days().collect();
    days.sort_by_key(|day| day.date);

    rows.extend(days.into_iter().map(|day| {
        ReportRow::Data(DataRow {
            week_number: week.week_number,
            date: format_date(day.date),
            values: log_fields
                .iter()
                .map(|field| day.value(field).to_string())
                .collect(),
        })
    }));
}

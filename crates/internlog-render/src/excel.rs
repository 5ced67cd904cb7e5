//! Excel workbook renderer
//!
//! Writes a report to a single-sheet XLSX workbook. The sheet opens with a
//! plain-text header block; the table starts at a fixed row below it.
//!
//! ## Whole internship (`Overall Report`)
//!
//! ```text
//! A1 | Internship Activity Report
//! A2 | Intern: Ada Lovelace
//! A3 | Location: Acme Labs
//! A4 |
//! A5 | Week           | Date              | Tasks Completed | Notes
//! A6 | Week 1 Summary | Productive week   |                 |
//! A7 | Week 1         | Mon, Jan 1, 2024  | Reviewed PR     |
//! ```
//!
//! ## Single week (`Week 1 Report`)
//!
//! ```text
//! A1 | Weekly Report - Week 1
//! A2 | Intern: Ada Lovelace
//! A3 | Location: Acme Labs
//! A4 |
//! A5 | Summary:                  <- only when the week has a summary
//! A6 | Productive week
//! A7 |
//! A8 | Date              | Tasks Completed | Notes
//! A9 | Mon, Jan 1, 2024  | Reviewed PR     |
//! ```
//!
//! Column widths are fixed per export kind rather than fitted to content.
//! Cell text longer than Excel allows is cut at [`MAX_CELL_CHARS`].

use std::borrow::Cow;

use internlog_core::{summary_label, RenderError, Renderer, Report, ReportRow, Scope};
use rust_xlsxwriter::{Color, Format, FormatAlign, FormatBorder, Workbook, XlsxError};
use tracing::warn;

/// Longest string Excel stores in a single cell
pub const MAX_CELL_CHARS: usize = 32_767;

/// Zero-based row of the table header when no summary block is present
const TABLE_ROW: u32 = 4;

/// Zero-based row of the table header below a week summary block
const TABLE_ROW_WITH_SUMMARY: u32 = 7;

/// Visual role of a worksheet cell
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CellStyle {
    /// Report heading in the header block
    Heading,
    /// Other header block lines
    Plain,
    /// Table column header
    ColumnHeader,
    /// Week and date cells of a data row
    Text,
    /// Log-field cells (wrapped)
    LogText,
    /// Cells of a summary row
    Summary,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SheetCell {
    pub row: u32,
    pub col: u16,
    pub value: String,
    pub style: CellStyle,
}

/// Everything the workbook will contain, computed before any writing
#[derive(Clone, Debug, PartialEq)]
pub struct SheetLayout {
    pub name: String,
    /// Zero-based row of the table header
    pub table_row: u32,
    pub cells: Vec<SheetCell>,
    /// Width of each table column, in character units
    pub column_widths: Vec<f64>,
}

impl SheetLayout {
    fn push(&mut self, row: u32, col: u16, value: impl Into<String>, style: CellStyle) {
        self.cells.push(SheetCell {
            row,
            col,
            value: value.into(),
            style,
        });
    }

    /// Values of one row ordered by column, blanks included
    pub fn row_values(&self, row: u32) -> Vec<&str> {
        let mut cells: Vec<&SheetCell> = self.cells.iter().filter(|c| c.row == row).collect();
        cells.sort_by_key(|c| c.col);
        cells.iter().map(|c| c.value.as_str()).collect()
    }

    /// Table body rows (below the column header), in order
    pub fn table_rows(&self) -> Vec<Vec<&str>> {
        let last = self.cells.iter().map(|c| c.row).max().unwrap_or(self.table_row);
        (self.table_row + 1..=last).map(|row| self.row_values(row)).collect()
    }
}

/// Excel workbook renderer configuration.
///
/// Values over [`MAX_CELL_CHARS`] characters are truncated when the workbook
/// is written; the layout keeps the full text.
#[derive(Clone, Debug)]
pub struct SpreadsheetRenderer {
    /// Week column width in whole-internship sheets
    pub overall_week_width: f64,
    /// Date column width in whole-internship sheets
    pub overall_date_width: f64,
    /// Log column width in whole-internship sheets
    pub overall_log_width: f64,
    /// Date column width in single-week sheets
    pub week_date_width: f64,
    /// Log column width in single-week sheets
    pub week_log_width: f64,
}

impl Default for SpreadsheetRenderer {
    fn default() -> Self {
        Self {
            overall_week_width: 20.0,
            overall_date_width: 25.0,
            overall_log_width: 50.0,
            week_date_width: 25.0,
            week_log_width: 75.0,
        }
    }
}

struct SheetFormats {
    heading: Format,
    column_header: Format,
    text: Format,
    log_text: Format,
    summary: Format,
}

impl SpreadsheetRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute the sheet contents for a report
    pub fn layout(&self, report: &Report) -> SheetLayout {
        let summaries: Vec<_> = report.summary_rows().collect();
        let (name, table_row, column_widths) = match report.scope {
            Scope::Full => (
                "Overall Report".to_string(),
                TABLE_ROW,
                self.widths(report, &[self.overall_week_width, self.overall_date_width], self.overall_log_width),
            ),
            Scope::Week(number) => (
                format!("Week {number} Report"),
                if summaries.is_empty() {
                    TABLE_ROW
                } else {
                    TABLE_ROW_WITH_SUMMARY
                },
                self.widths(report, &[self.week_date_width], self.week_log_width),
            ),
        };

        let mut layout = SheetLayout {
            name,
            table_row,
            cells: Vec::new(),
            column_widths,
        };

        layout.push(0, 0, report.title.heading.as_str(), CellStyle::Heading);
        layout.push(1, 0, format!("Intern: {}", report.title.intern), CellStyle::Plain);
        layout.push(2, 0, format!("Location: {}", report.title.location), CellStyle::Plain);

        // Single-week sheets carry the summary above the table
        if report.scope != Scope::Full {
            if let Some(summary) = summaries.first() {
                layout.push(4, 0, "Summary:", CellStyle::Plain);
                layout.push(5, 0, summary.text.as_str(), CellStyle::Plain);
            }
        }

        for (col, name) in report.columns.iter().enumerate() {
            layout.push(table_row, col as u16, name.as_str(), CellStyle::ColumnHeader);
        }

        let fixed = report.fixed_columns();
        let mut row = table_row;
        for entry in &report.rows {
            match entry {
                ReportRow::Summary(summary) => {
                    if report.scope != Scope::Full {
                        continue;
                    }
                    row += 1;
                    layout.push(row, 0, summary_label(summary.week_number), CellStyle::Summary);
                    layout.push(row, 1, summary.text.as_str(), CellStyle::Summary);
                    for col in 2..report.columns.len() {
                        layout.push(row, col as u16, "", CellStyle::Summary);
                    }
                }
                ReportRow::Data(data) => {
                    row += 1;
                    for (col, value) in report.cells(data).into_iter().enumerate() {
                        let style = if col < fixed {
                            CellStyle::Text
                        } else {
                            CellStyle::LogText
                        };
                        layout.push(row, col as u16, value, style);
                    }
                }
            }
        }

        layout
    }

    fn widths(&self, report: &Report, fixed: &[f64], log_width: f64) -> Vec<f64> {
        let log_count = report.columns.len().saturating_sub(fixed.len());
        fixed
            .iter()
            .copied()
            .chain(std::iter::repeat(log_width).take(log_count))
            .collect()
    }

    fn create_formats(&self) -> SheetFormats {
        let heading = Format::new().set_bold().set_font_size(14);

        let column_header = Format::new()
            .set_bold()
            .set_align(FormatAlign::Left)
            .set_background_color(Color::RGB(0x161616))
            .set_font_color(Color::White)
            .set_border(FormatBorder::Thin);

        let text = Format::new()
            .set_align(FormatAlign::Top)
            .set_border(FormatBorder::Thin);

        let log_text = Format::new()
            .set_text_wrap()
            .set_align(FormatAlign::Top)
            .set_border(FormatBorder::Thin);

        let summary = Format::new()
            .set_italic()
            .set_text_wrap()
            .set_align(FormatAlign::Top)
            .set_background_color(Color::RGB(0xF5F5F5))
            .set_font_color(Color::RGB(0x323232))
            .set_border(FormatBorder::Thin);

        SheetFormats {
            heading,
            column_header,
            text,
            log_text,
            summary,
        }
    }

    /// Generate workbook bytes from a precomputed layout
    pub fn write_layout(&self, layout: &SheetLayout) -> Result<Vec<u8>, RenderError> {
        let formats = self.create_formats();
        let mut workbook = Workbook::new();

        let sheet = workbook.add_worksheet();
        sheet.set_name(&layout.name).map_err(xlsx_error)?;

        for (col, width) in layout.column_widths.iter().enumerate() {
            sheet
                .set_column_width(col as u16, *width)
                .map_err(xlsx_error)?;
        }

        for cell in &layout.cells {
            let value = fit_cell(cell);
            let format = match cell.style {
                CellStyle::Plain => {
                    sheet
                        .write_string(cell.row, cell.col, value.as_ref())
                        .map_err(xlsx_error)?;
                    continue;
                }
                CellStyle::Heading => &formats.heading,
                CellStyle::ColumnHeader => &formats.column_header,
                CellStyle::Text => &formats.text,
                CellStyle::LogText => &formats.log_text,
                CellStyle::Summary => &formats.summary,
            };
            sheet
                .write_string_with_format(cell.row, cell.col, value.as_ref(), format)
                .map_err(xlsx_error)?;
        }

        workbook
            .save_to_buffer()
            .map_err(|e| RenderError::Format(format!("Failed to create Excel: {e}")))
    }
}

impl Renderer for SpreadsheetRenderer {
    type Output = Vec<u8>;

    fn render(&self, report: &Report) -> Result<Vec<u8>, RenderError> {
        self.write_layout(&self.layout(report))
    }

    fn extension(&self) -> &'static str {
        "xlsx"
    }
}

/// Cell text cut to the Excel limit
fn fit_cell(cell: &SheetCell) -> Cow<'_, str> {
    match cell.value.char_indices().nth(MAX_CELL_CHARS) {
        None => Cow::Borrowed(cell.value.as_str()),
        Some((end, _)) => {
            warn!(
                row = cell.row + 1,
                col = cell.col + 1,
                chars = cell.value.chars().count(),
                "cell text truncated to {MAX_CELL_CHARS} characters"
            );
            Cow::Borrowed(&cell.value[..end])
        }
    }
}

fn xlsx_error(e: XlsxError) -> RenderError {
    RenderError::Format(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use internlog_core::{aggregate, Internship, User};
    use pretty_assertions::assert_eq;

    fn internship(summary: Option<&str>) -> Internship {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let mut internship =
            Internship::new("Acme Labs", start, 1, vec!["Tasks Completed".into(), "Notes".into()]);
        internship.weeks[0].days[0].set("Tasks Completed", "Reviewed PR");
        internship.weeks[0].summary = summary.map(str::to_string);
        internship
    }

    fn layout(internship: &Internship, scope: Scope) -> SheetLayout {
        let report = aggregate(internship, &User::new("Ada Lovelace", "ada"), scope).unwrap();
        SpreadsheetRenderer::new().layout(&report)
    }

    #[test]
    fn overall_sheet_layout() {
        let layout = layout(&internship(Some("Productive week")), Scope::Full);

        assert_eq!(layout.name, "Overall Report");
        assert_eq!(layout.table_row, 4);
        assert_eq!(layout.column_widths, vec![20.0, 25.0, 50.0, 50.0]);
        assert_eq!(layout.row_values(0), vec!["Internship Activity Report"]);
        assert_eq!(layout.row_values(1), vec!["Intern: Ada Lovelace"]);
        assert_eq!(layout.row_values(2), vec!["Location: Acme Labs"]);
        assert!(layout.row_values(3).is_empty());
        assert_eq!(layout.row_values(4), vec!["Week", "Date", "Tasks Completed", "Notes"]);
        assert_eq!(
            layout.table_rows(),
            vec![
                vec!["Week 1 Summary", "Productive week", "", ""],
                vec!["Week 1", "Mon, Jan 1, 2024", "Reviewed PR", ""],
            ]
        );
    }

    #[test]
    fn week_sheet_without_summary() {
        let layout = layout(&internship(None), Scope::Week(1));

        assert_eq!(layout.name, "Week 1 Report");
        assert_eq!(layout.table_row, 4);
        assert_eq!(layout.column_widths, vec![25.0, 75.0, 75.0]);
        assert_eq!(layout.row_values(0), vec!["Weekly Report - Week 1"]);
        assert_eq!(layout.row_values(4), vec!["Date", "Tasks Completed", "Notes"]);
        assert_eq!(
            layout.table_rows(),
            vec![vec!["Mon, Jan 1, 2024", "Reviewed PR", ""]]
        );
    }

    #[test]
    fn week_sheet_reserves_summary_block() {
        let layout = layout(&internship(Some("Productive week")), Scope::Week(1));

        assert_eq!(layout.table_row, 7);
        assert_eq!(layout.row_values(4), vec!["Summary:"]);
        assert_eq!(layout.row_values(5), vec!["Productive week"]);
        assert!(layout.row_values(6).is_empty());
        assert_eq!(layout.row_values(7), vec!["Date", "Tasks Completed", "Notes"]);
        assert_eq!(
            layout.table_rows(),
            vec![vec!["Mon, Jan 1, 2024", "Reviewed PR", ""]]
        );
    }

    #[test]
    fn styles_follow_column_roles() {
        let layout = layout(&internship(None), Scope::Full);
        let styles: Vec<CellStyle> = layout
            .cells
            .iter()
            .filter(|c| c.row == 5)
            .map(|c| c.style)
            .collect();
        assert_eq!(
            styles,
            vec![CellStyle::Text, CellStyle::Text, CellStyle::LogText, CellStyle::LogText]
        );
    }

    #[test]
    fn empty_report_keeps_header_block_and_columns() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let blank = Internship::new("Acme", start, 1, vec!["Notes".into()]);
        let layout = layout(&blank, Scope::Full);

        assert!(layout.table_rows().is_empty());
        assert_eq!(layout.row_values(4), vec!["Week", "Date", "Notes"]);
    }

    #[test]
    fn renders_xlsx_bytes() {
        let report = aggregate(
            &internship(Some("Productive week")),
            &User::new("Ada Lovelace", "ada"),
            Scope::Full,
        )
        .unwrap();
        let renderer = SpreadsheetRenderer::new();
        let xlsx = renderer.render(&report).unwrap();

        assert!(xlsx.len() > 100);
        assert_eq!(&xlsx[0..2], b"PK");
        assert_eq!(renderer.extension(), "xlsx");
    }

    #[test]
    fn oversized_log_value_is_truncated() {
        let mut internship = internship(None);
        internship.weeks[0].days[0].set("Notes", "é".repeat(40_000));
        let report = aggregate(&internship, &User::default(), Scope::Full).unwrap();

        let renderer = SpreadsheetRenderer::new();
        let layout = renderer.layout(&report);
        let long = layout
            .cells
            .iter()
            .find(|c| c.value.chars().count() == 40_000)
            .unwrap();
        assert_eq!(fit_cell(long).chars().count(), MAX_CELL_CHARS);

        let xlsx = renderer.render(&report).unwrap();
        assert_eq!(&xlsx[0..2], b"PK");
    }

    #[test]
    fn short_cells_are_written_unchanged() {
        let cell = SheetCell {
            row: 0,
            col: 0,
            value: "Reviewed PR".into(),
            style: CellStyle::Text,
        };
        assert!(matches!(fit_cell(&cell), Cow::Borrowed("Reviewed PR")));
    }
}

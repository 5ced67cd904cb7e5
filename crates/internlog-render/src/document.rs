//! Paginated document renderer
//!
//! Lays a report out on A4 pages and emits a print-ready HTML document in
//! which every page is an inline SVG. Pagination happens here, not in the
//! viewer, so the page breaks are deterministic:
//!
//! ```text
//! +-----------------------------+   +-----------------------------+
//! |  Internship Activity Report |   | Week | Date | Tasks | Notes |  <- header repeated
//! |  Intern / Location / Period |   |------|------|-------|-------|
//! | Week | Date | Tasks | Notes |   | Week 3 Summary: ...         |
//! |------|------|-------|-------|   | ...                         |
//! | ...                         |   |                             |
//! |         Page 1 of 2         |   |         Page 2 of 2         |
//! +-----------------------------+   +-----------------------------+
//! ```
//!
//! Log-field cells use a smaller type size than week/date cells. Rows that do
//! not fit the remaining space move to the next page; a row taller than a
//! whole page is split line-wise.

use internlog_core::{format_date, RenderError, Renderer, Report, ReportRow, TitleBlock};
use svg::node::element::{Group, Rectangle, Text};
use svg::Document;

/// Average glyph advance as a fraction of the font size
const CHAR_WIDTH_RATIO: f64 = 0.5;

/// A4 in points
const A4_WIDTH: f64 = 595.28;
const A4_HEIGHT: f64 = 841.89;

/// Paginated document renderer configuration
#[derive(Clone, Debug)]
pub struct DocumentRenderer {
    /// Page width in points
    pub page_width: f64,
    /// Page height in points
    pub page_height: f64,
    /// Margin on every side in points
    pub margin: f64,
    pub title_font_size: f64,
    pub subtitle_font_size: f64,
    /// Font size of header, week and date cells
    pub base_font_size: f64,
    /// Font size of log-field cells
    pub log_font_size: f64,
    pub week_column_width: f64,
    pub date_column_width: f64,
    pub cell_padding: f64,
    /// Line height as a multiple of the font size
    pub line_spacing: f64,
    pub font_family: String,
    pub header_fill: String,
    pub header_text_color: String,
    pub summary_fill: String,
    pub summary_text_color: String,
    pub grid_color: String,
    pub text_color: String,
}

impl Default for DocumentRenderer {
    fn default() -> Self {
        Self {
            page_width: A4_WIDTH,
            page_height: A4_HEIGHT,
            margin: 40.0,
            title_font_size: 20.0,
            subtitle_font_size: 12.0,
            base_font_size: 10.0,
            log_font_size: 8.0,
            week_column_width: 55.0,
            date_column_width: 95.0,
            cell_padding: 4.0,
            line_spacing: 1.3,
            font_family: "Helvetica, Arial, sans-serif".into(),
            header_fill: "#161616".into(),
            header_text_color: "#ffffff".into(),
            summary_fill: "#f5f5f5".into(),
            summary_text_color: "#323232".into(),
            grid_color: "#bfbfbf".into(),
            text_color: "#222222".into(),
        }
    }
}

/// Kind of a table row on a page
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RowKind {
    Header,
    Data,
    Summary,
}

/// A laid-out table cell
#[derive(Clone, Debug, PartialEq)]
pub struct Cell {
    pub x: f64,
    pub width: f64,
    pub font_size: f64,
    /// Wrapped text lines
    pub lines: Vec<String>,
}

/// A table row placed on a page
#[derive(Clone, Debug, PartialEq)]
pub struct PlacedRow {
    pub kind: RowKind,
    pub y: f64,
    pub height: f64,
    pub cells: Vec<Cell>,
}

impl PlacedRow {
    /// Text of each cell with wrapped lines joined by spaces
    pub fn texts(&self) -> Vec<String> {
        self.cells.iter().map(|c| c.lines.join(" ").trim().to_string()).collect()
    }
}

/// One page of the laid-out document
#[derive(Clone, Debug, PartialEq)]
pub struct Page {
    /// 1-based page number
    pub number: usize,
    /// Title block, only on the first page
    pub title: Option<TitleBlock>,
    pub rows: Vec<PlacedRow>,
}

impl Page {
    fn new(number: usize, title: Option<TitleBlock>) -> Self {
        Self {
            number,
            title,
            rows: Vec::new(),
        }
    }

    /// Rows other than the repeated header
    pub fn body_rows(&self) -> impl Iterator<Item = &PlacedRow> {
        self.rows.iter().filter(|row| row.kind != RowKind::Header)
    }
}

/// Row awaiting placement
#[derive(Clone, Debug)]
struct PendingRow {
    kind: RowKind,
    cells: Vec<Cell>,
}

impl DocumentRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure page size in points
    pub fn page_size(mut self, width: f64, height: f64) -> Self {
        self.page_width = width;
        self.page_height = height;
        self
    }

    /// Configure page margin in points
    pub fn margin(mut self, margin: f64) -> Self {
        self.margin = margin;
        self
    }

    /// Configure font size of header, week and date cells
    pub fn base_font_size(mut self, size: f64) -> Self {
        self.base_font_size = size;
        self
    }

    /// Configure font size of log-field cells
    pub fn log_font_size(mut self, size: f64) -> Self {
        self.log_font_size = size;
        self
    }

    fn table_width(&self) -> f64 {
        self.page_width - 2.0 * self.margin
    }

    fn line_height(&self, font_size: f64) -> f64 {
        font_size * self.line_spacing
    }

    fn bottom(&self) -> f64 {
        self.page_height - self.margin
    }

    /// Vertical space taken by the title block on the first page
    fn title_height(&self) -> f64 {
        self.title_font_size * 1.6 + 3.0 * self.subtitle_font_size * 1.6 + self.subtitle_font_size
    }

    /// `(x, width)` of every column.
    ///
    /// Week and date columns are fixed; log fields share the rest evenly.
    fn column_geometry(&self, report: &Report) -> Vec<(f64, f64)> {
        let mut widths = Vec::with_capacity(report.columns.len());
        if report.has_week_column() {
            widths.push(self.week_column_width);
        }
        widths.push(self.date_column_width);

        let log_count = report.columns.len().saturating_sub(widths.len());
        let remaining = (self.table_width() - widths.iter().sum::<f64>()).max(0.0);
        if log_count == 0 {
            if let Some(last) = widths.last_mut() {
                *last += remaining;
            }
        } else {
            let share = remaining / log_count as f64;
            widths.extend(std::iter::repeat(share).take(log_count));
        }

        let mut x = self.margin;
        widths
            .into_iter()
            .map(|width| {
                let column = (x, width);
                x += width;
                column
            })
            .collect()
    }

    fn cell(&self, (x, width): (f64, f64), text: &str, font_size: f64) -> Cell {
        Cell {
            x,
            width,
            font_size,
            lines: wrap_text(text, width - 2.0 * self.cell_padding, font_size),
        }
    }

    fn row_height(&self, cells: &[Cell]) -> f64 {
        let text = cells
            .iter()
            .map(|c| c.lines.len() as f64 * self.line_height(c.font_size))
            .fold(0.0, f64::max);
        text + 2.0 * self.cell_padding
    }

    fn header_row(&self, report: &Report, geometry: &[(f64, f64)]) -> PendingRow {
        PendingRow {
            kind: RowKind::Header,
            cells: report
                .columns
                .iter()
                .zip(geometry)
                .map(|(name, column)| self.cell(*column, name, self.base_font_size))
                .collect(),
        }
    }

    fn body_row(&self, report: &Report, row: &ReportRow, geometry: &[(f64, f64)]) -> PendingRow {
        match row {
            ReportRow::Summary(summary) => PendingRow {
                kind: RowKind::Summary,
                cells: vec![self.cell(
                    (self.margin, self.table_width()),
                    &summary.caption(),
                    self.base_font_size,
                )],
            },
            ReportRow::Data(data) => {
                let fixed = report.fixed_columns();
                PendingRow {
                    kind: RowKind::Data,
                    cells: report
                        .cells(data)
                        .iter()
                        .zip(geometry)
                        .enumerate()
                        .map(|(index, (text, column))| {
                            let size = if index < fixed {
                                self.base_font_size
                            } else {
                                self.log_font_size
                            };
                            self.cell(*column, text, size)
                        })
                        .collect(),
                }
            }
        }
    }

    /// Split a row so its head fits in `available` points.
    ///
    /// Every cell keeps at least one line in the head so layout always
    /// advances. The tail is `None` once nothing is left over.
    fn split_row(&self, row: PendingRow, available: f64) -> (PendingRow, Option<PendingRow>) {
        let room = (available - 2.0 * self.cell_padding).max(0.0);
        let mut head = Vec::with_capacity(row.cells.len());
        let mut tail = Vec::with_capacity(row.cells.len());
        let mut leftover = false;

        for cell in row.cells {
            let Cell {
                x,
                width,
                font_size,
                mut lines,
            } = cell;
            let fit = ((room / self.line_height(font_size)).floor() as usize).max(1);
            let rest = if lines.len() > fit {
                lines.split_off(fit)
            } else {
                Vec::new()
            };
            leftover |= !rest.is_empty();

            head.push(Cell {
                x,
                width,
                font_size,
                lines,
            });
            tail.push(Cell {
                x,
                width,
                font_size,
                lines: if rest.is_empty() { vec![String::new()] } else { rest },
            });
        }

        let head = PendingRow {
            kind: row.kind,
            cells: head,
        };
        let tail = leftover.then_some(PendingRow {
            kind: row.kind,
            cells: tail,
        });
        (head, tail)
    }

    fn place(&self, page: &mut Page, row: &PendingRow, y: f64) -> f64 {
        let height = self.row_height(&row.cells);
        page.rows.push(PlacedRow {
            kind: row.kind,
            y,
            height,
            cells: row.cells.clone(),
        });
        y + height
    }

    /// Lay the report out on pages.
    ///
    /// The first page carries the title block; every page starts its table
    /// with the header row. A report without rows yields a single page.
    pub fn paginate(&self, report: &Report) -> Vec<Page> {
        let geometry = self.column_geometry(report);
        let header = self.header_row(report, &geometry);
        let header_height = self.row_height(&header.cells);
        let bottom = self.bottom();
        let continuation_room = bottom - self.margin - header_height;

        let mut pages = Vec::new();
        let mut page = Page::new(1, Some(report.title.clone()));
        let mut cursor = self.place(&mut page, &header, self.margin + self.title_height());

        for row in &report.rows {
            let mut pending = self.body_row(report, row, &geometry);
            loop {
                let height = self.row_height(&pending.cells);
                if cursor + height <= bottom {
                    cursor = self.place(&mut page, &pending, cursor);
                    break;
                }

                let only_header = page.rows.iter().all(|r| r.kind == RowKind::Header);
                let fits_next_page = page.title.is_some() && height <= continuation_room;
                if !only_header || fits_next_page {
                    let next = Page::new(pages.len() + 2, None);
                    pages.push(std::mem::replace(&mut page, next));
                    cursor = self.place(&mut page, &header, self.margin);
                    continue;
                }

                let (head, tail) = self.split_row(pending, bottom - cursor);
                cursor = self.place(&mut page, &head, cursor);
                match tail {
                    Some(rest) => {
                        pending = rest;
                        let next = Page::new(pages.len() + 2, None);
                        pages.push(std::mem::replace(&mut page, next));
                        cursor = self.place(&mut page, &header, self.margin);
                    }
                    None => break,
                }
            }
        }

        pages.push(page);
        pages
    }

    fn render_title(&self, title: &TitleBlock) -> Group {
        let center = self.page_width / 2.0;
        let mut group = Group::new().set("class", "title");

        let mut y = self.margin + self.title_font_size;
        group = group.add(
            Text::new(title.heading.as_str())
                .set("x", center)
                .set("y", y)
                .set("font-family", self.font_family.as_str())
                .set("font-size", self.title_font_size)
                .set("font-weight", "bold")
                .set("fill", self.text_color.as_str())
                .set("text-anchor", "middle"),
        );

        let (start, end) = title.period;
        let lines = [
            format!("Intern: {}", title.intern),
            format!("Location: {}", title.location),
            format!("Period: {} - {}", format_date(start), format_date(end)),
        ];
        y += self.title_font_size * 0.6;
        for line in lines {
            y += self.subtitle_font_size * 1.6;
            group = group.add(
                Text::new(line)
                    .set("x", center)
                    .set("y", y)
                    .set("font-family", self.font_family.as_str())
                    .set("font-size", self.subtitle_font_size)
                    .set("fill", self.text_color.as_str())
                    .set("text-anchor", "middle"),
            );
        }

        group
    }

    fn render_row(&self, row: &PlacedRow) -> Group {
        let (class, fill, color) = match row.kind {
            RowKind::Header => ("row-header", self.header_fill.as_str(), self.header_text_color.as_str()),
            RowKind::Summary => ("row-summary", self.summary_fill.as_str(), self.summary_text_color.as_str()),
            RowKind::Data => ("row-data", "#ffffff", self.text_color.as_str()),
        };
        let mut group = Group::new().set("class", class);

        for cell in &row.cells {
            group = group.add(
                Rectangle::new()
                    .set("x", cell.x)
                    .set("y", row.y)
                    .set("width", cell.width)
                    .set("height", row.height)
                    .set("fill", fill)
                    .set("stroke", self.grid_color.as_str())
                    .set("stroke-width", 0.5),
            );

            let line_height = self.line_height(cell.font_size);
            for (index, line) in cell.lines.iter().enumerate() {
                if line.is_empty() {
                    continue;
                }
                let mut text = Text::new(line.as_str())
                    .set("x", cell.x + self.cell_padding)
                    .set("y", row.y + self.cell_padding + cell.font_size + index as f64 * line_height)
                    .set("font-family", self.font_family.as_str())
                    .set("font-size", cell.font_size)
                    .set("fill", color);
                match row.kind {
                    RowKind::Header => text = text.set("font-weight", "bold"),
                    RowKind::Summary => text = text.set("font-style", "italic"),
                    RowKind::Data => {}
                }
                group = group.add(text);
            }
        }

        group
    }

    fn render_page(&self, page: &Page, page_count: usize) -> Result<String, RenderError> {
        let mut document = Document::new()
            .set("width", format!("{}pt", self.page_width))
            .set("height", format!("{}pt", self.page_height))
            .set("viewBox", (0.0, 0.0, self.page_width, self.page_height))
            .set("xmlns", "http://www.w3.org/2000/svg");

        document = document.add(
            Rectangle::new()
                .set("width", "100%")
                .set("height", "100%")
                .set("fill", "#ffffff"),
        );

        if let Some(title) = &page.title {
            document = document.add(self.render_title(title));
        }
        for row in &page.rows {
            document = document.add(self.render_row(row));
        }

        document = document.add(
            Text::new(format!("Page {} of {}", page.number, page_count))
                .set("x", self.page_width / 2.0)
                .set("y", self.page_height - self.margin / 2.0)
                .set("font-family", self.font_family.as_str())
                .set("font-size", self.log_font_size)
                .set("fill", self.text_color.as_str())
                .set("text-anchor", "middle"),
        );

        let mut output = Vec::new();
        svg::write(&mut output, &document)?;
        String::from_utf8(output).map_err(|e| RenderError::Format(format!("Invalid UTF-8: {e}")))
    }

    fn generate_html(&self, title: &TitleBlock, pages: &[String]) -> String {
        let body: String = pages
            .iter()
            .map(|page| format!("    <section class=\"page\">\n{page}\n    </section>\n"))
            .collect();

        format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>{heading} - {location}</title>
    <style>
        @page {{ size: {width}pt {height}pt; margin: 0; }}
        body {{ margin: 0; background: #e5e5e5; }}
        .page {{ width: {width}pt; height: {height}pt; margin: 0 auto 12pt; background: #ffffff; break-after: page; page-break-after: always; }}
        .page:last-child {{ break-after: auto; page-break-after: auto; }}
        .page svg {{ display: block; }}
        @media print {{ body {{ background: none; }} .page {{ margin: 0; }} }}
    </style>
</head>
<body>
{body}</body>
</html>
"#,
            heading = html_escape(&title.heading),
            location = html_escape(&title.location),
            width = self.page_width,
            height = self.page_height,
            body = body,
        )
    }
}

impl Renderer for DocumentRenderer {
    type Output = String;

    fn render(&self, report: &Report) -> Result<String, RenderError> {
        if self.table_width() <= 0.0 || self.bottom() <= self.margin {
            return Err(RenderError::InvalidData(
                "Page margins leave no room for the table".into(),
            ));
        }

        let pages = self.paginate(report);
        let svg_pages = pages
            .iter()
            .map(|page| self.render_page(page, pages.len()))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(self.generate_html(&report.title, &svg_pages))
    }

    fn extension(&self) -> &'static str {
        "html"
    }
}

/// Wrap text to lines that fit `width` points at `font_size`.
///
/// Breaks on whitespace, keeps explicit line breaks and hard-breaks words
/// longer than a line. Always returns at least one line.
pub fn wrap_text(text: &str, width: f64, font_size: f64) -> Vec<String> {
    let max_chars = ((width / (font_size * CHAR_WIDTH_RATIO)).floor() as usize).max(1);
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        if paragraph.trim().is_empty() {
            lines.push(String::new());
            continue;
        }

        let mut current = String::new();
        let mut current_len = 0;
        for word in paragraph.split_whitespace() {
            let mut chars: Vec<char> = word.chars().collect();
            while chars.len() > max_chars {
                if current_len > 0 {
                    lines.push(std::mem::take(&mut current));
                    current_len = 0;
                }
                let rest = chars.split_off(max_chars);
                lines.push(chars.into_iter().collect());
                chars = rest;
            }

            if current_len > 0 && current_len + 1 + chars.len() > max_chars {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            if current_len > 0 {
                current.push(' ');
                current_len += 1;
            }
            current_len += chars.len();
            current.extend(chars);
        }
        if current_len > 0 {
            lines.push(current);
        }
    }

    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

/// HTML-escape a string
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

//! # internlog-render
//!
//! Rendering backends for internlog reports.
//!
//! This crate provides:
//! - A paginated document renderer (print-ready HTML, one SVG per A4 page)
//! - An Excel workbook renderer
//! - The export facade that aggregates, renders and writes artifacts
//!
//! ## Example
//!
//! ```rust,ignore
//! use internlog_core::{Internship, User};
//! use internlog_render::{DocumentRenderer, Exporter, MemoryWriter, SpreadsheetRenderer};
//!
//! let exporter = Exporter::new(
//!     DocumentRenderer::new(),
//!     SpreadsheetRenderer::new(),
//!     MemoryWriter::default(),
//! );
//!
//! // Whole internship as a paginated document
//! let artifact = exporter.export_internship_document(&internship, &user)?;
//! assert_eq!(artifact.file_name, "Internship_Report_Acme_Labs.html");
//!
//! // Week 3 as a workbook
//! let artifact = exporter.export_week_spreadsheet(&internship, 3, &user)?;
//! assert_eq!(artifact.file_name, "Internship_Report_Week_3.xlsx");
//! ```

pub mod document;
pub mod excel;
pub mod export;

pub use document::{DocumentRenderer, Page, RowKind};
pub use excel::{SheetLayout, SpreadsheetRenderer};
pub use export::{
    report_file_stem, Artifact, ArtifactWriter, DirectoryWriter, ExportError, Exporter,
    MemoryWriter,
};

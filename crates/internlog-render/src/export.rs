//! Export facade
//!
//! Wires aggregation, one renderer and an artifact writer together for the
//! four exports: whole internship or single week, as a document or as a
//! spreadsheet. Renderers and the writer are injected, so aggregation and
//! naming can be exercised without touching a real rendering engine or disk.

use std::ffi::OsStr;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use internlog_core::{aggregate, Internship, RenderError, Renderer, ReportError, Scope, User};
use thiserror::Error;
use tracing::{debug, info};

use crate::document::DocumentRenderer;
use crate::excel::SpreadsheetRenderer;

/// Destination for rendered artifacts
pub trait ArtifactWriter {
    /// Store `bytes` under `file_name`, returning where it ended up
    fn write(&self, file_name: &str, bytes: &[u8]) -> io::Result<PathBuf>;
}

/// Writes artifacts into a directory, creating it when missing
#[derive(Clone, Debug)]
pub struct DirectoryWriter {
    dir: PathBuf,
}

impl DirectoryWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl ArtifactWriter for DirectoryWriter {
    fn write(&self, file_name: &str, bytes: &[u8]) -> io::Result<PathBuf> {
        if Path::new(file_name).file_name() != Some(OsStr::new(file_name)) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("'{file_name}' is not a plain file name"),
            ));
        }
        std::fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(file_name);
        std::fs::write(&path, bytes)?;
        Ok(path)
    }
}

/// Keeps artifacts in memory
#[derive(Debug, Default)]
pub struct MemoryWriter {
    files: Mutex<Vec<(String, Vec<u8>)>>,
}

impl MemoryWriter {
    /// Names of the stored artifacts, in write order
    pub fn file_names(&self) -> Vec<String> {
        self.lock().iter().map(|(name, _)| name.clone()).collect()
    }

    /// Contents of the most recent artifact with this name
    pub fn get(&self, file_name: &str) -> Option<Vec<u8>> {
        self.lock()
            .iter()
            .rev()
            .find(|(name, _)| name == file_name)
            .map(|(_, bytes)| bytes.clone())
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<(String, Vec<u8>)>> {
        self.files.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ArtifactWriter for MemoryWriter {
    fn write(&self, file_name: &str, bytes: &[u8]) -> io::Result<PathBuf> {
        self.lock().push((file_name.to_string(), bytes.to_vec()));
        Ok(PathBuf::from(file_name))
    }
}

/// A written export
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Artifact {
    pub file_name: String,
    pub path: PathBuf,
    /// Number of table rows (summary and data) in the report
    pub rows: usize,
    /// Size of the artifact in bytes
    pub size: usize,
}

/// Export error
#[derive(Debug, Error)]
pub enum ExportError {
    #[error(transparent)]
    Report(#[from] ReportError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("Failed to write {file_name}: {source}")]
    Write {
        file_name: String,
        #[source]
        source: io::Error,
    },
}

/// Characters that cannot appear in a file name on common platforms
const RESERVED_CHARS: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

/// File name without extension for an export.
///
/// Whole-internship exports are named after the location with every
/// whitespace, control or path-reserved character replaced by `_`;
/// single-week exports after the week.
pub fn report_file_stem(location: &str, scope: Scope) -> String {
    match scope {
        Scope::Full => {
            let location: String = location
                .chars()
                .map(|c| {
                    if c.is_whitespace() || c.is_control() || RESERVED_CHARS.contains(&c) {
                        '_'
                    } else {
                        c
                    }
                })
                .collect();
            format!("Internship_Report_{location}")
        }
        Scope::Week(number) => format!("Internship_Report_Week_{number}"),
    }
}

/// Export facade over a document renderer, a spreadsheet renderer and a writer
#[derive(Clone, Debug)]
pub struct Exporter<D = DocumentRenderer, S = SpreadsheetRenderer, W = DirectoryWriter> {
    document: D,
    spreadsheet: S,
    writer: W,
}

impl Exporter {
    /// Default renderers writing into `dir`
    pub fn to_directory(dir: impl Into<PathBuf>) -> Self {
        Self::new(
            DocumentRenderer::new(),
            SpreadsheetRenderer::new(),
            DirectoryWriter::new(dir),
        )
    }
}

impl<D, S, W> Exporter<D, S, W>
where
    D: Renderer,
    D::Output: AsRef<[u8]>,
    S: Renderer,
    S::Output: AsRef<[u8]>,
    W: ArtifactWriter,
{
    pub fn new(document: D, spreadsheet: S, writer: W) -> Self {
        Self {
            document,
            spreadsheet,
            writer,
        }
    }

    pub fn writer(&self) -> &W {
        &self.writer
    }

    /// Whole internship as a paginated document
    pub fn export_internship_document(
        &self,
        internship: &Internship,
        user: &User,
    ) -> Result<Artifact, ExportError> {
        export_with(&self.document, &self.writer, internship, user, Scope::Full)
    }

    /// Whole internship as a spreadsheet workbook
    pub fn export_internship_spreadsheet(
        &self,
        internship: &Internship,
        user: &User,
    ) -> Result<Artifact, ExportError> {
        export_with(&self.spreadsheet, &self.writer, internship, user, Scope::Full)
    }

    /// One week as a paginated document
    pub fn export_week_document(
        &self,
        internship: &Internship,
        week_number: u32,
        user: &User,
    ) -> Result<Artifact, ExportError> {
        export_with(&self.document, &self.writer, internship, user, Scope::Week(week_number))
    }

    /// One week as a spreadsheet workbook
    pub fn export_week_spreadsheet(
        &self,
        internship: &Internship,
        week_number: u32,
        user: &User,
    ) -> Result<Artifact, ExportError> {
        export_with(&self.spreadsheet, &self.writer, internship, user, Scope::Week(week_number))
    }
}

fn export_with<R, W>(
    renderer: &R,
    writer: &W,
    internship: &Internship,
    user: &User,
    scope: Scope,
) -> Result<Artifact, ExportError>
where
    R: Renderer,
    R::Output: AsRef<[u8]>,
    W: ArtifactWriter + ?Sized,
{
    let report = aggregate(internship, user, scope)?;
    let file_name = format!(
        "{}.{}",
        report_file_stem(&internship.location, scope),
        renderer.extension()
    );
    debug!(
        ?scope,
        rows = report.rows.len(),
        file = %file_name,
        "rendering report"
    );

    let output = renderer.render(&report)?;
    let bytes = output.as_ref();
    let path = writer
        .write(&file_name, bytes)
        .map_err(|source| ExportError::Write {
            file_name: file_name.clone(),
            source,
        })?;
    info!(path = %path.display(), bytes = bytes.len(), "report written");

    Ok(Artifact {
        file_name,
        path,
        rows: report.rows.len(),
        size: bytes.len(),
    })
}

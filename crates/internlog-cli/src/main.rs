//! internlog CLI - Internship activity reports
//!
//! Command-line interface for creating internship files, checking them and
//! exporting them as paginated documents or spreadsheets.

mod input;

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use internlog_core::summary::NO_ACTIVITY_MESSAGE;
use internlog_core::{activity_digest, parse_date, summary_prompt, Internship, User};
use internlog_render::{Artifact, Exporter};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::input::InternshipFile;

#[derive(Parser)]
#[command(name = "internlog")]
#[command(author, version, about = "Internship activity log reports", long_about = None)]
struct Cli {
    /// Verbose output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a blank internship file
    Init {
        /// Internship location
        #[arg(long)]
        location: String,

        /// First day of the internship (YYYY-MM-DD)
        #[arg(long, value_parser = parse_start)]
        start: NaiveDate,

        /// Number of weeks
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        weeks: u32,

        /// Log field name (repeatable)
        #[arg(long = "field", value_name = "NAME", default_values = ["Tasks Completed", "Notes"])]
        fields: Vec<String>,

        /// Intern's full name
        #[arg(long)]
        full_name: Option<String>,

        /// Intern's username
        #[arg(long)]
        username: Option<String>,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Validate an internship file
    Check {
        /// Input file path
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },

    /// Export reports
    Export {
        /// Input file path
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Export a single week instead of the whole internship
        #[arg(short, long)]
        week: Option<u32>,

        /// Output kind
        #[arg(short, long, value_enum, default_value_t = OutputKind::Both)]
        format: OutputKind,

        /// Output directory
        #[arg(short, long, env = "INTERNLOG_OUT_DIR", default_value = ".")]
        out_dir: PathBuf,
    },

    /// Print the activity digest a summary service is fed for a week
    Digest {
        /// Input file path
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Week number
        #[arg(short, long)]
        week: u32,

        /// Print the full instruction prompt instead of the bare digest
        #[arg(long)]
        prompt: bool,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputKind {
    /// Paginated document
    Document,
    /// Spreadsheet workbook
    Spreadsheet,
    /// Both artifacts
    Both,
}

fn parse_start(raw: &str) -> Result<NaiveDate, String> {
    parse_date(raw).ok_or_else(|| format!("invalid date '{raw}', expected YYYY-MM-DD"))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    match cli.command {
        Commands::Init {
            location,
            start,
            weeks,
            fields,
            full_name,
            username,
            output,
        } => cmd_init(location, start, weeks, fields, User { full_name, username }, &output),
        Commands::Check { file } => cmd_check(&file),
        Commands::Export {
            file,
            week,
            format,
            out_dir,
        } => cmd_export(&file, week, format, out_dir),
        Commands::Digest { file, week, prompt } => cmd_digest(&file, week, prompt),
    }
}

fn cmd_init(
    location: String,
    start: NaiveDate,
    weeks: u32,
    fields: Vec<String>,
    user: User,
    output: &Path,
) -> Result<()> {
    let fields: Vec<String> = fields
        .iter()
        .map(|f| f.trim().to_string())
        .filter(|f| !f.is_empty())
        .collect();
    if location.trim().is_empty() {
        bail!("Location must not be blank");
    }
    if fields.is_empty() {
        bail!("At least one non-blank log field is required");
    }

    let internship = Internship::new(location.trim(), start, weeks, fields);
    internship.validate().context("Generated internship is inconsistent")?;

    InternshipFile { user, internship }.save(output)?;
    println!("Created {} ({} weeks)", output.display(), weeks);
    Ok(())
}

/// Load a file and reject it unless the internship is consistent
fn load_checked(file: &Path) -> Result<InternshipFile> {
    let input = InternshipFile::load(file)?;
    input
        .internship
        .validate()
        .with_context(|| format!("{} is not a valid internship file", file.display()))?;
    Ok(input)
}

fn cmd_check(file: &Path) -> Result<()> {
    let input = load_checked(file)?;
    let internship = &input.internship;

    let logged: usize = internship.weeks.iter().map(|w| w.logged_days().count()).sum();
    let summaries = internship
        .weeks
        .iter()
        .filter(|w| w.summary_text().is_some())
        .count();
    println!(
        "OK: {} - {} weeks, {} log fields, {} logged days, {} summaries",
        internship.location,
        internship.total_weeks,
        internship.log_fields.len(),
        logged,
        summaries
    );
    Ok(())
}

fn cmd_export(file: &Path, week: Option<u32>, format: OutputKind, out_dir: PathBuf) -> Result<()> {
    let input = load_checked(file)?;
    let exporter = Exporter::to_directory(out_dir);
    let (internship, user) = (&input.internship, &input.user);

    let mut artifacts: Vec<Artifact> = Vec::new();
    if matches!(format, OutputKind::Document | OutputKind::Both) {
        artifacts.push(match week {
            Some(n) => exporter.export_week_document(internship, n, user)?,
            None => exporter.export_internship_document(internship, user)?,
        });
    }
    if matches!(format, OutputKind::Spreadsheet | OutputKind::Both) {
        artifacts.push(match week {
            Some(n) => exporter.export_week_spreadsheet(internship, n, user)?,
            None => exporter.export_internship_spreadsheet(internship, user)?,
        });
    }

    for artifact in &artifacts {
        println!(
            "Wrote {} ({} rows, {} bytes)",
            artifact.path.display(),
            artifact.rows,
            artifact.size
        );
    }
    Ok(())
}

fn cmd_digest(file: &Path, week_number: u32, prompt: bool) -> Result<()> {
    let input = load_checked(file)?;
    let internship = &input.internship;
    let Some(week) = internship.week(week_number) else {
        bail!(
            "Week {} not found (internship has {} weeks)",
            week_number,
            internship.total_weeks
        );
    };

    match activity_digest(week, &internship.log_fields) {
        Some(digest) if prompt => println!("{}", summary_prompt(&digest)),
        Some(digest) => println!("{digest}"),
        None => println!("{NO_ACTIVITY_MESSAGE}"),
    }
    Ok(())
}

//! Weekly summary collaborator seam.
//!
//! Summaries come from outside the report core: typed in by the intern or
//! produced by a text-generation service. This module defines what such a
//! service is fed and how its failures are absorbed; the network call lives
//! with the implementor of [`SummaryProvider`].

use thiserror::Error;

use crate::Week;

/// Returned instead of calling the provider when a week has no activity
pub const NO_ACTIVITY_MESSAGE: &str =
    "No activities were logged for this week, so a summary could not be generated.";

/// Something that can write a narrative summary for a week
pub trait SummaryProvider {
    fn summarize(&self, week: &Week, log_fields: &[String]) -> Result<String, SummaryError>;
}

/// Summary generation failure
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SummaryError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Summary service rejected the credentials")]
    Unauthorized,

    #[error("Summary service rate limit exceeded")]
    RateLimited,

    #[error("Summary service returned an empty response")]
    EmptyResponse,
}

/// Activity text for a week, one block per logged day.
///
/// ```text
/// - Mon:
///   - Tasks Completed: Reviewed PR
///   - Notes: Met the team
/// ```
///
/// Returns `None` when no day of the week has a non-blank entry.
pub fn activity_digest(week: &Week, log_fields: &[String]) -> Option<String> {
    let blocks: Vec<String> = week
        .logged_days()
        .map(|day| {
            let mut block = format!("- {}:", day.date.format("%a"));
            for field in log_fields {
                let value = day.value(field).trim();
                if !value.is_empty() {
                    block.push_str(&format!("\n  - {field}: {value}"));
                }
            }
            block
        })
        .collect();

    if blocks.is_empty() {
        None
    } else {
        Some(blocks.join("\n\n"))
    }
}

/// Instruction text handed to a text-generation service
pub fn summary_prompt(digest: &str) -> String {
    format!(
        "Based on the following structured daily logs for an intern, please generate a concise \
         weekly summary in a single paragraph. Highlight key achievements, skills learned, and any \
         challenges faced. Present it in a professional tone.\n\nDaily Logs:\n{digest}"
    )
}

/// Ask the provider for a summary, treating any failure as "no summary".
///
/// Weeks without activity never reach the provider; they get
/// [`NO_ACTIVITY_MESSAGE`] instead.
pub fn resolve_summary<P: SummaryProvider + ?Sized>(
    provider: &P,
    week: &Week,
    log_fields: &[String],
) -> Option<String> {
    if activity_digest(week, log_fields).is_none() {
        return Some(NO_ACTIVITY_MESSAGE.to_string());
    }

    match provider.summarize(week, log_fields) {
        Ok(text) if !text.trim().is_empty() => Some(text.trim().to_string()),
        Ok(_) | Err(_) => None,
    }
}

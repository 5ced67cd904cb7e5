//! Internship files: the JSON document the CLI reads and writes.
//!
//! ```json
//! {
//!   "user": { "fullName": "Ada Lovelace", "username": "ada" },
//!   "internship": { "location": "Acme Labs", "totalWeeks": 12, ... }
//! }
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use internlog_core::{Internship, User};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InternshipFile {
    #[serde(default)]
    pub user: User,
    pub internship: Internship,
}

impl InternshipFile {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let file: Self = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        tracing::debug!(
            path = %path.display(),
            weeks = file.internship.weeks.len(),
            fields = file.internship.log_fields.len(),
            "loaded internship"
        );
        Ok(file)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json + "\n")
            .with_context(|| format!("Failed to write {}", path.display()))
    }
}

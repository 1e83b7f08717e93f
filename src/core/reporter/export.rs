//! Export functionality for run reports.
//!
//! JSON for scripting, plain text (summary plus the detailed listing) for
//! keeping alongside the organized files.

use super::Report;
use serde::{Deserialize, Serialize};
use std::io::{self, Write};
use std::path::Path;

/// Export format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    Json,
    Text,
}

impl ExportFormat {
    /// `.json` means JSON, anything else text
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => ExportFormat::Json,
            _ => ExportFormat::Text,
        }
    }
}

/// Write the report as pretty-printed JSON
pub fn export_json<W: Write>(report: &Report, mut writer: W) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut writer, report)?;
    writeln!(writer)
}

/// Write the summary followed by the detailed listing
pub fn export_text<W: Write>(report: &Report, mut writer: W) -> io::Result<()> {
    writer.write_all(report.summary().as_bytes())?;
    let details = report.details();
    if !details.is_empty() {
        writeln!(writer)?;
        writer.write_all(details.as_bytes())?;
    }
    Ok(())
}

/// Export a report to a file, picking the format from its extension
pub fn export_to_file(report: &Report, path: &Path) -> io::Result<()> {
    let file = std::fs::File::create(path)?;
    let mut writer = io::BufWriter::new(file);

    match ExportFormat::from_path(path) {
        ExportFormat::Json => export_json(report, &mut writer)?,
        ExportFormat::Text => export_text(report, &mut writer)?,
    }
    writer.flush()
}

//! Plain-text renderings of a [`Report`].

use super::{Operation, Report, ReportEntry};
use crate::core::organize::OperationMode;
use std::fmt::Write;

/// Format bytes as human-readable string
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

impl Report {
    /// The always-shown summary
    pub fn summary(&self) -> String {
        let verb = match self.mode {
            OperationMode::Move => "moved",
            OperationMode::Copy => "copied",
        };
        let title = if self.cancelled {
            "Organization Cancelled"
        } else {
            "Organization Complete!"
        };

        let mut out = String::new();
        let _ = writeln!(out, "{title}");
        let _ = writeln!(out);
        let _ = writeln!(out, "Files scanned: {}", self.files_scanned);
        let _ = writeln!(out, "Unique files {verb}: {}", self.unique_count);
        let _ = writeln!(out, "Duplicates found: {}", self.duplicate_count);
        let _ = writeln!(out, "Space saved: {}", format_bytes(self.reclaimed_bytes));
        if self.duplicates_transferred > 0 {
            let _ = writeln!(out, "Duplicates are in: {}", self.duplicates_dir().display());
        }

        if !self.errors.is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(
                out,
                "Some problems occurred during processing ({}). See log below.",
                self.errors.len()
            );
        }
        out
    }

    /// Duplicate listing plus error log; empty when there is nothing to list
    pub fn details(&self) -> String {
        if !self.has_details() {
            return String::new();
        }

        let mut out = String::new();
        let _ = writeln!(out, "=== DUPLICATE FILES ===");
        for path in &self.duplicate_paths {
            let _ = writeln!(out, "{}", path.display());
        }
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "Total duplicates: {} ({})",
            self.duplicate_count,
            format_bytes(self.reclaimed_bytes)
        );

        if !self.errors.is_empty() {
            let _ = writeln!(out);
            let _ = writeln!(out, "=== ERROR LOG ===");
            for entry in &self.errors {
                let _ = writeln!(out, "{}", log_line(entry));
            }
        }
        out
    }
}

/// `[ERROR] transfer /a.jpg -> /out/a.jpg: message`
pub(crate) fn log_line(entry: &ReportEntry) -> String {
    let level = if entry.op.is_warning() { "WARN" } else { "ERROR" };
    match (&entry.dest_path, entry.op) {
        (Some(dest), Operation::Transfer) => format!(
            "[{level}] {} {} -> {}: {}",
            entry.op,
            entry.path.display(),
            dest.display(),
            entry.message
        ),
        _ => format!(
            "[{level}] {} {}: {}",
            entry.op,
            entry.path.display(),
            entry.message
        ),
    }
}

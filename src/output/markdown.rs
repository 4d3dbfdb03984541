//! Appends report sections to a markdown file.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

use chrono::Local;

use super::table::strip_ansi;
use crate::core::Result;

/// Title written once at the top of a new report file.
pub const REPORT_TITLE: &str = "# Lint Performance Report";

/// What the title block says about the analysed run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReportSource {
    /// Stats file the report was built from.
    pub stats_file: Option<String>,
    /// Linter command decoded from the stats file name, if any.
    pub command: Option<String>,
}

/// Append one section to `path`.
///
/// A missing or empty file first gets the title block; otherwise the new
/// section is separated from the previous one by `---`. Color codes are
/// removed from the table. Returns `true` when the file was (re)started.
pub fn append_section(
    path: &Path,
    source: &ReportSource,
    heading: &str,
    table: &str,
) -> Result<bool> {
    let is_new = fs::metadata(path).map(|m| m.len() == 0).unwrap_or(true);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut out = String::new();
    if is_new {
        out.push_str(&title_block(source));
    } else {
        out.push_str("\n---\n\n");
    }
    out.push_str(&section(heading, table));

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    file.write_all(out.as_bytes())?;

    tracing::info!(path = %path.display(), new = is_new, "Appended markdown section");
    Ok(is_new)
}

fn title_block(source: &ReportSource) -> String {
    let mut out = format!("{REPORT_TITLE}\n\n");
    if let Some(file) = &source.stats_file {
        out.push_str(&format!("- Stats file: `{file}`\n"));
    }
    if let Some(command) = &source.command {
        out.push_str(&format!("- Command: `{command}`\n"));
    }
    if source.stats_file.is_some() || source.command.is_some() {
        out.push('\n');
    }
    out
}

fn section(heading: &str, table: &str) -> String {
    let generated = Local::now().format("%Y-%m-%d %H:%M:%S");
    format!(
        "## {heading}\n\n_Generated {generated}_\n\n{}\n",
        strip_ansi(table)
    )
}

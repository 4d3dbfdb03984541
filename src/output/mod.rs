//! Output formatting: display strings, tables, markdown export and JSON.

pub mod display;
pub mod markdown;
pub mod table;
pub mod theme;

use std::io::Write;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::core::Result;

pub use display::{format_rows, FormattedDisplayEntry};
pub use table::{render_table, strip_ansi, TableOptions, NO_DATA};
pub use theme::{ColorScale, DurationStyle, Theme};

/// A value column of the report table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Column {
    Time,
    /// Share of the relevant total time.
    Relative,
    Warnings,
    Errors,
}

impl Column {
    pub const ALL: [Column; 4] = [Column::Time, Column::Relative, Column::Warnings, Column::Errors];

    pub fn header(self) -> &'static str {
        match self {
            Column::Time => "Time",
            Column::Relative => "Relative",
            Column::Warnings => "Warnings",
            Column::Errors => "Errors",
        }
    }
}

/// Output format for non-interactive runs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// Aligned plain-text table.
    #[default]
    Text,
    /// The same table, headed by a description of the view.
    Markdown,
    /// Ranked rows and run summary as JSON.
    Json,
}

impl Format {
    /// Serialize `data` as pretty JSON followed by a newline.
    pub fn write_json<T: Serialize, W: Write>(data: &T, writer: &mut W) -> Result<()> {
        serde_json::to_writer_pretty(&mut *writer, data)?;
        writeln!(writer)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_headers() {
        let headers: Vec<&str> = Column::ALL.iter().map(|c| c.header()).collect();
        assert_eq!(headers, vec!["Time", "Relative", "Warnings", "Errors"]);
    }

    #[test]
    fn test_column_from_cli_name() {
        assert_eq!(Column::from_str("relative", true).unwrap(), Column::Relative);
        assert!(Column::from_str("rule", true).is_err());
    }

    #[test]
    fn test_write_json() {
        let mut buf = Vec::new();
        Format::write_json(&serde_json::json!({"a": 1}), &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("\"a\": 1"));
        assert!(text.ends_with('\n'));
    }
}

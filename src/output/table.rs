//! Aligned text tables for formatted report rows.
//!
//! The layout doubles as a markdown table: a header row, a `:---`/`---:`
//! alignment row, then one row per entry with nested entries indented.

use std::borrow::Cow;

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_width::UnicodeWidthStr;

use super::display::FormattedDisplayEntry;
use super::theme::Theme;
use super::Column;

/// Printed instead of a table when there are no rows.
pub const NO_DATA: &str = "No data to display.";

const INDENT: &str = "  ";

static ANSI_ESCAPE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\x1b\[[0-9;?]*[A-Za-z]").expect("valid ANSI regex"));

/// Remove ANSI escape sequences.
pub fn strip_ansi(text: &str) -> Cow<'_, str> {
    ANSI_ESCAPE.replace_all(text, "")
}

/// Terminal column width of `text`, ignoring ANSI codes and counting wide
/// characters twice.
pub fn visible_width(text: &str) -> usize {
    UnicodeWidthStr::width(strip_ansi(text).as_ref())
}

/// Table layout options.
#[derive(Debug, Clone, PartialEq)]
pub struct TableOptions {
    /// Header of the identifier column.
    pub identifier_header: String,
    /// Value columns, in display order.
    pub columns: Vec<Column>,
    /// Fixed widths per column, identifier first. Zero or missing means auto.
    pub width_overrides: Vec<usize>,
}

impl TableOptions {
    pub fn new(identifier_header: impl Into<String>, columns: Vec<Column>) -> Self {
        Self {
            identifier_header: identifier_header.into(),
            columns,
            width_overrides: Vec::new(),
        }
    }

    fn headers(&self) -> Vec<String> {
        std::iter::once(self.identifier_header.clone())
            .chain(self.columns.iter().map(|c| c.header().to_string()))
            .collect()
    }
}

/// Render rows as an aligned table.
pub fn render_table(rows: &[FormattedDisplayEntry], options: &TableOptions, theme: &Theme) -> String {
    let mut flat = Vec::new();
    flatten(rows, 0, &mut flat);
    if flat.is_empty() {
        return NO_DATA.to_string();
    }

    let max_time = flat
        .iter()
        .filter(|(_, e)| !e.truncated)
        .map(|(_, e)| e.raw_time_ms)
        .fold(0.0_f64, f64::max);

    let body: Vec<Vec<String>> = flat
        .iter()
        .map(|(depth, entry)| build_row(*depth, entry, options, theme, max_time))
        .collect();

    let headers = options.headers();
    let widths: Vec<usize> = (0..headers.len())
        .map(|col| match options.width_overrides.get(col) {
            Some(&w) if w > 0 => w,
            _ => body
                .iter()
                .map(|row| visible_width(&row[col]))
                .chain(std::iter::once(visible_width(&headers[col])))
                .max()
                .unwrap_or(0)
                .max(3),
        })
        .collect();

    let border = theme.dim("|");
    let mut lines = Vec::with_capacity(body.len() + 2);

    let header_cells: Vec<String> = headers.iter().map(|h| theme.bold(h)).collect();
    lines.push(join_row(&header_cells, &widths, &border));

    let separator: Vec<String> = widths
        .iter()
        .enumerate()
        .map(|(col, &w)| {
            if col == 0 {
                format!(":{}", "-".repeat(w - 1))
            } else {
                format!("{}:", "-".repeat(w - 1))
            }
        })
        .collect();
    lines.push(join_row(&separator, &widths, &border));

    for row in &body {
        lines.push(join_row(row, &widths, &border));
    }
    lines.join("\n")
}

fn flatten<'a>(
    rows: &'a [FormattedDisplayEntry],
    depth: usize,
    out: &mut Vec<(usize, &'a FormattedDisplayEntry)>,
) {
    for row in rows {
        out.push((depth, row));
        if let Some(children) = &row.children {
            flatten(children, depth + 1, out);
        }
    }
}

fn build_row(
    depth: usize,
    entry: &FormattedDisplayEntry,
    options: &TableOptions,
    theme: &Theme,
    max_time: f64,
) -> Vec<String> {
    let mut cells = Vec::with_capacity(options.columns.len() + 1);
    let identifier = if entry.truncated {
        theme.dim(&entry.identifier)
    } else {
        entry.identifier.clone()
    };
    cells.push(format!("{}{}", INDENT.repeat(depth), identifier));

    for &column in &options.columns {
        let text = entry.cell(column);
        let cell = if column == Column::Time && !entry.truncated && max_time > 0.0 {
            theme.paint(text, theme.time_scale.at(entry.raw_time_ms / max_time))
        } else {
            text.to_string()
        };
        cells.push(cell);
    }
    cells
}

fn join_row(cells: &[String], widths: &[usize], border: &str) -> String {
    let mut line = String::new();
    for (col, (cell, &width)) in cells.iter().zip(widths).enumerate() {
        line.push_str(border);
        line.push(' ');
        let pad = " ".repeat(width.saturating_sub(visible_width(cell)));
        if col == 0 {
            line.push_str(cell);
            line.push_str(&pad);
        } else {
            line.push_str(&pad);
            line.push_str(cell);
        }
        line.push(' ');
    }
    line.push_str(border);
    line
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(identifier: &str, time: &str, relative: &str, warnings: &str, errors: &str) -> FormattedDisplayEntry {
        FormattedDisplayEntry {
            identifier: identifier.to_string(),
            time: time.to_string(),
            relative: relative.to_string(),
            warnings: warnings.to_string(),
            errors: errors.to_string(),
            raw_time_ms: 1.0,
            truncated: false,
            children: None,
        }
    }

    fn options() -> TableOptions {
        TableOptions::new("Rule", Column::ALL.to_vec())
    }

    #[test]
    fn test_empty_table() {
        assert_eq!(render_table(&[], &options(), &Theme::default()), NO_DATA);
    }

    #[test]
    fn test_plain_table_snapshot() {
        let rows = vec![
            row("no-unused-vars", "20.00 ms", "50.0%", "0", "1"),
            row("no-console", "20.00 ms", "50.0%", "1", "0"),
        ];
        let table = render_table(&rows, &options(), &Theme::default().plain());
        insta::assert_snapshot!(table, @r"
        | Rule           |     Time | Relative | Warnings | Errors |
        | :------------- | -------: | -------: | -------: | -----: |
        | no-unused-vars | 20.00 ms |    50.0% |        0 |      1 |
        | no-console     | 20.00 ms |    50.0% |        1 |      0 |
        ");
    }

    #[test]
    fn test_nested_rows_are_indented() {
        let mut parent = row("a.ts", "3.00 ms", "100.0%", "0", "1");
        parent.children = Some(vec![row("semi", "3.00 ms", "100.0%", "0", "1")]);
        let options = TableOptions::new("File / Rule", vec![Column::Time]);
        let table = render_table(&[parent], &options, &Theme::default().plain());
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[2].starts_with("| a.ts "));
        assert!(lines[3].starts_with("|   semi "));
    }

    #[test]
    fn test_wide_characters_align() {
        let rows = vec![
            row("semi", "1.00 ms", "50.0%", "0", "2 🔧"),
            row("quotes", "1.00 ms", "50.0%", "0", "10"),
        ];
        let table = render_table(&rows, &options(), &Theme::default().plain());
        let widths: Vec<usize> = table.lines().map(visible_width).collect();
        assert!(widths.windows(2).all(|w| w[0] == w[1]), "{table}");
    }

    #[test]
    fn test_colored_cells_align_by_visible_width() {
        let theme = Theme::default();
        let mut rows = vec![
            row("semi", "1.00 ms", "10.0%", "0", "0"),
            row("quotes", "9.00 ms", "90.0%", "0", "0"),
        ];
        rows[1].raw_time_ms = 9.0;
        rows[0].identifier = format!("\x1b[2mplugin/\x1b[0m{}", "semi");
        let table = render_table(&rows, &options(), &theme);
        let widths: Vec<usize> = table.lines().map(visible_width).collect();
        assert!(widths.windows(2).all(|w| w[0] == w[1]), "{table}");
    }

    #[test]
    fn test_width_overrides() {
        let rows = vec![row("semi", "1.00 ms", "50.0%", "0", "0")];
        let mut options = TableOptions::new("Rule", vec![Column::Time]);
        options.width_overrides = vec![10, 0];
        let table = render_table(&rows, &options, &Theme::default().plain());
        let first = table.lines().next().unwrap();
        assert_eq!(first, "| Rule       |    Time |");
    }

    #[test]
    fn test_strip_ansi_recovers_text() {
        assert_eq!(strip_ansi("\x1b[1;31m12\x1b[0m ms"), "12 ms");
        assert_eq!(strip_ansi("plain"), "plain");
        assert_eq!(visible_width("\x1b[2mab\x1b[0m🔧"), 4);
    }

    #[test]
    fn test_marker_row_has_empty_cells() {
        let mut marker = row("...", "", "", "", "");
        marker.truncated = true;
        let rows = vec![row("semi", "1.00 ms", "50.0%", "0", "0"), marker];
        let table = render_table(&rows, &options(), &Theme::default().plain());
        let last = table.lines().last().unwrap();
        assert!(last.starts_with("| ... "));
        assert!(!last.contains("ms"));
    }
}

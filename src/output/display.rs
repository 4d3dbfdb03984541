//! Converts ranked rows into display strings while keeping the tree shape.

use serde::Serialize;

use super::theme::{DurationStyle, Theme};
use super::Column;
use crate::stats::rank::TRUNCATION_MARKER;
use crate::stats::{ProcessedRow, ProcessedTimeEntry};

/// Appended to violation counts the linter can fix automatically.
pub const FIXABLE_ICON: &str = "🔧";
/// Appended to violation counts that offer manual suggestions.
pub const SUGGESTION_ICON: &str = "💡";

const ELLIPSIS: &str = "…";

/// A ranked row with every value rendered as text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormattedDisplayEntry {
    pub identifier: String,
    pub time: String,
    pub relative: String,
    pub warnings: String,
    pub errors: String,
    /// Unformatted time, kept for color intensity in the renderer.
    pub raw_time_ms: f64,
    pub truncated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<FormattedDisplayEntry>>,
}

impl FormattedDisplayEntry {
    fn marker() -> Self {
        Self {
            identifier: TRUNCATION_MARKER.to_string(),
            time: String::new(),
            relative: String::new(),
            warnings: String::new(),
            errors: String::new(),
            raw_time_ms: 0.0,
            truncated: true,
            children: None,
        }
    }

    /// The text shown for a value column.
    pub fn cell(&self, column: Column) -> &str {
        match column {
            Column::Time => &self.time,
            Column::Relative => &self.relative,
            Column::Warnings => &self.warnings,
            Column::Errors => &self.errors,
        }
    }
}

/// Format a ranked tree for display.
///
/// The common ancestor directory of all file-like identifiers is computed
/// once over the whole tree and stripped from each of them.
pub fn format_rows(rows: &[ProcessedRow], theme: &Theme) -> Vec<FormattedDisplayEntry> {
    let mut file_ids = Vec::new();
    collect_file_ids(rows, &mut file_ids);
    let prefix = common_dir_prefix(&file_ids);

    let mut max = (0u32, 0u32);
    max_counts(rows, &mut max);

    let ctx = FormatContext {
        theme,
        prefix: &prefix,
        max_errors: max.0,
        max_warnings: max.1,
    };
    format_level(rows, &ctx)
}

struct FormatContext<'a> {
    theme: &'a Theme,
    prefix: &'a str,
    max_errors: u32,
    max_warnings: u32,
}

fn format_level(rows: &[ProcessedRow], ctx: &FormatContext<'_>) -> Vec<FormattedDisplayEntry> {
    rows.iter()
        .map(|row| match row {
            ProcessedRow::Truncated => FormattedDisplayEntry::marker(),
            ProcessedRow::Entry(entry) => format_entry(entry, ctx),
        })
        .collect()
}

fn format_entry(entry: &ProcessedTimeEntry, ctx: &FormatContext<'_>) -> FormattedDisplayEntry {
    let theme = ctx.theme;
    let identifier = if is_file_like(&entry.id, entry.children.is_some()) {
        let stripped = entry.id.strip_prefix(ctx.prefix).unwrap_or(&entry.id);
        shorten_path(stripped, theme.max_identifier_width)
    } else {
        format_rule_id(&entry.id, theme)
    };

    let warnings = format_count(entry.warning_count, entry);
    let errors = format_count(entry.error_count, entry);
    let warnings = if entry.warning_count > 0 {
        let t = f64::from(entry.warning_count) / f64::from(ctx.max_warnings.max(1));
        theme.paint(&warnings, theme.warning_scale.at(t))
    } else {
        warnings
    };
    let errors = if entry.error_count > 0 {
        let t = f64::from(entry.error_count) / f64::from(ctx.max_errors.max(1));
        theme.paint(&errors, theme.error_scale.at(t))
    } else {
        errors
    };

    FormattedDisplayEntry {
        identifier,
        time: format_duration(entry.time_ms, theme.duration_style),
        relative: format_percent(entry.relative_percent),
        warnings,
        errors,
        raw_time_ms: entry.time_ms,
        truncated: false,
        children: entry.children.as_ref().map(|c| format_level(c, ctx)),
    }
}

fn collect_file_ids<'a>(rows: &'a [ProcessedRow], out: &mut Vec<&'a str>) {
    for entry in rows.iter().filter_map(ProcessedRow::entry) {
        if is_file_like(&entry.id, entry.children.is_some()) {
            out.push(&entry.id);
        }
        if let Some(children) = &entry.children {
            collect_file_ids(children, out);
        }
    }
}

fn max_counts(rows: &[ProcessedRow], max: &mut (u32, u32)) {
    for entry in rows.iter().filter_map(ProcessedRow::entry) {
        max.0 = max.0.max(entry.error_count);
        max.1 = max.1.max(entry.warning_count);
        if let Some(children) = &entry.children {
            max_counts(children, max);
        }
    }
}

/// Render a duration given in milliseconds.
pub fn format_duration(ms: f64, style: DurationStyle) -> String {
    // Decide the unit on the value as printed
    if (ms * 100.0).round() / 100.0 >= 1000.0 {
        return format!("{:.2} s", ms / 1000.0);
    }
    match style {
        DurationStyle::Si if ms > 0.0 && ms < 1.0 => format!("{:.2} µs", ms * 1000.0),
        _ => format!("{ms:.2} ms"),
    }
}

/// Render a relative percentage; negative values mean "undefined".
pub fn format_percent(percent: f64) -> String {
    if percent < 0.0 {
        "N/A".to_string()
    } else {
        format!("{percent:.1}%")
    }
}

fn format_count(count: u32, entry: &ProcessedTimeEntry) -> String {
    if count == 0 {
        return "0".to_string();
    }
    let mut icons = String::new();
    if entry.fixable {
        icons.push_str(FIXABLE_ICON);
    }
    if entry.manually_fixable {
        icons.push_str(SUGGESTION_ICON);
    }
    if icons.is_empty() {
        count.to_string()
    } else {
        format!("{count} {icons}")
    }
}

/// Dim a plugin prefix such as `react/` in `react/jsx-key`.
fn format_rule_id(id: &str, theme: &Theme) -> String {
    match id.find('/') {
        Some(i) => {
            let (plugin, rule) = id.split_at(i + 1);
            format!("{}{}", theme.dim(plugin), rule)
        }
        None => id.to_string(),
    }
}

/// Whether an identifier names a file rather than a rule.
///
/// Entries with children are always files. Otherwise the identifier needs a
/// path separator and an extension on its last segment.
pub fn is_file_like(id: &str, has_children: bool) -> bool {
    if has_children {
        return true;
    }
    let Some(sep) = id.rfind(['/', '\\']) else {
        return false;
    };
    let name = &id[sep + 1..];
    matches!(name.rfind('.'), Some(dot) if dot > 0 && dot + 1 < name.len())
}

/// Longest common prefix of all paths, cut back to its last separator.
pub fn common_dir_prefix(paths: &[&str]) -> String {
    let Some(&first) = paths.first() else {
        return String::new();
    };
    let mut len = first.len();
    for path in &paths[1..] {
        len = first
            .char_indices()
            .zip(path.chars())
            .take_while(|((_, a), b)| a == b)
            .last()
            .map(|((i, c), _)| i + c.len_utf8())
            .unwrap_or(0)
            .min(len);
    }
    let common = &first[..len];
    match common.rfind(['/', '\\']) {
        Some(sep) => common[..=sep].to_string(),
        None => String::new(),
    }
}

/// Shorten a path to `max` characters.
///
/// Middle segments collapse into `…`, keeping the first segment and the last
/// two. A path that still does not fit keeps the tail of its last part.
pub fn shorten_path(path: &str, max: usize) -> String {
    let len = path.chars().count();
    if max == 0 || len <= max {
        return path.to_string();
    }

    let segments: Vec<&str> = path.split(['/', '\\']).collect();
    if segments.len() > 3 {
        let n = segments.len();
        let sep = if path.contains('\\') && !path.contains('/') {
            '\\'
        } else {
            '/'
        };
        let candidate = format!(
            "{}{sep}{ELLIPSIS}{sep}{}{sep}{}",
            segments[0],
            segments[n - 2],
            segments[n - 1]
        );
        if candidate.chars().count() <= max {
            return candidate;
        }
    }

    let keep = max.saturating_sub(1);
    let tail: String = path.chars().skip(len - keep).collect();
    format!("{ELLIPSIS}{tail}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, time_ms: f64, errors: u32, warnings: u32) -> ProcessedTimeEntry {
        ProcessedTimeEntry {
            id: id.to_string(),
            time_ms,
            warning_count: warnings,
            error_count: errors,
            fixable: false,
            manually_fixable: false,
            relative_percent: 50.0,
            children: None,
        }
    }

    fn plain() -> Theme {
        Theme::default().plain()
    }

    #[test]
    fn test_format_duration_short() {
        assert_eq!(format_duration(0.0, DurationStyle::Short), "0.00 ms");
        assert_eq!(format_duration(12.345, DurationStyle::Short), "12.35 ms");
        assert_eq!(format_duration(999.99, DurationStyle::Short), "999.99 ms");
        assert_eq!(format_duration(1000.0, DurationStyle::Short), "1.00 s");
        assert_eq!(format_duration(999.996, DurationStyle::Short), "1.00 s");
        assert_eq!(format_duration(999.994, DurationStyle::Short), "999.99 ms");
        assert_eq!(format_duration(2345.0, DurationStyle::Short), "2.35 s");
    }

    #[test]
    fn test_format_duration_si() {
        assert_eq!(format_duration(0.25, DurationStyle::Si), "250.00 µs");
        assert_eq!(format_duration(0.0, DurationStyle::Si), "0.00 ms");
        assert_eq!(format_duration(12.5, DurationStyle::Si), "12.50 ms");
        assert_eq!(format_duration(1500.0, DurationStyle::Si), "1.50 s");
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(50.0), "50.0%");
        assert_eq!(format_percent(33.333), "33.3%");
        assert_eq!(format_percent(0.0), "0.0%");
        assert_eq!(format_percent(-1.0), "N/A");
    }

    #[test]
    fn test_common_prefix_stripping() {
        let rows = vec![
            ProcessedRow::Entry(entry("src/app/a.ts", 2.0, 0, 0)),
            ProcessedRow::Entry(entry("src/app/b.ts", 1.0, 0, 0)),
        ];
        let formatted = format_rows(&rows, &plain());
        assert_eq!(formatted[0].identifier, "a.ts");
        assert_eq!(formatted[1].identifier, "b.ts");
    }

    #[test]
    fn test_common_dir_prefix_cuts_at_separator() {
        assert_eq!(
            common_dir_prefix(&["src/app/x.ts", "src/apple/y.ts"]),
            "src/"
        );
        assert_eq!(common_dir_prefix(&["a.ts", "src/b.ts"]), "");
        assert_eq!(common_dir_prefix(&["/repo/src/one.ts"]), "/repo/src/");
        assert_eq!(common_dir_prefix(&[]), "");
    }

    #[test]
    fn test_is_file_like() {
        assert!(is_file_like("src/a.ts", false));
        assert!(is_file_like("C:\\repo\\a.js", false));
        assert!(!is_file_like("react/jsx-key", false));
        assert!(!is_file_like("no-console", false));
        assert!(!is_file_like("src/.eslintrc", false));
        assert!(is_file_like("Makefile", true));
    }

    #[test]
    fn test_rule_ids_are_left_alone() {
        let rows = vec![
            ProcessedRow::Entry(entry("react/jsx-key", 2.0, 0, 0)),
            ProcessedRow::Entry(entry("no-console", 1.0, 0, 0)),
        ];
        let formatted = format_rows(&rows, &plain());
        assert_eq!(formatted[0].identifier, "react/jsx-key");
        assert_eq!(formatted[1].identifier, "no-console");
    }

    #[test]
    fn test_shorten_path_collapses_middle() {
        let path = "packages/web/src/components/forms/inputs/TextField.tsx";
        let short = shorten_path(path, 40);
        assert_eq!(short, "packages/…/inputs/TextField.tsx");
        assert!(short.chars().count() <= 40);
    }

    #[test]
    fn test_shorten_path_collapses_windows_middle() {
        let path = r"C:\repo\packages\web\src\components\forms\inputs\TextField.tsx";
        let short = shorten_path(path, 40);
        assert_eq!(short, r"C:\…\inputs\TextField.tsx");
    }

    #[test]
    fn test_shorten_path_keeps_suffix_of_long_segment() {
        let path = "averyveryveryverylongfilenamewithoutbreaks.ts";
        let short = shorten_path(path, 12);
        assert_eq!(short.chars().count(), 12);
        assert!(short.starts_with('…'));
        assert!(short.ends_with("breaks.ts"));
    }

    #[test]
    fn test_shorten_path_within_limit_unchanged() {
        assert_eq!(shorten_path("src/a.ts", 60), "src/a.ts");
        assert_eq!(shorten_path("src/a.ts", 0), "src/a.ts");
    }

    #[test]
    fn test_icons_on_counts() {
        let mut e = entry("semi", 1.0, 2, 0);
        e.fixable = true;
        e.manually_fixable = true;
        let formatted = format_rows(&[ProcessedRow::Entry(e)], &plain());
        assert_eq!(formatted[0].errors, "2 🔧💡");
        assert_eq!(formatted[0].warnings, "0");
        assert_eq!(formatted[0].identifier, "semi");
    }

    #[test]
    fn test_marker_row() {
        let rows = vec![
            ProcessedRow::Entry(entry("semi", 1.0, 0, 0)),
            ProcessedRow::Truncated,
        ];
        let formatted = format_rows(&rows, &plain());
        assert!(formatted[1].truncated);
        assert_eq!(formatted[1].identifier, "...");
        assert!(formatted[1].time.is_empty());
    }

    #[test]
    fn test_tree_shape_preserved() {
        let mut file = entry("src/a.ts", 3.0, 1, 0);
        file.children = Some(vec![
            ProcessedRow::Entry(entry("semi", 2.0, 1, 0)),
            ProcessedRow::Truncated,
        ]);
        let formatted = format_rows(&[ProcessedRow::Entry(file)], &plain());
        assert_eq!(formatted[0].identifier, "a.ts");
        let children = formatted[0].children.as_ref().unwrap();
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].identifier, "semi");
        assert_eq!(children[0].time, "2.00 ms");
        assert_eq!(children[0].raw_time_ms, 2.0);
        assert!(children[1].truncated);
    }
}

//! Report pipeline: aggregation, ranking, formatting and rendering for one view.
//!
//! Static output, interactive redraws and markdown export all go through
//! [`render_view`], so every surface shows the same table for the same
//! [`ViewOptions`].

use std::io::Write;

use serde::Serialize;

use crate::config::AnalyseConfig;
use crate::core::Result;
use crate::output::{format_rows, render_table, strip_ansi, Column, Format, TableOptions, Theme};
use crate::stats::{
    aggregate, rank, CanonicalRuleRecord, GroupBy, ParsedStats, PercentPolicy, ProcessedRow,
    RankOptions, SortDirection, StatsSummary, TestFilter,
};

/// Everything that decides what one report table shows.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewOptions {
    pub group_by: GroupBy,
    pub rank: RankOptions,
    pub columns: Vec<Column>,
    pub tests: TestFilter,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self::from_config(&AnalyseConfig::default())
    }
}

impl ViewOptions {
    /// Build a view from the `[analyse]` config section.
    pub fn from_config(config: &AnalyseConfig) -> Self {
        let columns = if config.show.is_empty() {
            Column::ALL.to_vec()
        } else {
            config.show.clone()
        };
        Self {
            group_by: config.group_by,
            rank: RankOptions {
                sort_by: config.sort_by,
                direction: config.direction,
                limits: limits_from_take(&config.take),
                policy: config.percent,
            },
            columns,
            tests: TestFilter::Include,
        }
    }
}

/// Convert `--take` values to per-level limits. Values `<= 0` mean no limit.
pub fn limits_from_take(take: &[i64]) -> Vec<usize> {
    take.iter()
        .map(|&n| usize::try_from(n).unwrap_or(0))
        .collect()
}

/// Filter, aggregate and rank records for a view.
pub fn build_rows(records: &[CanonicalRuleRecord], view: &ViewOptions) -> Vec<ProcessedRow> {
    let records = view.tests.apply(records);
    let entries = aggregate(&records, view.group_by);
    let rows = rank(&entries, &view.rank);
    tracing::debug!(
        records = records.len(),
        entries = entries.len(),
        rows = rows.len(),
        group_by = %view.group_by,
        "Built report rows"
    );
    rows
}

/// Render a view as an aligned table.
pub fn render_view(records: &[CanonicalRuleRecord], view: &ViewOptions, theme: &Theme) -> String {
    let rows = build_rows(records, view);
    let formatted = format_rows(&rows, theme);
    let options = TableOptions::new(view.group_by.label(), view.columns.clone());
    render_table(&formatted, &options, theme)
}

/// One-line description of a view, used as section heading and status line.
pub fn describe(view: &ViewOptions) -> String {
    let grouping = match view.group_by {
        GroupBy::Rule => "rule",
        GroupBy::File => "file",
        GroupBy::FileRule => "file and rule",
    };
    let direction = match view.rank.direction {
        SortDirection::Asc => "asc",
        SortDirection::Desc => "desc",
    };
    let mut text = format!(
        "Grouped by {grouping}, sorted by {} ({direction})",
        view.rank.sort_by
    );

    match view.group_by {
        GroupBy::FileRule => {
            let files = view.rank.limit_for(0);
            let rules = view.rank.limit_for(1);
            match (files, rules) {
                (Some(f), Some(r)) => text.push_str(&format!(", top {f} files, {r} rules each")),
                (Some(f), None) => text.push_str(&format!(", top {f} files")),
                (None, Some(r)) => text.push_str(&format!(", {r} rules per file")),
                (None, None) => {}
            }
        }
        _ => {
            if let Some(n) = view.rank.limit_for(0) {
                text.push_str(&format!(", top {n}"));
            }
        }
    }

    if view.group_by == GroupBy::FileRule && view.rank.policy == PercentPolicy::Parent {
        text.push_str(", percent of parent");
    }
    match view.tests {
        TestFilter::Include => {}
        TestFilter::Exclude => text.push_str(", test files excluded"),
        TestFilter::Only => text.push_str(", test files only"),
    }
    text
}

/// JSON document written by `--format json`.
#[derive(Debug, Clone, Serialize)]
pub struct JsonReport<'a> {
    pub summary: &'a StatsSummary,
    pub group_by: GroupBy,
    pub rows: Vec<ProcessedRow>,
}

/// Write a non-interactive report in the requested format.
pub fn write_report<W: Write>(
    format: Format,
    stats: &ParsedStats,
    view: &ViewOptions,
    theme: &Theme,
    writer: &mut W,
) -> Result<()> {
    match format {
        Format::Text => {
            writeln!(writer, "{}", render_view(&stats.records, view, theme))?;
        }
        Format::Markdown => {
            let table = render_view(&stats.records, view, &theme.plain());
            writeln!(writer, "## {}\n\n{}", describe(view), strip_ansi(&table))?;
        }
        Format::Json => {
            let report = JsonReport {
                summary: &stats.summary,
                group_by: view.group_by,
                rows: build_rows(&stats.records, view),
            };
            Format::write_json(&report, writer)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::SortBy;

    fn record(file: &str, rule: &str, time_ms: f64, errors: u32, warnings: u32) -> CanonicalRuleRecord {
        CanonicalRuleRecord {
            file: file.to_string(),
            rule: rule.to_string(),
            time_ms,
            fixable: false,
            manually_fixable: false,
            error_count: errors,
            warning_count: warnings,
            is_test_file: file.contains(".test."),
        }
    }

    fn sample() -> Vec<CanonicalRuleRecord> {
        vec![
            record("src/a.ts", "no-unused-vars", 10.0, 1, 0),
            record("src/a.ts", "no-console", 10.0, 0, 1),
            record("src/b.ts", "no-unused-vars", 10.0, 0, 0),
            record("src/b.ts", "no-console", 10.0, 0, 0),
        ]
    }

    fn view(group_by: GroupBy) -> ViewOptions {
        ViewOptions {
            group_by,
            rank: RankOptions::default(),
            columns: Column::ALL.to_vec(),
            tests: TestFilter::Include,
        }
    }

    #[test]
    fn test_limits_from_take() {
        assert_eq!(limits_from_take(&[20, 5]), vec![20, 5]);
        assert_eq!(limits_from_take(&[0, -3]), vec![0, 0]);
        assert!(limits_from_take(&[]).is_empty());
    }

    #[test]
    fn test_view_from_config() {
        let config = AnalyseConfig {
            group_by: GroupBy::File,
            sort_by: SortBy::Violations,
            take: vec![3],
            show: Vec::new(),
            ..AnalyseConfig::default()
        };
        let view = ViewOptions::from_config(&config);
        assert_eq!(view.group_by, GroupBy::File);
        assert_eq!(view.rank.sort_by, SortBy::Violations);
        assert_eq!(view.rank.limits, vec![3]);
        assert_eq!(view.columns, Column::ALL.to_vec());
    }

    #[test]
    fn test_worked_example_by_rule() {
        let table = render_view(&sample(), &view(GroupBy::Rule), &Theme::default().plain());
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 4);
        // Equal times fall back to identifier order
        assert!(lines[2].contains("no-console"));
        assert!(lines[2].contains("20.00 ms"));
        assert!(lines[2].contains("50.0%"));
        assert!(lines[3].contains("no-unused-vars"));
        assert!(lines[3].contains("20.00 ms"));
        assert!(lines[3].contains("50.0%"));
    }

    #[test]
    fn test_file_rule_view_nests_rules() {
        let rows = build_rows(&sample(), &view(GroupBy::FileRule));
        assert_eq!(rows.len(), 2);
        let children = rows[0].children().unwrap();
        assert_eq!(children.len(), 2);
    }

    #[test]
    fn test_test_filter_applies_before_aggregation() {
        let mut records = sample();
        records.push(record("src/a.test.ts", "no-console", 100.0, 0, 0));
        let mut v = view(GroupBy::File);
        v.tests = TestFilter::Exclude;
        let rows = build_rows(&records, &v);
        assert!(rows.iter().all(|r| !r.id().contains(".test.")));

        v.tests = TestFilter::Only;
        let rows = build_rows(&records, &v);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id(), "src/a.test.ts");
    }

    #[test]
    fn test_empty_records_render_no_data() {
        let table = render_view(&[], &view(GroupBy::Rule), &Theme::default().plain());
        assert_eq!(table, crate::output::NO_DATA);
    }

    #[test]
    fn test_describe() {
        let mut v = view(GroupBy::Rule);
        v.rank.limits = vec![20];
        assert_eq!(describe(&v), "Grouped by rule, sorted by time (desc), top 20");

        let mut v = view(GroupBy::FileRule);
        v.rank.limits = vec![10, 3];
        v.rank.sort_by = SortBy::Violations;
        v.rank.direction = SortDirection::Asc;
        v.rank.policy = PercentPolicy::Parent;
        v.tests = TestFilter::Exclude;
        assert_eq!(
            describe(&v),
            "Grouped by file and rule, sorted by violations (asc), top 10 files, 3 rules each, \
             percent of parent, test files excluded"
        );
    }

    #[test]
    fn test_write_report_json() {
        let stats = ParsedStats {
            records: sample(),
            summary: StatsSummary::default(),
        };
        let mut buf = Vec::new();
        write_report(Format::Json, &stats, &view(GroupBy::Rule), &Theme::default(), &mut buf).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value["group_by"], "rule");
        assert_eq!(value["rows"].as_array().unwrap().len(), 2);
        assert!(value["summary"].is_object());
    }

    #[test]
    fn test_write_report_markdown_is_plain() {
        let stats = ParsedStats {
            records: sample(),
            summary: StatsSummary::default(),
        };
        let mut buf = Vec::new();
        write_report(Format::Markdown, &stats, &view(GroupBy::Rule), &Theme::default(), &mut buf)
            .unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("## Grouped by rule"));
        assert!(!text.contains('\x1b'));
    }
}

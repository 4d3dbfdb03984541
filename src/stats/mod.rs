//! Lint timing statistics: parsing, aggregation and ranking.
//!
//! The pipeline is `raw JSON -> CanonicalRuleRecord -> TimeEntry ->
//! ProcessedRow`. Each stage is a plain function over slices so callers can
//! recompute a whole view whenever the grouping or sorting changes.

pub mod aggregate;
pub mod parse;
pub mod rank;
pub mod raw;

use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

pub use aggregate::{aggregate, group_by_file, group_by_file_rule, group_by_rule};
pub use parse::{load_stats, parse, parse_value, ParsedStats};
pub use rank::{rank, ProcessedRow, ProcessedTimeEntry, RankOptions, UNDEFINED_PERCENT};

/// One file x rule pair observed in the linter output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalRuleRecord {
    /// Path of the linted file as reported by the linter.
    pub file: String,
    /// Rule identifier, e.g. `no-unused-vars` or `react/jsx-key`.
    pub rule: String,
    /// Time spent in the rule for this file, in milliseconds.
    pub time_ms: f64,
    /// The linter can fix this rule's violations automatically.
    pub fixable: bool,
    /// At least one violation offers a manual suggestion.
    pub manually_fixable: bool,
    pub error_count: u32,
    pub warning_count: u32,
    /// File name contains `.test.` or `.spec.`.
    pub is_test_file: bool,
}

impl CanonicalRuleRecord {
    /// Total number of reported violations.
    pub fn violations(&self) -> u32 {
        self.error_count + self.warning_count
    }
}

/// An aggregated row for one grouping key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeEntry {
    /// Rule id, file path, or rule id nested under a file.
    pub id: String,
    pub time_ms: f64,
    pub warning_count: u32,
    pub error_count: u32,
    /// Every violation in this entry can be fixed automatically.
    ///
    /// Never true for an entry without violations.
    pub fixable: bool,
    pub manually_fixable: bool,
    /// Per-rule breakdown, only present in the file-rule view.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<TimeEntry>>,
}

impl TimeEntry {
    /// Create an empty entry for the given key.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            time_ms: 0.0,
            warning_count: 0,
            error_count: 0,
            fixable: false,
            manually_fixable: false,
            children: None,
        }
    }

    /// Total number of reported violations.
    pub fn violations(&self) -> u32 {
        self.error_count + self.warning_count
    }
}

/// Sum of top-level times. Children are never added to the grand total.
pub fn grand_total(entries: &[TimeEntry]) -> f64 {
    entries.iter().map(|e| e.time_ms).sum()
}

/// How timing records are grouped into rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum GroupBy {
    /// One row per rule across all files.
    #[default]
    Rule,
    /// One row per file across all rules.
    File,
    /// One row per file with its rules nested underneath.
    FileRule,
}

impl GroupBy {
    /// All grouping modes in cycling order.
    pub const ALL: [GroupBy; 3] = [GroupBy::Rule, GroupBy::File, GroupBy::FileRule];

    /// Number of hierarchy levels this grouping produces.
    pub fn depth(self) -> usize {
        match self {
            GroupBy::FileRule => 2,
            _ => 1,
        }
    }

    /// Header label for the identifier column.
    pub fn label(self) -> &'static str {
        match self {
            GroupBy::Rule => "Rule",
            GroupBy::File => "File",
            GroupBy::FileRule => "File / Rule",
        }
    }

    /// The next mode in `rule -> file -> file-rule -> rule` order.
    pub fn next(self) -> Self {
        match self {
            GroupBy::Rule => GroupBy::File,
            GroupBy::File => GroupBy::FileRule,
            GroupBy::FileRule => GroupBy::Rule,
        }
    }

    /// The previous mode in cycling order.
    pub fn previous(self) -> Self {
        match self {
            GroupBy::Rule => GroupBy::FileRule,
            GroupBy::File => GroupBy::Rule,
            GroupBy::FileRule => GroupBy::File,
        }
    }
}

impl fmt::Display for GroupBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            GroupBy::Rule => "rule",
            GroupBy::File => "file",
            GroupBy::FileRule => "file-rule",
        };
        f.write_str(s)
    }
}

/// Primary sort key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum SortBy {
    #[default]
    Time,
    /// Errors plus warnings.
    Violations,
}

impl SortBy {
    /// Cycle to the other sort key.
    pub fn next(self) -> Self {
        match self {
            SortBy::Time => SortBy::Violations,
            SortBy::Violations => SortBy::Time,
        }
    }
}

impl fmt::Display for SortBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortBy::Time => f.write_str("time"),
            SortBy::Violations => f.write_str("violations"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn flip(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Asc => f.write_str("asc"),
            SortDirection::Desc => f.write_str("desc"),
        }
    }
}

/// What a nested entry's relative percentage is measured against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum PercentPolicy {
    /// Every row divides by the grand total of top-level times.
    #[default]
    Global,
    /// Children divide by their parent's time ("X% of this file").
    Parent,
}

impl PercentPolicy {
    pub fn toggle(self) -> Self {
        match self {
            PercentPolicy::Global => PercentPolicy::Parent,
            PercentPolicy::Parent => PercentPolicy::Global,
        }
    }
}

impl fmt::Display for PercentPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PercentPolicy::Global => f.write_str("global"),
            PercentPolicy::Parent => f.write_str("parent"),
        }
    }
}

/// Which records take part in a report, based on the test-file flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum TestFilter {
    #[default]
    Include,
    Exclude,
    Only,
}

impl TestFilter {
    /// Keep only the records this filter admits.
    pub fn apply(self, records: &[CanonicalRuleRecord]) -> Vec<CanonicalRuleRecord> {
        records
            .iter()
            .filter(|r| match self {
                TestFilter::Include => true,
                TestFilter::Exclude => !r.is_test_file,
                TestFilter::Only => r.is_test_file,
            })
            .cloned()
            .collect()
    }
}

/// Run-level totals collected while parsing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsSummary {
    /// Number of file results in the input.
    pub files: usize,
    /// Number of file results that carried a stats block.
    pub files_with_stats: usize,
    pub test_files: usize,
    /// Distinct rule ids seen in messages or timings.
    pub rules: usize,
    pub parse_ms: f64,
    pub rules_ms: f64,
    pub fix_ms: f64,
    /// Sum of per-pass totals as reported by the linter.
    pub total_ms: f64,
}

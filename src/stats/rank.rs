//! Relative percentages, per-level sorting and truncation of aggregated entries.

use std::cmp::Ordering;

use serde::Serialize;

use super::{grand_total, PercentPolicy, SortBy, SortDirection, TimeEntry};

/// Relative percentage used when the total it is measured against is zero.
pub const UNDEFINED_PERCENT: f64 = -1.0;

/// Identifier shown for the truncation marker row.
pub const TRUNCATION_MARKER: &str = "...";

/// A [`TimeEntry`] with its share of the relevant total.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessedTimeEntry {
    pub id: String,
    pub time_ms: f64,
    pub warning_count: u32,
    pub error_count: u32,
    pub fixable: bool,
    pub manually_fixable: bool,
    /// Percentage in `[0, 100]`, or [`UNDEFINED_PERCENT`] when the total is 0.
    pub relative_percent: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<ProcessedRow>>,
}

impl ProcessedTimeEntry {
    pub fn violations(&self) -> u32 {
        self.error_count + self.warning_count
    }

    /// The relative percentage, or `None` when it is undefined.
    pub fn percent(&self) -> Option<f64> {
        (self.relative_percent >= 0.0).then_some(self.relative_percent)
    }
}

/// A ranked row: either a real entry or the marker for cut rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ProcessedRow {
    Entry(ProcessedTimeEntry),
    Truncated,
}

impl ProcessedRow {
    pub fn id(&self) -> &str {
        match self {
            ProcessedRow::Entry(e) => &e.id,
            ProcessedRow::Truncated => TRUNCATION_MARKER,
        }
    }

    pub fn entry(&self) -> Option<&ProcessedTimeEntry> {
        match self {
            ProcessedRow::Entry(e) => Some(e),
            ProcessedRow::Truncated => None,
        }
    }

    pub fn is_truncated(&self) -> bool {
        matches!(self, ProcessedRow::Truncated)
    }

    pub fn children(&self) -> Option<&[ProcessedRow]> {
        self.entry().and_then(|e| e.children.as_deref())
    }
}

/// Sorting, truncation and percentage options for [`rank`].
#[derive(Debug, Clone, PartialEq)]
pub struct RankOptions {
    pub sort_by: SortBy,
    pub direction: SortDirection,
    /// Row limit per hierarchy level: `[n]` or `[files, rules per file]`.
    /// Zero or a missing level means no limit.
    pub limits: Vec<usize>,
    pub policy: PercentPolicy,
}

impl Default for RankOptions {
    fn default() -> Self {
        Self {
            sort_by: SortBy::Time,
            direction: SortDirection::Desc,
            limits: Vec::new(),
            policy: PercentPolicy::Global,
        }
    }
}

impl RankOptions {
    /// The row limit for a hierarchy level, if any.
    pub fn limit_for(&self, depth: usize) -> Option<usize> {
        self.limits.get(depth).copied().filter(|&n| n > 0)
    }
}

/// Compute percentages, then sort and truncate every level independently.
///
/// Percentages are computed over the full entry set before truncation, so a
/// cut list still shows each row's share of everything.
pub fn rank(entries: &[TimeEntry], options: &RankOptions) -> Vec<ProcessedRow> {
    let total = grand_total(entries);
    rank_level(entries, total, total, 0, options)
}

fn rank_level(
    entries: &[TimeEntry],
    grand_total: f64,
    level_total: f64,
    depth: usize,
    options: &RankOptions,
) -> Vec<ProcessedRow> {
    let mut processed: Vec<ProcessedTimeEntry> = entries
        .iter()
        .map(|entry| {
            let child_total = match options.policy {
                PercentPolicy::Global => grand_total,
                PercentPolicy::Parent => entry.time_ms,
            };
            let children = entry
                .children
                .as_ref()
                .map(|c| rank_level(c, grand_total, child_total, depth + 1, options));
            ProcessedTimeEntry {
                id: entry.id.clone(),
                time_ms: entry.time_ms,
                warning_count: entry.warning_count,
                error_count: entry.error_count,
                fixable: entry.fixable,
                manually_fixable: entry.manually_fixable,
                relative_percent: relative_percent(entry.time_ms, level_total),
                children,
            }
        })
        .collect();

    processed.sort_by(|a, b| compare(a, b, options.sort_by, options.direction));
    truncate(processed, options.limit_for(depth))
}

/// `part / total * 100`, or [`UNDEFINED_PERCENT`] when `total` is zero.
pub fn relative_percent(part: f64, total: f64) -> f64 {
    if total == 0.0 {
        UNDEFINED_PERCENT
    } else {
        (part / total * 100.0).clamp(0.0, 100.0)
    }
}

fn compare(
    a: &ProcessedTimeEntry,
    b: &ProcessedTimeEntry,
    sort_by: SortBy,
    direction: SortDirection,
) -> Ordering {
    let primary = match sort_by {
        SortBy::Time => a.time_ms.total_cmp(&b.time_ms),
        SortBy::Violations => a.violations().cmp(&b.violations()),
    };
    let primary = match direction {
        SortDirection::Asc => primary,
        SortDirection::Desc => primary.reverse(),
    };
    primary.then_with(|| a.id.cmp(&b.id))
}

fn truncate(mut entries: Vec<ProcessedTimeEntry>, limit: Option<usize>) -> Vec<ProcessedRow> {
    let cut = match limit {
        Some(n) if entries.len() > n => {
            entries.truncate(n);
            true
        }
        _ => false,
    };
    let mut rows: Vec<ProcessedRow> = entries.into_iter().map(ProcessedRow::Entry).collect();
    if cut {
        rows.push(ProcessedRow::Truncated);
    }
    rows
}

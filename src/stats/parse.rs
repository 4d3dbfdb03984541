//! Normalizes raw linter results into canonical per-file/per-rule records.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use serde::Serialize;
use serde_json::Value;

use super::raw::{RawFileResult, RawStats};
use super::{CanonicalRuleRecord, StatsSummary};
use crate::core::{Error, Result};

/// Canonical records plus run-level totals for one stats file.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ParsedStats {
    pub records: Vec<CanonicalRuleRecord>,
    pub summary: StatsSummary,
}

/// Read, validate and parse a stats file produced by the linter.
///
/// Fails when the file is missing, is not JSON, is not an array, or when a
/// non-empty array carries no `stats` block at all (the linter was run
/// without its instrumentation flag). Individual records without stats are
/// accepted and contribute zero time.
pub fn load_stats(path: impl AsRef<Path>) -> Result<ParsedStats> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let content = fs::read_to_string(path)?;
    let value: Value = serde_json::from_str(&content)
        .map_err(|e| Error::malformed(path, format!("invalid JSON: {e}")))?;
    let parsed = parse_value(&value, path)?;

    tracing::debug!(
        path = %path.display(),
        files = parsed.summary.files,
        records = parsed.records.len(),
        "Loaded stats file"
    );
    if parsed.summary.files_with_stats < parsed.summary.files {
        tracing::warn!(
            "{} of {} file results carry no timing data; their rules count as 0 ms",
            parsed.summary.files - parsed.summary.files_with_stats,
            parsed.summary.files
        );
    }

    Ok(parsed)
}

/// Validate an already-decoded JSON document and parse it.
///
/// `source` is only used for error messages.
pub fn parse_value(value: &Value, source: &Path) -> Result<ParsedStats> {
    let items = value.as_array().ok_or_else(|| {
        Error::malformed(source, "expected a JSON array of per-file lint results")
    })?;

    if !items.is_empty() && !items.iter().any(|item| item.get("stats").is_some()) {
        return Err(Error::MissingStats {
            path: source.to_path_buf(),
        });
    }

    let results: Vec<RawFileResult> = serde_json::from_value(value.clone())
        .map_err(|e| Error::malformed(source, e.to_string()))?;

    for result in &results {
        if let Some(msg) = result.messages.iter().find(|m| m.severity > 2) {
            return Err(Error::malformed(
                source,
                format!(
                    "severity {} in {} is not one of 0, 1, 2",
                    msg.severity, result.file_path
                ),
            ));
        }
    }

    Ok(parse(&results))
}

/// Turn raw file results into one record per observed file x rule pair.
///
/// Messages without a rule id are skipped. Rules that only appear in the
/// timing block still produce a zero-violation record so their cost shows up.
pub fn parse(results: &[RawFileResult]) -> ParsedStats {
    let mut summary = StatsSummary {
        files: results.len(),
        ..StatsSummary::default()
    };
    let mut rule_ids: HashSet<String> = HashSet::new();
    let mut records = Vec::new();

    for result in results {
        let is_test = is_test_file(&result.file_path);
        if is_test {
            summary.test_files += 1;
        }

        let timings = match &result.stats {
            Some(stats) => {
                summary.files_with_stats += 1;
                collect_timings(stats, &mut summary)
            }
            None => RuleTimings::default(),
        };

        let mut pending: Vec<PendingRecord> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for msg in &result.messages {
            let Some(rule) = msg.rule_id.as_deref() else {
                continue;
            };
            let slot = *index.entry(rule.to_string()).or_insert_with(|| {
                pending.push(PendingRecord::new(rule));
                pending.len() - 1
            });
            let rec = &mut pending[slot];
            match msg.severity {
                2 => rec.error_count += 1,
                1 => rec.warning_count += 1,
                _ => continue,
            }
            if msg.has_fix() {
                rec.with_fix += 1;
            }
            if msg.has_suggestions() {
                rec.manually_fixable = true;
            }
        }

        for (rule, _) in &timings.entries {
            if !index.contains_key(rule) {
                index.insert(rule.clone(), pending.len());
                pending.push(PendingRecord::new(rule));
            }
        }

        for rec in pending {
            let (time_ms, timing_fixable) = timings.get(&rec.rule);
            let violations = rec.error_count + rec.warning_count;
            rule_ids.insert(rec.rule.clone());
            records.push(CanonicalRuleRecord {
                file: result.file_path.clone(),
                fixable: timing_fixable || (violations > 0 && rec.with_fix == violations),
                manually_fixable: rec.manually_fixable,
                error_count: rec.error_count,
                warning_count: rec.warning_count,
                time_ms,
                is_test_file: is_test,
                rule: rec.rule,
            });
        }
    }

    summary.rules = rule_ids.len();
    ParsedStats { records, summary }
}

/// Whether a path names a test file (`.test.` or `.spec.` in the file name).
pub fn is_test_file(path: &str) -> bool {
    let name = path
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(path)
        .to_lowercase();
    name.contains(".test.") || name.contains(".spec.")
}

/// Per-rule timing for one file, summed over passes, in first-seen order.
#[derive(Default)]
struct RuleTimings {
    entries: Vec<(String, (f64, bool))>,
    index: HashMap<String, usize>,
}

impl RuleTimings {
    fn add(&mut self, rule: &str, time_ms: f64, fixable: bool) {
        match self.index.get(rule) {
            Some(&i) => {
                let (time, fix) = &mut self.entries[i].1;
                *time += time_ms;
                *fix |= fixable;
            }
            None => {
                self.index.insert(rule.to_string(), self.entries.len());
                self.entries.push((rule.to_string(), (time_ms, fixable)));
            }
        }
    }

    fn get(&self, rule: &str) -> (f64, bool) {
        self.index
            .get(rule)
            .map(|&i| self.entries[i].1)
            .unwrap_or((0.0, false))
    }
}

fn collect_timings(stats: &RawStats, summary: &mut StatsSummary) -> RuleTimings {
    let mut timings = RuleTimings::default();
    for pass in &stats.times.passes {
        summary.parse_ms += pass.parse.total;
        summary.fix_ms += pass.fix.total;
        summary.total_ms += pass.total;
        for (rule, timing) in &pass.rules {
            let time = timing.total.max(0.0);
            summary.rules_ms += time;
            timings.add(rule, time, timing.fixable.unwrap_or(false));
        }
    }
    timings
}

struct PendingRecord {
    rule: String,
    error_count: u32,
    warning_count: u32,
    /// Violating messages that carry an automatic fix.
    with_fix: u32,
    manually_fixable: bool,
}

impl PendingRecord {
    fn new(rule: &str) -> Self {
        Self {
            rule: rule.to_string(),
            error_count: 0,
            warning_count: 0,
            with_fix: 0,
            manually_fixable: false,
        }
    }
}

//! Groups canonical records into by-rule, by-file and by-file-then-rule views.
//!
//! Output order is first-seen order of the grouping key. Callers that need a
//! particular order must rank the entries explicitly.

use std::collections::HashMap;

use super::{CanonicalRuleRecord, GroupBy, TimeEntry};

/// Aggregate records for the requested grouping mode.
pub fn aggregate(records: &[CanonicalRuleRecord], group_by: GroupBy) -> Vec<TimeEntry> {
    let entries = match group_by {
        GroupBy::Rule => group_by_rule(records),
        GroupBy::File => group_by_file(records),
        GroupBy::FileRule => group_by_file_rule(records),
    };
    tracing::debug!(%group_by, records = records.len(), entries = entries.len(), "Aggregated records");
    entries
}

/// One entry per rule, summed across files.
pub fn group_by_rule(records: &[CanonicalRuleRecord]) -> Vec<TimeEntry> {
    group_records(records, |r| r.rule.as_str())
}

/// One entry per file, summed across rules.
pub fn group_by_file(records: &[CanonicalRuleRecord]) -> Vec<TimeEntry> {
    group_records(records, |r| r.file.as_str())
}

/// One entry per file, with one child per rule observed in that file.
///
/// A file's totals and fixability are derived from its own children only.
pub fn group_by_file_rule(records: &[CanonicalRuleRecord]) -> Vec<TimeEntry> {
    let mut files: Vec<(&str, Vec<&CanonicalRuleRecord>)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for record in records {
        let slot = *index.entry(record.file.as_str()).or_insert_with(|| {
            files.push((record.file.as_str(), Vec::new()));
            files.len() - 1
        });
        files[slot].1.push(record);
    }

    files
        .into_iter()
        .map(|(file, file_records)| {
            let children = group_records(file_records.into_iter(), |r| r.rule.as_str());
            let mut entry = TimeEntry::new(file);
            for child in &children {
                entry.time_ms += child.time_ms;
                entry.error_count += child.error_count;
                entry.warning_count += child.warning_count;
                entry.manually_fixable |= child.manually_fixable;
            }
            entry.fixable = all_violations_fixable(
                children.iter().map(|c| (c.violations(), c.fixable)),
            );
            entry.children = Some(children);
            entry
        })
        .collect()
}

fn group_records<'a, I, K>(records: I, key: K) -> Vec<TimeEntry>
where
    I: IntoIterator<Item = &'a CanonicalRuleRecord>,
    K: Fn(&CanonicalRuleRecord) -> &str,
{
    let mut entries: Vec<TimeEntry> = Vec::new();
    // Per entry: whether every violating record seen so far is fixable.
    let mut fixable_so_far: Vec<bool> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for record in records {
        let id = key(record);
        let slot = match index.get(id) {
            Some(&slot) => slot,
            None => {
                index.insert(id.to_string(), entries.len());
                entries.push(TimeEntry::new(id));
                fixable_so_far.push(true);
                entries.len() - 1
            }
        };

        let entry = &mut entries[slot];
        entry.time_ms += record.time_ms;
        entry.error_count += record.error_count;
        entry.warning_count += record.warning_count;
        entry.manually_fixable |= record.manually_fixable;
        if record.violations() > 0 && !record.fixable {
            fixable_so_far[slot] = false;
        }
    }

    for (entry, all_fixable) in entries.iter_mut().zip(fixable_so_far) {
        entry.fixable = entry.violations() > 0 && all_fixable;
    }
    entries
}

/// True when there is at least one violation and every violating part is fixable.
fn all_violations_fixable(parts: impl Iterator<Item = (u32, bool)>) -> bool {
    let mut any = false;
    for (violations, fixable) in parts {
        if violations == 0 {
            continue;
        }
        if !fixable {
            return false;
        }
        any = true;
    }
    any
}

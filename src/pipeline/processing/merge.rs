use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, warn};

use crate::constants;
use crate::types::{CanonicalRecord, CompanyRecord};

/// How disagreeing values of one column are reconciled inside a group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictPolicy {
    /// Collapse duplicates, surface only genuine disagreement
    #[default]
    Consensus,
    /// Keep every source's claim, repeats included, unless all sources agree
    FullDisclosure,
}

/// Explicit column → policy map with a fallback for unlisted columns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnPolicies {
    pub default: ConflictPolicy,
    pub columns: HashMap<String, ConflictPolicy>,
}

impl ColumnPolicies {
    pub fn new(default: ConflictPolicy) -> Self {
        Self {
            default,
            columns: HashMap::new(),
        }
    }

    pub fn with(mut self, column: &str, policy: ConflictPolicy) -> Self {
        self.columns.insert(column.to_string(), policy);
        self
    }

    pub fn policy_for(&self, column: &str) -> ConflictPolicy {
        self.columns.get(column).copied().unwrap_or(self.default)
    }
}

impl Default for ColumnPolicies {
    /// `mode` and `hiring` are assertions every source gets to keep
    fn default() -> Self {
        Self::new(ConflictPolicy::Consensus)
            .with(constants::MODE, ConflictPolicy::FullDisclosure)
            .with(constants::HIRING, ConflictPolicy::FullDisclosure)
    }
}

/// Distinct non-null values in first-occurrence order, joined
pub fn resolve_consensus(values: &[Option<&str>], delimiter: &str) -> String {
    let mut distinct: Vec<&str> = Vec::new();
    for value in values.iter().flatten().copied() {
        if !distinct.contains(&value) {
            distinct.push(value);
        }
    }
    distinct.join(delimiter)
}

/// The shared value when every raw value (nulls included) is identical,
/// otherwise every non-null value in order, repeats kept
pub fn resolve_full_disclosure(values: &[Option<&str>], delimiter: &str) -> String {
    let first = values.first().copied().flatten();
    if values.iter().all(|v| *v == first) {
        return first.unwrap_or_default().to_string();
    }
    values
        .iter()
        .flatten()
        .copied()
        .collect::<Vec<_>>()
        .join(delimiter)
}

/// Records of one batch partitioned by group key, in first-occurrence order
#[derive(Debug, Default)]
pub struct Grouping<'a> {
    pub groups: Vec<(String, Vec<&'a CompanyRecord>)>,
    /// Records that carried no key and therefore belong to no group
    pub skipped: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergeOutcome {
    pub records: Vec<CanonicalRecord>,
    pub skipped_without_key: usize,
    pub conflicting_groups: usize,
}

/// Collapses same-key records into canonical records, column by column
#[derive(Debug, Clone)]
pub struct RecordMerger {
    group_key: String,
    delimiter: String,
    policies: ColumnPolicies,
}

impl Default for RecordMerger {
    fn default() -> Self {
        Self::new(constants::ID, constants::MERGE_DELIMITER, ColumnPolicies::default())
    }
}

impl RecordMerger {
    pub fn new(group_key: &str, delimiter: &str, policies: ColumnPolicies) -> Self {
        Self {
            group_key: group_key.to_string(),
            delimiter: delimiter.to_string(),
            policies,
        }
    }

    pub fn group_key(&self) -> &str {
        &self.group_key
    }

    /// Single pass building key → ordered member list. Must finish before any
    /// merge runs since a merge needs the whole group.
    pub fn group<'a>(&self, records: &'a [CompanyRecord]) -> Grouping<'a> {
        let mut index: HashMap<&'a str, usize> = HashMap::new();
        let mut grouping = Grouping::default();

        for record in records {
            let Some(key) = record.get(&self.group_key) else {
                grouping.skipped += 1;
                continue;
            };
            match index.get(key) {
                Some(&slot) => grouping.groups[slot].1.push(record),
                None => {
                    index.insert(key, grouping.groups.len());
                    grouping.groups.push((key.to_string(), vec![record]));
                }
            }
        }

        if grouping.skipped > 0 {
            warn!(
                skipped = grouping.skipped,
                "Records without '{}' were left out of merging", self.group_key
            );
        }
        grouping
    }

    /// Merge one group of records sharing `key`
    pub fn merge(&self, key: &str, records: &[&CompanyRecord]) -> CanonicalRecord {
        let columns: BTreeSet<&str> = records.iter().flat_map(|r| r.columns()).collect();
        let mut values = HashMap::with_capacity(columns.len());
        let mut conflicts = Vec::new();

        for column in columns {
            let raw: Vec<Option<&str>> = records.iter().map(|r| r.get(column)).collect();
            let merged = match self.policies.policy_for(column) {
                ConflictPolicy::Consensus => resolve_consensus(&raw, &self.delimiter),
                ConflictPolicy::FullDisclosure => resolve_full_disclosure(&raw, &self.delimiter),
            };

            let mut seen: Vec<&str> = Vec::new();
            for value in raw.iter().flatten().copied() {
                if !seen.contains(&value) {
                    seen.push(value);
                }
            }
            if seen.len() > 1 {
                conflicts.push(column.to_string());
            }

            values.insert(column.to_string(), merged);
        }

        if !conflicts.is_empty() {
            debug!(key, columns = ?conflicts, "Merged group with disagreeing values");
        }

        CanonicalRecord {
            key: key.to_string(),
            values,
            member_count: records.len(),
            conflicts,
        }
    }

    /// Group a whole batch and merge every group
    pub fn merge_all(&self, records: &[CompanyRecord]) -> MergeOutcome {
        let grouping = self.group(records);
        let merged: Vec<CanonicalRecord> = grouping
            .groups
            .iter()
            .map(|(key, members)| self.merge(key, members))
            .collect();
        let conflicting_groups = merged.iter().filter(|r| !r.conflicts.is_empty()).count();

        MergeOutcome {
            records: merged,
            skipped_without_key: grouping.skipped,
            conflicting_groups,
        }
    }
}

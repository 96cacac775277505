//! Snapshot comparison.
//!
//! This is where determinism matters most: the same two stores must always
//! produce byte-identical reports.
//!
//! # Algorithm
//!
//! 1. Walk both stores in case-insensitive key order
//! 2. Keys only in the new store are added, keys only in the old are deleted
//! 3. Keys in both with equal fingerprints are unchanged
//! 4. Otherwise compare the union of attribute names one by one and record
//!    the value-level set differences

use crate::caseless::{eq_caseless, fold, Caseless};
use crate::{AttributeBag, ObjectRecord, ObjectStore, RecordKey};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

/// Value-level change of one attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeChange {
    /// Attribute name, spelled as in the newer record when present
    pub attribute: String,
    pub old_values: Vec<String>,
    pub new_values: Vec<String>,
    /// Values present only in the new record
    pub added: Vec<String>,
    /// Values present only in the old record
    pub removed: Vec<String>,
}

/// An object present in both snapshots whose attributes differ.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModifiedObject {
    pub key: RecordKey,
    pub changes: Vec<AttributeChange>,
}

/// Result of comparing two snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffResult {
    /// Objects in the old snapshot
    pub old_count: usize,
    /// Objects in the new snapshot
    pub new_count: usize,
    /// Keys only in the new snapshot
    pub added: Vec<RecordKey>,
    /// Keys only in the old snapshot
    pub deleted: Vec<RecordKey>,
    /// Objects whose attributes changed
    pub modified: Vec<ModifiedObject>,
}

/// Headline numbers of a [`DiffResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffSummary {
    pub old_count: usize,
    pub new_count: usize,
    pub added: usize,
    pub deleted: usize,
    pub modified: usize,
    pub unchanged: usize,
    pub attribute_changes: usize,
}

impl DiffResult {
    /// True when the two snapshots hold the same objects with the same content.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.deleted.is_empty() && self.modified.is_empty()
    }

    pub fn summary(&self) -> DiffSummary {
        DiffSummary {
            old_count: self.old_count,
            new_count: self.new_count,
            added: self.added.len(),
            deleted: self.deleted.len(),
            modified: self.modified.len(),
            unchanged: self
                .old_count
                .saturating_sub(self.deleted.len())
                .saturating_sub(self.modified.len()),
            attribute_changes: self.modified.iter().map(|m| m.changes.len()).sum(),
        }
    }

    /// Find the modification entry for a key, ignoring case.
    pub fn modified_object(&self, key: &str) -> Option<&ModifiedObject> {
        let key = fold(key);
        self.modified.iter().find(|m| fold(&m.key) == key)
    }
}

/// Compare two snapshots.
pub fn diff(old: &ObjectStore, new: &ObjectStore) -> DiffResult {
    let old_entries = old.entries();
    let new_entries = new.entries();

    let mut result = DiffResult {
        old_count: old.len(),
        new_count: new.len(),
        ..DiffResult::default()
    };

    for (key, old_record) in old_entries {
        match new_entries.get(key.folded()) {
            None => result.deleted.push(old_record.key.clone()),
            Some(new_record) if !old_record.same_content(new_record) => {
                result.modified.push(ModifiedObject {
                    key: new_record.key.clone(),
                    changes: attribute_changes(old_record, new_record),
                });
            }
            Some(_) => {}
        }
    }

    result.added = new_entries
        .iter()
        .filter(|(key, _)| !old_entries.contains_key(key.folded()))
        .map(|(_, record)| record.key.clone())
        .collect();

    result
}

/// Per-attribute changes between two versions of the same object.
pub fn attribute_changes(old: &ObjectRecord, new: &ObjectRecord) -> Vec<AttributeChange> {
    compare_bags(old.attributes(), new.attributes())
}

fn compare_bags(old: &AttributeBag, new: &AttributeBag) -> Vec<AttributeChange> {
    // `insert` keeps the first equal element, so new spellings go in first.
    let mut names: BTreeSet<&Caseless> = BTreeSet::new();
    for name in new.names().chain(old.names()) {
        names.insert(name);
    }

    names
        .into_iter()
        .filter_map(|name| {
            let old_values = old.get(name.folded()).unwrap_or_default();
            let new_values = new.get(name.folded()).unwrap_or_default();
            if eq_caseless(old_values, new_values) {
                return None;
            }
            Some(AttributeChange {
                attribute: name.as_str().to_string(),
                old_values: old_values.to_vec(),
                new_values: new_values.to_vec(),
                added: difference(new_values, old_values),
                removed: difference(old_values, new_values),
            })
        })
        .collect()
}

/// Values of `a` not in `b`, ignoring case.
fn difference(a: &[String], b: &[String]) -> Vec<String> {
    let b: HashSet<String> = b.iter().map(|v| fold(v)).collect();
    a.iter().filter(|v| !b.contains(&fold(v))).cloned().collect()
}

//! Canonical object records.

use crate::caseless::{fold, Caseless};
use crate::normalize::merge_values;
use crate::{Fingerprint, RecordKey, SourceLabel};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write;

/// Normalized attributes of one object.
///
/// Names are case-insensitive; each value sequence is canonical (see
/// [`crate::normalize`]). Iteration is in case-insensitive name order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AttributeBag(BTreeMap<Caseless, Vec<String>>);

impl AttributeBag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an attribute, replacing any existing values. Empty sequences are
    /// not stored.
    pub fn insert(&mut self, name: impl Into<Caseless>, values: Vec<String>) {
        if !values.is_empty() {
            self.0.insert(name.into(), values);
        }
    }

    /// Union `values` into an attribute, keeping the existing name spelling.
    pub fn merge(&mut self, name: impl Into<Caseless>, values: Vec<String>) {
        if values.is_empty() {
            return;
        }
        let name = name.into();
        match self.0.get_mut(name.folded()) {
            Some(existing) => *existing = merge_values(existing, &values),
            None => {
                self.0.insert(name, values);
            }
        }
    }

    /// Look up an attribute by name, ignoring case.
    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.0.get(fold(name).as_str()).map(Vec::as_slice)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(fold(name).as_str())
    }

    pub fn names(&self) -> impl Iterator<Item = &Caseless> {
        self.0.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Caseless, &[String])> {
        self.0.iter().map(|(k, v)| (k, v.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Deterministic digest of the bag's content.
    ///
    /// Names and values are joined in their folded form, so two bags that
    /// compare equal attribute by attribute always share a fingerprint. Every
    /// name and value is length-prefixed and every value list is counted, so
    /// no value can imitate the encoding of another attribute.
    pub fn fingerprint(&self) -> Fingerprint {
        let mut out = String::new();
        for (name, values) in &self.0 {
            push_field(&mut out, name.folded());
            // Writing into a String cannot fail.
            let _ = write!(out, "#{}", values.len());
            for value in values {
                push_field(&mut out, &fold(value));
            }
        }
        out
    }
}

fn push_field(out: &mut String, text: &str) {
    let _ = write!(out, "{}:{}", text.len(), text);
}

impl<N: Into<Caseless>> FromIterator<(N, Vec<String>)> for AttributeBag {
    fn from_iter<T: IntoIterator<Item = (N, Vec<String>)>>(iter: T) -> Self {
        let mut bag = Self::new();
        for (name, values) in iter {
            bag.merge(name, values);
        }
        bag
    }
}

/// One object extracted from a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectRecord {
    /// Identity key, unique within a snapshot (case-insensitive)
    pub key: RecordKey,
    /// Label of the payload the record was extracted from
    pub source: SourceLabel,
    attributes: AttributeBag,
    fingerprint: Fingerprint,
}

impl ObjectRecord {
    pub fn new(
        key: impl Into<RecordKey>,
        source: impl Into<SourceLabel>,
        attributes: AttributeBag,
    ) -> Self {
        let fingerprint = attributes.fingerprint();
        Self {
            key: key.into(),
            source: source.into(),
            attributes,
            fingerprint,
        }
    }

    pub fn attributes(&self) -> &AttributeBag {
        &self.attributes
    }

    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    /// Whether two records carry the same normalized content.
    pub fn same_content(&self, other: &ObjectRecord) -> bool {
        self.fingerprint == other.fingerprint
    }
}

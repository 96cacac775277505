//! Per-snapshot object stores.
//!
//! A [`SnapshotBuilder`] folds payloads, in archive order, into an
//! [`ObjectStore`]. Once built the store is read-only. Keys are compared
//! case-insensitively and a later record with the same key replaces the
//! earlier one.

use crate::caseless::{fold, Caseless};
use crate::config::ExtractConfig;
use crate::error::Result;
use crate::extract::{extract, parse_document};
use crate::{ObjectRecord, SourceLabel};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// What to do with a payload that is not valid JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ParsePolicy {
    /// Count the payload as skipped and continue (default)
    #[default]
    Skip,
    /// Stop building and return the parse error
    Abort,
}

/// Counters gathered while building a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotStats {
    /// Payloads offered to the builder
    pub payloads: usize,
    /// Payloads skipped because they could not be parsed
    pub skipped_payloads: usize,
    /// Records emitted by the extractor, before duplicate resolution
    pub extracted: usize,
    /// Records that replaced an earlier record with the same key
    pub duplicates: usize,
}

/// Outcome of ingesting a single payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ingested {
    /// The payload parsed; counts of records emitted and of those that
    /// replaced an earlier record
    Parsed { records: usize, duplicates: usize },
    /// The payload was malformed and skipped
    Skipped,
}

/// All objects of one snapshot, keyed by identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectStore {
    records: BTreeMap<Caseless, ObjectRecord>,
    stats: SnapshotStats,
    skipped_labels: Vec<SourceLabel>,
}

impl ObjectStore {
    /// Build a store from `(label, bytes)` payloads in order.
    pub fn from_payloads<I, L, B>(
        payloads: I,
        config: &ExtractConfig,
        policy: ParsePolicy,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = (L, B)>,
        L: AsRef<str>,
        B: AsRef<[u8]>,
    {
        let mut builder = SnapshotBuilder::new(config, policy);
        for (label, bytes) in payloads {
            builder.ingest(label.as_ref(), bytes.as_ref())?;
        }
        Ok(builder.finish())
    }

    /// Look up a record by key, ignoring case.
    pub fn get(&self, key: &str) -> Option<&ObjectRecord> {
        self.records.get(fold(key).as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.records.contains_key(fold(key).as_str())
    }

    /// Records in case-insensitive key order.
    pub fn records(&self) -> impl Iterator<Item = &ObjectRecord> {
        self.records.values()
    }

    pub(crate) fn entries(&self) -> &BTreeMap<Caseless, ObjectRecord> {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn stats(&self) -> &SnapshotStats {
        &self.stats
    }

    /// Labels of payloads skipped as malformed, in archive order.
    pub fn skipped_labels(&self) -> &[SourceLabel] {
        &self.skipped_labels
    }
}

/// Incrementally builds an [`ObjectStore`].
pub struct SnapshotBuilder<'a> {
    config: &'a ExtractConfig,
    policy: ParsePolicy,
    store: ObjectStore,
}

impl<'a> SnapshotBuilder<'a> {
    pub fn new(config: &'a ExtractConfig, policy: ParsePolicy) -> Self {
        Self {
            config,
            policy,
            store: ObjectStore::default(),
        }
    }

    /// Parse and extract one payload into the store.
    ///
    /// With [`ParsePolicy::Abort`] a malformed payload is returned as an error
    /// and the store is left as it was before the call.
    pub fn ingest(&mut self, label: &str, bytes: &[u8]) -> Result<Ingested> {
        let document = match parse_document(label, bytes) {
            Ok(document) => document,
            Err(e) if self.policy == ParsePolicy::Abort => return Err(e),
            Err(_) => {
                self.store.stats.payloads += 1;
                self.store.stats.skipped_payloads += 1;
                self.store.skipped_labels.push(label.to_string());
                return Ok(Ingested::Skipped);
            }
        };
        self.store.stats.payloads += 1;

        let extraction = extract(&document, label, self.config);
        let records = extraction.records.len();
        let mut duplicates = 0;
        for record in extraction.records {
            if self.insert(record) {
                duplicates += 1;
            }
        }

        self.store.stats.extracted += records;
        self.store.stats.duplicates += duplicates;
        Ok(Ingested::Parsed {
            records,
            duplicates,
        })
    }

    /// Insert a record, returning whether it replaced an existing one.
    pub fn insert(&mut self, record: ObjectRecord) -> bool {
        let key = Caseless::new(record.key.clone());
        // `BTreeMap::insert` keeps the old key, so remove first to let the
        // latest spelling win along with the latest record.
        let replaced = self.store.records.remove(key.folded()).is_some();
        self.store.records.insert(key, record);
        replaced
    }

    pub fn stats(&self) -> &SnapshotStats {
        &self.store.stats
    }

    pub fn finish(self) -> ObjectStore {
        self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    fn config() -> ExtractConfig {
        ExtractConfig::default()
    }

    #[test]
    fn build_from_payloads() {
        let config = config();
        let store = ObjectStore::from_payloads(
            vec![
                ("users", r#"[{"dn":"CN=a,DC=x","mail":"a@x"},{"name":"b"}]"#),
                ("groups", r#"{"data":[{"dn":"CN=g,DC=x","member":"CN=a,DC=x"}]}"#),
            ],
            &config,
            ParsePolicy::Skip,
        )
        .unwrap();

        assert_eq!(store.len(), 3);
        assert!(store.contains("cn=A,dc=X"));
        assert!(store.contains("users:b"));
        assert_eq!(store.get("CN=g,DC=x").unwrap().source, "groups");
        assert_eq!(
            store.stats(),
            &SnapshotStats {
                payloads: 2,
                skipped_payloads: 0,
                extracted: 3,
                duplicates: 0,
            }
        );
    }

    #[test]
    fn records_iterate_in_key_order() {
        let config = config();
        let store = ObjectStore::from_payloads(
            vec![("u", r#"[{"id":"c-1"},{"id":"A-1"},{"id":"b-1"}]"#)],
            &config,
            ParsePolicy::Skip,
        )
        .unwrap();
        let keys: Vec<_> = store.records().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["A-1", "b-1", "c-1"]);
    }

    #[test]
    fn last_writer_wins_on_duplicate_key() {
        let config = config();
        let mut builder = SnapshotBuilder::new(&config, ParsePolicy::Skip);
        builder
            .ingest("a", br#"[{"dn":"CN=x,DC=y","title":"old"}]"#)
            .unwrap();
        let outcome = builder
            .ingest("b", br#"[{"dn":"cn=x,dc=y","title":"new"}]"#)
            .unwrap();
        assert_eq!(
            outcome,
            Ingested::Parsed {
                records: 1,
                duplicates: 1
            }
        );

        let store = builder.finish();
        assert_eq!(store.len(), 1);
        let record = store.get("CN=X,DC=Y").unwrap();
        assert_eq!(record.key, "cn=x,dc=y");
        assert_eq!(record.source, "b");
        assert_eq!(store.stats().duplicates, 1);
        assert_eq!(store.stats().extracted, 2);
    }

    #[test]
    fn skip_policy_counts_malformed_payloads() {
        let config = config();
        let mut builder = SnapshotBuilder::new(&config, ParsePolicy::Skip);
        assert_eq!(builder.ingest("bad", b"{oops").unwrap(), Ingested::Skipped);
        builder.ingest("good", br#"[{"id":"k-1"}]"#).unwrap();

        let store = builder.finish();
        assert_eq!(store.len(), 1);
        assert_eq!(store.stats().payloads, 2);
        assert_eq!(store.stats().skipped_payloads, 1);
        assert_eq!(store.skipped_labels(), &["bad".to_string()]);
    }

    #[test]
    fn abort_policy_returns_parse_error() {
        let config = config();
        let result = ObjectStore::from_payloads(
            vec![("good", r#"[{"id":"k-1"}]"#), ("bad", "[")],
            &config,
            ParsePolicy::Abort,
        );
        assert!(matches!(
            result,
            Err(Error::MalformedDocument { ref label, .. }) if label == "bad"
        ));
    }

    #[test]
    fn zero_records_is_not_an_error() {
        let config = config();
        let mut builder = SnapshotBuilder::new(&config, ParsePolicy::Abort);
        let outcome = builder.ingest("empty", b"[]").unwrap();
        assert_eq!(
            outcome,
            Ingested::Parsed {
                records: 0,
                duplicates: 0
            }
        );
        assert!(builder.finish().is_empty());
    }
}

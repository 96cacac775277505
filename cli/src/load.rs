//! Snapshot loading: archive payloads folded into an object store.

use crate::archive::read_payloads;
use crate::config::Config;
use crate::error::Result;
use snapdelta_engine::{Ingested, ObjectStore, SnapshotBuilder};
use std::path::{Path, PathBuf};

/// A snapshot read from disk.
#[derive(Debug)]
pub struct LoadedSnapshot {
    pub path: PathBuf,
    pub store: ObjectStore,
}

/// Read and index one snapshot.
///
/// Payloads are ingested strictly in archive order; a later record with the
/// same key replaces an earlier one.
pub fn load_snapshot(path: &Path, config: &Config) -> Result<LoadedSnapshot> {
    let payloads = read_payloads(path)?;
    tracing::info!(path = %path.display(), payloads = payloads.len(), "Reading snapshot");

    let mut builder = SnapshotBuilder::new(&config.extract, config.policy);
    for payload in &payloads {
        match builder.ingest(&payload.label, &payload.bytes)? {
            Ingested::Parsed {
                records,
                duplicates,
            } => {
                tracing::debug!(
                    entry = %payload.name,
                    label = %payload.label,
                    records,
                    "Extracted payload"
                );
                if duplicates > 0 {
                    tracing::warn!(
                        entry = %payload.name,
                        duplicates,
                        "Duplicate keys replaced earlier records"
                    );
                }
            }
            Ingested::Skipped => {
                tracing::warn!(entry = %payload.name, "Skipping malformed payload");
            }
        }
    }

    let store = builder.finish();
    let stats = store.stats();
    tracing::info!(
        path = %path.display(),
        objects = store.len(),
        extracted = stats.extracted,
        skipped = stats.skipped_payloads,
        duplicates = stats.duplicates,
        "Snapshot indexed"
    );

    Ok(LoadedSnapshot {
        path: path.to_path_buf(),
        store,
    })
}

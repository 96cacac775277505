//! Report rendering.
//!
//! Renderers only read the [`DiffResult`]; the same [`Report`] feeds the JSON
//! file, the HTML page and the terminal summary.

mod html;
mod json;

pub use html::write_html;
pub use json::write_json;

use crate::load::LoadedSnapshot;
use chrono::{DateTime, Utc};
use serde::Serialize;
use snapdelta_engine::{DiffResult, DiffSummary, SnapshotStats};
use std::fmt::Write;

/// Everything a rendered report shows.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report<'a> {
    pub generated_at: DateTime<Utc>,
    pub old: SnapshotInfo<'a>,
    pub new: SnapshotInfo<'a>,
    pub summary: DiffSummary,
    pub diff: &'a DiffResult,
}

/// Where a snapshot came from and how it was read.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotInfo<'a> {
    pub path: String,
    pub objects: usize,
    pub stats: &'a SnapshotStats,
    pub skipped_payloads: &'a [String],
}

impl<'a> SnapshotInfo<'a> {
    pub fn from_loaded(loaded: &'a LoadedSnapshot) -> Self {
        Self {
            path: loaded.path.display().to_string(),
            objects: loaded.store.len(),
            stats: loaded.store.stats(),
            skipped_payloads: loaded.store.skipped_labels(),
        }
    }
}

impl<'a> Report<'a> {
    pub fn new(old: &'a LoadedSnapshot, new: &'a LoadedSnapshot, diff: &'a DiffResult) -> Self {
        Self {
            generated_at: Utc::now(),
            old: SnapshotInfo::from_loaded(old),
            new: SnapshotInfo::from_loaded(new),
            summary: diff.summary(),
            diff,
        }
    }

    pub fn skipped_payloads(&self) -> usize {
        self.old.stats.skipped_payloads + self.new.stats.skipped_payloads
    }
}

/// Plain-text summary for the terminal.
pub fn render_summary(report: &Report<'_>) -> String {
    let s = &report.summary;
    let mut out = String::new();
    let _ = writeln!(out, "Old: {} ({} objects)", report.old.path, s.old_count);
    let _ = writeln!(out, "New: {} ({} objects)", report.new.path, s.new_count);
    let _ = writeln!(
        out,
        "Added: {}  Deleted: {}  Modified: {}  Unchanged: {}  Attribute changes: {}",
        s.added, s.deleted, s.modified, s.unchanged, s.attribute_changes
    );
    if report.skipped_payloads() > 0 {
        let _ = writeln!(
            out,
            "Warning: {} malformed payload(s) skipped",
            report.skipped_payloads()
        );
    }
    out
}


#[cfg(test)]
mod tests {
    use super::test_support::fixture;
    use super::*;

    #[test]
    fn summary_text() {
        let (old, new, result) = fixture();
        let report = Report::new(&old, &new, &result);
        let text = render_summary(&report);

        assert!(text.contains("Old: old.zip (2 objects)"));
        assert!(text.contains("Added: 1  Deleted: 1  Modified: 1  Unchanged: 0"));
        assert!(text.contains("Warning: 1 malformed payload(s) skipped"));
    }
}

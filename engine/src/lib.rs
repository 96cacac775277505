//! # snapdelta engine
//!
//! Deterministic comparison of directory-service snapshots.
//!
//! This crate turns exported JSON records (users, groups, computers...) into
//! canonical objects and computes an attribute-level delta between two
//! snapshots. The same inputs always produce the same output, down to the
//! order of every list.
//!
//! ## Design Principles
//!
//! - **No IO**: the engine consumes payload bytes; archives, files and
//!   reports belong to the caller
//! - **Schema-agnostic**: identity and container fields are discovered by
//!   probing ordered name tables
//! - **Deterministic**: every output list is sorted case-insensitively
//!
//! ## Core Concepts
//!
//! ### Normalization
//!
//! [`normalize`] reduces any JSON value to a canonical, deduplicated, sorted
//! list of strings. Delimited strings are split on the configured separators.
//!
//! ### Records
//!
//! [`extract`] produces [`ObjectRecord`]s: an identity key, an
//! [`AttributeBag`] and a fingerprint of the bag used for cheap equality.
//!
//! ### Snapshots
//!
//! A [`SnapshotBuilder`] folds payloads into an [`ObjectStore`]. Duplicate
//! keys resolve last-writer-wins; malformed payloads are skipped or abort the
//! build depending on the [`ParsePolicy`].
//!
//! ### Diff
//!
//! [`diff`] partitions keys into added, deleted and modified, with
//! value-level [`AttributeChange`]s for modified objects.
//!
//! ## Quick Start
//!
//! ```rust
//! use snapdelta_engine::{diff, ExtractConfig, ObjectStore, ParsePolicy};
//!
//! let config = ExtractConfig::default();
//!
//! let old = ObjectStore::from_payloads(
//!     [("users", r#"[{"dn": "CN=jdoe,DC=corp", "memberOf": "Staff"}]"#)],
//!     &config,
//!     ParsePolicy::Skip,
//! )
//! .unwrap();
//! let new = ObjectStore::from_payloads(
//!     [("users", r#"[{"dn": "CN=jdoe,DC=corp", "memberOf": "Staff;Admins"}]"#)],
//!     &config,
//!     ParsePolicy::Skip,
//! )
//! .unwrap();
//!
//! let result = diff(&old, &new);
//! assert_eq!(result.modified.len(), 1);
//! assert_eq!(result.modified[0].changes[0].added, vec!["Admins"]);
//! ```

pub mod caseless;
pub mod config;
pub mod diff;
pub mod error;
pub mod extract;
pub mod normalize;
pub mod record;
pub mod snapshot;

// Re-export main types at crate root
pub use caseless::Caseless;
pub use config::{ExtractConfig, DEFAULT_IGNORED_ATTRIBUTES, DEFAULT_SEPARATORS};
pub use diff::{diff, AttributeChange, DiffResult, DiffSummary, ModifiedObject};
pub use error::Error;
pub use extract::{extract, parse_document, Extraction};
pub use normalize::normalize;
pub use record::{AttributeBag, ObjectRecord};
pub use snapshot::{Ingested, ObjectStore, ParsePolicy, SnapshotBuilder, SnapshotStats};

/// Type aliases for clarity
pub type RecordKey = String;
pub type SourceLabel = String;
pub type Fingerprint = String;

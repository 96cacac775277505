//! Case-insensitive string keys.
//!
//! Attribute names, identity keys and values are all compared without regard
//! to case. Rather than folding the data itself, [`Caseless`] keeps the
//! original spelling for display and a lower-cased copy for comparison.

use serde::{Serialize, Serializer};
use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A string whose equality, hashing and ordering ignore case.
#[derive(Debug, Clone)]
pub struct Caseless {
    original: String,
    folded: String,
}

impl Caseless {
    pub fn new(value: impl Into<String>) -> Self {
        let original = value.into();
        let folded = fold(&original);
        Self { original, folded }
    }

    /// The string as it was first seen.
    pub fn as_str(&self) -> &str {
        &self.original
    }

    /// The lower-cased comparison form.
    pub fn folded(&self) -> &str {
        &self.folded
    }

    pub fn into_string(self) -> String {
        self.original
    }
}

/// Lower-case a string for comparison.
pub fn fold(value: &str) -> String {
    value.to_lowercase()
}

/// Compare two strings the way [`Caseless`] does.
pub fn cmp_caseless(a: &str, b: &str) -> Ordering {
    fold(a).cmp(&fold(b))
}

/// Element-wise case-insensitive equality of two sequences.
pub fn eq_caseless(a: &[String], b: &[String]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| fold(x) == fold(y))
}

impl PartialEq for Caseless {
    fn eq(&self, other: &Self) -> bool {
        self.folded == other.folded
    }
}

impl Eq for Caseless {}

impl Hash for Caseless {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.folded.hash(state);
    }
}

impl Ord for Caseless {
    fn cmp(&self, other: &Self) -> Ordering {
        self.folded.cmp(&other.folded)
    }
}

impl PartialOrd for Caseless {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Lets maps keyed by [`Caseless`] be queried with an already-folded `&str`.
impl Borrow<str> for Caseless {
    fn borrow(&self) -> &str {
        &self.folded
    }
}

impl fmt::Display for Caseless {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}

impl From<&str> for Caseless {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Caseless {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl Serialize for Caseless {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.original)
    }
}

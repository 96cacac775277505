//! Error types for the snapdelta engine.

use crate::SourceLabel;
use thiserror::Error;

/// All possible errors from the snapdelta engine.
///
/// Missing identity keys and duplicate keys are not errors: the first drops the
/// candidate object, the second is resolved last-writer-wins.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("malformed document '{label}': {reason}")]
    MalformedDocument { label: SourceLabel, reason: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = Error::MalformedDocument {
            label: "users".into(),
            reason: "expected value at line 1 column 1".into(),
        };
        assert_eq!(
            err.to_string(),
            "malformed document 'users': expected value at line 1 column 1"
        );

        let err = Error::InvalidConfig("no separators".into());
        assert_eq!(err.to_string(), "invalid configuration: no separators");
    }
}

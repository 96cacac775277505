//! Extraction configuration.
//!
//! The ignored-attribute policy and the multi-value separators are passed to
//! every extractor and normalizer call explicitly.

use crate::{caseless::Caseless, error::Result, Error};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Attributes that change on every export without reflecting a real change
/// to the object (replication metadata, logon counters, timestamps).
pub const DEFAULT_IGNORED_ATTRIBUTES: &[&str] = &[
    "whenChanged",
    "whenCreated",
    "uSNChanged",
    "uSNCreated",
    "lastLogon",
    "lastLogonTimestamp",
    "lastLogoff",
    "logonCount",
    "badPwdCount",
    "badPasswordTime",
    "pwdLastSet",
    "dSCorePropagationData",
    "objectClass",
    "instanceType",
    "meta",
];

/// Separators used to split delimited multi-value strings.
pub const DEFAULT_SEPARATORS: &[&str] = &[";", "|", "\n"];

/// Configuration for record extraction and value normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractConfig {
    /// Attribute names never collected (case-insensitive)
    ignored_attributes: BTreeSet<String>,
    /// Separator alternatives for delimited strings, in priority order
    separators: Vec<String>,
}

impl ExtractConfig {
    /// Create a configuration, rejecting an empty or blank separator list.
    pub fn new<I, S, J, T>(ignored: I, separators: J) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        J: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let separators: Vec<String> = separators
            .into_iter()
            .map(Into::into)
            .filter(|s| !s.is_empty())
            .collect();
        if separators.is_empty() {
            return Err(Error::InvalidConfig(
                "at least one non-empty separator is required".into(),
            ));
        }

        let mut config = Self {
            ignored_attributes: BTreeSet::new(),
            separators,
        };
        config.extend_ignored(ignored);
        Ok(config)
    }

    /// Add more ignored attribute names.
    pub fn extend_ignored<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for name in names {
            let name = name.as_ref().trim();
            if !name.is_empty() {
                self.ignored_attributes
                    .insert(Caseless::new(name).folded().to_string());
            }
        }
    }

    /// Builder-style variant of [`ExtractConfig::extend_ignored`].
    pub fn with_ignored<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.extend_ignored(names);
        self
    }

    pub fn is_ignored(&self, name: &str) -> bool {
        self.ignored_attributes
            .contains(Caseless::new(name).folded())
    }

    /// Ignored names in their folded form.
    pub fn ignored_attributes(&self) -> impl Iterator<Item = &str> {
        self.ignored_attributes.iter().map(String::as_str)
    }

    pub fn separators(&self) -> &[String] {
        &self.separators
    }
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            ignored_attributes: DEFAULT_IGNORED_ATTRIBUTES
                .iter()
                .map(|name| Caseless::new(*name).folded().to_string())
                .collect(),
            separators: DEFAULT_SEPARATORS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

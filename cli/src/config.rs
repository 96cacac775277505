//! Configuration management for the CLI.
//!
//! Values come from the environment (optionally via `.env`) and are then
//! overridden by command-line flags.

use snapdelta_engine::{
    ExtractConfig, ParsePolicy, DEFAULT_IGNORED_ATTRIBUTES, DEFAULT_SEPARATORS,
};
use std::env;

/// Resolved configuration for one comparison run.
#[derive(Debug, Clone)]
pub struct Config {
    /// Ignored attributes and separators handed to the engine
    pub extract: ExtractConfig,
    /// How malformed payloads are handled
    pub policy: ParsePolicy,
}

/// Command-line values that take precedence over the environment.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    /// Extra attribute names to ignore
    pub ignore: Vec<String>,
    /// Replacement separator list (empty keeps the configured one)
    pub separators: Vec<String>,
    /// Abort on the first malformed payload
    pub strict: bool,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// - `SNAPDELTA_IGNORE`: comma-separated list replacing the default ignores
    /// - `SNAPDELTA_EXTRA_IGNORE`: comma-separated list added to the ignores
    /// - `SNAPDELTA_SEPARATORS`: every character is one separator (`\n` escape allowed)
    /// - `SNAPDELTA_STRICT`: `true`/`1`/`yes` aborts on malformed payloads
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let ignored: Vec<String> = match lookup("SNAPDELTA_IGNORE") {
            Some(list) => split_list(&list),
            None => DEFAULT_IGNORED_ATTRIBUTES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        };

        let separators: Vec<String> = match lookup("SNAPDELTA_SEPARATORS") {
            Some(raw) => unescape(&raw).chars().map(String::from).collect(),
            None => DEFAULT_SEPARATORS.iter().map(|s| s.to_string()).collect(),
        };

        let mut extract = ExtractConfig::new(ignored, separators)?;
        if let Some(extra) = lookup("SNAPDELTA_EXTRA_IGNORE") {
            extract.extend_ignored(split_list(&extra));
        }

        let strict = match lookup("SNAPDELTA_STRICT") {
            Some(value) => parse_flag(&value)?,
            None => false,
        };
        let policy = if strict {
            ParsePolicy::Abort
        } else {
            ParsePolicy::Skip
        };

        Ok(Self { extract, policy })
    }

    /// Apply command-line overrides.
    pub fn with_overrides(mut self, overrides: &Overrides) -> Result<Self, ConfigError> {
        if !overrides.separators.is_empty() {
            let ignored: Vec<String> = self
                .extract
                .ignored_attributes()
                .map(str::to_string)
                .collect();
            let separators = overrides.separators.iter().map(|s| unescape(s));
            self.extract = ExtractConfig::new(ignored, separators)?;
        }
        self.extract.extend_ignored(&overrides.ignore);
        if overrides.strict {
            self.policy = ParsePolicy::Abort;
        }
        Ok(self)
    }
}

fn split_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Turn the two-character escapes `\n`, `\r` and `\t` into control characters.
fn unescape(raw: &str) -> String {
    raw.replace("\\n", "\n")
        .replace("\\r", "\r")
        .replace("\\t", "\t")
}

fn parse_flag(value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::InvalidFlag {
            name: "SNAPDELTA_STRICT",
            value: value.to_string(),
        }),
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value:?}")]
    InvalidFlag { name: &'static str, value: String },

    #[error(transparent)]
    Engine(#[from] snapdelta_engine::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn defaults_without_environment() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.policy, ParsePolicy::Skip);
        assert!(config.extract.is_ignored("whenChanged"));
        assert_eq!(config.extract.separators(), &[";", "|", "\n"]);
    }

    #[test]
    fn environment_replaces_and_extends_ignores() {
        let config = Config::from_lookup(lookup(&[
            ("SNAPDELTA_IGNORE", "description, info"),
            ("SNAPDELTA_EXTRA_IGNORE", "title"),
            ("SNAPDELTA_SEPARATORS", ",\\n"),
            ("SNAPDELTA_STRICT", "yes"),
        ]))
        .unwrap();

        assert!(config.extract.is_ignored("Description"));
        assert!(config.extract.is_ignored("title"));
        assert!(!config.extract.is_ignored("whenChanged"));
        assert_eq!(config.extract.separators(), &[",", "\n"]);
        assert_eq!(config.policy, ParsePolicy::Abort);
    }

    #[test]
    fn invalid_strict_flag() {
        let result = Config::from_lookup(lookup(&[("SNAPDELTA_STRICT", "maybe")]));
        assert!(matches!(result, Err(ConfigError::InvalidFlag { .. })));
    }

    #[test]
    fn empty_separator_list_rejected() {
        let result = Config::from_lookup(lookup(&[("SNAPDELTA_SEPARATORS", "")]));
        assert!(matches!(result, Err(ConfigError::Engine(_))));
    }

    #[test]
    fn overrides_take_precedence() {
        let config = Config::from_lookup(lookup(&[]))
            .unwrap()
            .with_overrides(&Overrides {
                ignore: vec!["mail".into()],
                separators: vec![",".into(), "\\t".into()],
                strict: true,
            })
            .unwrap();

        assert!(config.extract.is_ignored("mail"));
        assert!(config.extract.is_ignored("whenchanged"));
        assert_eq!(config.extract.separators(), &[",", "\t"]);
        assert_eq!(config.policy, ParsePolicy::Abort);
    }
}

//! Value normalization.
//!
//! Every attribute value, whatever its JSON shape, is reduced to a canonical
//! set of strings: trimmed, non-empty, deduplicated and sorted without regard
//! to case. Two exports that spell the same multi-valued attribute differently
//! (array vs delimited string, different order, different case) normalize to
//! the same sequence.

use crate::caseless::{cmp_caseless, fold};
use serde_json::Value;
use std::collections::HashSet;

/// Normalize a raw JSON value into a canonical sequence of strings.
///
/// - arrays contribute one raw string per element (nulls skipped)
/// - strings are split on any of `separators` in a single pass
/// - numbers and booleans contribute their textual form
/// - null and objects contribute nothing
pub fn normalize(value: &Value, separators: &[String]) -> Vec<String> {
    let raw: Vec<String> = match value {
        Value::Array(items) => items.iter().filter_map(element_text).collect(),
        Value::String(s) => split_multi(s, separators),
        Value::Number(n) => vec![n.to_string()],
        Value::Bool(b) => vec![b.to_string()],
        Value::Null | Value::Object(_) => Vec::new(),
    };
    canonicalize(raw)
}

/// Case-insensitive union of two canonical sequences.
///
/// Spellings from `base` win over equal values from `extra`.
pub fn merge_values(base: &[String], extra: &[String]) -> Vec<String> {
    canonicalize(base.iter().chain(extra).cloned())
}

/// Trim, drop empties, dedup case-insensitively (first spelling kept) and sort.
pub fn canonicalize<I>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut seen = HashSet::new();
    let mut out: Vec<String> = values
        .into_iter()
        .filter_map(|v| {
            let trimmed = v.trim();
            if trimmed.is_empty() || !seen.insert(fold(trimmed)) {
                None
            } else {
                Some(trimmed.to_string())
            }
        })
        .collect();
    out.sort_by(|a, b| cmp_caseless(a, b));
    out
}

fn element_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        // Nested structures are compared by their compact JSON text.
        other => Some(other.to_string()),
    }
}

/// Split on any separator in one left-to-right pass.
///
/// Line endings are unified to `\n` first. Where several separators match at
/// the same position the longest one is consumed.
fn split_multi(input: &str, separators: &[String]) -> Vec<String> {
    let text = input.replace("\r\n", "\n").replace('\r', "\n");

    let mut pieces = Vec::new();
    let mut start = 0;
    let mut pos = 0;
    while pos < text.len() {
        let rest = &text[pos..];
        let matched = separators
            .iter()
            .filter(|sep| !sep.is_empty() && rest.starts_with(sep.as_str()))
            .map(String::len)
            .max();
        match matched {
            Some(len) => {
                pieces.push(text[start..pos].to_string());
                pos += len;
                start = pos;
            }
            None => {
                // Advance by one whole char to stay on a UTF-8 boundary.
                pos += rest.chars().next().map_or(1, char::len_utf8);
            }
        }
    }
    pieces.push(text[start..].to_string());
    pieces
}

//! Record extraction from JSON documents.
//!
//! Exports come in several shapes: a bare array of objects, an object with the
//! objects under a container field, or a single object. Objects may keep their
//! attributes flat or nested under `Properties`. The extractor probes for these
//! shapes with fixed, ordered name tables instead of requiring a schema.
//!
//! # Identity
//!
//! The first non-empty string found among [`IDENTITY_FIELDS`] (checked on the
//! object itself, then on its attribute source) becomes the key. Keys that
//! carry no structural character (see [`is_generic_key`]) are prefixed with the
//! source label so short names from unrelated payloads cannot collide.

use crate::caseless::fold;
use crate::config::ExtractConfig;
use crate::error::Result;
use crate::normalize::normalize;
use crate::record::{AttributeBag, ObjectRecord};
use crate::Error;
use serde_json::{Map, Value};

/// Fields that may hold the object list, in priority order.
pub const CONTAINER_FIELDS: &[&str] = &["data", "nodes", "objects", "items", "rows", "entries"];

/// Fields that may hold the identity key, in priority order.
pub const IDENTITY_FIELDS: &[&str] = &[
    "DistinguishedName",
    "dn",
    "ObjectIdentifier",
    "objectid",
    "Guid",
    "guid",
    "Name",
    "name",
    "id",
];

/// Nested field holding the primary attributes.
pub const PROPERTIES_FIELD: &str = "Properties";

/// Structural fields never collected as attributes.
const STRUCTURAL_FIELDS: &[&str] = &["objectClass"];

/// Characters that mark a key as structurally distinctive (DN, GUID, UPN...).
const DISTINCTIVE_KEY_CHARS: &[char] = &['=', '{', '@', '-', ','];

/// Separator between source label and a generic key.
pub const LABEL_SEPARATOR: char = ':';

/// Output of extracting one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    /// Records emitted, in document order
    pub records: Vec<ObjectRecord>,
    /// Candidate objects examined, including those without an identity key
    pub candidates: usize,
}

impl Extraction {
    /// Candidates dropped for lack of an identity key or for not being objects.
    pub fn dropped(&self) -> usize {
        self.candidates - self.records.len()
    }
}

/// Decode and parse one payload.
///
/// A leading UTF-8 byte order mark is tolerated.
pub fn parse_document(label: &str, bytes: &[u8]) -> Result<Value> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    let text = std::str::from_utf8(bytes).map_err(|e| Error::MalformedDocument {
        label: label.to_string(),
        reason: format!("invalid UTF-8: {}", e),
    })?;
    serde_json::from_str(text).map_err(|e| Error::MalformedDocument {
        label: label.to_string(),
        reason: e.to_string(),
    })
}

/// Extract all object records from a parsed document.
pub fn extract(document: &Value, source_label: &str, config: &ExtractConfig) -> Extraction {
    let candidates = candidates(document);
    let records = candidates
        .iter()
        .filter_map(|el| el.as_object())
        .filter_map(|el| extract_object(el, source_label, config))
        .collect();

    Extraction {
        records,
        candidates: candidates.len(),
    }
}

fn candidates(document: &Value) -> &[Value] {
    match document {
        Value::Array(items) => items,
        Value::Object(root) => CONTAINER_FIELDS
            .iter()
            .find_map(|field| root.get(*field).and_then(Value::as_array))
            .map(Vec::as_slice)
            .unwrap_or(std::slice::from_ref(document)),
        _ => &[],
    }
}

fn extract_object(
    el: &Map<String, Value>,
    source_label: &str,
    config: &ExtractConfig,
) -> Option<ObjectRecord> {
    let nested = el.get(PROPERTIES_FIELD).and_then(Value::as_object);
    let source = nested.unwrap_or(el);

    let raw_key = identity_key(el, source)?;
    let key = if is_generic_key(raw_key) {
        format!("{}{}{}", source_label, LABEL_SEPARATOR, raw_key)
    } else {
        raw_key.to_string()
    };

    let separators = config.separators();
    let mut attributes = AttributeBag::new();
    for (name, value) in source {
        if is_excluded(name) || config.is_ignored(name) {
            continue;
        }
        attributes.merge(name.as_str(), normalize(value, separators));
    }

    if nested.is_some() {
        for (name, value) in el {
            if name == PROPERTIES_FIELD || config.is_ignored(name) {
                continue;
            }
            attributes.merge(name.as_str(), normalize(value, separators));
        }
    }

    Some(ObjectRecord::new(key, source_label, attributes))
}

fn identity_key<'a>(
    root: &'a Map<String, Value>,
    source: &'a Map<String, Value>,
) -> Option<&'a str> {
    IDENTITY_FIELDS.iter().find_map(|field| {
        [root, source]
            .into_iter()
            .filter_map(|obj| obj.get(*field).and_then(Value::as_str))
            .map(str::trim)
            .find(|key| !key.is_empty())
    })
}

/// A key is generic when it contains none of `= { @ - ,`.
pub fn is_generic_key(key: &str) -> bool {
    !key.contains(DISTINCTIVE_KEY_CHARS)
}

fn is_excluded(name: &str) -> bool {
    let folded = fold(name);
    IDENTITY_FIELDS
        .iter()
        .chain(STRUCTURAL_FIELDS)
        .any(|field| fold(field) == folded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config() -> ExtractConfig {
        ExtractConfig::default()
    }

    fn vals(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn root_array_of_objects() {
        let doc = json!([
            {"dn": "CN=a,DC=x", "mail": "a@x"},
            {"dn": "CN=b,DC=x", "mail": "b@x"},
        ]);
        let out = extract(&doc, "users", &config());
        assert_eq!(out.candidates, 2);
        let keys: Vec<_> = out.records.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["CN=a,DC=x", "CN=b,DC=x"]);
        assert_eq!(out.records[0].attributes().get("mail"), Some(&vals(&["a@x"])[..]));
    }

    #[test]
    fn container_field_priority() {
        let doc = json!({
            "meta": {"count": 1},
            "items": [{"id": "ignored-by-priority"}],
            "data": [{"id": "CN=from-data"}],
        });
        let out = extract(&doc, "groups", &config());
        assert_eq!(out.records.len(), 1);
        assert_eq!(out.records[0].key, "CN=from-data");
    }

    #[test]
    fn non_array_container_falls_through() {
        let doc = json!({"data": "not a list", "rows": [{"id": "r-1"}]});
        let out = extract(&doc, "x", &config());
        assert_eq!(out.records[0].key, "r-1");

        let doc = json!({"data": {"nested": true}, "name": "solo"});
        let out = extract(&doc, "x", &config());
        assert_eq!(out.candidates, 1);
        assert_eq!(out.records[0].key, "x:solo");
    }

    #[test]
    fn root_object_is_single_candidate() {
        let doc = json!({"DistinguishedName": "CN=solo,DC=x", "title": "Engineer"});
        let out = extract(&doc, "users", &config());
        assert_eq!(out.records.len(), 1);
        assert_eq!(out.records[0].key, "CN=solo,DC=x");
    }

    #[test]
    fn identity_priority_checks_root_then_properties() {
        let doc = json!([{
            "ObjectIdentifier": "S-1-5-21-1",
            "Properties": {"name": "JDOE@CORP.LOCAL", "dn": "CN=jdoe,DC=corp"}
        }]);
        let out = extract(&doc, "users", &config());
        assert_eq!(out.records[0].key, "CN=jdoe,DC=corp");
    }

    #[test]
    fn missing_identity_drops_candidate() {
        let doc = json!([{"mail": "x@y"}, {"id": ""}, {"id": 7}, "text", {"id": "k-1"}]);
        let out = extract(&doc, "users", &config());
        assert_eq!(out.candidates, 5);
        assert_eq!(out.records.len(), 1);
        assert_eq!(out.dropped(), 4);
    }

    #[test]
    fn generic_keys_are_namespaced() {
        assert!(is_generic_key("jdoe"));
        assert!(!is_generic_key("CN=jdoe,DC=x"));
        assert!(!is_generic_key("{6f1c}"));
        assert!(!is_generic_key("jdoe@corp"));
        assert!(!is_generic_key("S-1-5"));

        let doc = json!([{"name": "jdoe"}, {"name": "CN=jdoe,DC=x"}]);
        let out = extract(&doc, "users", &config());
        assert_eq!(out.records[0].key, "users:jdoe");
        assert_eq!(out.records[1].key, "CN=jdoe,DC=x");
    }

    #[test]
    fn identity_and_ignored_fields_not_collected() {
        let doc = json!([{
            "dn": "CN=a,DC=x",
            "Name": "a",
            "objectClass": ["top", "user"],
            "whenChanged": "20240101",
            "memberOf": "G1;G2",
        }]);
        let out = extract(&doc, "users", &config());
        let attrs = out.records[0].attributes();
        assert_eq!(attrs.len(), 1);
        assert_eq!(attrs.get("memberof"), Some(&vals(&["G1", "G2"])[..]));
    }

    #[test]
    fn case_variant_field_names_are_unioned() {
        let doc = json!([{"dn": "CN=a,DC=x", "MemberOf": "g1", "memberOf": "g2;G1"}]);
        let out = extract(&doc, "users", &config());
        let attrs = out.records[0].attributes();
        assert_eq!(attrs.len(), 1);
        assert_eq!(attrs.get("memberof"), Some(&vals(&["g1", "g2"])[..]));
    }

    #[test]
    fn properties_merged_with_root_fields() {
        let doc = json!({"data": [{
            "ObjectIdentifier": "S-1-5-21-9",
            "Properties": {"enabled": true, "tags": ["a"], "whenchanged": 5},
            "Tags": "B;a",
            "IsDeleted": false,
            "Aces": [{"RightName": "GenericAll"}],
        }]});
        let out = extract(&doc, "computers", &config());
        let record = &out.records[0];
        assert_eq!(record.key, "S-1-5-21-9");

        let attrs = record.attributes();
        assert_eq!(attrs.get("enabled"), Some(&vals(&["true"])[..]));
        assert_eq!(attrs.get("tags"), Some(&vals(&["a", "B"])[..]));
        assert_eq!(attrs.get("isdeleted"), Some(&vals(&["false"])[..]));
        assert_eq!(
            attrs.get("aces"),
            Some(&vals(&[r#"{"RightName":"GenericAll"}"#])[..])
        );
        assert_eq!(attrs.get("ObjectIdentifier"), Some(&vals(&["S-1-5-21-9"])[..]));
        assert!(!attrs.contains("whenchanged"));
        assert!(!attrs.contains("Properties"));
    }

    #[test]
    fn scalar_document_yields_nothing() {
        let out = extract(&json!(42), "x", &config());
        assert_eq!(out, Extraction::default());
    }

    #[test]
    fn parse_document_handles_bom_and_errors() {
        let doc = parse_document("users", b"\xEF\xBB\xBF[{\"id\":\"a-1\"}]").unwrap();
        assert!(doc.is_array());

        let err = parse_document("users", b"{not json").unwrap_err();
        assert!(matches!(err, Error::MalformedDocument { ref label, .. } if label == "users"));

        let err = parse_document("users", &[0xff, 0xfe]).unwrap_err();
        assert!(err.to_string().contains("invalid UTF-8"));
    }
}

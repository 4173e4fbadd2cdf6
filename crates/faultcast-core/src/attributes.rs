//! Attribute projection
//!
//! Every report carries a flat map of contextual attributes derived from the
//! application settings. Settings types enumerate their own fields through
//! [`SettingsFields`]; [`project`] keeps every field except those owned by the
//! reporter infrastructure, so the endpoint host and token never travel inside
//! a report payload.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Field-name prefix reserved for reporter infrastructure settings.
pub const RESERVED_PREFIX: &str = "remote";

/// A loosely typed attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Null,
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Bool(b) => write!(f, "{b}"),
            AttributeValue::Integer(i) => write!(f, "{i}"),
            AttributeValue::Float(x) => write!(f, "{x}"),
            AttributeValue::String(s) => write!(f, "{s}"),
            AttributeValue::Null => write!(f, "null"),
        }
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        AttributeValue::Bool(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        AttributeValue::Integer(value)
    }
}

impl From<u32> for AttributeValue {
    fn from(value: u32) -> Self {
        AttributeValue::Integer(i64::from(value))
    }
}

impl From<u64> for AttributeValue {
    fn from(value: u64) -> Self {
        i64::try_from(value)
            .map(AttributeValue::Integer)
            .unwrap_or(AttributeValue::Float(value as f64))
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        AttributeValue::Float(value)
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::String(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::String(value)
    }
}

impl<T: Into<AttributeValue>> From<Option<T>> for AttributeValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(AttributeValue::Null)
    }
}

/// Implemented by settings types to list their own named fields.
///
/// Replaces runtime introspection: the type decides which `(name, value)`
/// pairs exist, including infrastructure fields, and [`project`] decides
/// which of them become attributes.
pub trait SettingsFields {
    fn fields(&self) -> Vec<(String, AttributeValue)>;
}

impl SettingsFields for BTreeMap<String, AttributeValue> {
    fn fields(&self) -> Vec<(String, AttributeValue)> {
        self.iter().map(|(k, v)| (k.clone(), v.clone())).collect()
    }
}

/// Immutable attribute map attached to every report sent by one reporter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttributeSet(BTreeMap<String, AttributeValue>);

impl AttributeSet {
    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<'a> IntoIterator for &'a AttributeSet {
    type Item = (&'a String, &'a AttributeValue);
    type IntoIter = std::collections::btree_map::Iter<'a, String, AttributeValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Returns `true` when `name` belongs to the reporter infrastructure.
///
/// The comparison ignores ASCII case so `remoteHost`, `RemoteToken` and
/// `remote_storage_path` are all excluded.
pub fn is_reserved(name: &str) -> bool {
    name.len() >= RESERVED_PREFIX.len()
        && name.as_bytes()[..RESERVED_PREFIX.len()].eq_ignore_ascii_case(RESERVED_PREFIX.as_bytes())
}

/// Project a settings snapshot into the attribute set sent with every report.
///
/// Values are copied unchanged, `Null` included. A later field with the same
/// name replaces an earlier one.
pub fn project<S: SettingsFields + ?Sized>(settings: &S) -> AttributeSet {
    let map = settings
        .fields()
        .into_iter()
        .filter(|(name, _)| !is_reserved(name))
        .collect();
    AttributeSet(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(pairs: &[(&str, AttributeValue)]) -> BTreeMap<String, AttributeValue> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_project_excludes_remote_fields() {
        let settings = snapshot(&[
            ("remoteHost", "h".into()),
            ("remoteToken", "t".into()),
            ("userName", "alice".into()),
            ("remoteX", "secret".into()),
        ]);

        let attrs = project(&settings);
        assert_eq!(attrs.len(), 1);
        assert_eq!(attrs.get("userName"), Some(&AttributeValue::from("alice")));
        assert!(attrs.iter().all(|(k, _)| !k.starts_with("remote")));
    }

    #[test]
    fn test_project_keeps_null_and_empty_values() {
        let settings = snapshot(&[
            ("theme", AttributeValue::Null),
            ("label", "".into()),
            ("scale", 1.5.into()),
            ("enabled", true.into()),
        ]);

        let attrs = project(&settings);
        assert_eq!(attrs.len(), 4);
        assert_eq!(attrs.get("theme"), Some(&AttributeValue::Null));
        assert_eq!(attrs.get("label"), Some(&AttributeValue::from("")));
    }

    #[test]
    fn test_reserved_prefix_ignores_case() {
        assert!(is_reserved("remote_host"));
        assert!(is_reserved("RemoteToken"));
        assert!(is_reserved("remote"));
        assert!(!is_reserved("remot"));
        assert!(!is_reserved("user_remote"));
    }

    #[test]
    fn test_attribute_value_serializes_untagged() {
        let attrs = project(&snapshot(&[
            ("count", 3i64.into()),
            ("name", "x".into()),
            ("missing", AttributeValue::Null),
        ]));
        let json = serde_json::to_value(&attrs).unwrap();
        assert_eq!(json, serde_json::json!({"count": 3, "name": "x", "missing": null}));
    }

    #[test]
    fn test_option_into_attribute_value() {
        assert_eq!(AttributeValue::from(None::<String>), AttributeValue::Null);
        assert_eq!(AttributeValue::from(Some(7u32)), AttributeValue::Integer(7));
    }
}

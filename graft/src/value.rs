//! Typed value trees decoded from recorded state.
//!
//! A [`Value`] is what one attribute or nested block of one instance holds
//! once its raw JSON has been interpreted through the resource's implied
//! type. Collections keep the distinction between lists, sets and tuples
//! (and between maps and objects) so synthesized literals read the way a
//! user would write them.

use std::collections::BTreeMap;

use serde_json::Number;

/// A decoded value.
///
/// Equality is deep and structural: two values are equal only when their
/// kinds and every element match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Absence of a value.
    Null,
    /// A boolean.
    Bool(bool),
    /// A number.
    Number(Number),
    /// A string.
    String(String),
    /// An ordered list of values of one type.
    List(Vec<Value>),
    /// A set, held in canonical order without duplicates.
    Set(Vec<Value>),
    /// A fixed-length sequence of values of possibly different types.
    Tuple(Vec<Value>),
    /// A map from string keys to values of one type.
    Map(BTreeMap<String, Value>),
    /// An object with a fixed set of attributes.
    Object(BTreeMap<String, Value>),
}

impl Value {
    /// Returns true if this is [`Value::Null`].
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Looks up an attribute of an object value.
    ///
    /// Returns `None` for non-objects and for missing attributes, so callers
    /// can substitute null uniformly.
    #[must_use]
    pub fn get_attr(&self, name: &str) -> Option<&Self> {
        match self {
            Self::Object(attrs) => attrs.get(name),
            _ => None,
        }
    }

    /// The elements of a list, set or tuple.
    #[must_use]
    pub fn elements(&self) -> Option<&[Self]> {
        match self {
            Self::List(items) | Self::Set(items) | Self::Tuple(items) => Some(items),
            _ => None,
        }
    }

    /// The entries of a map or object.
    #[must_use]
    pub fn entries(&self) -> Option<&BTreeMap<String, Self>> {
        match self {
            Self::Map(entries) | Self::Object(entries) => Some(entries),
            _ => None,
        }
    }

    /// Builds a number value from an integer.
    #[must_use]
    pub fn int(i: i64) -> Self {
        Self::Number(Number::from(i))
    }

    /// Converts back to plain JSON, dropping collection kinds.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Null => serde_json::Value::Null,
            Self::Bool(b) => serde_json::Value::Bool(*b),
            Self::Number(n) => serde_json::Value::Number(n.clone()),
            Self::String(s) => serde_json::Value::String(s.clone()),
            Self::List(items) | Self::Set(items) | Self::Tuple(items) => {
                serde_json::Value::Array(items.iter().map(Self::to_json).collect())
            }
            Self::Map(entries) | Self::Object(entries) => serde_json::Value::Object(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Self::int(i)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_attr() {
        let obj = Value::Object(BTreeMap::from([("size".to_string(), Value::from("large"))]));
        assert_eq!(obj.get_attr("size"), Some(&Value::from("large")));
        assert_eq!(obj.get_attr("missing"), None);
        assert_eq!(Value::Null.get_attr("size"), None);
    }

    #[test]
    fn test_collection_kinds_are_distinct() {
        let items = vec![Value::from("a")];
        assert_ne!(Value::List(items.clone()), Value::Set(items.clone()));
        assert_ne!(Value::Tuple(items.clone()), Value::List(items));
        assert_ne!(Value::Map(BTreeMap::new()), Value::Object(BTreeMap::new()));
    }

    #[test]
    fn test_to_json() {
        let value = Value::Object(BTreeMap::from([
            ("tags".to_string(), Value::Set(vec![Value::from("a"), Value::from("b")])),
            ("count".to_string(), Value::int(3)),
            ("gone".to_string(), Value::Null),
        ]));
        assert_eq!(
            value.to_json(),
            serde_json::json!({"tags": ["a", "b"], "count": 3, "gone": null})
        );
    }
}

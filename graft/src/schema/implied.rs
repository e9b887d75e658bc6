//! Implied value types and decoding of raw recorded state.
//!
//! A block schema implies an object type: one field per attribute plus one
//! per nested block type, wrapped according to its nesting mode. Raw JSON
//! from a state document is decoded against that type into a [`Value`].

use std::collections::BTreeMap;

use thiserror::Error;

use super::{BlockSchema, NestingMode, ValueType};
use crate::value::Value;

/// Derives the value type a block schema dictates for its data.
///
/// Nested block types with an unsupported nesting mode are left out of the
/// object type, so their data is ignored rather than rejected.
///
/// # Examples
///
/// ```
/// use graft::schema::{implied_type, BlockSchema, NestingMode, ValueType, Writability};
///
/// let block = BlockSchema::new()
///     .attribute("name", ValueType::String, Writability::Required)
///     .nested("rule", NestingMode::List, BlockSchema::new());
///
/// let ValueType::Object(fields) = implied_type(&block) else { unreachable!() };
/// assert_eq!(fields["name"], ValueType::String);
/// assert!(matches!(fields["rule"], ValueType::List(_)));
/// ```
#[must_use]
pub fn implied_type(block: &BlockSchema) -> ValueType {
    let mut fields: BTreeMap<String, ValueType> = block
        .attributes
        .iter()
        .map(|(name, attr)| (name.clone(), attr.value_type.clone()))
        .collect();

    for (type_name, nested) in &block.nested_blocks {
        let inner = implied_type(&nested.block);
        let wrapped = match nested.nesting {
            NestingMode::Single => inner,
            NestingMode::List => ValueType::List(Box::new(inner)),
            NestingMode::Set => ValueType::Set(Box::new(inner)),
            NestingMode::Map => ValueType::Map(Box::new(inner)),
            NestingMode::Unsupported(_) => continue,
        };
        fields.insert(type_name.clone(), wrapped);
    }

    ValueType::Object(fields)
}

/// Raw data that does not conform to the expected type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("at {path}: {message}")]
pub struct DecodeError {
    /// Location of the offending value, such as `.ebs_block_device[1].size`.
    pub path: String,
    /// What was wrong with it.
    pub message: String,
}

impl ValueType {
    /// Decodes raw JSON into a value of this type.
    ///
    /// Null is accepted for every type. Object attributes missing from the
    /// data decode as null and extra ones are ignored. Set elements come out
    /// in canonical order with duplicates removed. Primitive types accept
    /// the same loose conversions recorded state relies on: numbers and
    /// booleans as strings, and numeric or boolean strings as their values.
    ///
    /// # Errors
    ///
    /// Returns a [`DecodeError`] naming the path of the first value that
    /// does not fit.
    pub fn decode(&self, raw: &serde_json::Value) -> Result<Value, DecodeError> {
        self.decode_at(raw, &mut String::new())
    }

    fn decode_at(&self, raw: &serde_json::Value, path: &mut String) -> Result<Value, DecodeError> {
        use serde_json::Value as Json;

        let fail = |path: &str, message: String| DecodeError {
            path: if path.is_empty() { ".".to_string() } else { path.to_string() },
            message,
        };

        if raw.is_null() {
            return Ok(Value::Null);
        }

        match (self, raw) {
            (Self::String, Json::String(s)) => Ok(Value::String(s.clone())),
            (Self::String, Json::Number(n)) => Ok(Value::String(n.to_string())),
            (Self::String, Json::Bool(b)) => Ok(Value::String(b.to_string())),
            (Self::Number, Json::Number(n)) => Ok(Value::Number(normalize_number(n))),
            (Self::Number, Json::String(s)) => s
                .parse::<serde_json::Number>()
                .map(|n| Value::Number(normalize_number(&n)))
                .map_err(|_| fail(path.as_str(), format!("{s:?} is not a number"))),
            (Self::Bool, Json::Bool(b)) => Ok(Value::Bool(*b)),
            (Self::Bool, Json::String(s)) if s == "true" || s == "false" => {
                Ok(Value::Bool(s == "true"))
            }
            (Self::List(elem), Json::Array(items)) => {
                Ok(Value::List(decode_elements(elem, items, path)?))
            }
            (Self::Set(elem), Json::Array(items)) => {
                let mut keyed: BTreeMap<String, Value> = BTreeMap::new();
                for value in decode_elements(elem, items, path)? {
                    keyed.entry(value.to_json().to_string()).or_insert(value);
                }
                Ok(Value::Set(keyed.into_values().collect()))
            }
            (Self::Tuple(elems), Json::Array(items)) => {
                if elems.len() != items.len() {
                    return Err(fail(
                        path.as_str(),
                        format!("tuple requires {} elements, found {}", elems.len(), items.len()),
                    ));
                }
                let mut out = Vec::with_capacity(items.len());
                for (i, (ty, item)) in elems.iter().zip(items).enumerate() {
                    out.push(with_segment(path, &format!("[{i}]"), |p| ty.decode_at(item, p))?);
                }
                Ok(Value::Tuple(out))
            }
            (Self::Map(elem), Json::Object(entries)) => {
                let mut out = BTreeMap::new();
                for (key, item) in entries {
                    let value =
                        with_segment(path, &format!("[{key:?}]"), |p| elem.decode_at(item, p))?;
                    out.insert(key.clone(), value);
                }
                Ok(Value::Map(out))
            }
            (Self::Object(fields), Json::Object(entries)) => {
                let mut out = BTreeMap::new();
                for (name, ty) in fields {
                    let value = match entries.get(name) {
                        Some(item) => {
                            with_segment(path, &format!(".{name}"), |p| ty.decode_at(item, p))?
                        }
                        None => Value::Null,
                    };
                    out.insert(name.clone(), value);
                }
                Ok(Value::Object(out))
            }
            (Self::Dynamic, _) => Ok(decode_dynamic(raw)),
            (expected, found) => Err(fail(
                path.as_str(),
                format!("expected {}, found {}", type_name(expected), json_kind(found)),
            )),
        }
    }
}

fn decode_elements(
    elem: &ValueType,
    items: &[serde_json::Value],
    path: &mut String,
) -> Result<Vec<Value>, DecodeError> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| with_segment(path, &format!("[{i}]"), |p| elem.decode_at(item, p)))
        .collect()
}

fn with_segment<T>(
    path: &mut String,
    segment: &str,
    f: impl FnOnce(&mut String) -> Result<T, DecodeError>,
) -> Result<T, DecodeError> {
    let len = path.len();
    path.push_str(segment);
    let result = f(path);
    path.truncate(len);
    result
}

fn decode_dynamic(raw: &serde_json::Value) -> Value {
    use serde_json::Value as Json;

    match raw {
        Json::Null => Value::Null,
        Json::Bool(b) => Value::Bool(*b),
        Json::Number(n) => Value::Number(normalize_number(n)),
        Json::String(s) => Value::String(s.clone()),
        Json::Array(items) => Value::Tuple(items.iter().map(decode_dynamic).collect()),
        Json::Object(entries) => Value::Object(
            entries
                .iter()
                .map(|(k, v)| (k.clone(), decode_dynamic(v)))
                .collect(),
        ),
    }
}

/// Integral floats become integers so `1.0` and `1` compare equal.
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn normalize_number(n: &serde_json::Number) -> serde_json::Number {
    match n.as_f64() {
        Some(f) if !n.is_i64() && !n.is_u64() && f.fract() == 0.0 && f.abs() < 9.0e15 => {
            serde_json::Number::from(f as i64)
        }
        _ => n.clone(),
    }
}

fn type_name(ty: &ValueType) -> &'static str {
    match ty {
        ValueType::String => "string",
        ValueType::Number => "number",
        ValueType::Bool => "bool",
        ValueType::Dynamic => "any value",
        ValueType::List(_) => "list",
        ValueType::Set(_) => "set",
        ValueType::Map(_) => "map",
        ValueType::Object(_) => "object",
        ValueType::Tuple(_) => "tuple",
    }
}

fn json_kind(raw: &serde_json::Value) -> &'static str {
    match raw {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Writability;
    use serde_json::json;

    fn instance_schema() -> BlockSchema {
        BlockSchema::new()
            .attribute("ami", ValueType::String, Writability::Required)
            .attribute("tags", ValueType::Map(Box::new(ValueType::String)), Writability::Optional)
            .nested(
                "ebs_block_device",
                NestingMode::Set,
                BlockSchema::new()
                    .attribute("device_name", ValueType::String, Writability::Required)
                    .attribute("volume_size", ValueType::Number, Writability::Optional),
            )
            .nested(
                "metadata_options",
                NestingMode::Single,
                BlockSchema::new().attribute("http_tokens", ValueType::String, Writability::Optional),
            )
            .nested("timeouts", NestingMode::Unsupported("group".into()), BlockSchema::new())
    }

    #[test]
    fn test_implied_type_wraps_by_nesting_mode() {
        let ValueType::Object(fields) = implied_type(&instance_schema()) else {
            panic!("expected object type");
        };
        assert_eq!(fields["ami"], ValueType::String);
        assert!(matches!(fields["ebs_block_device"], ValueType::Set(_)));
        assert!(matches!(fields["metadata_options"], ValueType::Object(_)));
        assert!(!fields.contains_key("timeouts"));
    }

    #[test]
    fn test_implied_type_of_empty_block() {
        assert_eq!(implied_type(&BlockSchema::new()), ValueType::Object(BTreeMap::new()));
    }

    #[test]
    fn test_decode_fills_missing_fields_with_null() {
        let ty = implied_type(&instance_schema());
        let value = ty.decode(&json!({"ami": "ami-123", "unexpected": true})).unwrap();
        assert_eq!(value.get_attr("ami"), Some(&Value::from("ami-123")));
        assert_eq!(value.get_attr("tags"), Some(&Value::Null));
        assert_eq!(value.get_attr("metadata_options"), Some(&Value::Null));
        assert_eq!(value.get_attr("unexpected"), None);
    }

    #[test]
    fn test_decode_set_is_canonical() {
        let ty = ValueType::Set(Box::new(ValueType::String));
        let a = ty.decode(&json!(["b", "a", "b"])).unwrap();
        let b = ty.decode(&json!(["a", "b"])).unwrap();
        assert_eq!(a, b);
        assert_eq!(a, Value::Set(vec![Value::from("a"), Value::from("b")]));
    }

    #[test]
    fn test_decode_loose_primitives() {
        assert_eq!(ValueType::String.decode(&json!(42)).unwrap(), Value::from("42"));
        assert_eq!(ValueType::Number.decode(&json!("7")).unwrap(), Value::int(7));
        assert_eq!(ValueType::Number.decode(&json!(3.0)).unwrap(), Value::int(3));
        assert_eq!(ValueType::Bool.decode(&json!("true")).unwrap(), Value::Bool(true));
    }

    #[test]
    fn test_decode_reports_path() {
        let ty = implied_type(&instance_schema());
        let err = ty
            .decode(&json!({"ebs_block_device": [{"device_name": "/dev/sdb", "volume_size": "big"}]}))
            .unwrap_err();
        assert_eq!(err.path, ".ebs_block_device[0].volume_size");
        assert!(err.message.contains("not a number"));
    }

    #[test]
    fn test_decode_type_mismatch() {
        let err = ValueType::List(Box::new(ValueType::String))
            .decode(&json!({"a": 1}))
            .unwrap_err();
        assert_eq!(err.path, ".");
        assert_eq!(err.message, "expected list, found object");
    }

    #[test]
    fn test_decode_dynamic_is_structural() {
        let value = ValueType::Dynamic.decode(&json!({"a": [1, "x"]})).unwrap();
        assert_eq!(
            value,
            Value::Object(BTreeMap::from([(
                "a".to_string(),
                Value::Tuple(vec![Value::int(1), Value::from("x")])
            )]))
        );
    }
}

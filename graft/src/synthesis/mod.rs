//! Configuration synthesis.
//!
//! Given a block schema and the decoded values of every instance of one
//! resource, [`synthesize`] produces the body of a configuration block that
//! would record the same data again. Attributes whose value agrees across
//! all instances become constants. Attributes that disagree become a lookup
//! table literal indexed by `count.index` or `each.key`, so every instance
//! still selects its own recorded value.
//!
//! Attributes and nested block types are visited in lexicographic order and
//! lookup tables are ordered by instance key, so the same inputs always
//! produce the same body.

pub mod body;
pub mod resource;

#[cfg(test)]
mod proptests;

use std::collections::{BTreeMap, BTreeSet};

use crate::address::{InstanceAddress, InstanceKey};
use crate::error::{Error, Result};
use crate::schema::{BlockSchema, NestingMode};
use crate::value::Value;

pub use body::{Attribute, Block, Body, ConfigBlockBody, Expression, ObjectKey, Structure};
pub use resource::{generate_resource_block, GeneratedBlock};

static NULL: Value = Value::Null;

/// Per-instance values of one slot: an attribute, or one nested block.
type InstanceTable<'a> = BTreeMap<&'a InstanceKey, &'a Value>;

/// Output of [`synthesize`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Synthesized {
    /// The generated block body.
    pub body: ConfigBlockBody,
    /// Non-fatal problems found along the way.
    pub warnings: Vec<String>,
}

/// Synthesizes a block body from the decoded values of every instance of one
/// resource.
///
/// Each value must be an object conforming to the implied type of `schema`.
/// Fields missing from an instance's object are treated as null.
///
/// # Errors
///
/// Returns an error if the instances belong to more than one resource, mix
/// integer and string keys, use a negative integer key, or use integer keys
/// so sparse that the count lookup table would be mostly padding.
///
/// # Examples
///
/// ```
/// use std::collections::BTreeMap;
///
/// use graft::schema::{BlockSchema, ValueType, Writability};
/// use graft::synthesis::{synthesize, Expression};
/// use graft::{InstanceKey, ResourceAddress, Value};
///
/// let schema = BlockSchema::new().attribute("size", ValueType::String, Writability::Optional);
/// let resource: ResourceAddress = "example_disk.data".parse().unwrap();
///
/// let mut values = BTreeMap::new();
/// for i in 0..3 {
///     let object = BTreeMap::from([("size".to_string(), Value::from("large"))]);
///     values.insert(resource.instance(InstanceKey::Int(i)), Value::Object(object));
/// }
///
/// let out = synthesize(&schema, &values).unwrap();
/// assert_eq!(out.body.attribute("size"), Some(&Expression::Literal(Value::from("large"))));
/// ```
pub fn synthesize(
    schema: &BlockSchema,
    instance_values: &BTreeMap<InstanceAddress, Value>,
) -> Result<Synthesized> {
    let table = instance_table(instance_values)?;
    let mut synthesizer = Synthesizer {
        resource: instance_values
            .keys()
            .next()
            .map(|a| a.resource.to_string())
            .unwrap_or_default(),
        warnings: Vec::new(),
    };
    let mut body = Body::new();
    synthesizer.generate_body(schema, &table, "", &mut body);
    Ok(Synthesized {
        body,
        warnings: synthesizer.warnings,
    })
}

fn instance_table(instance_values: &BTreeMap<InstanceAddress, Value>) -> Result<InstanceTable<'_>> {
    let mut addresses = instance_values.keys();
    let Some(first) = addresses.next() else {
        return Ok(BTreeMap::new());
    };
    for address in addresses {
        if address.resource != first.resource {
            return Err(Error::InvalidState {
                reason: format!(
                    "cannot synthesize {} and {} into one block",
                    first.resource, address.resource
                ),
            });
        }
        if !address.key.same_kind(&first.key) {
            return Err(Error::MixedInstanceKeys {
                resource: first.resource.to_string(),
            });
        }
    }
    if matches!(first.key, InstanceKey::Int(_)) {
        count_length(&first.resource.to_string(), instance_values.keys().map(|a| &a.key))?;
    }
    Ok(instance_values.iter().map(|(a, v)| (&a.key, v)).collect())
}

/// Absent indexes a count lookup table may be padded with on top of four
/// slots per recorded instance.
const COUNT_PADDING_ALLOWANCE: usize = 1024;

/// The `count` that covers every integer key, which is the largest key plus
/// one.
///
/// # Errors
///
/// Returns an error for a negative key, and for a largest key so far past
/// the number of instances that the lookup table would be mostly padding.
pub(crate) fn count_length<'a>(resource: &str, keys: impl IntoIterator<Item = &'a InstanceKey>) -> Result<i64> {
    let mut instances = 0usize;
    let mut max = None;
    for key in keys {
        if let InstanceKey::Int(i) = key {
            if *i < 0 {
                return Err(Error::InstanceKeyMismatch {
                    resource: resource.to_string(),
                    expected: "non-negative integer key".into(),
                    found: format!("integer key {i}"),
                });
            }
            instances += 1;
            max = max.max(Some(*i));
        }
    }
    let Some(max) = max else {
        return Ok(0);
    };

    let out_of_range = || Error::InvalidState {
        reason: format!(
            "instance index {max} of {resource} is too far past its {instances} recorded instance(s) to generate a count"
        ),
    };
    let length = max.checked_add(1).ok_or_else(out_of_range)?;
    let allowed = instances.saturating_mul(4).saturating_add(COUNT_PADDING_ALLOWANCE);
    match usize::try_from(length) {
        Ok(len) if len <= allowed => Ok(length),
        _ => Err(out_of_range()),
    }
}

struct Synthesizer {
    resource: String,
    warnings: Vec<String>,
}

impl Synthesizer {
    fn generate_body(&mut self, schema: &BlockSchema, table: &InstanceTable<'_>, location: &str, body: &mut Body) {
        for (name, attribute) in &schema.attributes {
            if !attribute.is_writable() {
                continue;
            }
            let values = project(table, |object| object.get_attr(name));
            if let Some(expr) = attribute_expression(&values) {
                body.set_attribute(name.as_str(), expr);
            }
        }

        for (type_name, nested) in &schema.nested_blocks {
            let inner = format!("{location}{type_name}.");
            match &nested.nesting {
                NestingMode::Single => {
                    let values = project(table, |object| object.get_attr(type_name));
                    if values.values().all(|v| v.is_null()) {
                        continue;
                    }
                    self.emit_block(type_name, Vec::new(), &nested.block, &values, &inner, body);
                }
                NestingMode::List | NestingMode::Set => {
                    let sequences: BTreeMap<&InstanceKey, &[Value]> = table
                        .iter()
                        .map(|(key, object)| {
                            let items = object.get_attr(type_name).and_then(Value::elements).unwrap_or(&[]);
                            (*key, items)
                        })
                        .collect();
                    let max_len = sequences.values().map(|items| items.len()).max().unwrap_or(0);
                    for i in 0..max_len {
                        let values: InstanceTable<'_> = sequences
                            .iter()
                            .map(|(key, items)| (*key, items.get(i).unwrap_or(&NULL)))
                            .collect();
                        self.emit_block(type_name, Vec::new(), &nested.block, &values, &inner, body);
                    }
                }
                NestingMode::Map => {
                    let maps: BTreeMap<&InstanceKey, Option<&BTreeMap<String, Value>>> = table
                        .iter()
                        .map(|(key, object)| (*key, object.get_attr(type_name).and_then(Value::entries)))
                        .collect();
                    let labels: BTreeSet<&String> = maps.values().flatten().flat_map(|m| m.keys()).collect();
                    for label in labels {
                        let values: InstanceTable<'_> = maps
                            .iter()
                            .map(|(key, entries)| (*key, entries.and_then(|m| m.get(label)).unwrap_or(&NULL)))
                            .collect();
                        self.emit_block(type_name, vec![label.clone()], &nested.block, &values, &inner, body);
                    }
                }
                NestingMode::Unsupported(mode) => {
                    let warning = format!(
                        "{}: nested block type {location}{type_name} uses unsupported nesting mode {mode:?} and was left out",
                        self.resource
                    );
                    log::warn!("{warning}");
                    self.warnings.push(warning);
                }
            }
        }
    }

    fn emit_block(
        &mut self,
        type_name: &str,
        labels: Vec<String>,
        schema: &BlockSchema,
        values: &InstanceTable<'_>,
        location: &str,
        body: &mut Body,
    ) {
        let mut block = Block::new(type_name, labels);
        self.generate_body(schema, values, location, &mut block.body);
        body.append_block(block);
    }
}

fn project<'a>(table: &InstanceTable<'a>, field: impl Fn(&'a Value) -> Option<&'a Value>) -> InstanceTable<'a> {
    table
        .iter()
        .map(|(key, object)| (*key, field(*object).unwrap_or(&NULL)))
        .collect()
}

/// Chooses how one attribute is written.
///
/// Returns `None` when the attribute should be omitted: there are no
/// instances, or every instance agrees on null.
fn attribute_expression(values: &InstanceTable<'_>) -> Option<Expression> {
    let mut observed = values.values();
    let first = *observed.next()?;
    if observed.all(|v| *v == first) {
        return (!first.is_null()).then(|| Expression::Literal(first.clone()));
    }

    match values.keys().next()? {
        InstanceKey::Int(_) => {
            let max = values
                .keys()
                .filter_map(|key| match key {
                    InstanceKey::Int(i) => Some(*i),
                    _ => None,
                })
                .max()?;
            let items = (0..=max)
                .map(|i| Expression::Literal(values.get(&InstanceKey::Int(i)).map_or(Value::Null, |v| (*v).clone())))
                .collect();
            Some(Expression::Index {
                collection: Box::new(Expression::Tuple(items)),
                key: Box::new(Expression::traversal(&["count", "index"])),
            })
        }
        InstanceKey::String(_) => {
            let entries = values
                .iter()
                .map(|(key, value)| {
                    let label = match key {
                        InstanceKey::String(s) => s.clone(),
                        other => other.to_string(),
                    };
                    (ObjectKey::String(label), Expression::Literal((*value).clone()))
                })
                .collect();
            Some(Expression::Index {
                collection: Box::new(Expression::Object(entries)),
                key: Box::new(Expression::traversal(&["each", "key"])),
            })
        }
        // A single unkeyed instance always agrees with itself.
        InstanceKey::None => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::ResourceAddress;
    use crate::schema::{ValueType, Writability};

    fn resource() -> ResourceAddress {
        "example_server.web".parse().unwrap()
    }

    fn object(fields: &[(&str, Value)]) -> Value {
        Value::Object(fields.iter().map(|(k, v)| ((*k).to_string(), v.clone())).collect())
    }

    fn counted(values: Vec<Value>) -> BTreeMap<InstanceAddress, Value> {
        values
            .into_iter()
            .enumerate()
            .map(|(i, v)| (resource().instance(InstanceKey::Int(i as i64)), v))
            .collect()
    }

    fn string_schema(names: &[&str]) -> BlockSchema {
        names.iter().fold(BlockSchema::new(), |schema, name| {
            schema.attribute(*name, ValueType::String, Writability::Optional)
        })
    }

    #[test]
    fn test_constant_attribute() {
        let values = counted(vec![object(&[("size", "large".into())]); 3]);
        let out = synthesize(&string_schema(&["size"]), &values).unwrap();
        assert_eq!(out.body.attribute("size"), Some(&Expression::Literal("large".into())));
        assert!(out.warnings.is_empty());
    }

    #[test]
    fn test_divergent_attribute_round_trips() {
        let seeds = ["foo", "bar", "baz"];
        let values = counted(seeds.iter().map(|s| object(&[("seed", (*s).into())])).collect());
        let out = synthesize(&string_schema(&["seed"]), &values).unwrap();

        let expr = out.body.attribute("seed").unwrap();
        let Expression::Index { collection, key } = expr else {
            panic!("expected a lookup, got {expr:?}");
        };
        assert!(matches!(collection.as_ref(), Expression::Tuple(items) if items.len() == 3));
        assert_eq!(key.as_ref(), &Expression::traversal(&["count", "index"]));
        for (i, seed) in seeds.iter().enumerate() {
            assert_eq!(expr.evaluate(&InstanceKey::Int(i as i64)), Some(Value::from(*seed)));
        }
    }

    #[test]
    fn test_divergent_string_keys() {
        let values: BTreeMap<_, _> = [("b", "two"), ("a", "one")]
            .iter()
            .map(|(k, v)| {
                (
                    resource().instance(InstanceKey::String((*k).into())),
                    object(&[("name", (*v).into())]),
                )
            })
            .collect();
        let out = synthesize(&string_schema(&["name"]), &values).unwrap();
        let expr = out.body.attribute("name").unwrap();
        let Expression::Index { collection, .. } = expr else {
            panic!("expected a lookup, got {expr:?}");
        };
        let Expression::Object(entries) = collection.as_ref() else {
            panic!("expected an object table");
        };
        let keys: Vec<&str> = entries.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(expr.evaluate(&InstanceKey::String("b".into())), Some(Value::from("two")));
    }

    #[test]
    fn test_null_and_computed_attributes_omitted() {
        let schema = string_schema(&["name"])
            .attribute("id", ValueType::String, Writability::ComputedOnly)
            .attribute("zone", ValueType::String, Writability::Optional);
        let values = counted(vec![
            object(&[("name", "a".into()), ("id", "i-1".into()), ("zone", Value::Null)]),
            object(&[("name", "a".into()), ("id", "i-2".into())]),
        ]);
        let out = synthesize(&schema, &values).unwrap();
        assert_eq!(out.body.attribute_names(), vec!["name"]);
    }

    #[test]
    fn test_missing_field_is_null_in_lookup() {
        let values = counted(vec![object(&[("name", "a".into())]), object(&[])]);
        let out = synthesize(&string_schema(&["name"]), &values).unwrap();
        let expr = out.body.attribute("name").unwrap();
        assert_eq!(expr.evaluate(&InstanceKey::Int(0)), Some(Value::from("a")));
        assert_eq!(expr.evaluate(&InstanceKey::Int(1)), Some(Value::Null));
    }

    #[test]
    fn test_count_gap_padded_with_null() {
        let values: BTreeMap<_, _> = [(0, "a"), (2, "c")]
            .iter()
            .map(|(i, v)| (resource().instance(InstanceKey::Int(*i)), object(&[("name", (*v).into())])))
            .collect();
        let out = synthesize(&string_schema(&["name"]), &values).unwrap();
        let expr = out.body.attribute("name").unwrap();
        assert_eq!(expr.evaluate(&InstanceKey::Int(1)), Some(Value::Null));
        assert_eq!(expr.evaluate(&InstanceKey::Int(2)), Some(Value::from("c")));
    }

    #[test]
    fn test_attributes_sorted() {
        let values = counted(vec![object(&[("b", "1".into()), ("a", "2".into()), ("c", "3".into())])]);
        let out = synthesize(&string_schema(&["c", "a", "b"]), &values).unwrap();
        assert_eq!(out.body.attribute_names(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_list_blocks_padded_to_longest() {
        let disk = string_schema(&["device"]);
        let schema = BlockSchema::new().nested("disk", NestingMode::List, disk);
        let values = counted(vec![
            object(&[(
                "disk",
                Value::List(vec![object(&[("device", "sda".into())]), object(&[("device", "sdb".into())])]),
            )]),
            object(&[("disk", Value::List(vec![object(&[("device", "sda".into())])]))]),
        ]);
        let out = synthesize(&schema, &values).unwrap();
        let disks = out.body.blocks("disk");
        assert_eq!(disks.len(), 2);
        assert_eq!(disks[0].body.attribute("device"), Some(&Expression::Literal("sda".into())));
        let second = disks[1].body.attribute("device").unwrap();
        assert_eq!(second.evaluate(&InstanceKey::Int(0)), Some(Value::from("sdb")));
        assert_eq!(second.evaluate(&InstanceKey::Int(1)), Some(Value::Null));
    }

    #[test]
    fn test_map_blocks_cover_key_union() {
        let rule = string_schema(&["port"]);
        let schema = BlockSchema::new().nested("rule", NestingMode::Map, rule);
        let rules = |keys: &[&str]| {
            Value::Map(
                keys.iter()
                    .map(|k| ((*k).to_string(), object(&[("port", "80".into())])))
                    .collect(),
            )
        };
        let values = counted(vec![
            object(&[("rule", rules(&["http"]))]),
            object(&[("rule", rules(&["ssh", "http"]))]),
            object(&[("rule", Value::Null)]),
        ]);
        let out = synthesize(&schema, &values).unwrap();
        let labels: Vec<&str> = out
            .body
            .blocks("rule")
            .iter()
            .map(|b| b.labels[0].as_str())
            .collect();
        assert_eq!(labels, vec!["http", "ssh"]);
    }

    #[test]
    fn test_single_block_null_everywhere_omitted() {
        let schema = BlockSchema::new().nested("timeouts", NestingMode::Single, string_schema(&["create"]));
        let values = counted(vec![object(&[("timeouts", Value::Null)]), object(&[])]);
        let out = synthesize(&schema, &values).unwrap();
        assert!(out.body.is_empty());
    }

    #[test]
    fn test_unsupported_nesting_warns() {
        let schema = BlockSchema::new().nested("odd", NestingMode::Unsupported("group".into()), BlockSchema::new());
        let values = counted(vec![object(&[])]);
        let out = synthesize(&schema, &values).unwrap();
        assert!(out.body.is_empty());
        assert_eq!(out.warnings.len(), 1);
        assert!(out.warnings[0].contains("odd"));
    }

    #[test]
    fn test_mixed_keys_rejected() {
        let mut values = BTreeMap::new();
        values.insert(resource().instance(InstanceKey::Int(0)), object(&[]));
        values.insert(resource().instance(InstanceKey::String("a".into())), object(&[]));
        assert!(matches!(
            synthesize(&string_schema(&["name"]), &values),
            Err(Error::MixedInstanceKeys { .. })
        ));
    }

    #[test]
    fn test_negative_index_rejected() {
        let mut values = BTreeMap::new();
        values.insert(resource().instance(InstanceKey::Int(-1)), object(&[]));
        assert!(matches!(
            synthesize(&string_schema(&["name"]), &values),
            Err(Error::InstanceKeyMismatch { .. })
        ));
    }

    #[test]
    fn test_largest_index_rejected() {
        let mut values = BTreeMap::new();
        values.insert(resource().instance(InstanceKey::Int(i64::MAX)), object(&[]));
        assert!(matches!(
            synthesize(&string_schema(&["name"]), &values),
            Err(Error::InvalidState { .. })
        ));
    }

    #[test]
    fn test_sparse_indexes_rejected() {
        let mut values = BTreeMap::new();
        values.insert(
            resource().instance(InstanceKey::Int(0)),
            object(&[("name", Value::from("a"))]),
        );
        values.insert(
            resource().instance(InstanceKey::Int(50_000_000)),
            object(&[("name", Value::from("b"))]),
        );
        assert!(matches!(
            synthesize(&string_schema(&["name"]), &values),
            Err(Error::InvalidState { .. })
        ));
    }

    #[test]
    fn test_count_length_allows_modest_gaps() {
        let keys = [InstanceKey::Int(0), InstanceKey::Int(1000)];
        assert_eq!(count_length("example_server.web", &keys).unwrap(), 1001);
        assert_eq!(count_length("example_server.web", &[InstanceKey::None]).unwrap(), 0);
        assert!(matches!(
            count_length("example_server.web", &[InstanceKey::Int(2000)]),
            Err(Error::InvalidState { .. })
        ));
    }

    #[test]
    fn test_empty_input_yields_empty_body() {
        let out = synthesize(&string_schema(&["name"]), &BTreeMap::new()).unwrap();
        assert!(out.body.is_empty());
    }
}

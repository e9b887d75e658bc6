//! Property-based tests for configuration synthesis.

use std::collections::{BTreeMap, BTreeSet};

use proptest::prelude::*;

use super::{synthesize, Expression};
use crate::address::{InstanceAddress, InstanceKey, ResourceAddress};
use crate::schema::{BlockSchema, NestingMode, ValueType, Writability};
use crate::value::Value;

fn resource() -> ResourceAddress {
    ResourceAddress::managed("test_thing", "it").unwrap()
}

fn scalar_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i32>().prop_map(|i| Value::int(i64::from(i))),
        "[a-z ${}%]{0,6}".prop_map(Value::String),
    ]
}

fn value_strategy() -> impl Strategy<Value = Value> {
    scalar_strategy().prop_recursive(2, 12, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::List),
            prop::collection::btree_map("[a-z]{1,3}", inner, 0..4).prop_map(Value::Map),
        ]
    })
}

fn with_attr(value: Value) -> Value {
    Value::Object(BTreeMap::from([("attr".to_string(), value)]))
}

fn schema() -> BlockSchema {
    BlockSchema::new().attribute("attr", ValueType::Dynamic, Writability::Optional)
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 512,
        .. ProptestConfig::default()
    })]

    // Values every instance agrees on are written as one constant, or left out when null
    #[test]
    fn constant_emission_is_reflexive(value in value_strategy(), count in 1i64..6) {
        let values: BTreeMap<InstanceAddress, Value> = (0..count)
            .map(|i| (resource().instance(InstanceKey::Int(i)), with_attr(value.clone())))
            .collect();
        let out = synthesize(&schema(), &values).unwrap();

        match out.body.attribute("attr") {
            None => prop_assert!(value.is_null()),
            Some(expr) => prop_assert_eq!(expr, &Expression::Literal(value)),
        }
    }

    // Indexing a count lookup table by each instance's key yields that instance's value
    #[test]
    fn count_lookup_round_trips(values in prop::collection::vec(value_strategy(), 2..6)) {
        let instances: BTreeMap<InstanceAddress, Value> = values
            .iter()
            .enumerate()
            .map(|(i, v)| (resource().instance(InstanceKey::Int(i as i64)), with_attr(v.clone())))
            .collect();
        let out = synthesize(&schema(), &instances).unwrap();

        let all_equal = values.iter().all(|v| *v == values[0]);
        if let Some(expr) = out.body.attribute("attr") {
            for (i, v) in values.iter().enumerate() {
                prop_assert_eq!(expr.evaluate(&InstanceKey::Int(i as i64)), Some(v.clone()));
            }
        } else {
            prop_assert!(all_equal && values[0].is_null());
        }
    }

    // Indexing a for_each lookup table by each instance's key yields that instance's value
    #[test]
    fn each_key_lookup_round_trips(values in prop::collection::btree_map("[a-z]{1,4}", value_strategy(), 1..6)) {
        let instances: BTreeMap<InstanceAddress, Value> = values
            .iter()
            .map(|(k, v)| (resource().instance(InstanceKey::String(k.clone())), with_attr(v.clone())))
            .collect();
        let out = synthesize(&schema(), &instances).unwrap();

        if let Some(expr) = out.body.attribute("attr") {
            for (k, v) in &values {
                prop_assert_eq!(expr.evaluate(&InstanceKey::String(k.clone())), Some(v.clone()));
            }
        } else {
            prop_assert!(values.values().all(Value::is_null));
        }
    }

    // A map-nested block type gets one block per key seen in any instance
    #[test]
    fn map_blocks_cover_key_union(key_sets in prop::collection::vec(prop::collection::btree_set("[a-z]{1,3}", 0..4), 1..5)) {
        let schema = BlockSchema::new().nested(
            "rule",
            NestingMode::Map,
            BlockSchema::new().attribute("on", ValueType::Bool, Writability::Optional),
        );
        let instances: BTreeMap<InstanceAddress, Value> = key_sets
            .iter()
            .enumerate()
            .map(|(i, keys)| {
                let rules = keys
                    .iter()
                    .map(|k| (k.clone(), Value::Object(BTreeMap::from([("on".to_string(), Value::Bool(true))]))))
                    .collect();
                let object = Value::Object(BTreeMap::from([("rule".to_string(), Value::Map(rules))]));
                (resource().instance(InstanceKey::Int(i as i64)), object)
            })
            .collect();
        let out = synthesize(&schema, &instances).unwrap();

        let labels: Vec<&str> = out.body.blocks("rule").iter().map(|b| b.labels[0].as_str()).collect();
        let union: BTreeSet<&str> = key_sets.iter().flatten().map(String::as_str).collect();
        prop_assert_eq!(labels, union.into_iter().collect::<Vec<_>>());
    }
}

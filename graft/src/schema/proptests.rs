//! Property-based tests for implied types and state decoding.

use super::{implied_type, BlockSchema, NestingMode, ValueType, Writability};
use crate::value::Value;
use proptest::prelude::*;
use serde_json::json;

fn name_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z_]{0,8}"
}

// Flat block schemas with string attributes and one list block.
fn block_strategy() -> impl Strategy<Value = (Vec<String>, String)> {
    (prop::collection::vec(name_strategy(), 0..6), name_strategy())
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        .. ProptestConfig::default()
    })]

    // Every attribute and supported block type appears in the implied object.
    // Block names end in a digit so they never collide with attribute names.
    #[test]
    fn implied_type_covers_schema((attrs, block_name) in block_strategy()) {
        let mut block = BlockSchema::new();
        for attr in &attrs {
            block = block.attribute(attr.clone(), ValueType::String, Writability::Optional);
        }
        let block_name = format!("{block_name}0");
        block = block.nested(block_name.clone(), NestingMode::List, BlockSchema::new());

        let ValueType::Object(fields) = implied_type(&block) else {
            panic!("implied type of a block must be an object");
        };
        for attr in &attrs {
            prop_assert_eq!(&fields[attr], &ValueType::String);
        }
        prop_assert!(matches!(fields[&block_name], ValueType::List(_)));
    }

    // Decoding an empty object yields null for every field, never an error.
    #[test]
    fn decode_missing_fields_are_null((attrs, _) in block_strategy()) {
        let mut block = BlockSchema::new();
        for attr in &attrs {
            block = block.attribute(attr.clone(), ValueType::Number, Writability::Required);
        }
        let value = implied_type(&block).decode(&json!({})).unwrap();
        for attr in &attrs {
            prop_assert_eq!(value.get_attr(attr), Some(&Value::Null));
        }
    }

    // Set decoding ignores recorded order and duplicates.
    #[test]
    fn decode_set_order_insensitive(items in prop::collection::vec("[a-z]{0,4}", 0..8)) {
        let ty = ValueType::Set(Box::new(ValueType::String));
        let mut reversed = items.clone();
        reversed.reverse();
        let mut doubled = items.clone();
        doubled.extend(items.iter().cloned());

        let forward = ty.decode(&json!(items)).unwrap();
        prop_assert_eq!(&forward, &ty.decode(&json!(reversed)).unwrap());
        prop_assert_eq!(&forward, &ty.decode(&json!(doubled)).unwrap());
    }

    // Lists keep their recorded order exactly.
    #[test]
    fn decode_list_preserves_order(items in prop::collection::vec(any::<i32>(), 0..8)) {
        let ty = ValueType::List(Box::new(ValueType::Number));
        let decoded = ty.decode(&json!(items)).unwrap();
        let expected: Vec<Value> = items.iter().map(|i| Value::int(i64::from(*i))).collect();
        prop_assert_eq!(decoded, Value::List(expected));
    }
}

//! Property-based tests for operations module.
//!
//! These tests focus on plan construction and ordering invariants.

use std::collections::BTreeSet;

use proptest::prelude::*;
use serde_json::json;

use super::{build_plan, DesiredIds, ImportTarget};
use crate::address::{InstanceAddress, ResourceAddress};

// Strategy for generating ids of every shape
fn ids_strategy() -> impl Strategy<Value = serde_json::Value> {
    let id = "[a-z0-9-]{1,8}";
    prop_oneof![
        id.prop_map(|s| json!(s)),
        (0u32..100_000).prop_map(|n| json!(n)),
        prop::collection::vec(id, 0..5).prop_map(|v| json!(v)),
        prop::collection::btree_map("[a-z]{1,4}", id, 0..5).prop_map(|m| json!(m)),
    ]
}

// Strategy for generating targets; short names make repeats likely, and the
// type follows the id shape so repeats of one resource agree on their keys
fn targets_strategy() -> impl Strategy<Value = Vec<ImportTarget>> {
    prop::collection::vec(("[a-c]{1,2}", ids_strategy()), 0..8).prop_map(|targets| {
        targets
            .into_iter()
            .map(|(name, ids)| {
                let ids = DesiredIds::from_raw(ids);
                let resource_type = format!("test_{}", ids.repeat_mode());
                let address = ResourceAddress::managed(resource_type, name).unwrap();
                ImportTarget::new(address, ids)
            })
            .collect()
    })
}

fn computed_instances(targets: &[ImportTarget]) -> Vec<InstanceAddress> {
    targets
        .iter()
        .flat_map(|t| {
            t.desired_ids
                .normalize()
                .unwrap()
                .into_keys()
                .map(|key| t.address.instance(key))
                .collect::<Vec<_>>()
        })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 1000,
        max_shrink_iters: 10000,
        .. ProptestConfig::default()
    })]

    // Bindings cover exactly the computed instances that are not yet tracked
    #[test]
    fn bindings_are_missing_instances(
        targets in targets_strategy(),
        mask in prop::collection::vec(any::<bool>(), 32)
    ) {
        let all = computed_instances(&targets);
        let existing: BTreeSet<InstanceAddress> = all
            .iter()
            .zip(mask.iter().cycle())
            .filter(|(_, tracked)| **tracked)
            .map(|(a, _)| a.clone())
            .collect();

        let (plan, errors) = build_plan(&targets, &existing, &BTreeSet::new());
        prop_assert!(errors.is_empty());

        let bound: Vec<InstanceAddress> = plan.state_bindings.iter().map(|b| b.target.clone()).collect();
        let unique: BTreeSet<InstanceAddress> = bound.iter().cloned().collect();
        prop_assert_eq!(unique.len(), bound.len());

        let expected: BTreeSet<InstanceAddress> = all.into_iter().filter(|a| !existing.contains(a)).collect();
        prop_assert_eq!(unique, expected);
    }

    // One stub per undeclared resource
    #[test]
    fn one_stub_per_undeclared_resource(targets in targets_strategy(), declare_first in any::<bool>()) {
        let declared: BTreeSet<ResourceAddress> = if declare_first {
            targets.iter().take(1).map(|t| t.address.clone()).collect()
        } else {
            BTreeSet::new()
        };
        let (plan, _) = build_plan(&targets, &BTreeSet::new(), &declared);

        let stubbed: Vec<&ResourceAddress> = plan.config_stubs.iter().map(|s| &s.target).collect();
        let expected: BTreeSet<&ResourceAddress> = targets
            .iter()
            .map(|t| &t.address)
            .filter(|a| !declared.contains(*a))
            .collect();
        prop_assert_eq!(stubbed, expected.into_iter().collect::<Vec<_>>());
    }

    // Sorting an already sorted plan changes nothing
    #[test]
    fn sort_is_idempotent(targets in targets_strategy()) {
        let (mut plan, _) = build_plan(&targets, &BTreeSet::new(), &BTreeSet::new());
        let sorted = plan.clone();
        plan.sort();
        prop_assert_eq!(plan, sorted);
    }

    // Planning does not depend on the order targets are declared in
    #[test]
    fn plan_order_is_deterministic(targets in targets_strategy()) {
        let (plan, _) = build_plan(&targets, &BTreeSet::new(), &BTreeSet::new());
        let mut reversed = targets.clone();
        reversed.reverse();
        let (other, _) = build_plan(&reversed, &BTreeSet::new(), &BTreeSet::new());

        let addresses = |p: &super::ImportPlan| -> Vec<InstanceAddress> {
            p.state_bindings.iter().map(|b| b.target.clone()).collect()
        };
        prop_assert_eq!(addresses(&plan), addresses(&other));
        prop_assert_eq!(plan.config_stubs.len(), other.config_stubs.len());
    }
}

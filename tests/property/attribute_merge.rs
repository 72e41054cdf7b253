//! Property-based tests for attribute reconciliation

use flowmerge::flow::{Attributes, FlowUnit};
use flowmerge::merge::attributes::{keep_all_unique, keep_common};
use proptest::prelude::*;

fn units_strategy() -> impl Strategy<Value = Vec<Attributes>> {
    prop::collection::vec(prop::collection::btree_map("[a-d]", "[xy]", 0..4), 1..6)
}

fn to_units(maps: &[Attributes]) -> Vec<FlowUnit> {
    maps.iter()
        .map(|map| {
            let mut unit = FlowUnit::empty();
            unit.set_attributes(map.clone());
            unit
        })
        .collect()
}

/// KeepCommon does not depend on member order
#[test]
fn test_keep_common_order_independent() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&units_strategy(), |maps| {
            let forward = keep_common(&to_units(&maps));
            let mut reversed = maps.clone();
            reversed.reverse();
            prop_assert_eq!(&forward, &keep_common(&to_units(&reversed)));

            for (key, value) in &forward {
                prop_assert!(maps.iter().all(|m| m.get(key) == Some(value)));
            }
            Ok(())
        })
        .unwrap();
}

/// A key survives KeepAllUnique exactly when every member holding it agrees on the value
#[test]
fn test_keep_all_unique_drops_conflicting_keys() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(&units_strategy(), |maps| {
            let merged = keep_all_unique(&to_units(&maps));
            let keys: std::collections::BTreeSet<&String> =
                maps.iter().flat_map(|m| m.keys()).collect();

            for key in keys {
                let mut values = maps.iter().filter_map(|m| m.get(key));
                let first = values.next();
                let consistent = values.all(|v| Some(v) == first);
                if consistent {
                    prop_assert_eq!(merged.get(key), first);
                } else {
                    prop_assert!(!merged.contains_key(key));
                }
            }
            prop_assert!(merged.len() >= keep_common(&to_units(&maps)).len());
            Ok(())
        })
        .unwrap();
}

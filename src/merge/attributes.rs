//! Attribute reconciliation across a bin's members

use crate::config::AttributeStrategy;
use crate::flow::{Attributes, FlowUnit};
use std::collections::HashSet;

/// Computes the attribute set of a merge result from its members.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeMerger {
    strategy: AttributeStrategy,
}

impl AttributeMerger {
    pub fn new(strategy: AttributeStrategy) -> Self {
        Self { strategy }
    }

    pub fn strategy(&self) -> AttributeStrategy {
        self.strategy
    }

    /// Merged attributes of `units`, taken in arrival order.
    pub fn merge(&self, units: &[FlowUnit]) -> Attributes {
        match self.strategy {
            AttributeStrategy::KeepCommon => keep_common(units),
            AttributeStrategy::KeepAllUnique => keep_all_unique(units),
        }
    }
}

/// Pairs held with identical values by every member.
pub fn keep_common(units: &[FlowUnit]) -> Attributes {
    let Some((first, rest)) = units.split_first() else {
        return Attributes::new();
    };
    let mut merged = first.attributes().clone();
    for unit in rest {
        merged.retain(|key, value| unit.attribute(key) == Some(value.as_str()));
        if merged.is_empty() {
            break;
        }
    }
    merged
}

/// Union of all pairs, minus every key ever seen with two different values.
pub fn keep_all_unique(units: &[FlowUnit]) -> Attributes {
    let mut merged = Attributes::new();
    let mut excluded: HashSet<&str> = HashSet::new();
    for unit in units {
        for (key, value) in unit.attributes() {
            if excluded.contains(key.as_str()) {
                continue;
            }
            match merged.get(key).map(|existing| existing == value) {
                None => {
                    merged.insert(key.clone(), value.clone());
                }
                Some(false) => {
                    merged.remove(key);
                    excluded.insert(key.as_str());
                }
                Some(true) => {}
            }
        }
    }
    merged
}

//! Fragment validation and ordering for defragmentation

use crate::error::ValidationError;
use crate::flow::attributes;
use crate::flow::FlowUnit;

/// Fragment metadata of a validated bin, one index per member in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentSet {
    pub identifier: String,
    pub count: u64,
    indices: Vec<u64>,
}

impl FragmentSet {
    pub fn indices(&self) -> &[u64] {
        &self.indices
    }

    pub fn has_duplicates(&self) -> bool {
        let mut sorted = self.indices.clone();
        sorted.sort_unstable();
        sorted.windows(2).any(|pair| pair[0] == pair[1])
    }

    /// Reorder `units` (the same members, in the same arrival order that was validated)
    /// ascending by fragment index. Equal indices keep arrival order.
    pub fn order(&self, units: Vec<FlowUnit>) -> Vec<FlowUnit> {
        debug_assert_eq!(units.len(), self.indices.len());
        let mut keyed: Vec<(u64, FlowUnit)> = self.indices.iter().copied().zip(units).collect();
        keyed.sort_by_key(|(index, _)| *index);
        keyed.into_iter().map(|(_, unit)| unit).collect()
    }
}

fn required<'a>(unit: &'a FlowUnit, attribute: &'static str) -> Result<&'a str, ValidationError> {
    unit.attribute(attribute)
        .ok_or(ValidationError::MissingAttribute {
            unit: unit.id(),
            attribute,
        })
}

fn number(unit: &FlowUnit, attribute: &'static str, value: &str) -> Result<u64, ValidationError> {
    value.parse().map_err(|_| ValidationError::NotANumber {
        unit: unit.id(),
        attribute,
        value: value.to_string(),
    })
}

/// Check that every member carries the same `fragment.identifier` and `fragment.count`,
/// and an index below that count.
///
/// Identifier and count are compared as written, so `"3"` and `"03"` do not match.
pub fn validate(units: &[FlowUnit]) -> Result<FragmentSet, ValidationError> {
    let first = units.first().ok_or(ValidationError::EmptyBin)?;
    let identifier = required(first, attributes::FRAGMENT_ID)?;
    let count_text = required(first, attributes::FRAGMENT_COUNT)?;
    let count = number(first, attributes::FRAGMENT_COUNT, count_text)?;

    let mut indices = Vec::with_capacity(units.len());
    for unit in units {
        for (attribute, expected) in [
            (attributes::FRAGMENT_ID, identifier),
            (attributes::FRAGMENT_COUNT, count_text),
        ] {
            let actual = required(unit, attribute)?;
            if actual != expected {
                return Err(ValidationError::Mismatch {
                    unit: unit.id(),
                    attribute,
                    expected: expected.to_string(),
                    actual: actual.to_string(),
                });
            }
        }

        let index_text = required(unit, attributes::FRAGMENT_INDEX)?;
        let index = number(unit, attributes::FRAGMENT_INDEX, index_text)?;
        if index >= count {
            return Err(ValidationError::IndexOutOfRange {
                unit: unit.id(),
                index,
                count,
            });
        }
        indices.push(index);
    }

    Ok(FragmentSet {
        identifier: identifier.to_string(),
        count,
        indices,
    })
}

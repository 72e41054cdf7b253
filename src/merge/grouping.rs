//! Group assignment and per-bin limits

use crate::config::{BinThresholds, MergeStrategy};
use crate::error::GroupingError;
use crate::flow::attributes;
use crate::flow::FlowUnit;

/// Group id shared by every unit without a correlation value
pub const DEFAULT_GROUP: &str = "";

/// Size and entry bounds applied to a single bin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinLimits {
    pub min_size: u64,
    pub max_size: u64,
    pub min_entries: usize,
    pub max_entries: usize,
}

impl BinLimits {
    /// Whether a bin currently holding `count` units totalling `size` bytes may take one more
    /// unit of `unit_size` bytes.
    pub fn admits(&self, count: usize, size: u64, unit_size: u64) -> bool {
        count < self.max_entries
            && size
                .checked_add(unit_size)
                .map_or(false, |total| total <= self.max_size)
    }

    pub fn satisfied_by(&self, count: usize, size: u64) -> bool {
        (self.min_size..=self.max_size).contains(&size)
            && (self.min_entries..=self.max_entries).contains(&count)
    }
}

/// Maps a flow unit to the group whose bins it may join.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupingPolicy {
    strategy: MergeStrategy,
    correlation_attribute: Option<String>,
}

impl GroupingPolicy {
    pub fn new(strategy: MergeStrategy, correlation_attribute: Option<String>) -> Self {
        Self {
            strategy,
            correlation_attribute,
        }
    }

    pub fn strategy(&self) -> MergeStrategy {
        self.strategy
    }

    /// Group id for `unit`.
    ///
    /// Bin-packing never fails: units without a correlation value share [`DEFAULT_GROUP`].
    /// Defragmentation requires a non-empty `fragment.identifier`.
    pub fn group_id(&self, unit: &FlowUnit) -> Result<String, GroupingError> {
        match self.strategy {
            MergeStrategy::BinPacking => Ok(self
                .correlation_attribute
                .as_deref()
                .and_then(|name| unit.attribute(name))
                .filter(|value| !value.is_empty())
                .unwrap_or(DEFAULT_GROUP)
                .to_string()),
            MergeStrategy::Defragment => unit
                .attribute(attributes::FRAGMENT_ID)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
                .ok_or(GroupingError::MissingAttribute(attributes::FRAGMENT_ID)),
        }
    }

    /// Limits for a bin opened by `unit`.
    ///
    /// When defragmenting, a bin holds exactly `fragment.count` units; a missing or
    /// unparsable count falls back to the configured entry limits and is caught when the
    /// bin is validated.
    pub fn limits_for(&self, unit: &FlowUnit, thresholds: &BinThresholds) -> BinLimits {
        let mut limits = BinLimits {
            min_size: thresholds.min_size,
            max_size: thresholds.max_size,
            min_entries: thresholds.min_entries,
            max_entries: thresholds.max_entries,
        };
        if self.strategy == MergeStrategy::Defragment {
            let count = unit
                .attribute(attributes::FRAGMENT_COUNT)
                .and_then(|value| value.parse::<usize>().ok())
                .filter(|count| *count > 0);
            if let Some(count) = count {
                limits.min_entries = count;
                limits.max_entries = count;
            }
        }
        limits
    }
}

//! Bin: an append-ordered group of flow units awaiting merge

use crate::flow::FlowUnit;
use crate::merge::grouping::BinLimits;
use std::fmt;
use std::time::{Duration, Instant};

/// Handle identifying an open bin. Never reused within one manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BinId(u64);

impl BinId {
    pub(crate) fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for BinId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bin-{}", self.0)
    }
}

/// Flow units sharing one group id, in arrival order.
///
/// Totals always match membership. Once handed off by the manager a bin is owned by the
/// caller and consumed whole through [`Bin::into_units`].
#[derive(Debug)]
pub struct Bin {
    id: BinId,
    group_id: String,
    created: Instant,
    limits: BinLimits,
    units: Vec<FlowUnit>,
    size: u64,
}

impl Bin {
    pub fn new(id: BinId, group_id: String, created: Instant, limits: BinLimits) -> Self {
        Self {
            id,
            group_id,
            created,
            limits,
            units: Vec::new(),
            size: 0,
        }
    }

    pub fn id(&self) -> BinId {
        self.id
    }

    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    pub fn created(&self) -> Instant {
        self.created
    }

    pub fn limits(&self) -> &BinLimits {
        &self.limits
    }

    /// Cumulative payload size in bytes
    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn units(&self) -> &[FlowUnit] {
        &self.units
    }

    pub fn can_admit(&self, unit: &FlowUnit) -> bool {
        self.limits.admits(self.units.len(), self.size, unit.size())
    }

    /// Append `unit`, or hand it back if admitting it would exceed a limit.
    pub fn offer(&mut self, unit: FlowUnit) -> Result<(), FlowUnit> {
        if !self.can_admit(&unit) {
            return Err(unit);
        }
        self.size += unit.size();
        self.units.push(unit);
        Ok(())
    }

    /// Size and entry count both within bounds
    pub fn is_ready(&self) -> bool {
        self.limits.satisfied_by(self.units.len(), self.size)
    }

    pub fn is_expired(&self, now: Instant, max_age: Option<Duration>) -> bool {
        max_age.map_or(false, |age| now.saturating_duration_since(self.created) >= age)
    }

    pub fn into_units(self) -> Vec<FlowUnit> {
        self.units
    }
}

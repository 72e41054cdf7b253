//! Process session: collects the routing decisions made during one trigger.

use crate::flow::FlowUnit;
#[cfg(debug_assertions)]
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
#[cfg(debug_assertions)]
use uuid::Uuid;

/// Outbound relationships declared by the merge stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relationship {
    /// The synthesized merge result
    Merged,
    /// Every consumed input, echoed for lineage
    Original,
    /// Inputs that could not be grouped, validated or assembled
    Failure,
}

impl Relationship {
    pub const ALL: [Relationship; 3] = [
        Relationship::Merged,
        Relationship::Original,
        Relationship::Failure,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Relationship::Merged => "merged",
            Relationship::Original => "original",
            Relationship::Failure => "failure",
        }
    }
}

impl fmt::Display for Relationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Relationship {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Relationship::ALL
            .into_iter()
            .find(|r| r.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown relationship: {}", s))
    }
}

/// Ordered list of `(unit, relationship)` transfers.
///
/// Transferring takes the unit by value, so a unit can leave the engine only once.
#[derive(Debug, Default)]
pub struct ProcessSession {
    transfers: Vec<(FlowUnit, Relationship)>,
    #[cfg(debug_assertions)]
    seen: HashSet<Uuid>,
}

impl ProcessSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transfer(&mut self, unit: FlowUnit, relationship: Relationship) {
        #[cfg(debug_assertions)]
        assert!(self.seen.insert(unit.id()), "flow unit {} transferred twice", unit.id());
        self.transfers.push((unit, relationship));
    }

    pub fn transfer_all<I>(&mut self, units: I, relationship: Relationship)
    where
        I: IntoIterator<Item = FlowUnit>,
    {
        for unit in units {
            self.transfer(unit, relationship);
        }
    }

    /// Units routed to `relationship`, in transfer order.
    pub fn transferred(&self, relationship: Relationship) -> impl Iterator<Item = &FlowUnit> {
        self.transfers
            .iter()
            .filter(move |(_, r)| *r == relationship)
            .map(|(u, _)| u)
    }

    pub fn count(&self, relationship: Relationship) -> usize {
        self.transferred(relationship).count()
    }

    /// Remove and return the units routed to `relationship`.
    pub fn take(&mut self, relationship: Relationship) -> Vec<FlowUnit> {
        let (taken, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.transfers)
            .into_iter()
            .partition(|(_, r)| *r == relationship);
        self.transfers = kept;
        taken.into_iter().map(|(u, _)| u).collect()
    }

    pub fn len(&self) -> usize {
        self.transfers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transfers.is_empty()
    }

    pub fn into_transfers(self) -> Vec<(FlowUnit, Relationship)> {
        self.transfers
    }
}

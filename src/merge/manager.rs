//! Bin Manager
//!
//! Owns every open bin. Admission, readiness and eviction all happen under one lock, so a
//! bin is never handed off twice nor mutated while a collector inspects it.

use crate::config::BinThresholds;
use crate::error::GroupingError;
use crate::flow::FlowUnit;
use crate::merge::bin::{Bin, BinId};
use crate::merge::grouping::GroupingPolicy;
use parking_lot::Mutex;
use std::collections::{BTreeSet, HashMap};
use std::time::Instant;
use tracing::{debug, warn};

/// Result of offering a unit to the manager
#[derive(Debug)]
pub enum OfferOutcome {
    /// The unit now belongs to `bin`. `evicted` names the bin force-evicted to make room.
    Binned { bin: BinId, evicted: Option<BinId> },
    /// The unit could not be grouped and is returned to the caller.
    Rejected { unit: FlowUnit, error: GroupingError },
}

#[derive(Debug, Default)]
struct BinState {
    next_id: u64,
    bins: HashMap<BinId, Bin>,
    /// Open bins per group, oldest first
    groups: HashMap<String, Vec<BinId>>,
    by_age: BTreeSet<(Instant, BinId)>,
    /// Force-evicted bins awaiting collection
    evicted: Vec<Bin>,
}

impl BinState {
    fn detach(&mut self, id: BinId) -> Option<Bin> {
        let bin = self.bins.remove(&id)?;
        self.by_age.remove(&(bin.created(), id));
        if let Some(ids) = self.groups.get_mut(bin.group_id()) {
            ids.retain(|open| *open != id);
            if ids.is_empty() {
                self.groups.remove(bin.group_id());
            }
        }
        Some(bin)
    }

    fn oldest(&self) -> Option<BinId> {
        self.by_age.iter().next().map(|(_, id)| *id)
    }
}

/// Accumulates flow units into bins and hands off the ones ready to merge.
#[derive(Debug)]
pub struct BinManager {
    policy: GroupingPolicy,
    thresholds: BinThresholds,
    state: Mutex<BinState>,
}

impl BinManager {
    pub fn new(policy: GroupingPolicy, thresholds: BinThresholds) -> Self {
        Self {
            policy,
            thresholds,
            state: Mutex::new(BinState::default()),
        }
    }

    pub fn policy(&self) -> &GroupingPolicy {
        &self.policy
    }

    pub fn thresholds(&self) -> &BinThresholds {
        &self.thresholds
    }

    pub fn offer(&self, unit: FlowUnit) -> OfferOutcome {
        self.offer_at(unit, Instant::now())
    }

    /// Place `unit` into the newest open bin of its group, opening a new bin when that one
    /// cannot admit it. At the bin-count limit the oldest open bin is force-evicted first.
    pub fn offer_at(&self, mut unit: FlowUnit, now: Instant) -> OfferOutcome {
        let group_id = match self.policy.group_id(&unit) {
            Ok(group_id) => group_id,
            Err(error) => return OfferOutcome::Rejected { unit, error },
        };

        let limits = self.policy.limits_for(&unit, &self.thresholds);
        if !limits.admits(0, 0, unit.size()) {
            let error = GroupingError::Unadmittable {
                size: unit.size(),
                max_size: limits.max_size,
                max_entries: limits.max_entries,
            };
            return OfferOutcome::Rejected { unit, error };
        }

        let mut state = self.state.lock();

        let newest = state.groups.get(&group_id).and_then(|ids| ids.last().copied());
        if let Some(bin) = newest.and_then(|id| state.bins.get_mut(&id)) {
            match bin.offer(unit) {
                Ok(()) => {
                    return OfferOutcome::Binned {
                        bin: bin.id(),
                        evicted: None,
                    }
                }
                Err(refused) => unit = refused,
            }
        }

        let mut evicted = None;
        if state.bins.len() >= self.thresholds.max_bin_count {
            if let Some(oldest) = state.oldest() {
                if let Some(bin) = state.detach(oldest) {
                    warn!(
                        bin = %oldest,
                        group = bin.group_id(),
                        units = bin.len(),
                        bytes = bin.size(),
                        "Maximum bin count reached; evicting oldest bin"
                    );
                    state.evicted.push(bin);
                    evicted = Some(oldest);
                }
            }
        }

        let id = BinId::new(state.next_id);
        state.next_id += 1;
        let mut bin = Bin::new(id, group_id.clone(), now, limits);
        if let Err(unit) = bin.offer(unit) {
            // Limits admit a lone unit, checked above.
            return OfferOutcome::Rejected {
                error: GroupingError::Unadmittable {
                    size: unit.size(),
                    max_size: limits.max_size,
                    max_entries: limits.max_entries,
                },
                unit,
            };
        }
        debug!(bin = %id, group = %group_id, "Opened bin");
        state.by_age.insert((now, id));
        state.groups.entry(group_id).or_default().push(id);
        state.bins.insert(id, bin);

        OfferOutcome::Binned { bin: id, evicted }
    }

    pub fn collect_ready_bins(&self) -> Vec<Bin> {
        self.collect_ready_bins_at(Instant::now())
    }

    /// Remove and return every force-evicted bin, then every open bin that is ready or has
    /// reached the maximum bin age, oldest first.
    pub fn collect_ready_bins_at(&self, now: Instant) -> Vec<Bin> {
        let mut state = self.state.lock();
        let mut ready = std::mem::take(&mut state.evicted);

        let due: Vec<BinId> = state
            .by_age
            .iter()
            .filter_map(|(_, id)| state.bins.get(id))
            .filter(|bin| bin.is_ready() || bin.is_expired(now, self.thresholds.max_bin_age))
            .map(Bin::id)
            .collect();

        for id in due {
            if let Some(bin) = state.detach(id) {
                debug!(
                    bin = %id,
                    units = bin.len(),
                    bytes = bin.size(),
                    ready = bin.is_ready(),
                    "Bin handed off"
                );
                ready.push(bin);
            }
        }
        ready
    }

    /// Remove and return every bin regardless of readiness, oldest first.
    pub fn drain_all(&self) -> Vec<Bin> {
        let mut state = self.state.lock();
        let mut drained = std::mem::take(&mut state.evicted);
        let ids: Vec<BinId> = state.by_age.iter().map(|(_, id)| *id).collect();
        drained.extend(ids.into_iter().filter_map(|id| state.detach(id)));
        drained
    }

    pub fn open_bin_count(&self) -> usize {
        self.state.lock().bins.len()
    }

    /// Bins evicted by `offer` and not yet collected
    pub fn evicted_count(&self) -> usize {
        self.state.lock().evicted.len()
    }
}

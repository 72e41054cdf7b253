//! Merge stage
//!
//! Ties the pieces together for one scheduling activation: units are offered to the bin
//! manager, handed-off bins are validated (when defragmenting), their attributes reconciled
//! and their content assembled. Every inbound unit ends up transferred exactly once.

use crate::config::{MergeConfig, MergeSettings, MergeStrategy};
use crate::content::ContentStore;
use crate::error::{ConfigError, MergeError};
use crate::flow::{FlowUnit, ProcessSession, Relationship};
use crate::merge::assembly::ContentMerger;
use crate::merge::attributes::AttributeMerger;
use crate::merge::bin::Bin;
use crate::merge::fragment;
use crate::merge::grouping::GroupingPolicy;
use crate::merge::manager::{BinManager, OfferOutcome};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Counters for one trigger or flush
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TriggerStats {
    pub admitted: usize,
    pub rejected: usize,
    pub merged_bins: usize,
    pub failed_bins: usize,
}

impl TriggerStats {
    fn absorb(&mut self, other: TriggerStats) {
        self.admitted += other.admitted;
        self.rejected += other.rejected;
        self.merged_bins += other.merged_bins;
        self.failed_bins += other.failed_bins;
    }
}

/// The merge stage for one activation.
pub struct MergeProcessor {
    config: MergeConfig,
    bins: BinManager,
    attributes: AttributeMerger,
    content: ContentMerger,
    store: Arc<dyn ContentStore>,
}

impl MergeProcessor {
    /// Take the configuration snapshot and build the stage. Invalid settings refuse to start.
    pub fn schedule(
        settings: &MergeSettings,
        store: Arc<dyn ContentStore>,
    ) -> Result<Self, ConfigError> {
        let config = MergeConfig::from_settings(settings)?;
        Ok(Self::new(config, store))
    }

    pub fn new(config: MergeConfig, store: Arc<dyn ContentStore>) -> Self {
        let policy = GroupingPolicy::new(config.merge_strategy, config.correlation_attribute.clone());
        debug!(
            strategy = %config.merge_strategy,
            format = %config.merge_format,
            max_bin_count = config.thresholds.max_bin_count,
            "Merge stage scheduled"
        );
        Self {
            bins: BinManager::new(policy, config.thresholds),
            attributes: AttributeMerger::new(config.attribute_strategy),
            content: ContentMerger::from_config(&config),
            config,
            store,
        }
    }

    pub fn config(&self) -> &MergeConfig {
        &self.config
    }

    pub fn bin_manager(&self) -> &BinManager {
        &self.bins
    }

    /// Offer one unit. A unit that cannot be grouped goes straight to failure.
    pub fn offer(&self, session: &mut ProcessSession, unit: FlowUnit, now: Instant) -> bool {
        match self.bins.offer_at(unit, now) {
            OfferOutcome::Binned { .. } => true,
            OfferOutcome::Rejected { unit, error } => {
                warn!(unit = %unit.id(), error = %error, "Flow unit cannot be binned");
                session.transfer(unit, Relationship::Failure);
                false
            }
        }
    }

    pub fn on_trigger<I>(&self, session: &mut ProcessSession, inbound: I) -> TriggerStats
    where
        I: IntoIterator<Item = FlowUnit>,
    {
        self.on_trigger_at(session, inbound, Instant::now())
    }

    /// Offer every inbound unit, then merge every bin that is ready, expired or evicted.
    pub fn on_trigger_at<I>(
        &self,
        session: &mut ProcessSession,
        inbound: I,
        now: Instant,
    ) -> TriggerStats
    where
        I: IntoIterator<Item = FlowUnit>,
    {
        let mut stats = TriggerStats::default();
        for unit in inbound {
            if self.offer(session, unit, now) {
                stats.admitted += 1;
            } else {
                stats.rejected += 1;
            }
        }
        stats.absorb(self.process_bins(session, self.bins.collect_ready_bins_at(now)));
        stats
    }

    /// Merge every open bin regardless of readiness.
    pub fn flush(&self, session: &mut ProcessSession) -> TriggerStats {
        let drained = self.bins.drain_all();
        if !drained.is_empty() {
            debug!(bins = drained.len(), "Flushing open bins");
        }
        self.process_bins(session, drained)
    }

    fn process_bins(&self, session: &mut ProcessSession, bins: Vec<Bin>) -> TriggerStats {
        let mut stats = TriggerStats::default();
        for bin in bins {
            if self.process_bin(session, bin) {
                stats.merged_bins += 1;
            } else {
                stats.failed_bins += 1;
            }
        }
        stats
    }

    /// Merge one bin. On success the result goes to merged and every member to original;
    /// on any failure every member goes to failure and nothing is merged.
    pub fn process_bin(&self, session: &mut ProcessSession, bin: Bin) -> bool {
        let bin_id = bin.id();
        let units = bin.into_units();
        match self.merge_units(units) {
            Ok((result, members)) => {
                info!(
                    bin = %bin_id,
                    unit = %result.id(),
                    bytes = result.size(),
                    members = members.len(),
                    "Merged flow unit"
                );
                session.transfer(result, Relationship::Merged);
                session.transfer_all(members, Relationship::Original);
                true
            }
            Err((err, members)) => {
                error!(bin = %bin_id, members = members.len(), error = %err, "Bin merge failed");
                session.transfer_all(members, Relationship::Failure);
                false
            }
        }
    }

    fn merge_units(
        &self,
        units: Vec<FlowUnit>,
    ) -> Result<(FlowUnit, Vec<FlowUnit>), (MergeError, Vec<FlowUnit>)> {
        let units = if self.config.merge_strategy == MergeStrategy::Defragment {
            match fragment::validate(&units) {
                Ok(set) => {
                    if set.has_duplicates() {
                        warn!(
                            identifier = %set.identifier,
                            "Duplicate fragment indices; keeping arrival order"
                        );
                    }
                    set.order(units)
                }
                Err(err) => return Err((err.into(), units)),
            }
        } else {
            units
        };

        let attributes = self.attributes.merge(&units);
        match self.content.merge(self.store.as_ref(), &units, attributes) {
            Ok(result) => Ok((result, units)),
            Err(err) => Err((err, units)),
        }
    }
}

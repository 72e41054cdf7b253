//! Property-based tests for bin admission limits

use flowmerge::config::{BinThresholds, MergeStrategy};
use flowmerge::flow::FlowUnit;
use flowmerge::merge::{BinManager, GroupingPolicy, OfferOutcome};
use proptest::prelude::*;

/// Every handed-off bin respects the size and entry maxima, and no unit is lost
#[test]
fn test_bins_respect_maxima() {
    let mut runner = proptest::test_runner::TestRunner::default();

    let strategy = (
        prop::collection::vec((0u64..40, 0usize..3), 1..80),
        1u64..64,
        1usize..6,
        1usize..4,
    );
    runner
        .run(&strategy, |(offers, max_size, max_entries, max_bin_count)| {
            let manager = BinManager::new(
                GroupingPolicy::new(MergeStrategy::BinPacking, Some("tag".to_string())),
                BinThresholds {
                    max_size,
                    max_entries,
                    max_bin_count,
                    ..BinThresholds::default()
                },
            );

            let mut binned = 0;
            let mut bins = Vec::new();
            for (size, tag) in offers {
                let unit = FlowUnit::new(None, size).with_attribute("tag", tag.to_string());
                match manager.offer(unit) {
                    OfferOutcome::Binned { .. } => binned += 1,
                    OfferOutcome::Rejected { unit, .. } => prop_assert!(unit.size() > max_size),
                }
                prop_assert!(manager.open_bin_count() <= max_bin_count);
                bins.extend(manager.collect_ready_bins());
            }
            bins.extend(manager.drain_all());

            let mut total = 0;
            for bin in &bins {
                prop_assert!(!bin.is_empty());
                prop_assert!(bin.len() <= max_entries);
                prop_assert!(bin.size() <= max_size);
                total += bin.len();
            }
            prop_assert_eq!(total, binned);
            Ok(())
        })
        .unwrap();
}

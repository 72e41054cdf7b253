//! Merge Engine
//!
//! Bin-based aggregation: grouping, bin management, fragment validation, attribute
//! reconciliation and content assembly, driven by [`MergeProcessor`].

pub mod assembly;
pub mod attributes;
pub mod bin;
pub mod fragment;
pub mod grouping;
pub mod manager;
pub mod processor;

pub use assembly::ContentMerger;
pub use attributes::AttributeMerger;
pub use bin::{Bin, BinId};
pub use fragment::FragmentSet;
pub use grouping::{BinLimits, GroupingPolicy, DEFAULT_GROUP};
pub use manager::{BinManager, OfferOutcome};
pub use processor::{MergeProcessor, TriggerStats};

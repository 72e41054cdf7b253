//! Flowmerge: Bin-Based Aggregation and Merge Engine
//!
//! Accumulates flow units into bounded bins under size, count and age constraints,
//! reconciles attributes across each bin, and packages the bin's content into a single
//! merged flow unit (binary concatenation, tar or zip).

pub mod cli;
pub mod config;
pub mod content;
pub mod error;
pub mod flow;
pub mod lease;
pub mod logging;
pub mod merge;

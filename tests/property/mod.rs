//! Property-based tests for merge invariants

mod archive_entries;
mod attribute_merge;
mod bin_limits;

//! Merge rules: defaults, override order, conflict handling.

use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with merge policy defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<config::builder::DefaultState>, ConfigError>
{
    Config::builder()
        .set_default("merge.merge_strategy", "Defragment")?
        .set_default("merge.merge_format", "Binary Concatenation")?
        .set_default("merge.delimiter_strategy", "Filename")?
        .set_default("merge.attribute_strategy", "Keep Only Common Attributes")?
        .set_default("merge.min_entries", 1)?
        .set_default("merge.max_bin_count", 100)?
        .set_default("logging.level", "info")
}

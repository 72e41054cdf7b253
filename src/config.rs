//! Configuration System
//!
//! Two layers. [`MergeSettings`] holds merge options exactly as an operator writes them
//! (TOML file, environment, or original property names via [`MergeSettings::set_property`]).
//! [`MergeConfig`] is the immutable snapshot taken from those settings once per scheduling
//! activation; every strategy value is parsed and every threshold validated there, so an
//! invalid option refuses to start the stage instead of running with a guessed default.

use crate::error::ConfigError;
use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};

mod duration;
mod facade;
mod merge;
mod snapshot;
mod sources;

pub use duration::parse_duration;
pub use facade::ConfigLoader;
pub use snapshot::{
    AttributeStrategy, BinThresholds, DelimiterStrategy, Delimiters, MergeConfig, MergeFormat,
    MergeStrategy,
};

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FlowmergeConfig {
    /// Merge stage options
    #[serde(default)]
    pub merge: MergeSettings,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Raw merge options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergeSettings {
    /// Defragment or Bin-Packing Algorithm
    #[serde(default = "default_merge_strategy")]
    pub merge_strategy: String,

    /// Binary Concatenation, TAR or ZIP
    #[serde(default = "default_merge_format")]
    pub merge_format: String,

    /// Whether header/footer/demarcator name files (Filename) or are literal text (Text)
    #[serde(default = "default_delimiter_strategy")]
    pub delimiter_strategy: String,

    /// Keep Only Common Attributes or Keep All Unique Attributes
    #[serde(default = "default_attribute_strategy")]
    pub attribute_strategy: String,

    /// Attribute whose value groups units under Bin-Packing
    #[serde(default)]
    pub correlation_attribute_name: String,

    /// Minimum bin size in bytes
    #[serde(default)]
    pub min_size: u64,

    /// Maximum bin size in bytes (unbounded when unset)
    #[serde(default)]
    pub max_size: Option<u64>,

    /// Minimum number of units per bin
    #[serde(default = "default_min_entries")]
    pub min_entries: usize,

    /// Maximum number of units per bin (unbounded when unset)
    #[serde(default)]
    pub max_entries: Option<usize>,

    /// Age at which a bin is merged regardless of thresholds, e.g. "30 sec"
    #[serde(default)]
    pub max_bin_age: Option<String>,

    /// Maximum number of simultaneously open bins
    #[serde(default = "default_max_bin_count")]
    pub max_bin_count: usize,

    #[serde(default)]
    pub header: Option<String>,

    #[serde(default)]
    pub footer: Option<String>,

    #[serde(default)]
    pub demarcator: Option<String>,

    /// Include each unit's path attribute in archive entry names
    #[serde(default)]
    pub keep_path: bool,
}

fn default_merge_strategy() -> String {
    MergeStrategy::Defragment.as_str().to_string()
}

fn default_merge_format() -> String {
    MergeFormat::Concatenation.as_str().to_string()
}

fn default_delimiter_strategy() -> String {
    DelimiterStrategy::Filename.as_str().to_string()
}

fn default_attribute_strategy() -> String {
    AttributeStrategy::KeepCommon.as_str().to_string()
}

fn default_min_entries() -> usize {
    1
}

fn default_max_bin_count() -> usize {
    100
}

impl Default for MergeSettings {
    fn default() -> Self {
        Self {
            merge_strategy: default_merge_strategy(),
            merge_format: default_merge_format(),
            delimiter_strategy: default_delimiter_strategy(),
            attribute_strategy: default_attribute_strategy(),
            correlation_attribute_name: String::new(),
            min_size: 0,
            max_size: None,
            min_entries: default_min_entries(),
            max_entries: None,
            max_bin_age: None,
            max_bin_count: default_max_bin_count(),
            header: None,
            footer: None,
            demarcator: None,
            keep_path: false,
        }
    }
}

/// Property names understood by [`MergeSettings::set_property`]
pub const PROPERTY_NAMES: [&str; 15] = [
    "Merge Strategy",
    "Merge Format",
    "Correlation Attribute Name",
    "Delimiter Strategy",
    "Header File",
    "Footer File",
    "Demarcator File",
    "Keep Path",
    "Attribute Strategy",
    "Minimum Group Size",
    "Maximum Group Size",
    "Minimum Number of Entries",
    "Maximum Number of Entries",
    "Max Bin Age",
    "Maximum number of Bins",
];

impl MergeSettings {
    /// Set an option by its property name.
    ///
    /// Strategy values are stored verbatim and checked when the snapshot is taken; numeric
    /// and boolean values are parsed here. An empty value leaves the option unchanged.
    pub fn set_property(&mut self, name: &str, value: &str) -> Result<(), ConfigError> {
        let value = value.trim();
        if value.is_empty() {
            return Ok(());
        }
        let invalid = || ConfigError::InvalidPropertyValue {
            property: name.to_string(),
            value: value.to_string(),
        };

        match name {
            "Merge Strategy" => self.merge_strategy = value.to_string(),
            "Merge Format" => self.merge_format = value.to_string(),
            "Correlation Attribute Name" => self.correlation_attribute_name = value.to_string(),
            "Delimiter Strategy" => self.delimiter_strategy = value.to_string(),
            "Header File" => self.header = Some(value.to_string()),
            "Footer File" => self.footer = Some(value.to_string()),
            "Demarcator File" => self.demarcator = Some(value.to_string()),
            "Keep Path" => self.keep_path = parse_bool(value).ok_or_else(invalid)?,
            "Attribute Strategy" => self.attribute_strategy = value.to_string(),
            "Minimum Group Size" => self.min_size = value.parse().map_err(|_| invalid())?,
            "Maximum Group Size" => self.max_size = Some(value.parse().map_err(|_| invalid())?),
            "Minimum Number of Entries" => {
                self.min_entries = value.parse().map_err(|_| invalid())?
            }
            "Maximum Number of Entries" => {
                self.max_entries = Some(value.parse().map_err(|_| invalid())?)
            }
            "Max Bin Age" => {
                parse_duration(value)?;
                self.max_bin_age = Some(value.to_string());
            }
            "Maximum number of Bins" => {
                self.max_bin_count = value.parse().map_err(|_| invalid())?
            }
            other => return Err(ConfigError::UnknownProperty(other.to_string())),
        }
        Ok(())
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => Some(true),
        "false" | "no" | "0" => Some(false),
        _ => None,
    }
}

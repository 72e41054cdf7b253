//! Activation-time configuration snapshot

use crate::config::{parse_duration, MergeSettings};
use crate::error::ConfigError;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

/// How units are grouped into bins
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeStrategy {
    /// Reassemble fragments by fragment identifier, index and count
    Defragment,
    /// Group by correlation attribute, in arrival order
    BinPacking,
}

/// How a bin's content is packaged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeFormat {
    Concatenation,
    Tar,
    Zip,
}

/// Whether header/footer/demarcator values are file paths or literal text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelimiterStrategy {
    Filename,
    Text,
}

/// Attribute algebra applied across a bin's members
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeStrategy {
    KeepCommon,
    KeepAllUnique,
}

impl MergeStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            MergeStrategy::Defragment => "Defragment",
            MergeStrategy::BinPacking => "Bin-Packing Algorithm",
        }
    }
}

impl MergeFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            MergeFormat::Concatenation => "Binary Concatenation",
            MergeFormat::Tar => "TAR",
            MergeFormat::Zip => "ZIP",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            MergeFormat::Concatenation => "application/octet-stream",
            MergeFormat::Tar => "application/tar",
            MergeFormat::Zip => "application/zip",
        }
    }

    /// Suffix appended to the derived result filename
    pub fn filename_suffix(&self) -> Option<&'static str> {
        match self {
            MergeFormat::Concatenation => None,
            MergeFormat::Tar => Some(".tar"),
            MergeFormat::Zip => Some(".zip"),
        }
    }
}

impl DelimiterStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            DelimiterStrategy::Filename => "Filename",
            DelimiterStrategy::Text => "Text",
        }
    }
}

impl AttributeStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttributeStrategy::KeepCommon => "Keep Only Common Attributes",
            AttributeStrategy::KeepAllUnique => "Keep All Unique Attributes",
        }
    }
}

fn normalized(value: &str) -> String {
    value.trim().to_ascii_lowercase()
}

impl FromStr for MergeStrategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalized(s).as_str() {
            "defragment" => Ok(MergeStrategy::Defragment),
            "bin-packing algorithm" | "bin-packing" | "bin packing" => Ok(MergeStrategy::BinPacking),
            _ => Err(ConfigError::InvalidMergeStrategy(s.to_string())),
        }
    }
}

impl FromStr for MergeFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalized(s).as_str() {
            "binary concatenation" | "concatenation" => Ok(MergeFormat::Concatenation),
            "tar" => Ok(MergeFormat::Tar),
            "zip" => Ok(MergeFormat::Zip),
            _ => Err(ConfigError::InvalidMergeFormat(s.to_string())),
        }
    }
}

impl FromStr for DelimiterStrategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalized(s).as_str() {
            "filename" => Ok(DelimiterStrategy::Filename),
            "text" => Ok(DelimiterStrategy::Text),
            _ => Err(ConfigError::InvalidDelimiterStrategy(s.to_string())),
        }
    }
}

impl FromStr for AttributeStrategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalized(s).as_str() {
            "keep only common attributes" | "keep-common" | "keep common" => {
                Ok(AttributeStrategy::KeepCommon)
            }
            "keep all unique attributes" | "keep-all-unique" | "keep all unique" => {
                Ok(AttributeStrategy::KeepAllUnique)
            }
            _ => Err(ConfigError::InvalidAttributeStrategy(s.to_string())),
        }
    }
}

macro_rules! impl_display_as_str {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        })*
    };
}

impl_display_as_str!(MergeStrategy, MergeFormat, DelimiterStrategy, AttributeStrategy);

/// Size, count and age limits applied by the bin manager
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BinThresholds {
    pub min_size: u64,
    pub max_size: u64,
    pub min_entries: usize,
    pub max_entries: usize,
    /// `None` disables age-based eviction
    pub max_bin_age: Option<Duration>,
    pub max_bin_count: usize,
}

impl Default for BinThresholds {
    fn default() -> Self {
        Self {
            min_size: 0,
            max_size: u64::MAX,
            min_entries: 1,
            max_entries: usize::MAX,
            max_bin_age: None,
            max_bin_count: 100,
        }
    }
}

impl BinThresholds {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_size > self.max_size {
            return Err(ConfigError::InvalidThreshold(format!(
                "minimum group size {} exceeds maximum group size {}",
                self.min_size, self.max_size
            )));
        }
        if self.max_entries == 0 {
            return Err(ConfigError::InvalidThreshold(
                "maximum number of entries must be at least 1".to_string(),
            ));
        }
        if self.min_entries > self.max_entries {
            return Err(ConfigError::InvalidThreshold(format!(
                "minimum number of entries {} exceeds maximum number of entries {}",
                self.min_entries, self.max_entries
            )));
        }
        if self.max_bin_count == 0 {
            return Err(ConfigError::InvalidThreshold(
                "maximum number of bins must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Resolved header, footer and demarcator bytes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Delimiters {
    pub header: Option<Vec<u8>>,
    pub footer: Option<Vec<u8>>,
    pub demarcator: Option<Vec<u8>>,
}

impl Delimiters {
    /// Literal delimiters
    pub fn text(header: &str, footer: &str, demarcator: &str) -> Self {
        let bytes = |s: &str| (!s.is_empty()).then(|| s.as_bytes().to_vec());
        Self {
            header: bytes(header),
            footer: bytes(footer),
            demarcator: bytes(demarcator),
        }
    }

    fn resolve(strategy: DelimiterStrategy, settings: &MergeSettings) -> Result<Self, ConfigError> {
        let resolve_one = |value: &Option<String>| -> Result<Option<Vec<u8>>, ConfigError> {
            let Some(value) = value.as_deref().filter(|v| !v.is_empty()) else {
                return Ok(None);
            };
            match strategy {
                DelimiterStrategy::Text => Ok(Some(value.as_bytes().to_vec())),
                DelimiterStrategy::Filename => {
                    let path = PathBuf::from(value);
                    std::fs::read(&path)
                        .map(Some)
                        .map_err(|source| ConfigError::DelimiterFile { path, source })
                }
            }
        };

        Ok(Self {
            header: resolve_one(&settings.header)?,
            footer: resolve_one(&settings.footer)?,
            demarcator: resolve_one(&settings.demarcator)?,
        })
    }
}

/// Immutable configuration for one scheduling activation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeConfig {
    pub merge_strategy: MergeStrategy,
    pub merge_format: MergeFormat,
    pub delimiter_strategy: DelimiterStrategy,
    pub attribute_strategy: AttributeStrategy,
    pub thresholds: BinThresholds,
    /// Correlation attribute; `None` when unset or empty
    pub correlation_attribute: Option<String>,
    pub delimiters: Delimiters,
    pub keep_path: bool,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            merge_strategy: MergeStrategy::Defragment,
            merge_format: MergeFormat::Concatenation,
            delimiter_strategy: DelimiterStrategy::Filename,
            attribute_strategy: AttributeStrategy::KeepCommon,
            thresholds: BinThresholds::default(),
            correlation_attribute: None,
            delimiters: Delimiters::default(),
            keep_path: false,
        }
    }
}

impl MergeConfig {
    /// Take the activation snapshot.
    ///
    /// Fails on any unrecognized strategy value, unparsable age, inconsistent threshold, or
    /// unreadable delimiter file.
    pub fn from_settings(settings: &MergeSettings) -> Result<Self, ConfigError> {
        let merge_strategy: MergeStrategy = settings.merge_strategy.parse()?;
        let merge_format: MergeFormat = settings.merge_format.parse()?;
        let delimiter_strategy: DelimiterStrategy = settings.delimiter_strategy.parse()?;
        let attribute_strategy: AttributeStrategy = settings.attribute_strategy.parse()?;

        let max_bin_age = settings
            .max_bin_age
            .as_deref()
            .filter(|v| !v.trim().is_empty())
            .map(parse_duration)
            .transpose()?;

        let thresholds = BinThresholds {
            min_size: settings.min_size,
            max_size: settings.max_size.unwrap_or(u64::MAX),
            min_entries: settings.min_entries,
            max_entries: settings.max_entries.unwrap_or(usize::MAX),
            max_bin_age,
            max_bin_count: settings.max_bin_count,
        };
        thresholds.validate()?;

        let delimiters = Delimiters::resolve(delimiter_strategy, settings)?;
        let correlation_attribute = Some(settings.correlation_attribute_name.trim())
            .filter(|name| !name.is_empty())
            .map(str::to_string);

        debug!(
            strategy = %merge_strategy,
            format = %merge_format,
            delimiter = %delimiter_strategy,
            attributes = %attribute_strategy,
            correlation = ?correlation_attribute,
            keep_path = settings.keep_path,
            "Merge configuration resolved"
        );

        Ok(Self {
            merge_strategy,
            merge_format,
            delimiter_strategy,
            attribute_strategy,
            thresholds,
            correlation_attribute,
            delimiters,
            keep_path: settings.keep_path,
        })
    }
}

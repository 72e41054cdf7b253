//! Error types for the flowmerge engine.

use crate::content::ContentClaim;
use std::path::PathBuf;
use thiserror::Error;
use uuid::Uuid;

/// Activation-time configuration errors. Any of these refuses to start the stage.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid merge strategy: {0}")]
    InvalidMergeStrategy(String),

    #[error("Invalid merge format: {0}")]
    InvalidMergeFormat(String),

    #[error("Invalid delimiter strategy: {0}")]
    InvalidDelimiterStrategy(String),

    #[error("Invalid attribute strategy: {0}")]
    InvalidAttributeStrategy(String),

    #[error("Invalid duration '{value}': {reason}")]
    InvalidDuration { value: String, reason: String },

    #[error("Invalid threshold: {0}")]
    InvalidThreshold(String),

    #[error("Unknown property: {0}")]
    UnknownProperty(String),

    #[error("Invalid value '{value}' for property '{property}'")]
    InvalidPropertyValue { property: String, value: String },

    #[error("Failed to read delimiter file {path:?}: {source}")]
    DelimiterFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Logging configuration error: {0}")]
    Logging(String),

    #[error("Failed to load configuration: {0}")]
    Load(String),
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::Load(err.to_string())
    }
}

/// Content store errors
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("Content claim not found: {0}")]
    ClaimNotFound(ContentClaim),

    #[error("Content store I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Reasons a flow unit cannot be placed into any bin
#[derive(Debug, Error)]
pub enum GroupingError {
    #[error("Missing required attribute '{0}'")]
    MissingAttribute(&'static str),

    #[error("Flow unit of {size} bytes cannot be admitted to an empty bin (max size {max_size}, max entries {max_entries})")]
    Unadmittable {
        size: u64,
        max_size: u64,
        max_entries: usize,
    },
}

/// Fragment metadata inconsistencies found in a completed bin
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Bin contains no flow units")]
    EmptyBin,

    #[error("Flow unit {unit} is missing attribute '{attribute}'")]
    MissingAttribute { unit: Uuid, attribute: &'static str },

    #[error("Flow unit {unit} has {attribute}='{actual}', expected '{expected}'")]
    Mismatch {
        unit: Uuid,
        attribute: &'static str,
        expected: String,
        actual: String,
    },

    #[error("Flow unit {unit} has non-numeric {attribute}='{value}'")]
    NotANumber {
        unit: Uuid,
        attribute: &'static str,
        value: String,
    },

    #[error("Flow unit {unit} has fragment index {index} outside fragment count {count}")]
    IndexOutOfRange { unit: Uuid, index: u64, count: u64 },
}

/// Failure merging one bin. The bin's members are routed to failure.
#[derive(Debug, Error)]
pub enum MergeError {
    #[error("Fragment validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Content error: {0}")]
    Content(#[from] ContentError),

    #[error("Archive write failed: {0}")]
    Archive(String),

    #[error("Merge I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<zip::result::ZipError> for MergeError {
    fn from(err: zip::result::ZipError) -> Self {
        match err {
            zip::result::ZipError::Io(io) => MergeError::Io(io),
            other => MergeError::Archive(other.to_string()),
        }
    }
}

/// Top-level error surfaced by the command-line front end
#[derive(Debug, Error)]
pub enum FlowmergeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Content error: {0}")]
    Content(#[from] ContentError),

    #[error("Merge error: {0}")]
    Merge(#[from] MergeError),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::{ConfigError, FlowmergeError};

/// Map domain errors to a string for CLI output.
pub fn map_error(e: &FlowmergeError) -> String {
    match e {
        FlowmergeError::Config(ConfigError::DelimiterFile { path, .. }) => format!(
            "Configuration error: delimiter file {} could not be read",
            path.display()
        ),
        FlowmergeError::Config(_) => format!(
            "{}\nRun 'flowmerge check-config' to inspect the resolved settings.",
            e
        ),
        other => other.to_string(),
    }
}

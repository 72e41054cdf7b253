//! CLI presentation: text tables and JSON for command results.

use crate::config::MergeConfig;
use crate::merge::TriggerStats;
use comfy_table::presets::UTF8_BORDERS_ONLY;
use comfy_table::Table;
use serde::Serialize;
use serde_json::json;
use std::path::PathBuf;

/// One merged result written to disk
#[derive(Debug, Clone, Serialize)]
pub struct MergedOutput {
    pub path: PathBuf,
    pub bytes: u64,
    pub members: usize,
}

/// Outcome of `flowmerge merge`
#[derive(Debug, Clone, Default)]
pub struct MergeReport {
    pub stats: TriggerStats,
    pub merged: Vec<MergedOutput>,
    pub original: usize,
    /// Filenames (or ids) of units routed to failure
    pub failed: Vec<String>,
}

pub fn format_merge_text(report: &MergeReport) -> String {
    let mut out = String::new();
    if report.merged.is_empty() {
        out.push_str("No merged output.\n");
    } else {
        let mut table = Table::new();
        table.load_preset(UTF8_BORDERS_ONLY);
        table.set_header(vec!["Output", "Bytes", "Members"]);
        for row in &report.merged {
            table.add_row(vec![
                row.path.display().to_string(),
                row.bytes.to_string(),
                row.members.to_string(),
            ]);
        }
        out.push_str(&format!("{}\n", table));
    }
    out.push_str(&format!(
        "\nmerged: {}  original: {}  failure: {}\n",
        report.merged.len(),
        report.original,
        report.failed.len()
    ));
    for name in &report.failed {
        out.push_str(&format!("  failed: {}\n", name));
    }
    out
}

pub fn format_merge_json(report: &MergeReport) -> String {
    let value = json!({
        "merged": report.merged,
        "original": report.original,
        "failure": report.failed,
        "bins": {
            "merged": report.stats.merged_bins,
            "failed": report.stats.failed_bins,
        },
    });
    serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string())
}

fn limit<T: PartialEq + ToString>(value: T, unbounded: T) -> String {
    if value == unbounded {
        "unbounded".to_string()
    } else {
        value.to_string()
    }
}

fn delimiter(bytes: &Option<Vec<u8>>) -> String {
    bytes
        .as_ref()
        .map(|b| format!("{} bytes", b.len()))
        .unwrap_or_else(|| "-".to_string())
}

fn config_rows(config: &MergeConfig) -> Vec<(&'static str, String)> {
    let t = &config.thresholds;
    vec![
        ("Merge Strategy", config.merge_strategy.to_string()),
        ("Merge Format", config.merge_format.to_string()),
        ("Attribute Strategy", config.attribute_strategy.to_string()),
        ("Delimiter Strategy", config.delimiter_strategy.to_string()),
        (
            "Correlation Attribute Name",
            config.correlation_attribute.clone().unwrap_or_else(|| "-".to_string()),
        ),
        ("Minimum Group Size", t.min_size.to_string()),
        ("Maximum Group Size", limit(t.max_size, u64::MAX)),
        ("Minimum Number of Entries", t.min_entries.to_string()),
        ("Maximum Number of Entries", limit(t.max_entries, usize::MAX)),
        (
            "Max Bin Age",
            t.max_bin_age
                .map(|age| format!("{:?}", age))
                .unwrap_or_else(|| "unbounded".to_string()),
        ),
        ("Maximum number of Bins", t.max_bin_count.to_string()),
        ("Header", delimiter(&config.delimiters.header)),
        ("Footer", delimiter(&config.delimiters.footer)),
        ("Demarcator", delimiter(&config.delimiters.demarcator)),
        ("Keep Path", config.keep_path.to_string()),
    ]
}

pub fn format_config_text(config: &MergeConfig) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(vec!["Property", "Value"]);
    for (name, value) in config_rows(config) {
        table.add_row(vec![name.to_string(), value]);
    }
    format!("Configuration is valid.\n\n{}\n", table)
}

pub fn format_config_json(config: &MergeConfig) -> String {
    let map: serde_json::Map<String, serde_json::Value> = config_rows(config)
        .into_iter()
        .map(|(name, value)| (name.to_string(), serde_json::Value::String(value)))
        .collect();
    let value = json!({ "valid": true, "settings": map });
    serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string())
}

//! CLI route: single route table and run context.

use crate::cli::parse::Commands;
use crate::cli::presentation::{
    format_config_json, format_config_text, format_merge_json, format_merge_text, MergeReport,
    MergedOutput,
};
use crate::config::{ConfigLoader, FlowmergeConfig, MergeConfig, MergeSettings};
use crate::content::memory::MemoryContentStore;
use crate::error::FlowmergeError;
use crate::flow::attributes;
use crate::flow::{FlowUnit, ProcessSession, Relationship};
use crate::merge::MergeProcessor;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

/// Runtime context for CLI execution: workspace and loaded configuration.
pub struct RunContext {
    workspace_root: PathBuf,
    config: FlowmergeConfig,
}

impl RunContext {
    /// Create run context from workspace root and optional config path. Uses ConfigLoader only.
    pub fn new(workspace_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, FlowmergeError> {
        let config = match config_path {
            Some(ref path) => ConfigLoader::load_from_file(path)?,
            None => ConfigLoader::load(&workspace_root)?,
        };
        Ok(Self {
            workspace_root,
            config,
        })
    }

    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }

    pub fn config(&self) -> &FlowmergeConfig {
        &self.config
    }

    /// Execute a command and return its formatted output.
    pub fn execute(&self, command: &Commands) -> Result<String, FlowmergeError> {
        match command {
            Commands::Merge {
                out,
                attrs,
                properties,
                format,
                inputs,
            } => {
                let settings = self.settings_with(properties)?;
                let attrs = attrs
                    .iter()
                    .map(|pair| parse_pair(pair, "--attr"))
                    .collect::<Result<Vec<_>, _>>()?;
                let report = run_merge(&settings, &attrs, inputs, out)?;
                render(format, || format_merge_text(&report), || format_merge_json(&report))
            }
            Commands::CheckConfig { properties, format } => {
                let settings = self.settings_with(properties)?;
                let snapshot = MergeConfig::from_settings(&settings)?;
                render(
                    format,
                    || format_config_text(&snapshot),
                    || format_config_json(&snapshot),
                )
            }
        }
    }

    /// Loaded merge settings with `--set PROPERTY=VALUE` overrides applied.
    fn settings_with(&self, properties: &[String]) -> Result<MergeSettings, FlowmergeError> {
        let mut settings = self.config.merge.clone();
        for property in properties {
            let (name, value) = parse_pair(property, "--set")?;
            settings.set_property(&name, &value)?;
        }
        Ok(settings)
    }
}

fn render(
    format: &str,
    text: impl FnOnce() -> String,
    json: impl FnOnce() -> String,
) -> Result<String, FlowmergeError> {
    match format {
        "text" => Ok(text()),
        "json" => Ok(json()),
        other => Err(FlowmergeError::InvalidArgument(format!(
            "Invalid output format: {} (must be 'text' or 'json')",
            other
        ))),
    }
}

/// Split `KEY=VALUE` at the first `=`.
fn parse_pair(pair: &str, flag: &str) -> Result<(String, String), FlowmergeError> {
    match pair.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(FlowmergeError::InvalidArgument(format!(
            "{} expects KEY=VALUE, got '{}'",
            flag, pair
        ))),
    }
}

/// Input files with the `path` attribute each should carry, in a stable order.
fn collect_inputs(inputs: &[PathBuf]) -> Result<Vec<(PathBuf, String)>, FlowmergeError> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            for entry in WalkDir::new(input).sort_by_file_name() {
                let entry = entry.map_err(|e| FlowmergeError::Io(e.into()))?;
                if !entry.file_type().is_file() {
                    continue;
                }
                let relative = entry
                    .path()
                    .parent()
                    .and_then(|parent| parent.strip_prefix(input).ok())
                    .map(|p| p.to_string_lossy().to_string())
                    .unwrap_or_default();
                files.push((entry.path().to_path_buf(), format!("./{}", relative)));
            }
        } else if input.is_file() {
            files.push((input.clone(), "./".to_string()));
        } else {
            return Err(FlowmergeError::InvalidArgument(format!(
                "Input not found: {}",
                input.display()
            )));
        }
    }
    Ok(files)
}

fn import_file(
    store: &MemoryContentStore,
    file: &Path,
    path_attr: &str,
    attrs: &[(String, String)],
) -> Result<FlowUnit, FlowmergeError> {
    let content = std::fs::read(file)?;
    let mut unit = store.import(content)?;
    if let Some(name) = file.file_name() {
        unit.set_attribute(attributes::FILENAME, name.to_string_lossy());
    }
    unit.set_attribute(attributes::PATH, path_attr);
    for (key, value) in attrs {
        unit.set_attribute(key.as_str(), value.as_str());
    }
    Ok(unit)
}

fn unit_label(unit: &FlowUnit) -> String {
    unit.filename()
        .map(str::to_string)
        .unwrap_or_else(|| unit.id().to_string())
}

/// File name for a merged result inside the output directory. Directory parts of the label
/// are dropped so the result cannot land outside it.
fn output_name(unit: &FlowUnit) -> String {
    let label = unit_label(unit);
    Path::new(&label)
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| unit.id().to_string())
}

/// Import, run one trigger and a flush, then write every merged result into `out`.
fn run_merge(
    settings: &MergeSettings,
    attrs: &[(String, String)],
    inputs: &[PathBuf],
    out: &Path,
) -> Result<MergeReport, FlowmergeError> {
    let store = MemoryContentStore::shared();
    let processor = MergeProcessor::schedule(settings, store.clone())?;

    let files = collect_inputs(inputs)?;
    let units = files
        .iter()
        .map(|(file, path_attr)| import_file(&store, file, path_attr, attrs))
        .collect::<Result<Vec<_>, _>>()?;
    info!(units = units.len(), "Imported input files");

    let mut session = ProcessSession::new();
    let mut stats = processor.on_trigger(&mut session, units);
    let flushed = processor.flush(&mut session);
    stats.merged_bins += flushed.merged_bins;
    stats.failed_bins += flushed.failed_bins;

    std::fs::create_dir_all(out)?;
    let mut used = HashSet::new();
    let mut merged = Vec::new();
    for unit in session.take(Relationship::Merged) {
        let mut name = output_name(&unit);
        if !used.insert(name.clone()) {
            name = format!("{}.{}", name, unit.id());
            used.insert(name.clone());
        }
        let path = out.join(&name);
        std::fs::write(&path, store.content_of(&unit)?)?;
        debug!(path = %path.display(), bytes = unit.size(), "Wrote merged output");
        merged.push(MergedOutput {
            path,
            bytes: unit.size(),
            members: unit
                .attribute(attributes::FRAGMENT_COUNT)
                .and_then(|count| count.parse().ok())
                .unwrap_or_default(),
        });
    }

    Ok(MergeReport {
        stats,
        merged,
        original: session.count(Relationship::Original),
        failed: session
            .transferred(Relationship::Failure)
            .map(unit_label)
            .collect(),
    })
}

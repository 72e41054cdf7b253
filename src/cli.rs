//! CLI domain: parse, route, output, and presentation only.
//! No engine logic; the route table drives the merge stage and formats its outcome.

mod output;
mod parse;
mod presentation;
mod route;

pub use output::map_error;
pub use parse::{Cli, Commands};
pub use presentation::{
    format_config_json, format_config_text, format_merge_json, format_merge_text, MergeReport,
    MergedOutput,
};
pub use route::RunContext;

//! Application layer: use cases that orchestrate settings, inventory, and domain.
//!
//! This crate contains the "glue" logic that the CLI delegates to. Each use case is a
//! function that takes structured input and returns structured output, keeping the CLI
//! thin and focused on argument parsing and I/O.

#![forbid(unsafe_code)]

mod check;
mod explain;
mod report;
mod rulesets;

pub use check::{CheckInput, CheckOutput, load_config, run_check, verdict_exit_code};
pub use explain::{ExplainOutput, format_explanation, format_not_found, run_explain};
pub use report::{parse_report_json, runtime_error_report, serialize_report, write_report};
pub use rulesets::{RulesetsOutput, format_rulesets, run_rulesets};

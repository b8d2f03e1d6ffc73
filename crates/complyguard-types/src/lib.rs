//! Stable DTOs and IDs used across the complyguard workspace.
//!
//! This crate is intentionally boring:
//! - the unified severity scale and its legacy rule vocabulary
//! - data types for the emitted report
//! - stable string IDs for rulesets and rules
//! - explain registry for remediation guidance

#![forbid(unsafe_code)]

pub mod explain;
pub mod ids;
pub mod receipt;
pub mod severity;

pub use explain::{lookup_explanation, ExamplePair, Explanation};
pub use receipt::{
    ComplyguardData, ComplyguardReport, Finding, MessageType, ReportEnvelope, ReportMessage,
    RulesetMeta, RunMeta, ToolMeta, Verdict, VerdictCounts, VerdictStatus, SCHEMA_REPORT_V1,
};
pub use severity::{ParseSeverityError, RuleSeverity, Severity};

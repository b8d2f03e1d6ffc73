use crate::Severity;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Stable schema identifier for complyguard reports.
pub const SCHEMA_REPORT_V1: &str = "complyguard.report.v1";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ToolMeta {
    pub name: String,
    pub version: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RunMeta {
    #[schemars(with = "String")]
    #[serde(with = "time::serde::rfc3339")]
    pub started_at: OffsetDateTime,
    #[schemars(with = "Option<String>")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[serde(with = "time::serde::rfc3339::option")]
    pub ended_at: Option<OffsetDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum VerdictStatus {
    Pass,
    Warn,
    Fail,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct VerdictCounts {
    pub info: u32,
    pub warn: u32,
    pub fail: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Verdict {
    pub status: VerdictStatus,
    pub counts: VerdictCounts,
    /// Fail-causing rule ids (empty unless `status == fail`).
    #[serde(default)]
    pub reasons: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Finding {
    pub severity: Severity,
    pub rule_id: String,
    /// Ruleset (or validator) that produced the finding.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ruleset: Option<String>,
    pub message: String,
    /// Display labels of the failing artifacts.
    #[serde(default)]
    pub artifacts: Vec<String>,
    /// Whether this finding crossed the `fail_on` threshold.
    #[serde(default)]
    pub fail_causing: bool,

    /// Stable identifier intended for dedup and trending: a hash of
    /// `rule_id + sorted canonical coordinates of the failing artifacts`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,
}

/// Kind of a processing message collected during a run.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    RuleEngine,
    ProcessingFailure,
    UnnecessaryConfig,
    OverrideArtifactValues,
    ConfigurationError,
    MissingLicenseInformation,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ReportMessage {
    pub kind: MessageType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    pub message: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RulesetMeta {
    pub name: String,
    pub version: String,
}

/// Complyguard-specific summary payload for the report.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ComplyguardData {
    pub profile: String,
    pub fail_on: Severity,

    pub artifacts_evaluated: u32,
    #[serde(default)]
    pub rulesets: Vec<RulesetMeta>,

    pub findings_total: u32,
    pub findings_emitted: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub truncated_reason: Option<String>,

    /// Free-form comments contributed by pipeline stages.
    #[serde(default)]
    pub comments: Vec<String>,

    /// Processing messages (unnecessary configuration, overrides, failures).
    #[serde(default)]
    pub messages: Vec<ReportMessage>,
}

impl Default for ComplyguardData {
    fn default() -> Self {
        Self {
            profile: String::new(),
            fail_on: Severity::Fail,
            artifacts_evaluated: 0,
            rulesets: Vec::new(),
            findings_total: 0,
            findings_emitted: 0,
            truncated_reason: None,
            comments: Vec::new(),
            messages: Vec::new(),
        }
    }
}

/// A generic report envelope.
///
/// The outer shape is stable; tool-specific data lives in `data`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ReportEnvelope<TData = ComplyguardData> {
    /// Versioned schema identifier for the envelope shape.
    pub schema: String,
    pub tool: ToolMeta,
    pub run: RunMeta,
    pub verdict: Verdict,
    pub findings: Vec<Finding>,
    pub data: TData,
}

pub type ComplyguardReport = ReportEnvelope<ComplyguardData>;

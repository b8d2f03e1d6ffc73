use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Schema identifier accepted in the `schema` key.
pub const SCHEMA_CONFIG_V1: &str = "complyguard.config.v1";

/// `complyguard.toml` schema v1.
///
/// This is a *user-facing* config model: it is intentionally permissive so forward-compat is easy.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ComplyguardConfigV1 {
    /// Optional schema string for tooling (`complyguard.config.v1`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// `strict`, `standard` (default) or `lenient`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,

    /// Lowest severity that fails the run: `info`, `warn` or `fail`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fail_on: Option<String>,

    /// How many findings to emit before truncating the list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_findings: Option<u32>,

    #[serde(default)]
    pub policy: PolicyConfig,

    /// Map of rule_id -> override.
    #[serde(default)]
    pub rules: BTreeMap<String, RuleConfig>,

    #[serde(default)]
    pub validators: ValidatorsConfig,

    #[serde(default)]
    pub overrides: Vec<OverrideConfig>,

    #[serde(default)]
    pub additions: Vec<ArtifactConfig>,

    #[serde(default)]
    pub removals: Vec<RemovalConfig>,

    /// Map of license id -> knowledge base entry.
    #[serde(default)]
    pub licenses: BTreeMap<String, LicenseConfig>,
}

/// A selector string, or an array of selector strings that must all match.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum SelectorSpec {
    One(String),
    All(Vec<String>),
}

impl SelectorSpec {
    pub fn parts(&self) -> Vec<&str> {
        match self {
            SelectorSpec::One(s) => vec![s.as_str()],
            SelectorSpec::All(parts) => parts.iter().map(String::as_str).collect(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PolicyConfig {
    /// Ruleset ids evaluated by the rule engine; replaces the preset list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rulesets: Option<Vec<String>>,

    #[serde(default)]
    pub custom_rulesets: Vec<CustomRulesetConfig>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RuleConfig {
    /// Override preset enable/disable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    /// `info|warn|fail`, or the legacy `warn|severe|critical`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CustomRulesetConfig {
    pub name: String,
    #[serde(default = "default_version")]
    pub version: String,
    #[serde(default)]
    pub rules: Vec<CustomRuleConfig>,
}

fn default_version() -> String {
    "1.0.0".to_string()
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CustomRuleConfig {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
    /// Legacy spelling of `severity`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rule_severity: Option<String>,
    /// Single-artifact rule: violate when any selector matches.
    #[serde(default)]
    pub deny: Vec<SelectorSpec>,
    /// Pairwise rule: `potential-duplicate` or `license-mismatch`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compare: Option<String>,
    /// Artifacts a pairwise rule applies to; empty means all.
    #[serde(default)]
    pub scope: Vec<SelectorSpec>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ValidatorsConfig {
    #[serde(default)]
    pub license: LicenseValidatorToml,
    #[serde(default)]
    pub security: SecurityValidatorToml,
    #[serde(default)]
    pub source: SourceValidatorToml,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct LicenseValidatorToml {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub forbidden: Vec<String>,
    #[serde(default)]
    pub ignored: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forbidden_severity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub missing_info_severity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub missing_text_severity: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SecurityValidatorToml {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    /// Issue statuses that always violate (`open`, `confirmed`, ...).
    #[serde(default)]
    pub forbidden_statuses: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_severity: Option<String>,
    /// Score at or above which an issue violates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity_limit: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit_severity: Option<String>,
    #[serde(default)]
    pub ignore_references: Vec<String>,
    #[serde(default)]
    pub issues: Vec<IssuesConfig>,
    #[serde(default)]
    pub suppress: Vec<SuppressConfig>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct IssuesConfig {
    pub selector: SelectorSpec,
    #[serde(default)]
    pub issues: Vec<IssueConfig>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct IssueConfig {
    pub reference: String,
    pub severity: f64,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

fn default_status() -> String {
    "open".to_string()
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SuppressConfig {
    pub reference: String,
    pub selector: SelectorSpec,
    /// RFC 3339 timestamp or `YYYY-MM-DD` (midnight UTC).
    pub until: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SourceValidatorToml {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub missing_severity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub incomplete_severity: Option<String>,
    #[serde(default)]
    pub allow_missing: Vec<SelectorSpec>,
    #[serde(default)]
    pub allow_incomplete: Vec<SelectorSpec>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct OverrideConfig {
    pub selector: SelectorSpec,
    #[serde(flatten)]
    pub artifact: ArtifactConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RemovalConfig {
    pub selector: SelectorSpec,
}

/// Facts and flags of an artifact written in configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ArtifactConfig {
    /// Identity strings in selector syntax (`pkg:..`, `maven:g:a:v`, ...).
    #[serde(default)]
    pub coordinates: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub declared_license: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub configured_license: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub copyright: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub homepage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proprietary: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignore_for_download: Option<bool>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct LicenseConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default)]
    pub aliases: Vec<String>,
    /// `permissive`, `weak-copyleft`, `strong-copyleft` or a custom group.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threat_group: Option<String>,
}

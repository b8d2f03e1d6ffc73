//! Config parsing and profile/preset resolution.
//!
//! This crate is intentionally IO-free: it parses and resolves configuration provided as strings.

#![forbid(unsafe_code)]

mod model;
mod presets;
mod resolve;
mod selector;

pub use model::{
    ArtifactConfig, ComplyguardConfigV1, CustomRuleConfig, CustomRulesetConfig, IssueConfig,
    IssuesConfig, LicenseConfig, LicenseValidatorToml, OverrideConfig, PolicyConfig, RemovalConfig,
    RuleConfig, SecurityValidatorToml, SelectorSpec, SourceValidatorToml, SuppressConfig,
    ValidatorsConfig, SCHEMA_CONFIG_V1,
};
pub use presets::PROFILES;
pub use resolve::{Overrides, ResolvedConfig};
pub use selector::parse_selector;

/// Parse `complyguard.toml` (or equivalent) into a typed model.
pub fn parse_config_toml(input: &str) -> anyhow::Result<ComplyguardConfigV1> {
    let cfg: ComplyguardConfigV1 = toml::from_str(input)?;
    Ok(cfg)
}

/// Resolve the effective config used by the pipeline (preset + file + overrides).
pub fn resolve_config(
    cfg: ComplyguardConfigV1,
    overrides: Overrides,
) -> anyhow::Result<ResolvedConfig> {
    resolve::resolve_config(cfg, overrides)
}

/// JSON schema of the configuration file.
pub fn config_schema() -> schemars::Schema {
    schemars::schema_for!(ComplyguardConfigV1)
}

use complyguard_domain::policy::{EffectiveConfig, RulePolicy};
use complyguard_types::{Severity, ids};

/// Profile names accepted by [`preset`].
pub const PROFILES: [&str; 3] = ["strict", "standard", "lenient"];

/// Preset profiles are opinionated defaults.
///
/// Keep these small and readable. Anything complex should go into repo config.
pub fn preset(profile: &str) -> anyhow::Result<EffectiveConfig> {
    match profile {
        "strict" => Ok(strict_profile()),
        "standard" => Ok(EffectiveConfig::default()),
        "lenient" => Ok(lenient_profile()),
        other => anyhow::bail!("unknown profile: {other} (expected strict|standard|lenient)"),
    }
}

fn strict_profile() -> EffectiveConfig {
    let mut cfg = EffectiveConfig {
        profile: "strict".to_string(),
        fail_on: Severity::Warn,
        ..EffectiveConfig::default()
    };
    cfg.source.enabled = true;
    cfg
}

fn lenient_profile() -> EffectiveConfig {
    let mut cfg = EffectiveConfig {
        profile: "lenient".to_string(),
        ..EffectiveConfig::default()
    };
    cfg.license.missing_info_severity = Severity::Info;
    cfg.license.missing_text_severity = Severity::Info;
    cfg.rules.insert(
        ids::RULE_BASIC_UNKNOWN_MATCH_STATE.to_string(),
        RulePolicy::disabled(),
    );
    cfg.rules.insert(
        ids::RULE_LICENSING_UNKNOWN_LICENSE.to_string(),
        RulePolicy::enabled(Severity::Info),
    );
    cfg
}

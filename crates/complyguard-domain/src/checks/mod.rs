use crate::policy::EffectiveConfig;
use crate::rule::RuleMeta;
use crate::ruleset::{Ruleset, StaticRulesets};
use complyguard_types::Severity;

mod basic;
mod custom;
mod licensing;


/// Every ruleset the configuration can name: `basic`, `licensing`, and the
/// configured custom rulesets.
pub fn builtin_rulesets(cfg: &EffectiveConfig) -> StaticRulesets {
    let mut rulesets = StaticRulesets::new();
    rulesets.insert(basic::ruleset(cfg));
    rulesets.insert(licensing::ruleset(cfg));
    for custom in &cfg.custom_rulesets {
        rulesets.insert(custom::ruleset(custom));
    }
    rulesets
}

/// Summary of one rule for listings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuleInfo {
    pub id: String,
    pub kind: &'static str,
    pub severity: Severity,
    pub description: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RulesetInfo {
    pub name: String,
    pub version: String,
    pub rules: Vec<RuleInfo>,
}

impl From<&Ruleset> for RulesetInfo {
    fn from(ruleset: &Ruleset) -> Self {
        Self {
            name: ruleset.name().to_string(),
            version: ruleset.version().to_string(),
            rules: ruleset
                .rules()
                .iter()
                .map(|rule| RuleInfo {
                    id: rule.id().to_string(),
                    kind: rule.kind_name(),
                    severity: rule.meta().severity,
                    description: rule.meta().description.clone(),
                })
                .collect(),
        }
    }
}

/// Rulesets as configured by `cfg`, for listings.
pub fn catalog(cfg: &EffectiveConfig) -> Vec<RulesetInfo> {
    builtin_rulesets(cfg)
        .iter()
        .map(|ruleset| RulesetInfo::from(ruleset.as_ref()))
        .collect()
}

/// Metadata for an enabled rule, or `None` when configuration disables it.
fn enabled(
    cfg: &EffectiveConfig,
    id: &str,
    name: &str,
    description: &str,
    default: impl Into<Severity>,
) -> Option<RuleMeta> {
    cfg.rule_severity(id, default)
        .map(|severity| RuleMeta::new(id, name, description, severity))
}

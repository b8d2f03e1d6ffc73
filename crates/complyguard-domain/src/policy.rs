use complyguard_domain_core::facts::{IssueStatus, SecurityIssue};
use complyguard_domain_core::{Artifact, ArtifactSelector, LicenseKnowledgeBase};
use complyguard_types::{RuleSeverity, Severity, ids};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use time::OffsetDateTime;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RulePolicy {
    pub enabled: bool,
    /// `None` keeps the rule's built-in severity.
    pub severity: Option<Severity>,
}

impl RulePolicy {
    pub fn enabled(severity: Severity) -> Self {
        Self {
            enabled: true,
            severity: Some(severity),
        }
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            severity: None,
        }
    }
}

/// Pairwise predicates available to data-driven rules.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ComparePredicate {
    PotentialDuplicate,
    /// Final licenses differ.
    LicenseMismatch,
}

impl ComparePredicate {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PotentialDuplicate => "potential-duplicate",
            Self::LicenseMismatch => "license-mismatch",
        }
    }
}

impl fmt::Display for ComparePredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComparePredicate {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "potential-duplicate" => Ok(Self::PotentialDuplicate),
            "license-mismatch" => Ok(Self::LicenseMismatch),
            other => Err(format!(
                "unknown compare predicate: {other} (expected potential-duplicate|license-mismatch)"
            )),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum CustomCheck {
    /// Violate when the artifact matches any selector.
    Deny(Vec<ArtifactSelector>),
    /// Violate when both artifacts are in scope and the predicate holds.
    /// An empty scope admits every artifact.
    Compare {
        predicate: ComparePredicate,
        scope: Vec<ArtifactSelector>,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct CustomRule {
    pub id: String,
    pub name: String,
    pub description: String,
    pub severity: Severity,
    pub check: CustomCheck,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CustomRuleset {
    pub name: String,
    pub version: String,
    pub rules: Vec<CustomRule>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LicenseValidatorConfig {
    pub enabled: bool,
    pub forbidden: BTreeSet<String>,
    pub ignored: BTreeSet<String>,
    pub forbidden_severity: Severity,
    pub missing_info_severity: Severity,
    pub missing_text_severity: Severity,
}

impl Default for LicenseValidatorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            forbidden: BTreeSet::new(),
            ignored: BTreeSet::new(),
            forbidden_severity: Severity::Fail,
            missing_info_severity: Severity::Warn,
            missing_text_severity: Severity::Warn,
        }
    }
}

/// Issues declared in configuration for every artifact matching `selector`.
#[derive(Clone, Debug, PartialEq)]
pub struct ConfiguredIssues {
    pub selector: ArtifactSelector,
    pub issues: Vec<SecurityIssue>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Suppression {
    pub reference: String,
    pub selector: ArtifactSelector,
    pub until: OffsetDateTime,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SecurityValidatorConfig {
    pub enabled: bool,
    pub forbidden_statuses: Vec<IssueStatus>,
    pub status_severity: Severity,
    /// Issues scoring at or above this limit violate.
    pub severity_limit: f64,
    pub limit_severity: Severity,
    pub ignore_references: BTreeSet<String>,
    pub issues: Vec<ConfiguredIssues>,
    pub suppressions: Vec<Suppression>,
}

impl Default for SecurityValidatorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            forbidden_statuses: Vec::new(),
            status_severity: Severity::Fail,
            severity_limit: f64::MAX,
            limit_severity: Severity::Fail,
            ignore_references: BTreeSet::new(),
            issues: Vec::new(),
            suppressions: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SourceValidatorConfig {
    pub enabled: bool,
    pub missing_severity: Severity,
    pub incomplete_severity: Severity,
    pub allow_missing: Vec<ArtifactSelector>,
    pub allow_incomplete: Vec<ArtifactSelector>,
}

impl Default for SourceValidatorConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            missing_severity: Severity::Fail,
            incomplete_severity: Severity::Warn,
            allow_missing: Vec::new(),
            allow_incomplete: Vec::new(),
        }
    }
}

/// Facts and flags applied to every artifact matching `selector`.
#[derive(Clone, Debug, PartialEq)]
pub struct ArtifactOverride {
    pub selector: ArtifactSelector,
    pub artifact: Artifact,
}

#[derive(Clone, Debug)]
pub struct EffectiveConfig {
    pub profile: String,
    pub fail_on: Severity,
    pub max_findings: usize,
    pub rulesets: Vec<String>,
    pub rules: BTreeMap<String, RulePolicy>,
    pub custom_rulesets: Vec<CustomRuleset>,
    pub license: LicenseValidatorConfig,
    pub security: SecurityValidatorConfig,
    pub source: SourceValidatorConfig,
    pub overrides: Vec<ArtifactOverride>,
    pub additions: Vec<Artifact>,
    pub removals: Vec<ArtifactSelector>,
    pub knowledge_base: Arc<LicenseKnowledgeBase>,
}

impl Default for EffectiveConfig {
    fn default() -> Self {
        Self {
            profile: "standard".to_string(),
            fail_on: Severity::Fail,
            max_findings: 200,
            rulesets: vec![
                ids::RULESET_BASIC.to_string(),
                ids::RULESET_LICENSING.to_string(),
            ],
            rules: BTreeMap::new(),
            custom_rulesets: Vec::new(),
            license: LicenseValidatorConfig::default(),
            security: SecurityValidatorConfig::default(),
            source: SourceValidatorConfig::default(),
            overrides: Vec::new(),
            additions: Vec::new(),
            removals: Vec::new(),
            knowledge_base: Arc::new(LicenseKnowledgeBase::with_defaults()),
        }
    }
}

impl EffectiveConfig {
    /// Severity a rule runs at, or `None` when it is disabled.
    pub fn rule_severity(&self, rule_id: &str, default: impl Into<Severity>) -> Option<Severity> {
        let default = default.into();
        match self.rules.get(rule_id) {
            Some(policy) if !policy.enabled => None,
            Some(policy) => Some(policy.severity.unwrap_or(default)),
            None => Some(default),
        }
    }
}

/// Legacy spelling accepted wherever configuration names a rule severity.
pub fn parse_any_severity(value: &str) -> Option<Severity> {
    value
        .parse::<Severity>()
        .ok()
        .or_else(|| value.parse::<RuleSeverity>().ok().map(Severity::from))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_severity_honors_overrides_and_disabling() {
        let mut cfg = EffectiveConfig::default();
        cfg.rules
            .insert("basic.no_license".to_string(), RulePolicy::enabled(Severity::Fail));
        cfg.rules
            .insert("basic.unknown_match_state".to_string(), RulePolicy::disabled());
        cfg.rules.insert(
            "basic.missing_identity".to_string(),
            RulePolicy {
                enabled: true,
                severity: None,
            },
        );

        assert_eq!(cfg.rule_severity("basic.no_license", Severity::Warn), Some(Severity::Fail));
        assert_eq!(cfg.rule_severity("basic.unknown_match_state", Severity::Info), None);
        assert_eq!(cfg.rule_severity("basic.missing_identity", Severity::Warn), Some(Severity::Warn));
        assert_eq!(
            cfg.rule_severity("basic.duplicate_artifact", RuleSeverity::Severe),
            Some(Severity::Warn)
        );
    }

    #[test]
    fn both_severity_vocabularies_parse() {
        assert_eq!(parse_any_severity("warn"), Some(Severity::Warn));
        assert_eq!(parse_any_severity("critical"), Some(Severity::Fail));
        assert_eq!(parse_any_severity("severe"), Some(Severity::Warn));
        assert_eq!(parse_any_severity("loud"), None);
    }

    #[test]
    fn compare_predicates_round_trip_through_strings() {
        for predicate in [ComparePredicate::PotentialDuplicate, ComparePredicate::LicenseMismatch] {
            assert_eq!(predicate.as_str().parse::<ComparePredicate>(), Ok(predicate));
        }
        assert!("same-vendor".parse::<ComparePredicate>().is_err());
    }

    #[test]
    fn defaults_enable_license_and_security_validators_only() {
        let cfg = EffectiveConfig::default();
        assert!(cfg.license.enabled);
        assert!(cfg.security.enabled);
        assert!(!cfg.source.enabled);
        assert_eq!(cfg.security.severity_limit, f64::MAX);
        assert_eq!(cfg.fail_on, Severity::Fail);
    }
}

use super::enabled;
use crate::policy::EffectiveConfig;
use crate::rule::{CompareArtifactRule, Rule, RuleError, RuleKind, RuleMeta, SingleArtifactRule};
use crate::ruleset::Ruleset;
use crate::violation::Violation;
use complyguard_domain_core::Artifact;
use complyguard_domain_core::facts::MatchState;
use complyguard_types::{RuleSeverity, Severity, ids};

pub fn ruleset(cfg: &EffectiveConfig) -> Ruleset {
    let mut rules = Vec::new();
    if let Some(meta) = enabled(
        cfg,
        ids::RULE_BASIC_NO_LICENSE,
        "Component without license",
        "Non-proprietary component whose final license is empty.",
        Severity::Warn,
    ) {
        rules.push(RuleKind::single(NoLicense { meta }));
    }
    if let Some(meta) = enabled(
        cfg,
        ids::RULE_BASIC_UNKNOWN_MATCH_STATE,
        "Unknown match state",
        "The analyzer could not tell whether the component was identified exactly.",
        Severity::Info,
    ) {
        rules.push(RuleKind::single(UnknownMatchState { meta }));
    }
    if let Some(meta) = enabled(
        cfg,
        ids::RULE_BASIC_MISSING_IDENTITY,
        "Component without identity",
        "The component carries no coordinate or filename fact.",
        Severity::Warn,
    ) {
        rules.push(RuleKind::single(MissingIdentity { meta }));
    }
    if let Some(meta) = enabled(
        cfg,
        ids::RULE_BASIC_DUPLICATE_ARTIFACT,
        "Potential duplicate",
        "Two components whose identities wildcard-match each other.",
        RuleSeverity::Severe,
    ) {
        rules.push(RuleKind::compare(DuplicateArtifact { meta }));
    }
    Ruleset::new(ids::RULESET_BASIC, ids::RULESET_BASIC_VERSION, rules)
}

#[derive(Debug)]
pub struct NoLicense {
    meta: RuleMeta,
}

impl Rule for NoLicense {
    fn meta(&self) -> &RuleMeta {
        &self.meta
    }
}

impl SingleArtifactRule for NoLicense {
    fn evaluate(&self, artifact: &Artifact) -> Result<Option<Violation>, RuleError> {
        if artifact.is_proprietary() || !artifact.final_licenses().is_empty() {
            return Ok(None);
        }
        Ok(Some(self.violation(
            format!("{artifact} has no license information"),
            [artifact.clone()],
        )))
    }
}

#[derive(Debug)]
pub struct UnknownMatchState {
    meta: RuleMeta,
}

impl Rule for UnknownMatchState {
    fn meta(&self) -> &RuleMeta {
        &self.meta
    }
}

impl SingleArtifactRule for UnknownMatchState {
    fn evaluate(&self, artifact: &Artifact) -> Result<Option<Violation>, RuleError> {
        if artifact.match_state() != MatchState::Unknown {
            return Ok(None);
        }
        Ok(Some(self.violation(
            format!("{artifact} was not matched exactly (match state unknown)"),
            [artifact.clone()],
        )))
    }
}

#[derive(Debug)]
pub struct MissingIdentity {
    meta: RuleMeta,
}

impl Rule for MissingIdentity {
    fn meta(&self) -> &RuleMeta {
        &self.meta
    }
}

impl SingleArtifactRule for MissingIdentity {
    fn evaluate(&self, artifact: &Artifact) -> Result<Option<Violation>, RuleError> {
        if !artifact.identifiers().is_empty() {
            return Ok(None);
        }
        Ok(Some(self.violation(
            format!(
                "component from {} has no coordinates or filename",
                artifact.analysis_source()
            ),
            [artifact.clone()],
        )))
    }
}

/// Lenient: wildcard identities count as duplicates of concrete ones.
#[derive(Debug)]
pub struct DuplicateArtifact {
    meta: RuleMeta,
}

impl Rule for DuplicateArtifact {
    fn meta(&self) -> &RuleMeta {
        &self.meta
    }
}

impl CompareArtifactRule for DuplicateArtifact {
    fn evaluate(&self, left: &Artifact, right: &Artifact) -> Result<Option<Violation>, RuleError> {
        if !left.is_potential_duplicate_of(right) {
            return Ok(None);
        }
        Ok(Some(self.violation(
            format!("{left} and {right} are potential duplicates"),
            [left.clone(), right.clone()],
        )))
    }
}

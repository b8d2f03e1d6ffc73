//! Rules built from configuration data.

use crate::policy::{ComparePredicate, CustomCheck, CustomRuleset};
use crate::rule::{CompareArtifactRule, Rule, RuleError, RuleKind, RuleMeta, SingleArtifactRule};
use crate::ruleset::Ruleset;
use crate::violation::Violation;
use complyguard_domain_core::{Artifact, ArtifactSelector};

pub fn ruleset(custom: &CustomRuleset) -> Ruleset {
    let rules = custom
        .rules
        .iter()
        .map(|rule| {
            let meta = RuleMeta::new(&rule.id, &rule.name, &rule.description, rule.severity);
            match &rule.check {
                CustomCheck::Deny(selectors) => RuleKind::single(DenyRule {
                    meta,
                    selectors: selectors.clone(),
                }),
                CustomCheck::Compare { predicate, scope } => RuleKind::compare(PredicateRule {
                    meta,
                    predicate: *predicate,
                    scope: scope.clone(),
                }),
            }
        })
        .collect();
    Ruleset::new(&custom.name, &custom.version, rules)
}

#[derive(Debug)]
pub struct DenyRule {
    meta: RuleMeta,
    selectors: Vec<ArtifactSelector>,
}

impl Rule for DenyRule {
    fn meta(&self) -> &RuleMeta {
        &self.meta
    }
}

impl SingleArtifactRule for DenyRule {
    fn evaluate(&self, artifact: &Artifact) -> Result<Option<Violation>, RuleError> {
        let Some(selector) = self.selectors.iter().find(|s| s.matches(artifact)) else {
            return Ok(None);
        };
        let description = if self.meta.description.is_empty() {
            format!("{artifact} matches denied selector {selector}")
        } else {
            format!("{artifact}: {} (matched {selector})", self.meta.description)
        };
        Ok(Some(self.violation(description, [artifact.clone()])))
    }
}

#[derive(Debug)]
pub struct PredicateRule {
    meta: RuleMeta,
    predicate: ComparePredicate,
    scope: Vec<ArtifactSelector>,
}

impl PredicateRule {
    fn in_scope(&self, artifact: &Artifact) -> bool {
        self.scope.is_empty() || self.scope.iter().any(|s| s.matches(artifact))
    }

    fn holds(&self, left: &Artifact, right: &Artifact) -> bool {
        match self.predicate {
            ComparePredicate::PotentialDuplicate => left.is_potential_duplicate_of(right),
            ComparePredicate::LicenseMismatch => left.final_licenses() != right.final_licenses(),
        }
    }
}

impl Rule for PredicateRule {
    fn meta(&self) -> &RuleMeta {
        &self.meta
    }
}

impl CompareArtifactRule for PredicateRule {
    fn evaluate(&self, left: &Artifact, right: &Artifact) -> Result<Option<Violation>, RuleError> {
        if !self.in_scope(left) || !self.in_scope(right) || !self.holds(left, right) {
            return Ok(None);
        }
        Ok(Some(self.violation(
            format!("{left} and {right}: {} ({})", self.meta.name, self.predicate),
            [left.clone(), right.clone()],
        )))
    }
}

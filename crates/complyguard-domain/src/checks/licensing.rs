use super::enabled;
use crate::policy::EffectiveConfig;
use crate::rule::{CompareArtifactRule, Rule, RuleError, RuleKind, RuleMeta, SingleArtifactRule};
use crate::ruleset::Ruleset;
use crate::violation::Violation;
use complyguard_domain_core::license::threat_groups;
use complyguard_domain_core::{Artifact, License, LicenseExpression, LicenseKnowledgeBase};
use complyguard_types::{RuleSeverity, Severity, ids};
use std::sync::Arc;

pub fn ruleset(cfg: &EffectiveConfig) -> Ruleset {
    let kb = &cfg.knowledge_base;
    let mut rules = Vec::new();
    if let Some(meta) = enabled(
        cfg,
        ids::RULE_LICENSING_UNKNOWN_LICENSE,
        "Unknown license",
        "A final license id is not in the license knowledge base.",
        Severity::Warn,
    ) {
        rules.push(RuleKind::single(UnknownLicense {
            meta,
            kb: Arc::clone(kb),
        }));
    }
    if let Some(meta) = enabled(
        cfg,
        ids::RULE_LICENSING_STRONG_COPYLEFT,
        "Strong copyleft",
        "The final license cannot be satisfied without a strong-copyleft license.",
        RuleSeverity::Critical,
    ) {
        rules.push(RuleKind::single(StrongCopyleft {
            meta,
            kb: Arc::clone(kb),
        }));
    }
    if let Some(meta) = enabled(
        cfg,
        ids::RULE_LICENSING_PROPRIETARY_COPYLEFT_MIX,
        "Proprietary and copyleft mix",
        "A proprietary component is distributed next to a strong-copyleft one.",
        RuleSeverity::Critical,
    ) {
        rules.push(RuleKind::compare(ProprietaryCopyleftMix {
            meta,
            kb: Arc::clone(kb),
        }));
    }
    Ruleset::new(ids::RULESET_LICENSING, ids::RULESET_LICENSING_VERSION, rules)
}

/// The final license with knowledge base data filled in.
fn enriched_license(kb: &LicenseKnowledgeBase, artifact: &Artifact) -> LicenseExpression {
    kb.enrich_expression(artifact.final_licenses())
}

/// True when every license choice includes a strong-copyleft license.
fn requires_strong_copyleft(expression: &LicenseExpression) -> bool {
    !expression.is_empty() && !expression.satisfiable_without(&is_strong_copyleft)
}

fn is_strong_copyleft(license: &License) -> bool {
    license.is_in_threat_group(threat_groups::STRONG_COPYLEFT)
}

#[derive(Debug)]
pub struct UnknownLicense {
    meta: RuleMeta,
    kb: Arc<LicenseKnowledgeBase>,
}

impl Rule for UnknownLicense {
    fn meta(&self) -> &RuleMeta {
        &self.meta
    }
}

impl SingleArtifactRule for UnknownLicense {
    fn evaluate(&self, artifact: &Artifact) -> Result<Option<Violation>, RuleError> {
        let expression = artifact.final_licenses();
        let unknown: Vec<&str> = expression
            .licenses()
            .into_iter()
            .filter(|license| !self.kb.knows(license))
            .map(|license| license.id.as_str())
            .collect();
        if unknown.is_empty() {
            return Ok(None);
        }
        Ok(Some(self.violation(
            format!("{artifact} uses licenses unknown to the knowledge base: {}", unknown.join(", ")),
            [artifact.clone()],
        )))
    }
}

#[derive(Debug)]
pub struct StrongCopyleft {
    meta: RuleMeta,
    kb: Arc<LicenseKnowledgeBase>,
}

impl Rule for StrongCopyleft {
    fn meta(&self) -> &RuleMeta {
        &self.meta
    }
}

impl SingleArtifactRule for StrongCopyleft {
    fn evaluate(&self, artifact: &Artifact) -> Result<Option<Violation>, RuleError> {
        let expression = enriched_license(&self.kb, artifact);
        if !requires_strong_copyleft(&expression) {
            return Ok(None);
        }
        Ok(Some(self.violation(
            format!("{artifact} is only available under strong copyleft terms ({expression})"),
            [artifact.clone()],
        )))
    }
}

#[derive(Debug)]
pub struct ProprietaryCopyleftMix {
    meta: RuleMeta,
    kb: Arc<LicenseKnowledgeBase>,
}

impl ProprietaryCopyleftMix {
    fn mixes(&self, proprietary: &Artifact, other: &Artifact) -> bool {
        proprietary.is_proprietary()
            && !other.is_proprietary()
            && requires_strong_copyleft(&enriched_license(&self.kb, other))
    }
}

impl Rule for ProprietaryCopyleftMix {
    fn meta(&self) -> &RuleMeta {
        &self.meta
    }
}

impl CompareArtifactRule for ProprietaryCopyleftMix {
    fn evaluate(&self, left: &Artifact, right: &Artifact) -> Result<Option<Violation>, RuleError> {
        let (proprietary, copyleft) = if self.mixes(left, right) {
            (left, right)
        } else if self.mixes(right, left) {
            (right, left)
        } else {
            return Ok(None);
        };
        Ok(Some(self.violation(
            format!("proprietary {proprietary} is combined with strong copyleft {copyleft}"),
            [proprietary.clone(), copyleft.clone()],
        )))
    }
}

use crate::rule::{CompareArtifactRule, Rule, RuleError, RuleMeta, SingleArtifactRule};
use crate::violation::Violation;
use complyguard_domain_core::facts::{
    ArtifactMatchingMetadata, DeclaredLicenseInformation, GenericCoordinates, MatchState,
};
use complyguard_domain_core::{Artifact, LicenseExpression};
use complyguard_types::Severity;
use std::sync::{Arc, Mutex};

pub fn generic_artifact(name: &str, version: &str) -> Artifact {
    Artifact::from_source("test").with_fact(GenericCoordinates::new(name, version))
}

/// An exactly matched artifact declaring `license`.
pub fn licensed(name: &str, version: &str, license: &str) -> Artifact {
    let expression = LicenseExpression::parse(license).expect("valid license expression");
    generic_artifact(name, version)
        .with_fact(DeclaredLicenseInformation::new(expression))
        .with_fact(ArtifactMatchingMetadata::new(MatchState::Exact))
}

/// Violates for every artifact flagged proprietary.
#[derive(Debug)]
pub struct FlagRule {
    meta: RuleMeta,
}

impl FlagRule {
    pub fn new(id: &str, severity: Severity) -> Self {
        Self {
            meta: RuleMeta::new(id, id, "flags proprietary artifacts", severity),
        }
    }
}

impl Rule for FlagRule {
    fn meta(&self) -> &RuleMeta {
        &self.meta
    }
}

impl SingleArtifactRule for FlagRule {
    fn evaluate(&self, artifact: &Artifact) -> Result<Option<Violation>, RuleError> {
        Ok(artifact
            .is_proprietary()
            .then(|| self.violation("proprietary", [artifact.clone()])))
    }
}

/// Always errors.
#[derive(Debug)]
pub struct FailingRule {
    meta: RuleMeta,
}

impl FailingRule {
    pub fn new(id: &str) -> Self {
        Self {
            meta: RuleMeta::new(id, id, "always fails", Severity::Fail),
        }
    }
}

impl Rule for FailingRule {
    fn meta(&self) -> &RuleMeta {
        &self.meta
    }
}

impl SingleArtifactRule for FailingRule {
    fn evaluate(&self, _artifact: &Artifact) -> Result<Option<Violation>, RuleError> {
        Err(self.error("boom"))
    }
}

/// Panics on every invocation.
#[derive(Debug)]
pub struct PanickingRule {
    meta: RuleMeta,
}

impl PanickingRule {
    pub fn new(id: &str) -> Self {
        Self {
            meta: RuleMeta::new(id, id, "always panics", Severity::Fail),
        }
    }
}

impl Rule for PanickingRule {
    fn meta(&self) -> &RuleMeta {
        &self.meta
    }
}

impl SingleArtifactRule for PanickingRule {
    fn evaluate(&self, _artifact: &Artifact) -> Result<Option<Violation>, RuleError> {
        panic!("index out of range")
    }
}

/// Records every pair it is invoked with and never violates.
///
/// Clone `pairs` before boxing the rule to inspect the calls afterwards.
#[derive(Debug)]
pub struct PairRecorder {
    meta: RuleMeta,
    pub pairs: Arc<Mutex<Vec<(String, String)>>>,
}

impl PairRecorder {
    pub fn new() -> Self {
        Self {
            meta: RuleMeta::new("test.pairs", "pairs", "records pairs", Severity::Info),
            pairs: Arc::default(),
        }
    }
}

impl Rule for PairRecorder {
    fn meta(&self) -> &RuleMeta {
        &self.meta
    }
}

impl CompareArtifactRule for PairRecorder {
    fn evaluate(&self, left: &Artifact, right: &Artifact) -> Result<Option<Violation>, RuleError> {
        self.pairs
            .lock()
            .expect("pairs lock")
            .push((left.label(), right.label()));
        Ok(None)
    }
}

use crate::checker::ComplianceChecker;
use crate::policy::SourceValidatorConfig;
use crate::violation::Violation;
use complyguard_domain_core::facts::{ArtifactFile, ArtifactSourceFile, MavenCoordinates};
use complyguard_domain_core::{Artifact, Fact};
use complyguard_types::{Severity, ids};

/// Checks that Maven artifacts come with both a binary and a source archive.
///
/// Only presence is checked; archive contents are not inspected.
#[derive(Clone, Debug)]
pub struct SourceValidator {
    config: SourceValidatorConfig,
}

impl SourceValidator {
    pub fn new(config: SourceValidatorConfig) -> Self {
        Self { config }
    }

    fn allowed_missing(&self, artifact: &Artifact) -> bool {
        self.config.allow_missing.iter().any(|s| s.matches(artifact))
    }

    fn allowed_incomplete(&self, artifact: &Artifact) -> bool {
        self.allowed_missing(artifact)
            || self.config.allow_incomplete.iter().any(|s| s.matches(artifact))
    }

    fn applies_to(artifact: &Artifact) -> bool {
        !artifact.is_proprietary()
            && artifact
                .ask_for::<MavenCoordinates>()
                .is_some_and(|c| !Fact::is_empty(c))
    }

    fn validate(&self, artifact: &Artifact) -> Option<Violation> {
        if artifact.ask_for::<ArtifactSourceFile>().is_none() {
            let (severity, description) = if self.allowed_missing(artifact) {
                (Severity::Info, format!("{artifact} has no source archive but is allowed to"))
            } else {
                (self.config.missing_severity, format!("No source archive available for {artifact}."))
            };
            return Some(self.violation(ids::RULE_SOURCE_MISSING_SOURCES, description, severity, artifact));
        }
        if artifact.ask_for::<ArtifactFile>().is_none() {
            let (severity, description) = if self.allowed_incomplete(artifact) {
                (
                    Severity::Info,
                    format!("{artifact} has no binary to verify sources against but is allowed to"),
                )
            } else {
                (
                    self.config.incomplete_severity,
                    format!("{artifact} has no binary, so its sources cannot be verified."),
                )
            };
            return Some(self.violation(ids::RULE_SOURCE_MISSING_BINARY, description, severity, artifact));
        }
        None
    }

    fn violation(&self, rule_id: &str, description: String, severity: Severity, artifact: &Artifact) -> Violation {
        Violation::new(rule_id, description, severity, [artifact.clone()])
            .with_ruleset(ids::VALIDATOR_SOURCE)
    }
}

impl ComplianceChecker for SourceValidator {
    fn name(&self) -> &str {
        ids::VALIDATOR_SOURCE
    }

    fn ruleset_description(&self) -> String {
        "Source Validator".to_string()
    }

    fn evaluate(&self, artifacts: &[Artifact]) -> Vec<Violation> {
        artifacts
            .iter()
            .filter(|a| Self::applies_to(a))
            .filter_map(|a| self.validate(a))
            .collect()
    }
}

use crate::fingerprint::fingerprint_for_violation;
use complyguard_domain_core::Artifact;
use complyguard_types::Severity;
use std::fmt;

/// The output of a rule that failed for one or more artifacts.
///
/// `failing_artifacts` behaves as a set: equal artifacts are stored once.
#[derive(Clone, Debug, PartialEq)]
pub struct Violation {
    pub rule_id: String,
    /// Ruleset or validator that produced the violation.
    pub ruleset: Option<String>,
    pub description: String,
    pub severity: Severity,
    pub failing_artifacts: Vec<Artifact>,
}

impl Violation {
    pub fn new(
        rule_id: impl Into<String>,
        description: impl Into<String>,
        severity: Severity,
        artifacts: impl IntoIterator<Item = Artifact>,
    ) -> Self {
        let mut failing_artifacts: Vec<Artifact> = Vec::new();
        for artifact in artifacts {
            if !failing_artifacts.contains(&artifact) {
                failing_artifacts.push(artifact);
            }
        }
        Self {
            rule_id: rule_id.into(),
            ruleset: None,
            description: description.into(),
            severity,
            failing_artifacts,
        }
    }

    pub fn with_ruleset(mut self, ruleset: impl Into<String>) -> Self {
        self.ruleset = Some(ruleset.into());
        self
    }

    /// At or above the threshold and blaming at least one artifact.
    pub fn is_fail_causing(&self, fail_on: Severity) -> bool {
        self.severity >= fail_on && !self.failing_artifacts.is_empty()
    }

    pub fn artifact_labels(&self) -> Vec<String> {
        self.failing_artifacts.iter().map(Artifact::label).collect()
    }

    pub fn fingerprint(&self) -> String {
        fingerprint_for_violation(&self.rule_id, &self.failing_artifacts)
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]: {}", self.severity, self.rule_id, self.description)
    }
}

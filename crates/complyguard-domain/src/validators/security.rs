use crate::checker::ComplianceChecker;
use crate::policy::SecurityValidatorConfig;
use crate::violation::Violation;
use complyguard_domain_core::Artifact;
use complyguard_domain_core::facts::{ArtifactIssues, IssueStatus, SecurityIssue};
use complyguard_types::{Severity, ids};
use time::OffsetDateTime;
use tracing::debug;

/// Checks known security issues against forbidden statuses and a score limit.
#[derive(Clone, Debug)]
pub struct SecurityValidator {
    config: SecurityValidatorConfig,
    now: OffsetDateTime,
}

impl SecurityValidator {
    /// `now` decides which suppressions are still active.
    pub fn new(config: SecurityValidatorConfig, now: OffsetDateTime) -> Self {
        Self { config, now }
    }

    /// Issues on the artifact plus configured issues for matching selectors.
    fn issues_for(&self, artifact: &Artifact) -> Vec<SecurityIssue> {
        let found = artifact
            .ask_for_get::<ArtifactIssues>()
            .cloned()
            .unwrap_or_default();
        let configured = self
            .config
            .issues
            .iter()
            .filter(|entry| entry.selector.matches(artifact))
            .flat_map(|entry| entry.issues.iter().cloned());
        ArtifactIssues::new(found).merge_distinct(configured).0
    }

    fn is_suppressed(&self, issue: &SecurityIssue, artifact: &Artifact) -> bool {
        self.config
            .suppressions
            .iter()
            .filter(|s| s.reference == issue.reference && s.selector.matches(artifact))
            .map(|s| s.until)
            .max()
            .is_some_and(|until| self.now < until)
    }

    fn validate(&self, artifact: &Artifact, out: &mut Vec<Violation>) {
        for issue in self.issues_for(artifact) {
            if self.config.ignore_references.contains(&issue.reference) {
                debug!(reference = %issue.reference, "security issue ignored for validation");
                continue;
            }
            if issue.status == IssueStatus::NotApplicable {
                debug!(reference = %issue.reference, "security issue not applicable");
                continue;
            }
            if self.is_suppressed(&issue, artifact) {
                debug!(reference = %issue.reference, %artifact, "security issue suppressed");
                continue;
            }
            if self.config.forbidden_statuses.contains(&issue.status) {
                out.push(self.violation(
                    ids::RULE_SECURITY_FORBIDDEN_STATUS,
                    format!(
                        "{artifact} has security issue [{}] with forbidden status {}.",
                        issue.reference, issue.status
                    ),
                    self.config.status_severity,
                    artifact,
                ));
            }
            if issue.severity >= self.config.severity_limit {
                out.push(self.violation(
                    ids::RULE_SECURITY_SEVERITY_LIMIT,
                    format!(
                        "{artifact} has security issue [{}] with severity {}, at or above the limit {}.",
                        issue.reference, issue.severity, self.config.severity_limit
                    ),
                    self.config.limit_severity,
                    artifact,
                ));
            }
        }
    }

    fn violation(&self, rule_id: &str, description: String, severity: Severity, artifact: &Artifact) -> Violation {
        Violation::new(rule_id, description, severity, [artifact.clone()])
            .with_ruleset(ids::VALIDATOR_SECURITY)
    }
}

impl ComplianceChecker for SecurityValidator {
    fn name(&self) -> &str {
        ids::VALIDATOR_SECURITY
    }

    fn ruleset_description(&self) -> String {
        "Security Issue Validator".to_string()
    }

    fn evaluate(&self, artifacts: &[Artifact]) -> Vec<Violation> {
        let mut out = Vec::new();
        for artifact in artifacts {
            self.validate(artifact, &mut out);
        }
        out
    }
}

use crate::checker::ComplianceChecker;
use crate::policy::LicenseValidatorConfig;
use crate::violation::Violation;
use complyguard_domain_core::Artifact;
use complyguard_types::{Severity, ids};
use tracing::debug;

/// Checks final licenses of non-proprietary artifacts: presence, the
/// forbidden list, and license texts.
#[derive(Clone, Debug)]
pub struct LicenseValidator {
    config: LicenseValidatorConfig,
}

impl LicenseValidator {
    pub fn new(config: LicenseValidatorConfig) -> Self {
        Self { config }
    }

    fn validate(&self, artifact: &Artifact, out: &mut Vec<Violation>) {
        let licenses = artifact.final_licenses();
        if licenses.is_empty() {
            out.push(self.violation(
                ids::RULE_LICENSE_NO_LICENSE,
                format!("No license information found for {artifact}."),
                self.config.missing_info_severity,
                artifact,
            ));
            return;
        }
        for license in licenses.licenses() {
            if self.config.ignored.contains(&license.id) {
                debug!(license = %license.id, "license ignored for validation");
                continue;
            }
            if self.config.forbidden.contains(&license.id) {
                out.push(self.violation(
                    ids::RULE_LICENSE_FORBIDDEN,
                    format!("{artifact} is licensed under the forbidden license {}", license.id),
                    self.config.forbidden_severity,
                    artifact,
                ));
            }
            if !license.has_text() {
                out.push(self.violation(
                    ids::RULE_LICENSE_NO_TEXT,
                    format!("License {} of {artifact} has no text", license.id),
                    self.config.missing_text_severity,
                    artifact,
                ));
            }
        }
    }

    fn violation(
        &self,
        rule_id: &str,
        description: String,
        severity: Severity,
        artifact: &Artifact,
    ) -> Violation {
        Violation::new(rule_id, description, severity, [artifact.clone()]).with_ruleset(ids::VALIDATOR_LICENSE)
    }
}

impl ComplianceChecker for LicenseValidator {
    fn name(&self) -> &str {
        ids::VALIDATOR_LICENSE
    }

    fn ruleset_description(&self) -> String {
        "License Validator".to_string()
    }

    fn evaluate(&self, artifacts: &[Artifact]) -> Vec<Violation> {
        let mut out = Vec::new();
        for artifact in artifacts.iter().filter(|a| !a.is_proprietary()) {
            self.validate(artifact, &mut out);
        }
        out
    }
}

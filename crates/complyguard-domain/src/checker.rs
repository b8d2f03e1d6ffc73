//! Turning violations into a thresholded stage outcome.

use crate::engine::PolicyEngine;
use crate::reporter::{ProcessingMessage, ProcessingReporter};
use crate::stage::{FailCauses, Processor, StageResult};
use crate::violation::Violation;
use complyguard_domain_core::Artifact;
use complyguard_types::Severity;
use std::collections::{BTreeMap, BTreeSet};
use tracing::info;

const SUMMARY_LIMIT: usize = 3;

/// Evaluates artifacts into violations; the threshold decision is made by
/// [`post_process_result`].
pub trait ComplianceChecker: Send + Sync {
    fn name(&self) -> &str;

    fn ruleset_description(&self) -> String;

    fn evaluate(&self, artifacts: &[Artifact]) -> Vec<Violation>;

    /// Extra report comments contributed by this checker.
    fn comments(&self) -> Vec<String> {
        Vec::new()
    }
}

/// Record `violations` on `result` and decide whether the stage failed.
///
/// Every violation is reported once. The fail-causing payload holds the
/// violations at or above `fail_on` that blame at least one artifact, and is
/// `None` when there are none.
pub fn post_process_result(
    mut result: StageResult,
    mut violations: Vec<Violation>,
    fail_on: Severity,
    stage: &str,
    reporter: &dyn ProcessingReporter,
) -> StageResult {
    violations.sort_by(|a, b| a.rule_id.cmp(&b.rule_id));

    let mut failing = Vec::new();
    for violation in &violations {
        reporter.add(ProcessingMessage::for_violation(violation));
        if violation.is_fail_causing(fail_on) {
            failing.push(violation.clone());
        }
    }

    result.fail_causing = if failing.is_empty() {
        None
    } else {
        Some(FailCauses::from([(stage.to_string(), failing)]))
    };
    result.violations.extend(violations);
    result
}

/// Human-readable account of why a run failed, grouped by artifact.
pub fn fail_summary(description: &str, causes: &FailCauses) -> String {
    let mut by_artifact: BTreeMap<String, BTreeSet<&str>> = BTreeMap::new();
    for violation in causes.values().flatten() {
        for artifact in &violation.failing_artifacts {
            by_artifact
                .entry(artifact.to_string())
                .or_default()
                .insert(violation.description.as_str());
        }
    }

    let mut out = format!("Rule engine=[{description}] failed evaluation. Due to:");
    for (artifact, reasons) in by_artifact.iter().take(SUMMARY_LIMIT) {
        out.push_str(&format!("\n\t- the artifact=[{artifact}] failed, due to:"));
        for reason in reasons.iter().take(SUMMARY_LIMIT) {
            out.push_str(&format!("\n\t\t- {reason}"));
        }
        if reasons.len() > SUMMARY_LIMIT {
            out.push_str(&format!(
                "\n\t\t- ... and {} fail causing results more",
                reasons.len() - SUMMARY_LIMIT
            ));
        }
    }
    if by_artifact.len() > SUMMARY_LIMIT {
        out.push_str(&format!(
            "\n\t- ... and {} artifacts more",
            by_artifact.len() - SUMMARY_LIMIT
        ));
    }
    out.push_str("\nSee generated report for details.");
    out
}

/// Runs a [`ComplianceChecker`] as a pipeline stage that keeps artifacts.
pub struct ComplianceStage {
    checker: Box<dyn ComplianceChecker>,
    fail_on: Severity,
}

impl ComplianceStage {
    pub fn new(checker: Box<dyn ComplianceChecker>, fail_on: Severity) -> Self {
        Self { checker, fail_on }
    }
}

impl Processor for ComplianceStage {
    fn name(&self) -> &str {
        self.checker.name()
    }

    fn keeps_artifacts(&self) -> bool {
        true
    }

    fn process(&self, artifacts: &mut Vec<Artifact>, reporter: &dyn ProcessingReporter) -> StageResult {
        info!(ruleset = %self.checker.ruleset_description(), "evaluating compliance rule set");
        let violations = self.checker.evaluate(artifacts);
        let result = StageResult {
            comments: self.checker.comments(),
            ..StageResult::default()
        };
        let result = post_process_result(result, violations, self.fail_on, self.checker.name(), reporter);
        info!(
            stage = self.checker.name(),
            violations = result.violations.len(),
            failed = result.is_failed(),
            "compliance evaluation done"
        );
        result
    }
}

/// The rule engine as a compliance checker.
#[derive(Debug)]
pub struct PolicyEngineChecker {
    engine: PolicyEngine,
}

impl PolicyEngineChecker {
    pub const NAME: &'static str = "policy-engine";

    pub fn new(engine: PolicyEngine) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &PolicyEngine {
        &self.engine
    }
}

impl ComplianceChecker for PolicyEngineChecker {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn ruleset_description(&self) -> String {
        self.engine.description()
    }

    fn evaluate(&self, artifacts: &[Artifact]) -> Vec<Violation> {
        self.engine.evaluate(artifacts).violations
    }

    fn comments(&self) -> Vec<String> {
        vec![format!("Evaluated rulesets: {}", self.engine.description())]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporter::ProcessingReport;
    use crate::test_support::generic_artifact;
    use complyguard_types::MessageType;

    fn violation(rule: &str, severity: Severity, artifacts: Vec<Artifact>) -> Violation {
        Violation::new(rule, format!("{rule} violated"), severity, artifacts)
    }

    #[test]
    fn warn_violations_fail_only_at_warn_threshold() {
        let report = ProcessingReport::new();
        let violations = vec![violation("a.rule", Severity::Warn, vec![generic_artifact("a", "1.0")])];

        let lenient = post_process_result(StageResult::default(), violations.clone(), Severity::Fail, "s", &report);
        assert_eq!(lenient.fail_causing, None);
        assert_eq!(lenient.violations.len(), 1);

        let strict = post_process_result(StageResult::default(), violations, Severity::Warn, "s", &report);
        assert_eq!(strict.fail_causing.expect("failed")["s"].len(), 1);
    }

    #[test]
    fn violations_without_artifacts_never_fail() {
        let report = ProcessingReport::new();
        let result = post_process_result(
            StageResult::default(),
            vec![violation("a.rule", Severity::Fail, vec![])],
            Severity::Info,
            "s",
            &report,
        );
        assert_eq!(result.fail_causing, None);
    }

    #[test]
    fn empty_violation_set_never_fails() {
        let report = ProcessingReport::new();
        for fail_on in Severity::ALL {
            let result = post_process_result(StageResult::default(), vec![], fail_on, "s", &report);
            assert!(result.fail_causing.is_none());
        }
        assert!(report.is_empty());
    }

    #[test]
    fn every_violation_is_reported_once() {
        let report = ProcessingReport::new();
        let a = generic_artifact("a", "1.0");
        post_process_result(
            StageResult::default(),
            vec![
                violation("b.rule", Severity::Info, vec![a.clone()]),
                violation("a.rule", Severity::Fail, vec![a]),
            ],
            Severity::Fail,
            "s",
            &report,
        );
        let messages = report.into_messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].rule_id.as_deref(), Some("a.rule"));
        assert_eq!(messages[0].message_type, MessageType::ProcessingFailure);
        assert_eq!(messages[1].message_type, MessageType::RuleEngine);
        assert_eq!(messages[1].identifier.as_deref(), Some("pkg:generic/a@1.0"));
    }

    #[test]
    fn message_type_follows_severity_not_threshold() {
        let report = ProcessingReport::new();
        let a = generic_artifact("a", "1.0");
        let result = post_process_result(
            StageResult::default(),
            vec![
                violation("a.rule", Severity::Warn, vec![a]),
                violation("b.rule", Severity::Fail, vec![]),
            ],
            Severity::Warn,
            "s",
            &report,
        );
        let messages = report.into_messages();
        // The warning fails the stage but stays a rule-engine message.
        assert!(result.fail_causing.is_some());
        assert_eq!(messages[0].message_type, MessageType::RuleEngine);
        // No artifact is blamed, yet a FAIL is still a processing failure.
        assert_eq!(messages[1].message_type, MessageType::ProcessingFailure);
        assert_eq!(result.fail_causing.map(|c| c["s"].len()), Some(1));
    }

    #[test]
    fn summary_is_grouped_and_capped() {
        let artifacts: Vec<Artifact> = (0..5).map(|i| generic_artifact(&format!("p{i}"), "1.0")).collect();
        let mut failing: Vec<Violation> = (0..5)
            .map(|i| violation(&format!("r{i}"), Severity::Fail, vec![artifacts[0].clone()]))
            .collect();
        failing.extend(
            artifacts[1..]
                .iter()
                .map(|a| violation("r0", Severity::Fail, vec![a.clone()])),
        );
        let causes = FailCauses::from([("s".to_string(), failing)]);

        let summary = fail_summary("basic@1.0.0", &causes);
        assert!(summary.starts_with("Rule engine=[basic@1.0.0] failed evaluation. Due to:"));
        assert!(summary.contains("\n\t- the artifact=[Artifact{pkg:generic/p0@1.0}] failed, due to:"));
        assert!(summary.contains("... and 2 fail causing results more"));
        assert!(summary.contains("... and 2 artifacts more"));
        assert!(summary.ends_with("See generated report for details."));
    }
}

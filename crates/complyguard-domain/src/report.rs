use crate::policy::EffectiveConfig;
use crate::reporter::ProcessingMessage;
use crate::stage::StageResult;
use crate::violation::Violation;
use complyguard_types::{
    ComplyguardData, Finding, ReportMessage, RulesetMeta, Severity, Verdict, VerdictCounts,
    VerdictStatus,
};
use std::cmp::Ordering;
use std::collections::BTreeSet;

#[derive(Clone, Debug, Default)]
pub struct SeverityCounts {
    pub info: u32,
    pub warn: u32,
    pub fail: u32,
}

impl SeverityCounts {
    pub fn from_findings(findings: &[Finding]) -> Self {
        let mut counts = SeverityCounts::default();
        for f in findings {
            match f.severity {
                Severity::Info => counts.info += 1,
                Severity::Warn => counts.warn += 1,
                Severity::Fail => counts.fail += 1,
            }
        }
        counts
    }
}

impl From<&SeverityCounts> for VerdictCounts {
    fn from(counts: &SeverityCounts) -> Self {
        VerdictCounts {
            info: counts.info,
            warn: counts.warn,
            fail: counts.fail,
        }
    }
}

#[derive(Clone, Debug)]
pub struct DomainReport {
    pub verdict: Verdict,
    pub findings: Vec<Finding>,
    pub data: ComplyguardData,
    pub counts: SeverityCounts,
}

/// Turn the merged pipeline outcome into findings, a verdict and summary data.
///
/// Processing messages that belong to a violation are already represented
/// by its finding and are left out of `data.messages`.
pub fn build_report(
    result: &StageResult,
    messages: &[ProcessingMessage],
    rulesets: &[RulesetMeta],
    cfg: &EffectiveConfig,
) -> DomainReport {
    let failing: Vec<&Violation> = result
        .fail_causing
        .iter()
        .flat_map(|causes| causes.values().flatten())
        .collect();

    let mut findings: Vec<Finding> = result
        .violations
        .iter()
        .map(|v| to_finding(v, failing.contains(&v)))
        .collect();

    // Deterministic ordering before truncation.
    findings.sort_by(compare_findings);

    let total = findings.len() as u32;

    let mut emitted = findings;
    let mut truncated_reason: Option<String> = None;
    if emitted.len() > cfg.max_findings {
        emitted.truncate(cfg.max_findings);
        truncated_reason = Some(format!(
            "findings truncated to max_findings={}",
            cfg.max_findings
        ));
    }

    let counts = SeverityCounts::from_findings(&emitted);
    let verdict = compute_verdict(result, &failing, &counts);

    let data = ComplyguardData {
        profile: cfg.profile.clone(),
        fail_on: cfg.fail_on,
        artifacts_evaluated: result.artifacts.len() as u32,
        rulesets: rulesets.to_vec(),
        findings_total: total,
        findings_emitted: emitted.len() as u32,
        truncated_reason,
        comments: result.comments.clone(),
        messages: messages
            .iter()
            .filter(|m| m.rule_id.is_none())
            .map(|m| ReportMessage {
                kind: m.message_type,
                identifier: m.identifier.clone(),
                message: m.message.clone(),
            })
            .collect(),
    };

    DomainReport {
        verdict,
        findings: emitted,
        data,
        counts,
    }
}

fn to_finding(violation: &Violation, fail_causing: bool) -> Finding {
    Finding {
        severity: violation.severity,
        rule_id: violation.rule_id.clone(),
        ruleset: violation.ruleset.clone(),
        message: violation.description.clone(),
        artifacts: violation.artifact_labels(),
        fail_causing,
        fingerprint: Some(violation.fingerprint()),
    }
}

fn compute_verdict(result: &StageResult, failing: &[&Violation], counts: &SeverityCounts) -> Verdict {
    let status = if result.is_failed() {
        VerdictStatus::Fail
    } else if counts.warn > 0 || counts.fail > 0 {
        VerdictStatus::Warn
    } else {
        VerdictStatus::Pass
    };
    let reasons: BTreeSet<String> = failing.iter().map(|v| v.rule_id.clone()).collect();
    Verdict {
        status,
        counts: counts.into(),
        reasons: reasons.into_iter().collect(),
    }
}

fn compare_findings(a: &Finding, b: &Finding) -> Ordering {
    // Ordering priority:
    // 1) severity (fail -> warn -> info)
    // 2) rule_id
    // 3) artifacts
    // 4) message
    b.severity
        .cmp(&a.severity)
        .then_with(|| a.rule_id.cmp(&b.rule_id))
        .then_with(|| a.artifacts.cmp(&b.artifacts))
        .then_with(|| a.message.cmp(&b.message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::post_process_result;
    use crate::reporter::{ProcessingReport, ProcessingReporter};
    use crate::test_support::generic_artifact;
    use complyguard_types::MessageType;

    fn violation(rule: &str, severity: Severity, name: &str) -> Violation {
        Violation::new(rule, format!("{rule} hit {name}"), severity, [generic_artifact(name, "1.0")])
    }

    fn evaluated(violations: Vec<Violation>, fail_on: Severity, report: &ProcessingReport) -> StageResult {
        let result = StageResult::new(vec![generic_artifact("a", "1.0"), generic_artifact("b", "1.0")]);
        post_process_result(result, violations, fail_on, "stage", report)
    }

    #[test]
    fn findings_are_sorted_and_flag_fail_causing_entries() {
        let report = ProcessingReport::new();
        let result = evaluated(
            vec![
                violation("z.info", Severity::Info, "a"),
                violation("b.warn", Severity::Warn, "b"),
                violation("a.fail", Severity::Fail, "a"),
            ],
            Severity::Fail,
            &report,
        );

        let out = build_report(&result, &report.messages(), &[], &EffectiveConfig::default());

        let ids: Vec<&str> = out.findings.iter().map(|f| f.rule_id.as_str()).collect();
        assert_eq!(ids, vec!["a.fail", "b.warn", "z.info"]);
        assert!(out.findings[0].fail_causing);
        assert!(!out.findings[1].fail_causing);
        assert_eq!(out.verdict.status, VerdictStatus::Fail);
        assert_eq!(out.verdict.reasons, vec!["a.fail".to_string()]);
        assert_eq!(out.data.artifacts_evaluated, 2);
        assert!(out.data.messages.is_empty());
        assert!(out.findings.iter().all(|f| f.fingerprint.is_some()));
    }

    #[test]
    fn warnings_below_threshold_give_warn_verdict() {
        let report = ProcessingReport::new();
        let result = evaluated(vec![violation("b.warn", Severity::Warn, "b")], Severity::Fail, &report);

        let out = build_report(&result, &report.messages(), &[], &EffectiveConfig::default());

        assert_eq!(out.verdict.status, VerdictStatus::Warn);
        assert!(out.verdict.reasons.is_empty());
        assert_eq!(out.verdict.counts.warn, 1);
    }

    #[test]
    fn info_only_passes() {
        let report = ProcessingReport::new();
        let result = evaluated(vec![violation("z.info", Severity::Info, "a")], Severity::Fail, &report);

        let out = build_report(&result, &report.messages(), &[], &EffectiveConfig::default());

        assert_eq!(out.verdict.status, VerdictStatus::Pass);
    }

    #[test]
    fn truncation_keeps_the_most_severe_findings() {
        let report = ProcessingReport::new();
        let result = evaluated(
            vec![
                violation("z.info", Severity::Info, "a"),
                violation("a.fail", Severity::Fail, "b"),
                violation("b.warn", Severity::Warn, "a"),
            ],
            Severity::Fail,
            &report,
        );
        let cfg = EffectiveConfig {
            max_findings: 1,
            ..EffectiveConfig::default()
        };

        let out = build_report(&result, &report.messages(), &[], &cfg);

        assert_eq!(out.findings.len(), 1);
        assert_eq!(out.findings[0].rule_id, "a.fail");
        assert_eq!(out.data.findings_total, 3);
        assert_eq!(out.data.findings_emitted, 1);
        assert_eq!(
            out.data.truncated_reason.as_deref(),
            Some("findings truncated to max_findings=1")
        );
    }

    #[test]
    fn processing_messages_without_rules_are_carried_over() {
        let report = ProcessingReport::new();
        report.add(
            ProcessingMessage::new(MessageType::UnnecessaryConfig, "removal entry does not match")
                .with_identifier("pkg:generic/x@*"),
        );
        let result = evaluated(vec![violation("b.warn", Severity::Warn, "b")], Severity::Fail, &report);

        let out = build_report(&result, &report.messages(), &[], &EffectiveConfig::default());

        assert_eq!(out.data.messages.len(), 1);
        assert_eq!(out.data.messages[0].kind, MessageType::UnnecessaryConfig);
        assert_eq!(out.data.messages[0].identifier.as_deref(), Some("pkg:generic/x@*"));
    }
}

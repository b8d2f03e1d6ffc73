//! Property-based tests for evaluation and stage composition.
//!
//! Invariants covered:
//! - compare rules see every unordered pair exactly once
//! - fail-causing payload is present iff a violation reaches the threshold
//! - legacy rule severities map monotonically onto the unified scale
//! - replace, append and keep-artifacts merges

use crate::checker::post_process_result;
use crate::engine::PolicyEngine;
use crate::reporter::ProcessingReport;
use crate::rule::RuleKind;
use crate::ruleset::{Ruleset, StaticRulesets};
use crate::stage::StageResult;
use crate::test_support::{PairRecorder, generic_artifact};
use crate::violation::Violation;
use complyguard_domain_core::Artifact;
use complyguard_types::{RuleSeverity, Severity};
use proptest::prelude::*;
use std::collections::BTreeSet;

// ============================================================================
// Strategies
// ============================================================================

fn arb_severity() -> impl Strategy<Value = Severity> {
    prop_oneof![Just(Severity::Info), Just(Severity::Warn), Just(Severity::Fail)]
}

fn arb_rule_severity() -> impl Strategy<Value = RuleSeverity> {
    prop_oneof![
        Just(RuleSeverity::Warn),
        Just(RuleSeverity::Severe),
        Just(RuleSeverity::Critical),
    ]
}

/// Distinct artifacts named `c0..cN`.
fn arb_artifacts(max: usize) -> impl Strategy<Value = Vec<Artifact>> {
    (0..=max).prop_map(|m| {
        (0..m)
            .map(|i| generic_artifact(&format!("c{i}"), "1.0"))
            .collect()
    })
}

fn arb_subset() -> impl Strategy<Value = Vec<Artifact>> {
    prop::collection::btree_set(0u8..6, 0..5).prop_map(|names| {
        names
            .into_iter()
            .map(|i| generic_artifact(&format!("a{i}"), "1.0"))
            .collect()
    })
}

fn arb_violation() -> impl Strategy<Value = Violation> {
    (
        prop::string::string_regex("[a-z]{1,6}\\.[a-z]{1,6}").unwrap(),
        arb_severity(),
        0usize..3,
    )
        .prop_map(|(rule, severity, blamed)| {
            let artifacts = (0..blamed).map(|i| generic_artifact(&format!("v{i}"), "1.0"));
            Violation::new(rule, "violated", severity, artifacts)
        })
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn compare_rules_see_each_pair_once(artifacts in arb_artifacts(9)) {
        let recorder = PairRecorder::new();
        let pairs = recorder.pairs.clone();
        let mut rulesets = StaticRulesets::new();
        rulesets.insert(Ruleset::new("pairs", "1.0.0", vec![RuleKind::compare(recorder)]));
        let engine = PolicyEngine::configure(&["pairs"], &rulesets).unwrap();

        let evaluation = engine.evaluate(&artifacts);

        let m = artifacts.len();
        let seen = pairs.lock().unwrap().clone();
        prop_assert_eq!(seen.len(), m * m.saturating_sub(1) / 2);
        prop_assert_eq!(evaluation.compare_invocations, seen.len());
        let mut unordered = BTreeSet::new();
        for (left, right) in &seen {
            prop_assert_ne!(left, right);
            let key = if left < right { (left, right) } else { (right, left) };
            prop_assert!(unordered.insert(key));
        }
    }

    #[test]
    fn fail_causing_present_iff_threshold_reached(
        violations in prop::collection::vec(arb_violation(), 0..6),
        fail_on in arb_severity(),
    ) {
        let expected = violations
            .iter()
            .any(|v| v.severity >= fail_on && !v.failing_artifacts.is_empty());
        let report = ProcessingReport::new();

        let result = post_process_result(StageResult::default(), violations.clone(), fail_on, "s", &report);

        prop_assert_eq!(result.fail_causing.is_some(), expected);
        if let Some(causes) = &result.fail_causing {
            prop_assert!(causes.values().all(|v| !v.is_empty()));
        }
        prop_assert_eq!(result.violations.len(), violations.len());
        prop_assert_eq!(report.len(), violations.len());
    }

    #[test]
    fn legacy_severities_keep_their_order(a in arb_rule_severity(), b in arb_rule_severity()) {
        prop_assert_eq!(a.cmp(&b), Severity::from(a).cmp(&Severity::from(b)));
    }

    #[test]
    fn replace_merge_takes_later_artifacts(earlier in arb_subset(), later in arb_subset()) {
        let merged = StageResult::new(earlier).merge(StageResult::new(later.clone()));
        prop_assert_eq!(merged.artifacts, later);
    }

    #[test]
    fn append_merge_is_a_union(earlier in arb_subset(), later in arb_subset()) {
        let merged = StageResult::new(earlier.clone()).merge(StageResult::appending(later.clone()));

        prop_assert!(earlier.iter().chain(&later).all(|a| merged.artifacts.contains(a)));
        prop_assert!(merged.artifacts.iter().all(|a| earlier.contains(a) || later.contains(a)));
        prop_assert_eq!(&merged.artifacts[..earlier.len()], &earlier[..]);
        prop_assert!(!merged.append);
    }

    #[test]
    fn keep_artifacts_merge_ignores_later_artifacts(earlier in arb_subset(), later in arb_subset()) {
        let merged = StageResult::new(earlier.clone()).merge_keep_artifacts(StageResult::new(later));
        prop_assert_eq!(merged.artifacts, earlier);
    }
}

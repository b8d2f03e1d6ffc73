//! Drives rule evaluation over an artifact collection.
//!
//! Lifecycle: [`PolicyEngine::configure`] resolves every ruleset up front
//! (Configured), [`PolicyEngine::evaluate`] runs the rules (Evaluating) and
//! returns a finished [`PolicyEvaluation`] (Completed). Evaluation is a pure
//! function of rulesets and artifacts.

use crate::rule::{RuleError, RuleKind};
use crate::ruleset::{Ruleset, RulesetResolver};
use crate::violation::Violation;
use complyguard_domain_core::Artifact;
use complyguard_types::Severity;
use rayon::prelude::*;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum PolicyError {
    #[error("no rulesets configured")]
    NoRulesets,
    #[error("unknown ruleset '{id}' (available: {})", .available.join(", "))]
    UnknownRuleset { id: String, available: Vec<String> },
}

/// A rule invocation that returned an error instead of a result.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuleFailure {
    pub ruleset: String,
    pub rule_id: String,
    pub message: String,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PolicyEvaluation {
    pub violations: Vec<Violation>,
    pub failures: Vec<RuleFailure>,
    pub single_invocations: usize,
    pub compare_invocations: usize,
}

#[derive(Debug)]
pub struct PolicyEngine {
    rulesets: Vec<Arc<Ruleset>>,
}

impl PolicyEngine {
    /// Resolve every identifier; any miss is fatal and nothing is evaluated.
    pub fn configure<S: AsRef<str>>(
        ids: &[S],
        resolver: &dyn RulesetResolver,
    ) -> Result<Self, PolicyError> {
        if ids.is_empty() {
            return Err(PolicyError::NoRulesets);
        }
        let mut rulesets = Vec::with_capacity(ids.len());
        for id in ids {
            let id = id.as_ref();
            let Some(ruleset) = resolver.resolve(id) else {
                return Err(PolicyError::UnknownRuleset {
                    id: id.to_string(),
                    available: resolver.available(),
                });
            };
            info!(
                ruleset = ruleset.name(),
                version = ruleset.version(),
                rules = ruleset.rules().len(),
                "loaded ruleset"
            );
            rulesets.push(ruleset);
        }
        Ok(Self { rulesets })
    }

    pub fn rulesets(&self) -> &[Arc<Ruleset>] {
        &self.rulesets
    }

    pub fn description(&self) -> String {
        self.rulesets
            .iter()
            .map(|r| format!("{}@{}", r.name(), r.version()))
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn evaluate(&self, artifacts: &[Artifact]) -> PolicyEvaluation {
        let m = artifacts.len();
        let pairs: Vec<(usize, usize)> = (0..m)
            .flat_map(|i| (i + 1..m).map(move |j| (i, j)))
            .collect();
        info!(artifacts = m, pairs = pairs.len(), "policy evaluation started");

        let mut evaluation = PolicyEvaluation::default();
        for ruleset in &self.rulesets {
            for rule in ruleset.rules() {
                let outcomes: Vec<(Result<Option<Violation>, RuleError>, Vec<&Artifact>)> =
                    match rule {
                        RuleKind::Single(rule) => {
                            evaluation.single_invocations += m;
                            artifacts
                                .par_iter()
                                .map(|a| (guarded(rule.id(), || rule.evaluate(a)), vec![a]))
                                .collect()
                        }
                        RuleKind::Compare(rule) => {
                            evaluation.compare_invocations += pairs.len();
                            pairs
                                .par_iter()
                                .map(|&(i, j)| {
                                    let (left, right) = (&artifacts[i], &artifacts[j]);
                                    let outcome = guarded(rule.id(), || rule.evaluate(left, right));
                                    (outcome, vec![left, right])
                                })
                                .collect()
                        }
                    };
                for (outcome, involved) in outcomes {
                    collect(&mut evaluation, ruleset, rule, outcome, involved);
                }
            }
        }

        info!(
            violations = evaluation.violations.len(),
            failures = evaluation.failures.len(),
            "policy evaluation finished"
        );
        evaluation
    }
}

/// Run one rule invocation, turning a panic into a [`RuleError`].
fn guarded<F>(rule_id: &str, invoke: F) -> Result<Option<Violation>, RuleError>
where
    F: FnOnce() -> Result<Option<Violation>, RuleError>,
{
    panic::catch_unwind(AssertUnwindSafe(invoke)).unwrap_or_else(|payload| {
        Err(RuleError {
            rule_id: rule_id.to_string(),
            message: format!("rule panicked: {}", panic_message(payload.as_ref())),
        })
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

fn collect(
    evaluation: &mut PolicyEvaluation,
    ruleset: &Ruleset,
    rule: &RuleKind,
    outcome: Result<Option<Violation>, RuleError>,
    involved: Vec<&Artifact>,
) {
    match outcome {
        Ok(Some(violation)) => {
            debug!(rule = %violation.rule_id, "violation");
            evaluation
                .violations
                .push(violation.with_ruleset(ruleset.name()));
        }
        Ok(None) => {}
        Err(err) => {
            warn!(ruleset = ruleset.name(), rule = rule.id(), error = %err, "rule invocation failed");
            let diagnostic = Violation::new(
                rule.id(),
                format!("rule evaluation failed: {}", err.message),
                Severity::Warn,
                involved.into_iter().cloned(),
            )
            .with_ruleset(ruleset.name());
            evaluation.violations.push(diagnostic);
            evaluation.failures.push(RuleFailure {
                ruleset: ruleset.name().to_string(),
                rule_id: err.rule_id,
                message: err.message,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ruleset::StaticRulesets;
    use crate::test_support::{FailingRule, FlagRule, PanickingRule, generic_artifact};

    fn resolver() -> StaticRulesets {
        let mut rulesets = StaticRulesets::new();
        rulesets.insert(Ruleset::new(
            "demo",
            "1.0.0",
            vec![
                RuleKind::single(FlagRule::new("demo.proprietary", Severity::Fail)),
                RuleKind::single(FailingRule::new("demo.broken")),
            ],
        ));
        rulesets
    }

    #[test]
    fn unknown_ruleset_is_fatal_before_evaluation() {
        let err = PolicyEngine::configure(&["demo", "missing"], &resolver()).unwrap_err();
        assert_eq!(
            err,
            PolicyError::UnknownRuleset {
                id: "missing".to_string(),
                available: vec!["demo".to_string()],
            }
        );
        assert_eq!(err.to_string(), "unknown ruleset 'missing' (available: demo)");
    }

    #[test]
    fn empty_ruleset_list_is_rejected() {
        let ids: [&str; 0] = [];
        assert_eq!(
            PolicyEngine::configure(&ids, &resolver()).unwrap_err(),
            PolicyError::NoRulesets
        );
    }

    #[test]
    fn rule_errors_become_diagnostics_and_evaluation_continues() {
        let engine = PolicyEngine::configure(&["demo"], &resolver()).expect("configure");
        let artifacts = vec![
            generic_artifact("a", "1.0").with_flag("proprietary", true),
            generic_artifact("b", "1.0"),
        ];

        let evaluation = engine.evaluate(&artifacts);

        assert_eq!(evaluation.single_invocations, 4);
        assert_eq!(evaluation.failures.len(), 2);
        assert_eq!(evaluation.failures[0].rule_id, "demo.broken");

        let flagged: Vec<&Violation> = evaluation
            .violations
            .iter()
            .filter(|v| v.rule_id == "demo.proprietary")
            .collect();
        assert_eq!(flagged.len(), 1);
        assert_eq!(flagged[0].failing_artifacts, vec![artifacts[0].clone()]);
        assert_eq!(flagged[0].ruleset.as_deref(), Some("demo"));

        let diagnostics: Vec<&Violation> = evaluation
            .violations
            .iter()
            .filter(|v| v.rule_id == "demo.broken")
            .collect();
        assert_eq!(diagnostics.len(), 2);
        assert!(diagnostics.iter().all(|v| v.severity == Severity::Warn));
    }

    #[test]
    fn panicking_rules_become_diagnostics() {
        let mut rulesets = StaticRulesets::new();
        rulesets.insert(Ruleset::new(
            "fragile",
            "1.0.0",
            vec![
                RuleKind::single(PanickingRule::new("fragile.panics")),
                RuleKind::single(FlagRule::new("fragile.proprietary", Severity::Fail)),
            ],
        ));
        let engine = PolicyEngine::configure(&["fragile"], &rulesets).expect("configure");
        let artifacts = vec![generic_artifact("a", "1.0").with_flag("proprietary", true)];

        let evaluation = engine.evaluate(&artifacts);

        assert_eq!(evaluation.failures.len(), 1);
        assert_eq!(evaluation.failures[0].rule_id, "fragile.panics");
        assert_eq!(evaluation.failures[0].message, "rule panicked: index out of range");
        let diagnostic = evaluation
            .violations
            .iter()
            .find(|v| v.rule_id == "fragile.panics")
            .expect("diagnostic violation");
        assert_eq!(diagnostic.severity, Severity::Warn);
        assert_eq!(diagnostic.failing_artifacts, artifacts);
        assert!(
            evaluation
                .violations
                .iter()
                .any(|v| v.rule_id == "fragile.proprietary")
        );
    }

    #[test]
    fn engine_describes_its_rulesets() {
        let engine = PolicyEngine::configure(&["demo"], &resolver()).expect("configure");
        assert_eq!(engine.description(), "demo@1.0.0");
        assert_eq!(engine.rulesets().len(), 1);
    }
}

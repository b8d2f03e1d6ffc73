//! Pure policy evaluation (no IO).
//!
//! Input: artifacts built elsewhere plus an [`policy::EffectiveConfig`].
//! Output: a merged [`stage::StageResult`], processing messages and a
//! [`report::DomainReport`] with findings and verdict.

#![forbid(unsafe_code)]

pub mod checker;
pub mod checks;
pub mod engine;
pub mod fingerprint;
pub mod pipeline;
pub mod policy;
pub mod processors;
pub mod report;
pub mod reporter;
pub mod rule;
pub mod ruleset;
pub mod stage;
pub mod validators;
pub mod violation;

#[cfg(test)]
mod proptest;
#[cfg(test)]
mod test_support;

pub use checker::{ComplianceChecker, ComplianceStage, PolicyEngineChecker, fail_summary, post_process_result};
pub use engine::{PolicyEngine, PolicyError, PolicyEvaluation, RuleFailure};
pub use pipeline::{Pipeline, build_pipeline};
pub use policy::EffectiveConfig;
pub use report::{DomainReport, build_report};
pub use reporter::{ProcessingMessage, ProcessingReport, ProcessingReporter};
pub use rule::{CompareArtifactRule, Rule, RuleError, RuleKind, RuleMeta, SingleArtifactRule};
pub use ruleset::{Ruleset, RulesetResolver, StaticRulesets};
pub use stage::{Attachable, FailCauses, Processor, StageResult, run_stages};
pub use violation::Violation;

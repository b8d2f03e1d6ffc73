//! Assembling the stage sequence for one run.
//!
//! Order: configuration checker, removals, additions, overrides, license
//! resolution, then the compliance stages (rule engine first, validators
//! after). Configuration errors surface before any stage runs.

use crate::checker::{ComplianceStage, PolicyEngineChecker};
use crate::checks::builtin_rulesets;
use crate::engine::{PolicyEngine, PolicyError};
use crate::policy::EffectiveConfig;
use crate::processors::{
    AdditionHandler, ConfigurationChecker, LicenseResolver, OverrideHandler, RemovalHandler,
};
use crate::reporter::{ProcessingMessage, ProcessingReporter};
use crate::stage::{Processor, StageResult, run_stages};
use crate::validators::{LicenseValidator, SecurityValidator, SourceValidator};
use complyguard_domain_core::Artifact;
use complyguard_types::{MessageType, RulesetMeta};
use time::OffsetDateTime;
use tracing::info;

const VALIDATOR_VERSION: &str = env!("CARGO_PKG_VERSION");

pub struct Pipeline {
    processors: Vec<Box<dyn Processor>>,
    rulesets: Vec<RulesetMeta>,
}

impl Pipeline {
    pub fn stage_names(&self) -> Vec<&str> {
        self.processors.iter().map(|p| p.name()).collect()
    }

    /// Rulesets and validators the compliance stages evaluate.
    pub fn rulesets(&self) -> &[RulesetMeta] {
        &self.rulesets
    }

    pub fn run(&self, artifacts: Vec<Artifact>, reporter: &dyn ProcessingReporter) -> StageResult {
        info!(artifacts = artifacts.len(), stages = self.processors.len(), "running pipeline");
        run_stages(&self.processors, artifacts, reporter)
    }
}

/// Build the stages for `cfg`.
///
/// Unknown rulesets are fatal; the error is also reported as a
/// configuration message so it lands in the report.
pub fn build_pipeline(
    cfg: &EffectiveConfig,
    now: OffsetDateTime,
    reporter: &dyn ProcessingReporter,
) -> Result<Pipeline, PolicyError> {
    let resolver = builtin_rulesets(cfg);
    let engine = PolicyEngine::configure(&cfg.rulesets, &resolver).inspect_err(|err| {
        reporter.add(ProcessingMessage::new(MessageType::ConfigurationError, err.to_string()));
    })?;

    let mut rulesets: Vec<RulesetMeta> = engine
        .rulesets()
        .iter()
        .map(|r| RulesetMeta {
            name: r.name().to_string(),
            version: r.version().to_string(),
        })
        .collect();

    let override_selectors = cfg.overrides.iter().map(|o| o.selector.clone()).collect();
    let mut processors: Vec<Box<dyn Processor>> = vec![
        Box::new(ConfigurationChecker::new(override_selectors, cfg.removals.clone())),
        Box::new(RemovalHandler::new(cfg.removals.clone())),
        Box::new(AdditionHandler::new(cfg.additions.clone())),
        Box::new(OverrideHandler::new(cfg.overrides.clone())),
        Box::new(LicenseResolver::new(cfg.knowledge_base.clone())),
        Box::new(ComplianceStage::new(
            Box::new(PolicyEngineChecker::new(engine)),
            cfg.fail_on,
        )),
    ];

    let mut validator = |name: &str, stage: ComplianceStage| {
        rulesets.push(RulesetMeta {
            name: name.to_string(),
            version: VALIDATOR_VERSION.to_string(),
        });
        processors.push(Box::new(stage));
    };
    if cfg.license.enabled {
        validator(
            complyguard_types::ids::VALIDATOR_LICENSE,
            ComplianceStage::new(Box::new(LicenseValidator::new(cfg.license.clone())), cfg.fail_on),
        );
    }
    if cfg.security.enabled {
        validator(
            complyguard_types::ids::VALIDATOR_SECURITY,
            ComplianceStage::new(
                Box::new(SecurityValidator::new(cfg.security.clone(), now)),
                cfg.fail_on,
            ),
        );
    }
    if cfg.source.enabled {
        validator(
            complyguard_types::ids::VALIDATOR_SOURCE,
            ComplianceStage::new(Box::new(SourceValidator::new(cfg.source.clone())), cfg.fail_on),
        );
    }

    Ok(Pipeline {
        processors,
        rulesets,
    })
}

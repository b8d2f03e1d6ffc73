use crate::policy::ArtifactOverride;
use crate::reporter::{ProcessingMessage, ProcessingReporter};
use crate::stage::{Processor, StageResult};
use complyguard_domain_core::{Artifact, ArtifactSelector};
use complyguard_types::MessageType;
use rayon::prelude::*;
use tracing::info;

/// Drops artifacts matched by any removal selector.
#[derive(Clone, Debug, Default)]
pub struct RemovalHandler {
    removals: Vec<ArtifactSelector>,
}

impl RemovalHandler {
    pub fn new(removals: Vec<ArtifactSelector>) -> Self {
        Self { removals }
    }
}

impl Processor for RemovalHandler {
    fn name(&self) -> &str {
        "configuration-removals"
    }

    fn process(&self, artifacts: &mut Vec<Artifact>, _reporter: &dyn ProcessingReporter) -> StageResult {
        let kept: Vec<Artifact> = artifacts
            .iter()
            .filter(|a| !self.removals.iter().any(|s| s.matches(a)))
            .cloned()
            .collect();
        info!(removed = artifacts.len() - kept.len(), "removed configured artifacts");
        StageResult::new(kept)
    }
}

/// Adds artifacts declared only in configuration.
#[derive(Clone, Debug, Default)]
pub struct AdditionHandler {
    additions: Vec<Artifact>,
}

impl AdditionHandler {
    pub fn new(additions: Vec<Artifact>) -> Self {
        Self { additions }
    }
}

impl Processor for AdditionHandler {
    fn name(&self) -> &str {
        "configuration-additions"
    }

    fn process(&self, _artifacts: &mut Vec<Artifact>, _reporter: &dyn ProcessingReporter) -> StageResult {
        info!(added = self.additions.len(), "added configured artifacts");
        StageResult::appending(self.additions.clone())
    }
}

/// Applies configured facts and flags in place to every matching artifact.
#[derive(Clone, Debug, Default)]
pub struct OverrideHandler {
    overrides: Vec<ArtifactOverride>,
}

impl OverrideHandler {
    pub fn new(overrides: Vec<ArtifactOverride>) -> Self {
        Self { overrides }
    }
}

impl Processor for OverrideHandler {
    fn name(&self) -> &str {
        "configuration-overrides"
    }

    fn keeps_artifacts(&self) -> bool {
        true
    }

    fn process(&self, artifacts: &mut Vec<Artifact>, reporter: &dyn ProcessingReporter) -> StageResult {
        // One worker per artifact; each artifact is only ever mutated by one thread.
        artifacts.par_iter_mut().for_each(|artifact| {
            for entry in &self.overrides {
                if !entry.selector.matches(artifact) {
                    continue;
                }
                let before = artifact.label();
                artifact.override_with(&entry.artifact);
                reporter.add(
                    ProcessingMessage::new(
                        MessageType::OverrideArtifactValues,
                        format!("values of {before} overridden by configuration entry {}", entry.selector),
                    )
                    .with_identifier(before),
                );
            }
        });
        StageResult::default()
    }
}

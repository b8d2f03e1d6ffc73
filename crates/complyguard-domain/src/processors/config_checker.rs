use crate::reporter::{ProcessingMessage, ProcessingReporter};
use crate::stage::{Processor, StageResult};
use complyguard_domain_core::{Artifact, ArtifactSelector};
use complyguard_types::MessageType;
use tracing::debug;

/// Reports configuration entries whose selectors match no artifact.
///
/// Runs before any handler so removals are checked against the full set.
#[derive(Clone, Debug, Default)]
pub struct ConfigurationChecker {
    overrides: Vec<ArtifactSelector>,
    removals: Vec<ArtifactSelector>,
}

impl ConfigurationChecker {
    pub fn new(overrides: Vec<ArtifactSelector>, removals: Vec<ArtifactSelector>) -> Self {
        Self { overrides, removals }
    }

    fn check(
        selectors: &[ArtifactSelector],
        section: &str,
        artifacts: &[Artifact],
        reporter: &dyn ProcessingReporter,
    ) {
        for selector in selectors {
            if artifacts.iter().any(|a| selector.matches(a)) {
                continue;
            }
            debug!(%selector, section, "configuration entry matches no artifact");
            reporter.add(
                ProcessingMessage::new(
                    MessageType::UnnecessaryConfig,
                    format!("{section} entry {selector} does not match any artifact"),
                )
                .with_identifier(selector.to_string()),
            );
        }
    }
}

impl Processor for ConfigurationChecker {
    fn name(&self) -> &str {
        "configuration-checker"
    }

    fn keeps_artifacts(&self) -> bool {
        true
    }

    fn process(&self, artifacts: &mut Vec<Artifact>, reporter: &dyn ProcessingReporter) -> StageResult {
        Self::check(&self.overrides, "override", artifacts, reporter);
        Self::check(&self.removals, "removal", artifacts, reporter);
        StageResult::default()
    }
}

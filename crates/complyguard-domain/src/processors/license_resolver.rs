use crate::reporter::{ProcessingMessage, ProcessingReporter};
use crate::stage::{Processor, StageResult};
use complyguard_domain_core::facts::{
    ConfiguredLicenseInformation, DeclaredLicenseInformation, MissingLicenseInformation,
    ObservedLicenseInformation, OverriddenLicenseInformation,
};
use complyguard_domain_core::{Artifact, Fact, LicenseExpression, LicenseKnowledgeBase, SingleValueFact};
use complyguard_types::MessageType;
use rayon::prelude::*;
use std::sync::Arc;
use tracing::debug;

/// Canonicalizes license ids and fills names, texts and threat groups from
/// the knowledge base.
#[derive(Clone, Debug)]
pub struct LicenseResolver {
    kb: Arc<LicenseKnowledgeBase>,
}

impl LicenseResolver {
    pub fn new(kb: Arc<LicenseKnowledgeBase>) -> Self {
        Self { kb }
    }

    fn resolve<F>(&self, artifact: &mut Artifact, wrap: fn(LicenseExpression) -> F)
    where
        F: SingleValueFact<Payload = LicenseExpression>,
    {
        let Some(fact) = artifact.remove_fact::<F>() else {
            return;
        };
        let expression = self.kb.enrich_expression(fact.value().clone());
        for license in expression.licenses() {
            if !self.kb.knows(license) {
                debug!(license = %license.id, "license not in knowledge base");
            }
        }
        artifact.add_fact(wrap(expression));
    }
}

impl Processor for LicenseResolver {
    fn name(&self) -> &str {
        "license-resolver"
    }

    fn keeps_artifacts(&self) -> bool {
        true
    }

    fn process(&self, artifacts: &mut Vec<Artifact>, reporter: &dyn ProcessingReporter) -> StageResult {
        artifacts.par_iter_mut().for_each(|artifact| {
            self.resolve(artifact, DeclaredLicenseInformation::new);
            self.resolve(artifact, ObservedLicenseInformation::new);
            self.resolve(artifact, OverriddenLicenseInformation::new);
            self.resolve(artifact, ConfiguredLicenseInformation::new);

            if let Some(missing) = artifact.ask_for::<MissingLicenseInformation>()
                && !Fact::is_empty(missing)
            {
                let reasons: Vec<&str> = missing.reasons.iter().map(|r| r.marker_id()).collect();
                reporter.add(
                    ProcessingMessage::new(
                        MessageType::MissingLicenseInformation,
                        format!("{artifact} has no license: {}", reasons.join(", ")),
                    )
                    .with_identifier(artifact.label()),
                );
            }
        });
        StageResult::default()
    }
}

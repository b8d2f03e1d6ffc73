use crate::coordinate::Coordinate;
use crate::fact::{ArtifactIdentifier, DynFact, Fact, FactFamily, FactStore, SingleValueFact};
use crate::facts::{
    ArtifactMatchingMetadata, ConfiguredLicenseInformation, DeclaredLicenseInformation,
    MatchState, ObservedLicenseInformation, OverriddenLicenseInformation,
};
use crate::license::LicenseExpression;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::fmt::Write as _;

/// Well-known flag keys.
pub mod flags {
    pub const PROPRIETARY: &str = "proprietary";
    pub const MODIFIED_BY_CONFIGURATION: &str = "modified_by_configuration";
    pub const IGNORE_FOR_DOWNLOAD: &str = "ignore_for_download";
}

pub const UNKNOWN_ANALYSIS_SOURCE: &str = "UNKNOWN";

/// One third-party component and everything known about it.
///
/// Identity is derived from whichever identifier facts are present; an
/// artifact may carry several (for example generic and Maven coordinates).
#[derive(Clone, Debug, PartialEq)]
pub struct Artifact {
    facts: FactStore,
    flags: BTreeMap<String, bool>,
    analysis_source: String,
}

impl Default for Artifact {
    fn default() -> Self {
        Self {
            facts: FactStore::new(),
            flags: BTreeMap::new(),
            analysis_source: UNKNOWN_ANALYSIS_SOURCE.to_string(),
        }
    }
}

impl Artifact {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_source(analysis_source: impl Into<String>) -> Self {
        Self {
            analysis_source: analysis_source.into(),
            ..Self::default()
        }
    }

    pub fn analysis_source(&self) -> &str {
        &self.analysis_source
    }

    /// Add `fact`, merging with an existing fact of the same kind.
    pub fn add_fact<F: Fact>(&mut self, fact: F) -> &mut Self {
        self.facts.add(fact);
        self
    }

    pub fn with_fact<F: Fact>(mut self, fact: F) -> Self {
        self.facts.add(fact);
        self
    }

    pub fn ask_for<F: Fact>(&self) -> Option<&F> {
        self.facts.ask_for::<F>()
    }

    pub fn ask_for_get<F: SingleValueFact>(&self) -> Option<&F::Payload> {
        self.facts.ask_for_get::<F>()
    }

    pub fn ask_for_all(&self, family: FactFamily) -> Vec<&dyn DynFact> {
        self.facts.ask_for_all(family)
    }

    pub fn remove_fact<F: Fact>(&mut self) -> Option<F> {
        self.facts.remove::<F>()
    }

    pub fn facts(&self) -> &FactStore {
        &self.facts
    }

    pub fn identifiers(&self) -> Vec<&dyn ArtifactIdentifier> {
        self.facts.identifiers()
    }

    /// Distinct package coordinates derivable from all identifier facts.
    pub fn coordinates(&self) -> Vec<Coordinate> {
        self.identifiers()
            .into_iter()
            .flat_map(|id| id.coordinates())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn set_flag(&mut self, key: impl Into<String>, value: bool) -> &mut Self {
        self.flags.insert(key.into(), value);
        self
    }

    pub fn with_flag(mut self, key: impl Into<String>, value: bool) -> Self {
        self.set_flag(key, value);
        self
    }

    /// Absent flags read as `false`.
    pub fn flag(&self, key: &str) -> bool {
        self.flags.get(key).copied().unwrap_or(false)
    }

    pub fn flags(&self) -> &BTreeMap<String, bool> {
        &self.flags
    }

    pub fn is_proprietary(&self) -> bool {
        self.flag(flags::PROPRIETARY)
    }

    pub fn match_state(&self) -> MatchState {
        self.ask_for_get::<ArtifactMatchingMetadata>()
            .copied()
            .unwrap_or_default()
    }

    /// The license the artifact is distributed under.
    ///
    /// Configured beats overridden, which beats declared AND observed.
    pub fn final_licenses(&self) -> LicenseExpression {
        if let Some(configured) = self.ask_for_get::<ConfiguredLicenseInformation>() {
            return configured.clone();
        }
        if let Some(overridden) = self.ask_for_get::<OverriddenLicenseInformation>() {
            return overridden.clone();
        }
        let declared = self
            .ask_for_get::<DeclaredLicenseInformation>()
            .cloned()
            .unwrap_or_default();
        let observed = self
            .ask_for_get::<ObservedLicenseInformation>()
            .cloned()
            .unwrap_or_default();
        declared.and(observed)
    }

    /// Apply every non-empty fact and flag of `precedent` on top of this artifact.
    pub fn override_with(&mut self, precedent: &Artifact) {
        self.facts.merge_from(&precedent.facts);
        for (key, value) in &precedent.flags {
            self.flags.insert(key.clone(), *value);
        }
        self.set_flag(flags::MODIFIED_BY_CONFIGURATION, true);
    }

    /// Whether any identifier of one artifact wildcard-matches any identifier
    /// of the other, in either direction.
    ///
    /// This is deliberately lenient: `pkg:generic/foo@*` and
    /// `pkg:generic/foo@1.0` count as duplicates. The relation is symmetric
    /// but not transitive.
    pub fn is_potential_duplicate_of(&self, other: &Artifact) -> bool {
        let theirs = other.identifiers();
        self.identifiers().into_iter().any(|mine| {
            theirs
                .iter()
                .any(|their| mine.matches(*their) || their.matches(mine))
        })
    }

    /// Short identity used in messages and reports.
    pub fn label(&self) -> String {
        if let Some(coordinate) = self.coordinates().first() {
            return coordinate.to_string();
        }
        let described: Vec<String> = self
            .identifiers()
            .into_iter()
            .map(|id| id.describe())
            .collect();
        if described.is_empty() {
            "unidentified artifact".to_string()
        } else {
            described.join(", ")
        }
    }

    pub fn pretty_print(&self) -> String {
        let mut out = format!("Artifact (analysis source: {})\n", self.analysis_source);
        let set_flags: Vec<&str> = self
            .flags
            .iter()
            .filter(|(_, v)| **v)
            .map(|(k, _)| k.as_str())
            .collect();
        if !set_flags.is_empty() {
            let _ = writeln!(out, "  flags: {}", set_flags.join(", "));
        }
        for fact in self.facts.iter() {
            let _ = writeln!(out, "  {}: {}", fact.content_name(), fact.describe());
        }
        out
    }
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Artifact{{{}}}", self.label())
    }
}

//! Read-only predicates over artifacts, identifiers and coordinates.

use crate::artifact::Artifact;
use crate::coordinate::Coordinate;
use crate::fact::{ArtifactIdentifier, DynFact};
use std::fmt;
use std::sync::Arc;

#[derive(Clone, Debug)]
pub enum ArtifactSelector {
    /// Wildcard match against identifier facts of the same kind.
    Identifier(Arc<dyn ArtifactIdentifier>),
    /// Wildcard match against the artifact's package coordinates.
    Coordinate(Coordinate),
    /// Every member must match. A single member stands for itself.
    And(Vec<ArtifactSelector>),
}

impl ArtifactSelector {
    pub fn identifier<I: ArtifactIdentifier>(identifier: I) -> Self {
        Self::Identifier(Arc::new(identifier))
    }

    pub fn coordinate(coordinate: Coordinate) -> Self {
        Self::Coordinate(coordinate)
    }

    pub fn and(selectors: impl IntoIterator<Item = ArtifactSelector>) -> Self {
        Self::And(selectors.into_iter().collect())
    }

    /// Strip singleton AND-sets down to their member.
    pub fn normalized(&self) -> &ArtifactSelector {
        match self {
            Self::And(members) if members.len() == 1 => members[0].normalized(),
            other => other,
        }
    }

    pub fn matches(&self, artifact: &Artifact) -> bool {
        match self {
            Self::Identifier(pattern) => artifact
                .identifiers()
                .into_iter()
                .any(|id| pattern.matches(id)),
            Self::Coordinate(pattern) => artifact
                .coordinates()
                .iter()
                .any(|value| pattern.matches(value)),
            Self::And(members) => members.iter().all(|s| s.matches(artifact)),
        }
    }

    pub fn matches_identifier(&self, identifier: &dyn ArtifactIdentifier) -> bool {
        match self {
            Self::Identifier(pattern) => pattern.matches(identifier),
            Self::Coordinate(pattern) => identifier
                .coordinates()
                .iter()
                .any(|value| pattern.matches(value)),
            Self::And(members) => members.iter().all(|s| s.matches_identifier(identifier)),
        }
    }

    pub fn matches_coordinate(&self, coordinate: &Coordinate) -> bool {
        match self {
            Self::Identifier(pattern) => pattern
                .coordinates()
                .iter()
                .any(|p| p.matches(coordinate)),
            Self::Coordinate(pattern) => pattern.matches(coordinate),
            Self::And(members) => members.iter().all(|s| s.matches_coordinate(coordinate)),
        }
    }
}

impl PartialEq for ArtifactSelector {
    fn eq(&self, other: &Self) -> bool {
        match (self.normalized(), other.normalized()) {
            (Self::Identifier(a), Self::Identifier(b)) => a.dyn_eq(&**b),
            (Self::Coordinate(a), Self::Coordinate(b)) => a == b,
            (Self::And(a), Self::And(b)) => {
                a.len() == b.len()
                    && a.iter().all(|s| b.contains(s))
                    && b.iter().all(|s| a.contains(s))
            }
            _ => false,
        }
    }
}

impl fmt::Display for ArtifactSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.normalized() {
            Self::Identifier(id) => write!(f, "{}({})", id.content_name(), id.describe()),
            Self::Coordinate(c) => write!(f, "{c}"),
            Self::And(members) => {
                f.write_str("[")?;
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" AND ")?;
                    }
                    write!(f, "{member}")?;
                }
                f.write_str("]")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facts::{ArtifactFilename, GenericCoordinates, MavenCoordinates};

    fn purl(s: &str) -> Coordinate {
        Coordinate::parse(s).expect("valid coordinate")
    }

    fn util() -> Artifact {
        Artifact::new()
            .with_fact(MavenCoordinates::new("org.example", "util", "1.0"))
            .with_fact(ArtifactFilename::new("util-1.0.jar"))
    }

    #[test]
    fn leaf_selector_matches_same_kind_with_wildcards() {
        let selector = ArtifactSelector::identifier(MavenCoordinates::new("org.example", "*", "1.*"));
        assert!(selector.matches(&util()));
        let other = ArtifactSelector::identifier(GenericCoordinates::new("util", "1.0"));
        assert!(!other.matches(&util()));
    }

    #[test]
    fn coordinate_selector_matches_derived_coordinates() {
        let selector = ArtifactSelector::coordinate(purl("pkg:maven/org.example/*@*"));
        assert!(selector.matches(&util()));
        assert!(!ArtifactSelector::coordinate(purl("pkg:npm/util@*")).matches(&util()));
    }

    #[test]
    fn and_set_requires_every_member() {
        let by_name = ArtifactSelector::identifier(ArtifactFilename::new("util-*.jar"));
        let by_group = ArtifactSelector::coordinate(purl("pkg:maven/org.example/*"));
        let by_other_group = ArtifactSelector::coordinate(purl("pkg:maven/com.example/*"));

        let both = ArtifactSelector::and([by_name.clone(), by_group.clone()]);
        assert_eq!(both.matches(&util()), by_name.matches(&util()) && by_group.matches(&util()));
        assert!(both.matches(&util()));
        assert!(!ArtifactSelector::and([by_name, by_other_group]).matches(&util()));
    }

    #[test]
    fn singleton_and_set_is_interchangeable_with_its_member() {
        let member = ArtifactSelector::coordinate(purl("pkg:generic/foo@*"));
        let singleton = ArtifactSelector::and([member.clone()]);
        assert_eq!(singleton, member);
        assert_eq!(member, singleton);
        assert_eq!(singleton.to_string(), member.to_string());
        assert_eq!(singleton.to_string(), "pkg:generic/foo@*");
    }

    #[test]
    fn and_set_equality_ignores_order() {
        let a = ArtifactSelector::coordinate(purl("pkg:generic/a"));
        let b = ArtifactSelector::identifier(ArtifactFilename::new("b.jar"));
        assert_eq!(
            ArtifactSelector::and([a.clone(), b.clone()]),
            ArtifactSelector::and([b.clone(), a.clone()])
        );
        assert_ne!(ArtifactSelector::and([a.clone(), b]), a);
    }

    #[test]
    fn matching_does_not_mutate_operands() {
        let artifact = util();
        let before = artifact.clone();
        let selector = ArtifactSelector::identifier(ArtifactFilename::new("*.jar"));
        assert!(selector.matches(&artifact));
        assert_eq!(artifact, before);
    }

    #[test]
    fn identifier_and_coordinate_entry_points() {
        let selector = ArtifactSelector::identifier(MavenCoordinates::new("org.example", "util", "*"));
        let concrete = MavenCoordinates::new("org.example", "util", "2.0");
        assert!(selector.matches_identifier(&concrete));
        assert!(selector.matches_coordinate(&purl("pkg:maven/org.example/util@2.0")));
        assert!(!selector.matches_coordinate(&purl("pkg:maven/org.example/other@2.0")));
    }

    #[test]
    fn leaf_display_names_the_fact_kind() {
        let selector = ArtifactSelector::identifier(ArtifactFilename::new("util.jar"));
        assert_eq!(selector.to_string(), "Filename(util.jar)");
    }
}

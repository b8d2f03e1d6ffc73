//! Property-based tests for the fact model.
//!
//! Invariants covered:
//! - wildcard laws (null pattern, reflexivity, literal characters)
//! - AND-set selectors behave as the conjunction of their members
//! - replace-merge is idempotent
//! - potential-duplicate detection is symmetric

use crate::artifact::Artifact;
use crate::coordinate::Coordinate;
use crate::fact::Fact;
use crate::facts::{ArtifactCoordinates, ArtifactFilename, ArtifactSourceUrl, GenericCoordinates};
use crate::selector::ArtifactSelector;
use crate::wildcard::matches;
use proptest::prelude::*;

// ============================================================================
// Strategies
// ============================================================================

/// Values free of `*`, including regex metacharacters.
fn arb_literal() -> impl Strategy<Value = String> {
    prop::string::string_regex(r"[a-z0-9.+?()\[\]^$|\\-]{0,12}").unwrap()
}

fn arb_name() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z][a-z0-9-]{0,8}").unwrap()
}

fn arb_version_or_wildcard() -> impl Strategy<Value = String> {
    prop_oneof![
        (0u32..5, 0u32..5).prop_map(|(a, b)| format!("{a}.{b}")),
        (0u32..5).prop_map(|a| format!("{a}.*")),
        Just("*".to_string()),
    ]
}

fn arb_generic_artifact() -> impl Strategy<Value = Artifact> {
    (prop_oneof![Just("foo"), Just("bar")], arb_version_or_wildcard()).prop_map(|(name, version)| {
        let coordinate = Coordinate::generic(name, Some(version.as_str())).unwrap();
        Artifact::new().with_fact(ArtifactCoordinates::new([coordinate]))
    })
}

fn arb_selector() -> impl Strategy<Value = ArtifactSelector> {
    prop_oneof![
        (arb_name(), arb_version_or_wildcard()).prop_map(|(name, version)| {
            ArtifactSelector::identifier(GenericCoordinates::new(&name, &version))
        }),
        arb_version_or_wildcard().prop_map(|version| {
            ArtifactSelector::coordinate(Coordinate::generic("foo", Some(version.as_str())).unwrap())
        }),
        prop_oneof![Just("foo-*.jar"), Just("*.jar"), Just("bar.jar")]
            .prop_map(|f| ArtifactSelector::identifier(ArtifactFilename::new(f))),
    ]
}

fn arb_artifact() -> impl Strategy<Value = Artifact> {
    (
        prop_oneof![Just("foo"), Just("bar")],
        arb_version_or_wildcard(),
        prop_oneof![Just("foo-1.0.jar"), Just("bar.jar"), Just("baz.zip")],
    )
        .prop_map(|(name, version, filename)| {
            Artifact::new()
                .with_fact(GenericCoordinates::new(name, &version))
                .with_fact(ArtifactFilename::new(filename))
        })
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn null_pattern_matches_everything(value in arb_literal()) {
        prop_assert!(matches(None, Some(&value)));
        prop_assert!(matches(None, None));
    }

    #[test]
    fn every_value_matches_itself(value in arb_literal()) {
        prop_assert!(matches(Some(&value), Some(&value)));
    }

    #[test]
    fn literal_patterns_only_match_equal_values(a in arb_literal(), b in arb_literal()) {
        prop_assert_eq!(matches(Some(&a), Some(&b)), a == b);
    }

    #[test]
    fn star_prefix_and_suffix(prefix in arb_literal(), middle in arb_literal(), suffix in arb_literal()) {
        let pattern = format!("{prefix}*{suffix}");
        let value = format!("{prefix}{middle}{suffix}");
        prop_assert!(matches(Some(&pattern), Some(&value)));
    }

    #[test]
    fn and_set_is_conjunction(s1 in arb_selector(), s2 in arb_selector(), artifact in arb_artifact()) {
        let both = ArtifactSelector::and([s1.clone(), s2.clone()]);
        prop_assert_eq!(both.matches(&artifact), s1.matches(&artifact) && s2.matches(&artifact));
    }

    #[test]
    fn singleton_and_set_is_its_member(s in arb_selector(), artifact in arb_artifact()) {
        let singleton = ArtifactSelector::and([s.clone()]);
        prop_assert_eq!(&singleton, &s);
        prop_assert_eq!(singleton.to_string(), s.to_string());
        prop_assert_eq!(singleton.matches(&artifact), s.matches(&artifact));
    }

    #[test]
    fn replace_merge_is_idempotent(url in "[a-z]{1,10}") {
        let fact = ArtifactSourceUrl(format!("https://{url}.example/src.zip"));
        prop_assert_eq!(fact.clone().merge_with(fact.clone()), fact);
    }

    #[test]
    fn potential_duplicates_are_symmetric(a in arb_generic_artifact(), b in arb_generic_artifact()) {
        prop_assert_eq!(a.is_potential_duplicate_of(&b), b.is_potential_duplicate_of(&a));
    }
}

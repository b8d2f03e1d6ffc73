//! Explain registry for rules.
//!
//! Maps rule IDs to human-readable explanations with remediation guidance.

use crate::ids;

/// Explanation entry for a rule.
#[derive(Debug, Clone)]
pub struct Explanation {
    /// Short description of the rule.
    pub title: &'static str,
    /// What the rule does and why it exists.
    pub description: &'static str,
    /// How to resolve violations.
    pub remediation: &'static str,
    /// Before/after configuration or inventory examples.
    pub examples: ExamplePair,
}

/// Before and after examples.
#[derive(Debug, Clone)]
pub struct ExamplePair {
    /// Input that would trigger a finding.
    pub before: &'static str,
    /// Input that passes the rule.
    pub after: &'static str,
}

/// Look up an explanation by rule id.
///
/// Returns `None` if the identifier is not recognized.
pub fn lookup_explanation(identifier: &str) -> Option<Explanation> {
    match identifier {
        ids::RULE_BASIC_NO_LICENSE => Some(explain_basic_no_license()),
        ids::RULE_BASIC_UNKNOWN_MATCH_STATE => Some(explain_unknown_match_state()),
        ids::RULE_BASIC_MISSING_IDENTITY => Some(explain_missing_identity()),
        ids::RULE_BASIC_DUPLICATE_ARTIFACT => Some(explain_duplicate_artifact()),
        ids::RULE_LICENSING_UNKNOWN_LICENSE => Some(explain_unknown_license()),
        ids::RULE_LICENSING_STRONG_COPYLEFT => Some(explain_strong_copyleft()),
        ids::RULE_LICENSING_PROPRIETARY_COPYLEFT_MIX => Some(explain_proprietary_copyleft_mix()),
        ids::RULE_LICENSE_NO_LICENSE => Some(explain_license_no_license()),
        ids::RULE_LICENSE_FORBIDDEN => Some(explain_license_forbidden()),
        ids::RULE_LICENSE_NO_TEXT => Some(explain_license_no_text()),
        ids::RULE_SECURITY_FORBIDDEN_STATUS => Some(explain_security_forbidden_status()),
        ids::RULE_SECURITY_SEVERITY_LIMIT => Some(explain_security_severity_limit()),
        ids::RULE_SOURCE_MISSING_SOURCES => Some(explain_missing_sources()),
        ids::RULE_SOURCE_MISSING_BINARY => Some(explain_missing_binary()),
        _ => None,
    }
}

/// List all known rule IDs.
pub fn all_rule_ids() -> &'static [&'static str] {
    &[
        ids::RULE_BASIC_NO_LICENSE,
        ids::RULE_BASIC_UNKNOWN_MATCH_STATE,
        ids::RULE_BASIC_MISSING_IDENTITY,
        ids::RULE_BASIC_DUPLICATE_ARTIFACT,
        ids::RULE_LICENSING_UNKNOWN_LICENSE,
        ids::RULE_LICENSING_STRONG_COPYLEFT,
        ids::RULE_LICENSING_PROPRIETARY_COPYLEFT_MIX,
        ids::RULE_LICENSE_NO_LICENSE,
        ids::RULE_LICENSE_FORBIDDEN,
        ids::RULE_LICENSE_NO_TEXT,
        ids::RULE_SECURITY_FORBIDDEN_STATUS,
        ids::RULE_SECURITY_SEVERITY_LIMIT,
        ids::RULE_SOURCE_MISSING_SOURCES,
        ids::RULE_SOURCE_MISSING_BINARY,
    ]
}

// --- Ruleset: basic ---

fn explain_basic_no_license() -> Explanation {
    Explanation {
        title: "Component Without License",
        description: "\
Flags non-proprietary components whose final license is empty.

The final license is chosen by precedence: a configured license wins over an
overridden one, which wins over the combination (AND) of declared and observed
licenses. A component with none of these cannot be cleared for distribution.",
        remediation: "\
Provide license information for the component:
- fix the upstream metadata so the analyzer reports a declared license
- or add a configuration override that sets `declared_license` / `configured_license`
- or mark the component `proprietary = true` if it is your own code",
        examples: ExamplePair {
            before: r#"{ "coordinates": ["pkg:maven/org.example/util@1.0"] }"#,
            after: r#"[[overrides]]
selector = "pkg:maven/org.example/util@1.0"
configured_license = "Apache-2.0""#,
        },
    }
}

fn explain_unknown_match_state() -> Explanation {
    Explanation {
        title: "Unknown Match State",
        description: "\
Reports components whose identification against the upstream catalog is
`unknown`. Such components were neither matched exactly nor by similarity, so
the remaining metadata may be unreliable.",
        remediation: "\
Re-run the analysis with better input (binary hashes, full coordinates), or
override the component's coordinates in configuration.",
        examples: ExamplePair {
            before: r#"{ "filename": "blob.jar", "match_state": "unknown" }"#,
            after: r#"{ "filename": "blob.jar", "match_state": "exact",
  "coordinates": ["pkg:maven/org.example/blob@2.1"] }"#,
        },
    }
}

fn explain_missing_identity() -> Explanation {
    Explanation {
        title: "Component Without Identity",
        description: "\
Flags components that carry no identity fact at all: no coordinates, no
package-manager specific coordinates, and no filename or hash. Selectors and
duplicate detection cannot address such a component.",
        remediation: "Make the analyzer emit at least a filename, hash, or package URL.",
        examples: ExamplePair {
            before: r#"{ "proprietary": false }"#,
            after: r#"{ "filename": "lib.jar", "hash": "9f86d081884c7d65" }"#,
        },
    }
}

fn explain_duplicate_artifact() -> Explanation {
    Explanation {
        title: "Potential Duplicate Components",
        description: "\
Compares every unordered pair of components and reports pairs where an identity
fact of one wildcard-matches an identity fact of the other, in either direction.

The match is intentionally lenient: `pkg:generic/foo@*` and `pkg:generic/foo@1.0`
are potential duplicates because the first matches the second. The relation is
symmetric but not transitive.",
        remediation: "\
Remove one of the two components from the inventory, or tighten the coordinates
so that no wildcard remains.",
        examples: ExamplePair {
            before: r#"["pkg:generic/foo@1.0"], ["pkg:generic/foo@*"]"#,
            after: r#"["pkg:generic/foo@1.0"], ["pkg:generic/bar@2.0"]"#,
        },
    }
}

// --- Ruleset: licensing ---

fn explain_unknown_license() -> Explanation {
    Explanation {
        title: "License Not In Knowledge Base",
        description: "\
Reports components whose final license mentions an identifier that the license
knowledge base neither knows nor can resolve through an alias.",
        remediation: "\
Add the license to the knowledge base (`[licenses.\"<id>\"]`) or register the
spelling as an alias of a known license.",
        examples: ExamplePair {
            before: r#"declared_license = "The MIT License""#,
            after: r#"[licenses."MIT"]
aliases = ["The MIT License"]"#,
        },
    }
}

fn explain_strong_copyleft() -> Explanation {
    Explanation {
        title: "Strong Copyleft License",
        description: "\
Flags components whose final license cannot be satisfied without accepting a
license in the `strong-copyleft` threat group. A dual-licensed component that
offers a permissive alternative through OR is not flagged.",
        remediation: "\
Replace the component, obtain a commercial license, or configure the license
choice explicitly with `configured_license` when an alternative exists.",
        examples: ExamplePair {
            before: r#"declared_license = "GPL-3.0-only""#,
            after: r#"declared_license = "GPL-3.0-only OR MIT"
configured_license = "MIT""#,
        },
    }
}

fn explain_proprietary_copyleft_mix() -> Explanation {
    Explanation {
        title: "Proprietary And Strong Copyleft Mix",
        description: "\
Pairwise rule: reports a proprietary component shipped together with a component
under a strong copyleft license.",
        remediation: "Separate the distributions or replace the copyleft component.",
        examples: ExamplePair {
            before: r#"{ "proprietary": true }, { "licenses": { "declared": "GPL-2.0-only" } }"#,
            after: r#"{ "proprietary": true }, { "licenses": { "declared": "Apache-2.0" } }"#,
        },
    }
}

// --- Validators ---

fn explain_license_no_license() -> Explanation {
    Explanation {
        title: "License Information Missing",
        description: "The license validator found no final license for a non-proprietary component.",
        remediation: "Provide license information through the analyzer or a configuration override.",
        examples: ExamplePair {
            before: r#"{ "licenses": {} }"#,
            after: r#"{ "licenses": { "declared": "MIT" } }"#,
        },
    }
}

fn explain_license_forbidden() -> Explanation {
    Explanation {
        title: "Forbidden License",
        description: "\
The component's final license contains a license listed in
`validators.license.forbidden`. Licenses listed in `ignored` are skipped.",
        remediation: "Replace the component or remove the license from the forbidden list after legal review.",
        examples: ExamplePair {
            before: r#"[validators.license]
forbidden = ["AGPL-3.0-only"]"#,
            after: r#"[validators.license]
forbidden = ["AGPL-3.0-only"]
ignored = ["AGPL-3.0-only"]  # reviewed"#,
        },
    }
}

fn explain_license_no_text() -> Explanation {
    Explanation {
        title: "License Text Missing",
        description: "A license in the component's final license carries no license text.",
        remediation: "Add the text to the license knowledge base so attribution documents can be produced.",
        examples: ExamplePair {
            before: r#"[licenses."MIT"]
name = "MIT License""#,
            after: r#"[licenses."MIT"]
name = "MIT License"
text = "Permission is hereby granted, free of charge, ...""#,
        },
    }
}

fn explain_security_forbidden_status() -> Explanation {
    Explanation {
        title: "Security Issue With Forbidden Status",
        description: "\
The component has a security issue whose status is listed in
`validators.security.forbidden_statuses`. Issues marked `not_applicable`,
ignored references, and issues suppressed until a future date are skipped.",
        remediation: "Upgrade the component, or record a reviewed suppression with an expiry date.",
        examples: ExamplePair {
            before: r#"{ "reference": "CVE-2021-44228", "status": "open" }"#,
            after: r#"[[validators.security.suppress]]
reference = "CVE-2021-44228"
selector = "pkg:maven/org.apache.logging.log4j/log4j-core@*"
until = "2027-01-01T00:00:00Z""#,
        },
    }
}

fn explain_security_severity_limit() -> Explanation {
    Explanation {
        title: "Security Issue Above Severity Limit",
        description: "A security issue's score is greater than or equal to `validators.security.severity_limit`.",
        remediation: "Upgrade to a fixed version of the component.",
        examples: ExamplePair {
            before: r#"{ "reference": "CVE-2022-0001", "severity": 9.8 }"#,
            after: r#"{ "reference": "CVE-2022-0001", "severity": 9.8, "status": "resolved" }"#,
        },
    }
}

fn explain_missing_sources() -> Explanation {
    Explanation {
        title: "Sources Missing",
        description: "\
The component carries no source archive. Components matched by
`validators.source.allow_missing` are reported at info level instead.",
        remediation: "Provide the source archive, or allow-list the component after review.",
        examples: ExamplePair {
            before: r#"{ "file": "lib/util.jar" }"#,
            after: r#"{ "file": "lib/util.jar", "source_file": "lib/util-sources.jar" }"#,
        },
    }
}

fn explain_missing_binary() -> Explanation {
    Explanation {
        title: "Binary Missing",
        description: "\
The component has sources but no binary file, so the sources cannot be verified
against it. Components matched by `allow_incomplete` or `allow_missing` are
reported at info level instead.",
        remediation: "Provide the binary file or allow-list the component.",
        examples: ExamplePair {
            before: r#"{ "source_file": "lib/util-sources.jar" }"#,
            after: r#"{ "file": "lib/util.jar", "source_file": "lib/util-sources.jar" }"#,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_rule_id_has_an_explanation() {
        for id in all_rule_ids() {
            let exp = lookup_explanation(id).unwrap_or_else(|| panic!("missing {id}"));
            assert!(!exp.title.is_empty());
            assert!(!exp.remediation.is_empty());
        }
    }

    #[test]
    fn unknown_identifier_is_none() {
        assert!(lookup_explanation("deps.no_such_rule").is_none());
    }
}

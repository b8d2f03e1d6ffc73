use complyguard_domain_core::Artifact;
use sha2::{Digest, Sha256};

/// Compute a stable SHA-256 fingerprint for a violation.
///
/// Identity fields:
/// - rule_id
/// - canonical coordinates of every failing artifact, sorted
///
/// Artifacts without coordinates contribute their display label instead.
pub fn fingerprint_for_violation(rule_id: &str, artifacts: &[Artifact]) -> String {
    let mut identities: Vec<String> = artifacts
        .iter()
        .flat_map(|artifact| {
            let coordinates = artifact.coordinates();
            if coordinates.is_empty() {
                vec![artifact.label()]
            } else {
                coordinates
                    .into_iter()
                    .map(|c| c.canonical().to_string())
                    .collect()
            }
        })
        .collect();
    identities.sort();
    identities.dedup();

    let mut parts = vec![rule_id.to_string()];
    parts.extend(identities);
    let canonical = parts.join("|");

    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    let digest = hasher.finalize();
    hex::encode(digest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use complyguard_domain_core::facts::{ArtifactFilename, GenericCoordinates};

    #[test]
    fn fingerprint_ignores_artifact_order() {
        let a = Artifact::new().with_fact(GenericCoordinates::new("a", "1.0"));
        let b = Artifact::new().with_fact(GenericCoordinates::new("b", "2.0"));
        let forward = fingerprint_for_violation("basic.duplicate_artifact", &[a.clone(), b.clone()]);
        let backward = fingerprint_for_violation("basic.duplicate_artifact", &[b, a]);
        assert_eq!(forward, backward);
        assert_eq!(forward.len(), 64);
    }

    #[test]
    fn fingerprint_depends_on_rule_and_identity() {
        let a = Artifact::new().with_fact(GenericCoordinates::new("a", "1.0"));
        let unnamed = Artifact::new().with_fact(ArtifactFilename::new("a.jar"));
        assert_ne!(
            fingerprint_for_violation("basic.no_license", std::slice::from_ref(&a)),
            fingerprint_for_violation("basic.missing_identity", std::slice::from_ref(&a))
        );
        assert_ne!(
            fingerprint_for_violation("basic.no_license", &[a]),
            fingerprint_for_violation("basic.no_license", &[unnamed])
        );
    }
}

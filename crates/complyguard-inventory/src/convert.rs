use crate::model::{ComponentDoc, InventoryDocument, InventoryFile, SCHEMA_INVENTORY_V1};
use anyhow::{Context, bail};
use complyguard_domain_core::facts::{
    ArtifactCoordinates, ArtifactFile, ArtifactFilename, ArtifactHomepage, ArtifactIssues,
    ArtifactMatchingMetadata, ArtifactPathnames, ArtifactSourceFile, ArtifactSourceUrl,
    BundleCoordinates, CopyrightStatement, DeclaredLicenseInformation, DotNetCoordinates,
    FilenameEntry, GenericCoordinates, JavaScriptCoordinates, MavenCoordinates,
    MissingLicenseInformation, MissingLicenseReason, ObservedLicenseInformation,
};
use complyguard_domain_core::{Artifact, Coordinate, LicenseExpression, UNKNOWN_ANALYSIS_SOURCE, flags};
use std::collections::BTreeSet;

/// Parse one inventory document into artifacts, in document order.
///
/// `label` names the document in error messages.
pub fn parse_inventory(text: &str, label: &str) -> anyhow::Result<Vec<Artifact>> {
    let file: InventoryFile =
        serde_json::from_str(text).with_context(|| format!("parse inventory {label}"))?;
    let doc = match file {
        InventoryFile::Components(components) => InventoryDocument {
            components,
            ..InventoryDocument::default()
        },
        InventoryFile::Document(doc) => doc,
    };
    if let Some(schema) = doc.schema.as_deref()
        && schema != SCHEMA_INVENTORY_V1
    {
        bail!("{label}: unsupported inventory schema {schema} (expected {SCHEMA_INVENTORY_V1})");
    }

    let source = doc
        .analysis_source
        .as_deref()
        .unwrap_or(UNKNOWN_ANALYSIS_SOURCE);
    doc.components
        .iter()
        .enumerate()
        .map(|(i, c)| to_artifact(c, source).with_context(|| format!("{label}: components[{i}]")))
        .collect()
}

fn to_artifact(c: &ComponentDoc, default_source: &str) -> anyhow::Result<Artifact> {
    let mut artifact = Artifact::from_source(c.analysis_source.as_deref().unwrap_or(default_source));

    if !c.purls.is_empty() {
        let coordinates = c
            .purls
            .iter()
            .map(|p| Coordinate::parse(p).with_context(|| format!("invalid purl {p}")))
            .collect::<anyhow::Result<Vec<_>>>()?;
        artifact.add_fact(ArtifactCoordinates::new(coordinates));
    }
    if let Some(m) = &c.maven {
        artifact.add_fact(MavenCoordinates {
            group_id: m.group_id.clone(),
            artifact_id: m.artifact_id.clone(),
            version: m.version.clone(),
        });
    }
    if let Some(n) = &c.npm {
        artifact.add_fact(JavaScriptCoordinates {
            namespace: n.namespace.clone(),
            name: n.name.clone(),
            version: n.version.clone(),
        });
    }
    if let Some(n) = &c.nuget {
        artifact.add_fact(DotNetCoordinates {
            package_id: n.package_id.clone(),
            version: n.version.clone(),
        });
    }
    if let Some(b) = &c.bundle {
        artifact.add_fact(BundleCoordinates {
            symbolic_name: b.symbolic_name.clone(),
            version: b.version.clone(),
        });
    }
    if let Some(g) = &c.generic {
        artifact.add_fact(GenericCoordinates {
            name: g.name.clone(),
            version: g.version.clone(),
        });
    }
    for f in &c.files {
        artifact.add_fact(ArtifactFilename::from_entry(FilenameEntry::new(
            f.name.as_deref(),
            f.hash.as_deref(),
            f.algorithm.as_deref(),
        )));
    }

    let mut reasons: BTreeSet<MissingLicenseReason> =
        c.missing_license_reasons.iter().copied().collect();
    if let Some(text) = &c.declared_license
        && let Some(expression) = license(text, &mut reasons)?
    {
        artifact.add_fact(DeclaredLicenseInformation::new(expression));
    }
    if let Some(text) = &c.observed_license
        && let Some(expression) = license(text, &mut reasons)?
    {
        artifact.add_fact(ObservedLicenseInformation::new(expression));
    }
    if !reasons.is_empty() {
        artifact.add_fact(MissingLicenseInformation::new(reasons));
    }

    if let Some(copyright) = &c.copyright {
        artifact.add_fact(CopyrightStatement::new(copyright.clone()));
    }
    if let Some(url) = &c.homepage {
        artifact.add_fact(ArtifactHomepage(url.clone()));
    }
    if let Some(url) = &c.source_url {
        artifact.add_fact(ArtifactSourceUrl(url.clone()));
    }
    if let Some(path) = &c.file {
        artifact.add_fact(ArtifactFile(path.into()));
    }
    if let Some(path) = &c.source_file {
        artifact.add_fact(ArtifactSourceFile(path.into()));
    }
    if !c.pathnames.is_empty() {
        artifact.add_fact(ArtifactPathnames::new(c.pathnames.iter().cloned()));
    }
    if let Some(state) = c.match_state {
        artifact.add_fact(ArtifactMatchingMetadata::new(state));
    }
    if !c.issues.is_empty() {
        artifact.add_fact(ArtifactIssues::new(c.issues.iter().cloned()));
    }
    if c.proprietary {
        artifact.set_flag(flags::PROPRIETARY, true);
    }
    if c.ignore_for_download {
        artifact.set_flag(flags::IGNORE_FOR_DOWNLOAD, true);
    }
    Ok(artifact)
}

/// Parse a license expression; an expression made only of marker ids
/// yields reasons instead of licenses.
fn license(
    text: &str,
    reasons: &mut BTreeSet<MissingLicenseReason>,
) -> anyhow::Result<Option<LicenseExpression>> {
    let expression =
        LicenseExpression::parse(text).with_context(|| format!("invalid license expression {text}"))?;
    let licenses = expression.licenses();
    let markers: Vec<MissingLicenseReason> = licenses
        .iter()
        .filter_map(|l| MissingLicenseReason::from_marker_id(&l.id))
        .collect();
    let only_markers = !markers.is_empty() && markers.len() == licenses.len();
    reasons.extend(markers);
    if only_markers || expression.is_empty() {
        return Ok(None);
    }
    Ok(Some(expression))
}

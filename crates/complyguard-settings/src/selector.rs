//! Selector and identity strings.
//!
//! | prefix | leaf |
//! |---|---|
//! | `pkg:` | coordinate pattern |
//! | `filename:` | filename |
//! | `hash:` | filename hash |
//! | `maven:g:a[:v]` | Maven coordinates |
//! | `npm:[@scope/]name[@v]` | JavaScript coordinates |
//! | `nuget:id[@v]` | .NET coordinates |
//! | `bundle:symbolic-name[@v]` | bundle coordinates |
//! | `generic:name[@v]` | generic coordinates |

use crate::model::SelectorSpec;
use anyhow::{Context, bail};
use complyguard_domain_core::facts::{
    ArtifactCoordinates, ArtifactFilename, BundleCoordinates, DotNetCoordinates, FilenameEntry,
    GenericCoordinates, JavaScriptCoordinates, MavenCoordinates,
};
use complyguard_domain_core::{Artifact, ArtifactSelector, Coordinate, wildcard};

/// One parsed identity string.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Leaf {
    Coordinate(Coordinate),
    Filename(ArtifactFilename),
    Maven(MavenCoordinates),
    Npm(JavaScriptCoordinates),
    NuGet(DotNetCoordinates),
    Bundle(BundleCoordinates),
    Generic(GenericCoordinates),
}

impl Leaf {
    /// Parse `input`; a missing version becomes `default_version`.
    pub(crate) fn parse(input: &str, default_version: &str) -> anyhow::Result<Leaf> {
        let input = input.trim();
        if input.starts_with("pkg:") {
            let coordinate = Coordinate::parse(input)
                .with_context(|| format!("invalid coordinate selector: {input}"))?;
            let fields = [Some(coordinate.ty()), coordinate.namespace(), Some(coordinate.name())]
                .into_iter()
                .chain([coordinate.version(), coordinate.subpath()])
                .flatten()
                .chain(coordinate.qualifiers().values().map(String::as_str));
            check_patterns(input, fields)?;
            return Ok(Leaf::Coordinate(coordinate));
        }
        let Some((prefix, rest)) = input.split_once(':') else {
            bail!(
                "invalid selector: {input} (expected a pkg:, filename:, hash:, maven:, npm:, nuget:, bundle: or generic: prefix)"
            );
        };
        if rest.is_empty() {
            bail!("invalid selector: {input} (nothing after '{prefix}:')");
        }
        // Every field below is a slice of `rest`.
        check_patterns(input, [rest])?;
        let leaf = match prefix {
            "filename" => Leaf::Filename(ArtifactFilename::new(rest)),
            "hash" => Leaf::Filename(ArtifactFilename::from_entry(FilenameEntry::new(
                None,
                Some(rest),
                None,
            ))),
            "maven" => {
                let parts: Vec<&str> = rest.split(':').collect();
                match parts.as_slice() {
                    [group, artifact] => Leaf::Maven(MavenCoordinates::new(group, artifact, default_version)),
                    [group, artifact, version] => Leaf::Maven(MavenCoordinates::new(group, artifact, version)),
                    _ => bail!("invalid maven selector: {input} (expected maven:group:artifact[:version])"),
                }
            }
            "npm" => {
                let (name, version) = split_version(rest, default_version);
                let (namespace, name) = match name.split_once('/') {
                    Some((scope, name)) if scope.starts_with('@') => (&scope[1..], name),
                    _ => ("", name),
                };
                Leaf::Npm(JavaScriptCoordinates::new(namespace, name, version))
            }
            "nuget" => {
                let (id, version) = split_version(rest, default_version);
                Leaf::NuGet(DotNetCoordinates::new(id, version))
            }
            "bundle" => {
                let (name, version) = split_version(rest, default_version);
                Leaf::Bundle(BundleCoordinates::new(name, version))
            }
            "generic" => {
                let (name, version) = split_version(rest, default_version);
                Leaf::Generic(GenericCoordinates::new(name, version))
            }
            other => bail!("unknown selector prefix '{other}' in {input}"),
        };
        Ok(leaf)
    }

    pub(crate) fn into_selector(self) -> ArtifactSelector {
        match self {
            Leaf::Coordinate(c) => ArtifactSelector::coordinate(c),
            Leaf::Filename(f) => ArtifactSelector::identifier(f),
            Leaf::Maven(c) => ArtifactSelector::identifier(c),
            Leaf::Npm(c) => ArtifactSelector::identifier(c),
            Leaf::NuGet(c) => ArtifactSelector::identifier(c),
            Leaf::Bundle(c) => ArtifactSelector::identifier(c),
            Leaf::Generic(c) => ArtifactSelector::identifier(c),
        }
    }

    /// Add this identity to `artifact`; package coordinates are collected
    /// into `coordinates` first.
    pub(crate) fn add_to(self, artifact: &mut Artifact, coordinates: &mut Vec<Coordinate>) {
        match self {
            Leaf::Coordinate(c) => coordinates.push(c),
            Leaf::Filename(f) => {
                artifact.add_fact(f);
            }
            Leaf::Maven(c) => {
                artifact.add_fact(c);
            }
            Leaf::Npm(c) => {
                artifact.add_fact(c);
            }
            Leaf::NuGet(c) => {
                artifact.add_fact(c);
            }
            Leaf::Bundle(c) => {
                artifact.add_fact(c);
            }
            Leaf::Generic(c) => {
                artifact.add_fact(c);
            }
        }
    }
}

fn check_patterns<'a>(input: &str, patterns: impl IntoIterator<Item = &'a str>) -> anyhow::Result<()> {
    for pattern in patterns {
        wildcard::validate(pattern).with_context(|| format!("invalid wildcard pattern in selector: {input:?}"))?;
    }
    Ok(())
}

/// Split `name@version` on the last `@` that is not the leading scope marker.
fn split_version<'a>(value: &'a str, default_version: &'a str) -> (&'a str, &'a str) {
    match value.rfind('@') {
        Some(at) if at > 0 => (&value[..at], &value[at + 1..]),
        _ => (value, default_version),
    }
}

/// Parse one selector string. Unspecified versions match any version.
pub fn parse_selector(input: &str) -> anyhow::Result<ArtifactSelector> {
    Ok(Leaf::parse(input, "*")?.into_selector())
}

pub(crate) fn parse_spec(spec: &SelectorSpec) -> anyhow::Result<ArtifactSelector> {
    let parts = spec.parts();
    if parts.is_empty() {
        bail!("empty selector array");
    }
    let selectors = parts
        .into_iter()
        .map(parse_selector)
        .collect::<anyhow::Result<Vec<_>>>()?;
    Ok(ArtifactSelector::and(selectors))
}

pub(crate) fn parse_specs(specs: &[SelectorSpec]) -> anyhow::Result<Vec<ArtifactSelector>> {
    specs.iter().map(parse_spec).collect()
}

/// Identity facts of an artifact written in configuration.
pub(crate) fn add_identities(artifact: &mut Artifact, identities: &[String]) -> anyhow::Result<()> {
    let mut coordinates = Vec::new();
    for identity in identities {
        Leaf::parse(identity, "")
            .with_context(|| format!("invalid artifact identity: {identity}"))?
            .add_to(artifact, &mut coordinates);
    }
    if !coordinates.is_empty() {
        artifact.add_fact(ArtifactCoordinates::new(coordinates));
    }
    Ok(())
}

//! Package-manager specific coordinate facts.
//!
//! All of them share one shape: optional string fields, a field-wise merge
//! that prefers the precedent's present fields, and a match that requires
//! every field to pass the wildcard primitive.

use crate::coordinate::{Coordinate, types};
use crate::fact::{ArtifactIdentifier, Fact, FactFamily};
use crate::wildcard;
use std::fmt;

macro_rules! coordinate_fact {
    (
        $(#[$meta:meta])*
        $name:ident, $label:literal, [$($field:ident),+ $(,)?]
    ) => {
        $(#[$meta])*
        #[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name {
            $(pub $field: Option<String>,)+
        }

        impl Fact for $name {
            const CONTENT_NAME: &'static str = $label;

            fn is_empty(&self) -> bool {
                true $(&& self.$field.as_deref().is_none_or(str::is_empty))+
            }

            fn merge_with(self, precedent: Self) -> Self {
                Self {
                    $($field: precedent.$field.or(self.$field),)+
                }
            }

            fn families(&self) -> &'static [FactFamily] {
                &[FactFamily::Identifier, FactFamily::Coordinate]
            }

            fn as_identifier(&self) -> Option<&dyn ArtifactIdentifier> {
                Some(self)
            }

            fn describe(&self) -> String {
                self.to_string()
            }
        }

        impl ArtifactIdentifier for $name {
            fn matches(&self, other: &dyn ArtifactIdentifier) -> bool {
                let Some(other) = other.as_any().downcast_ref::<Self>() else {
                    return false;
                };
                true $(&& wildcard::matches(self.$field.as_deref(), other.$field.as_deref()))+
            }

            fn coordinates(&self) -> Vec<Coordinate> {
                self.to_coordinate().into_iter().collect()
            }
        }
    };
}

coordinate_fact!(
    /// `groupId:artifactId:version`.
    MavenCoordinates,
    "Maven Coordinates",
    [group_id, artifact_id, version]
);

coordinate_fact!(
    /// npm package coordinates; `namespace` is the scope without `@`.
    JavaScriptCoordinates,
    "JavaScript Coordinates",
    [namespace, name, version]
);

coordinate_fact!(
    /// NuGet package coordinates.
    DotNetCoordinates,
    "DotNet Coordinates",
    [package_id, version]
);

coordinate_fact!(
    /// OSGi bundle coordinates.
    BundleCoordinates,
    "Bundle Coordinates",
    [symbolic_name, version]
);

coordinate_fact!(
    /// Identity without a package manager.
    GenericCoordinates,
    "Generic Coordinates",
    [name, version]
);

fn owned(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

fn build(
    ty: &str,
    namespace: Option<&str>,
    name: Option<&str>,
    version: Option<&str>,
) -> Option<Coordinate> {
    let mut builder = Coordinate::builder(ty, name?);
    if let Some(namespace) = namespace {
        builder = builder.namespace(namespace);
    }
    if let Some(version) = version {
        builder = builder.version(version);
    }
    builder.build().ok()
}

fn show(field: &Option<String>) -> &str {
    field.as_deref().unwrap_or("")
}

impl MavenCoordinates {
    pub fn new(group_id: &str, artifact_id: &str, version: &str) -> Self {
        Self {
            group_id: owned(group_id),
            artifact_id: owned(artifact_id),
            version: owned(version),
        }
    }

    pub fn to_coordinate(&self) -> Option<Coordinate> {
        build(
            types::MAVEN,
            self.group_id.as_deref(),
            self.artifact_id.as_deref(),
            self.version.as_deref(),
        )
    }
}

impl fmt::Display for MavenCoordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            show(&self.group_id),
            show(&self.artifact_id),
            show(&self.version)
        )
    }
}

impl JavaScriptCoordinates {
    pub fn new(namespace: &str, name: &str, version: &str) -> Self {
        Self {
            namespace: owned(namespace.trim_start_matches('@')),
            name: owned(name),
            version: owned(version),
        }
    }

    pub fn to_coordinate(&self) -> Option<Coordinate> {
        let namespace = self.namespace.as_ref().map(|ns| format!("@{ns}"));
        build(
            types::NPM,
            namespace.as_deref(),
            self.name.as_deref(),
            self.version.as_deref(),
        )
    }
}

impl fmt::Display for JavaScriptCoordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(namespace) = &self.namespace {
            write!(f, "@{namespace}/")?;
        }
        write!(f, "{}@{}", show(&self.name), show(&self.version))
    }
}

impl DotNetCoordinates {
    pub fn new(package_id: &str, version: &str) -> Self {
        Self {
            package_id: owned(package_id),
            version: owned(version),
        }
    }

    pub fn to_coordinate(&self) -> Option<Coordinate> {
        build(
            types::NUGET,
            None,
            self.package_id.as_deref(),
            self.version.as_deref(),
        )
    }
}

impl fmt::Display for DotNetCoordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", show(&self.package_id), show(&self.version))
    }
}

impl BundleCoordinates {
    pub fn new(symbolic_name: &str, version: &str) -> Self {
        Self {
            symbolic_name: owned(symbolic_name),
            version: owned(version),
        }
    }

    pub fn to_coordinate(&self) -> Option<Coordinate> {
        build(
            types::P2,
            None,
            self.symbolic_name.as_deref(),
            self.version.as_deref(),
        )
    }
}

impl fmt::Display for BundleCoordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", show(&self.symbolic_name), show(&self.version))
    }
}

impl GenericCoordinates {
    pub fn new(name: &str, version: &str) -> Self {
        Self {
            name: owned(name),
            version: owned(version),
        }
    }

    pub fn to_coordinate(&self) -> Option<Coordinate> {
        build(
            types::GENERIC,
            None,
            self.name.as_deref(),
            self.version.as_deref(),
        )
    }
}

impl fmt::Display for GenericCoordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", show(&self.name), show(&self.version))
    }
}

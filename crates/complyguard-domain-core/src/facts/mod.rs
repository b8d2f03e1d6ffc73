//! Concrete fact kinds attached to artifacts by analyzers and configuration.

mod coordinates;
mod identity;
mod issues;
mod licenses;
mod misc;

pub use coordinates::{
    BundleCoordinates, DotNetCoordinates, GenericCoordinates, JavaScriptCoordinates,
    MavenCoordinates,
};
pub use identity::{ArtifactCoordinates, ArtifactFilename, FilenameEntry, UNKNOWN_HASH_ALGORITHM};
pub use issues::{ArtifactIssues, IssueStatus, SecurityIssue};
pub use licenses::{
    ConfiguredLicenseInformation, DeclaredLicenseInformation, MissingLicenseInformation,
    MissingLicenseReason, ObservedLicenseInformation, OverriddenLicenseInformation,
};
pub use misc::{
    ArtifactFile, ArtifactHomepage, ArtifactMatchingMetadata, ArtifactPathnames,
    ArtifactSourceFile, ArtifactSourceUrl, CopyrightStatement, MatchState,
};

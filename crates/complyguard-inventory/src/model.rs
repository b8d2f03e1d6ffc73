use complyguard_domain_core::facts::{MatchState, MissingLicenseReason, SecurityIssue};
use serde::Deserialize;

/// Schema identifier accepted in an inventory document's `schema` key.
pub const SCHEMA_INVENTORY_V1: &str = "complyguard.inventory.v1";

/// An inventory file: either a document object or a bare component array.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum InventoryFile {
    Components(Vec<ComponentDoc>),
    Document(InventoryDocument),
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct InventoryDocument {
    #[serde(default)]
    pub schema: Option<String>,
    /// Tool that produced the inventory; components inherit it.
    #[serde(default)]
    pub analysis_source: Option<String>,
    #[serde(default)]
    pub components: Vec<ComponentDoc>,
}

/// One third-party component as reported by an analyzer.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ComponentDoc {
    #[serde(default)]
    pub analysis_source: Option<String>,

    /// Package URLs (`pkg:type/namespace/name@version`).
    #[serde(default)]
    pub purls: Vec<String>,
    #[serde(default)]
    pub maven: Option<MavenDoc>,
    #[serde(default)]
    pub npm: Option<NpmDoc>,
    #[serde(default)]
    pub nuget: Option<NuGetDoc>,
    #[serde(default)]
    pub bundle: Option<BundleDoc>,
    #[serde(default)]
    pub generic: Option<GenericDoc>,
    #[serde(default)]
    pub files: Vec<FileDoc>,

    /// SPDX-style expression; analyzer marker ids (`Not-Declared`, ...)
    /// become missing-license reasons.
    #[serde(default)]
    pub declared_license: Option<String>,
    #[serde(default)]
    pub observed_license: Option<String>,
    #[serde(default)]
    pub missing_license_reasons: Vec<MissingLicenseReason>,

    #[serde(default)]
    pub copyright: Option<String>,
    #[serde(default)]
    pub homepage: Option<String>,
    #[serde(default)]
    pub source_url: Option<String>,
    /// Path of the binary on disk.
    #[serde(default)]
    pub file: Option<String>,
    /// Path of the downloaded sources on disk.
    #[serde(default)]
    pub source_file: Option<String>,
    #[serde(default)]
    pub pathnames: Vec<String>,
    #[serde(default)]
    pub match_state: Option<MatchState>,
    #[serde(default)]
    pub issues: Vec<SecurityIssue>,
    #[serde(default)]
    pub proprietary: bool,
    #[serde(default)]
    pub ignore_for_download: bool,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct MavenDoc {
    pub group_id: Option<String>,
    pub artifact_id: Option<String>,
    pub version: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct NpmDoc {
    pub namespace: Option<String>,
    pub name: Option<String>,
    pub version: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct NuGetDoc {
    pub package_id: Option<String>,
    pub version: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct BundleDoc {
    pub symbolic_name: Option<String>,
    pub version: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct GenericDoc {
    pub name: Option<String>,
    pub version: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct FileDoc {
    pub name: Option<String>,
    pub hash: Option<String>,
    pub algorithm: Option<String>,
}

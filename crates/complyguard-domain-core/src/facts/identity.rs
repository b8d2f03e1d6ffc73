use crate::coordinate::Coordinate;
use crate::fact::{ArtifactIdentifier, Fact, FactFamily};
use crate::wildcard;
use std::collections::{BTreeMap, BTreeSet};

/// Package coordinates of an artifact, at most one per coordinate type.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ArtifactCoordinates {
    coordinates: BTreeMap<String, Coordinate>,
}

impl ArtifactCoordinates {
    /// Later coordinates replace earlier ones of the same type.
    pub fn new(coordinates: impl IntoIterator<Item = Coordinate>) -> Self {
        Self {
            coordinates: coordinates
                .into_iter()
                .map(|c| (c.ty().to_string(), c))
                .collect(),
        }
    }

    pub fn get(&self, ty: &str) -> Option<&Coordinate> {
        self.coordinates.get(ty)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Coordinate> {
        self.coordinates.values()
    }

    pub fn len(&self) -> usize {
        self.coordinates.len()
    }
}

impl Fact for ArtifactCoordinates {
    const CONTENT_NAME: &'static str = "Artifact Coordinates";

    fn is_empty(&self) -> bool {
        self.coordinates.is_empty()
    }

    fn merge_with(mut self, precedent: Self) -> Self {
        self.coordinates.extend(precedent.coordinates);
        self
    }

    fn families(&self) -> &'static [FactFamily] {
        &[FactFamily::Identifier, FactFamily::Coordinate]
    }

    fn as_identifier(&self) -> Option<&dyn ArtifactIdentifier> {
        Some(self)
    }

    fn describe(&self) -> String {
        self.iter()
            .map(Coordinate::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl ArtifactIdentifier for ArtifactCoordinates {
    /// Matches when any of our coordinates matches the other side's
    /// coordinate of the same type.
    fn matches(&self, other: &dyn ArtifactIdentifier) -> bool {
        let Some(other) = other.as_any().downcast_ref::<Self>() else {
            return false;
        };
        self.coordinates.iter().any(|(ty, pattern)| {
            other
                .coordinates
                .get(ty)
                .is_some_and(|value| pattern.matches(value))
        })
    }

    fn coordinates(&self) -> Vec<Coordinate> {
        self.iter().cloned().collect()
    }
}

/// One observed file name of an artifact, optionally with its content hash.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FilenameEntry {
    pub filename: Option<String>,
    pub hash: Option<String>,
    pub algorithm: String,
}

pub const UNKNOWN_HASH_ALGORITHM: &str = "UNKNOWN";

fn sanitize(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl FilenameEntry {
    pub fn new(filename: Option<&str>, hash: Option<&str>, algorithm: Option<&str>) -> Self {
        Self {
            filename: sanitize(filename),
            hash: sanitize(hash),
            algorithm: sanitize(algorithm).unwrap_or_else(|| UNKNOWN_HASH_ALGORITHM.to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.filename.is_none() && self.hash.is_none()
    }

    /// A hash in the pattern also pins the hash algorithm.
    pub fn matches(&self, other: &FilenameEntry) -> bool {
        wildcard::matches(self.filename.as_deref(), other.filename.as_deref())
            && wildcard::matches(self.hash.as_deref(), other.hash.as_deref())
            && (self.hash.is_none() || self.algorithm == other.algorithm)
    }
}

/// File names (and hashes) under which an artifact was seen.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ArtifactFilename {
    entries: BTreeSet<FilenameEntry>,
}

impl ArtifactFilename {
    pub fn new(filename: &str) -> Self {
        Self::from_entry(FilenameEntry::new(Some(filename), None, None))
    }

    pub fn with_hash(filename: &str, hash: &str) -> Self {
        Self::from_entry(FilenameEntry::new(Some(filename), Some(hash), None))
    }

    pub fn from_entry(entry: FilenameEntry) -> Self {
        Self {
            entries: BTreeSet::from([entry]),
        }
    }

    pub fn entries(&self) -> impl Iterator<Item = &FilenameEntry> {
        self.entries.iter()
    }

    pub fn filenames(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter_map(|e| e.filename.as_deref())
            .collect()
    }

    /// The longest known file name.
    pub fn best_guess(&self) -> Option<&str> {
        self.filenames().into_iter().max_by_key(|f| f.len())
    }
}

impl Fact for ArtifactFilename {
    const CONTENT_NAME: &'static str = "Filename";

    fn is_empty(&self) -> bool {
        self.entries.iter().all(FilenameEntry::is_empty)
    }

    fn merge_with(mut self, precedent: Self) -> Self {
        self.entries.extend(precedent.entries);
        self
    }

    fn families(&self) -> &'static [FactFamily] {
        &[FactFamily::Identifier]
    }

    fn as_identifier(&self) -> Option<&dyn ArtifactIdentifier> {
        Some(self)
    }

    fn describe(&self) -> String {
        self.entries
            .iter()
            .map(|e| match (&e.filename, &e.hash) {
                (Some(name), Some(hash)) => format!("{name} ({}={hash})", e.algorithm),
                (Some(name), None) => name.clone(),
                (None, Some(hash)) => format!("{}={hash}", e.algorithm),
                (None, None) => String::new(),
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl ArtifactIdentifier for ArtifactFilename {
    fn matches(&self, other: &dyn ArtifactIdentifier) -> bool {
        let Some(other) = other.as_any().downcast_ref::<Self>() else {
            return false;
        };
        self.entries
            .iter()
            .filter(|e| !e.is_empty())
            .any(|mine| {
                other
                    .entries
                    .iter()
                    .any(|theirs| mine.matches(theirs) || theirs.matches(mine))
            })
    }
}

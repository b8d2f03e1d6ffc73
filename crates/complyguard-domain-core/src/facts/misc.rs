use crate::fact::{Fact, FactFamily, SingleValueFact};
use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

macro_rules! single_value_fact {
    ($(#[$meta:meta])* $name:ident($payload:ty), $label:literal, $empty:expr, [$($family:expr),*]) => {
        $(#[$meta])*
        #[derive(Clone, Debug, PartialEq, Eq)]
        pub struct $name(pub $payload);

        impl Fact for $name {
            const CONTENT_NAME: &'static str = $label;

            fn is_empty(&self) -> bool {
                let check: fn(&$payload) -> bool = $empty;
                check(&self.0)
            }

            fn families(&self) -> &'static [FactFamily] {
                &[$($family),*]
            }

            fn describe(&self) -> String {
                self.0.to_string()
            }
        }

        impl SingleValueFact for $name {
            type Payload = $payload;

            fn value(&self) -> &$payload {
                &self.0
            }
        }
    };
}

single_value_fact!(
    /// Where the sources of the artifact can be downloaded.
    ArtifactSourceUrl(String),
    "Source URL",
    |s| s.trim().is_empty(),
    []
);

single_value_fact!(
    ArtifactHomepage(String),
    "Homepage",
    |s| s.trim().is_empty(),
    []
);

single_value_fact!(
    /// The binary file of the artifact.
    ArtifactFile(Utf8PathBuf),
    "File",
    |p| p.as_str().is_empty(),
    [FactFamily::File]
);

single_value_fact!(
    /// The source archive of the artifact.
    ArtifactSourceFile(Utf8PathBuf),
    "Source File",
    |p| p.as_str().is_empty(),
    [FactFamily::File]
);

/// Copyright holders; statements from several producers are concatenated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CopyrightStatement(pub String);

impl CopyrightStatement {
    pub fn new(statement: impl Into<String>) -> Self {
        Self(statement.into())
    }
}

impl Fact for CopyrightStatement {
    const CONTENT_NAME: &'static str = "Copyright";

    fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }

    fn merge_with(self, precedent: Self) -> Self {
        if Fact::is_empty(&precedent) {
            return self;
        }
        if Fact::is_empty(&self) {
            return precedent;
        }
        Self(format!("{}\n{}", self.0, precedent.0))
    }

    fn describe(&self) -> String {
        self.0.clone()
    }
}

impl SingleValueFact for CopyrightStatement {
    type Payload = String;

    fn value(&self) -> &String {
        &self.0
    }
}

/// Paths inside the analyzed distribution where the artifact was found.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ArtifactPathnames(pub BTreeSet<String>);

impl ArtifactPathnames {
    pub fn new<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(paths.into_iter().map(Into::into).collect())
    }
}

impl Fact for ArtifactPathnames {
    const CONTENT_NAME: &'static str = "Pathnames";

    fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn merge_with(mut self, precedent: Self) -> Self {
        self.0.extend(precedent.0);
        self
    }

    fn families(&self) -> &'static [FactFamily] {
        &[FactFamily::File]
    }

    fn describe(&self) -> String {
        self.0.iter().cloned().collect::<Vec<_>>().join(", ")
    }
}

impl SingleValueFact for ArtifactPathnames {
    type Payload = BTreeSet<String>;

    fn value(&self) -> &BTreeSet<String> {
        &self.0
    }
}

/// How reliably the artifact was identified against the upstream catalog.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchState {
    Exact,
    Similar,
    #[default]
    Unknown,
}

impl fmt::Display for MatchState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MatchState::Exact => "exact",
            MatchState::Similar => "similar",
            MatchState::Unknown => "unknown",
        })
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ArtifactMatchingMetadata {
    pub match_state: MatchState,
}

impl ArtifactMatchingMetadata {
    pub fn new(match_state: MatchState) -> Self {
        Self { match_state }
    }
}

impl Fact for ArtifactMatchingMetadata {
    const CONTENT_NAME: &'static str = "Matching Metadata";

    fn is_empty(&self) -> bool {
        false
    }

    fn describe(&self) -> String {
        self.match_state.to_string()
    }
}

impl SingleValueFact for ArtifactMatchingMetadata {
    type Payload = MatchState;

    fn value(&self) -> &MatchState {
        &self.match_state
    }
}

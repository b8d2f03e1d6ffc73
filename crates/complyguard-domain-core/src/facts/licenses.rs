use crate::fact::{Fact, FactFamily, SingleValueFact};
use crate::license::LicenseExpression;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

macro_rules! license_fact {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Clone, Debug, Default, PartialEq, Eq)]
        pub struct $name(pub LicenseExpression);

        impl $name {
            pub fn new(expression: LicenseExpression) -> Self {
                Self(expression)
            }
        }

        impl Fact for $name {
            const CONTENT_NAME: &'static str = $label;

            fn is_empty(&self) -> bool {
                self.0.is_empty()
            }

            fn families(&self) -> &'static [FactFamily] {
                &[FactFamily::License]
            }

            fn describe(&self) -> String {
                self.0.to_string()
            }
        }

        impl SingleValueFact for $name {
            type Payload = LicenseExpression;

            fn value(&self) -> &LicenseExpression {
                &self.0
            }
        }
    };
}

license_fact!(
    /// License stated by the artifact's own metadata.
    DeclaredLicenseInformation,
    "Declared License"
);
license_fact!(
    /// License found by scanning the artifact's content.
    ObservedLicenseInformation,
    "Observed License"
);
license_fact!(
    /// License corrected by an upstream curation.
    OverriddenLicenseInformation,
    "Overridden License"
);
license_fact!(
    /// License chosen in local configuration; always wins.
    ConfiguredLicenseInformation,
    "Configured License"
);

/// Why no license information could be provided for an artifact.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum MissingLicenseReason {
    NoSources,
    NotDeclared,
    NotProvided,
    NotSupported,
    NonStandard,
    NoLicenseInSources,
}

impl MissingLicenseReason {
    pub const ALL: [MissingLicenseReason; 6] = [
        MissingLicenseReason::NoSources,
        MissingLicenseReason::NotDeclared,
        MissingLicenseReason::NotProvided,
        MissingLicenseReason::NotSupported,
        MissingLicenseReason::NonStandard,
        MissingLicenseReason::NoLicenseInSources,
    ];

    /// Marker license ids that analyzers emit instead of a real license.
    pub fn marker_id(self) -> &'static str {
        match self {
            MissingLicenseReason::NoSources => "No-Sources",
            MissingLicenseReason::NotDeclared => "Not-Declared",
            MissingLicenseReason::NotProvided => "Not-Provided",
            MissingLicenseReason::NotSupported => "Not-Supported",
            MissingLicenseReason::NonStandard => "Non-Standard",
            MissingLicenseReason::NoLicenseInSources => "No-License-In-Sources",
        }
    }

    pub fn from_marker_id(id: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|r| r.marker_id().eq_ignore_ascii_case(id))
    }
}

impl fmt::Display for MissingLicenseReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.marker_id())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MissingLicenseInformation {
    pub reasons: BTreeSet<MissingLicenseReason>,
}

impl MissingLicenseInformation {
    pub fn new(reasons: impl IntoIterator<Item = MissingLicenseReason>) -> Self {
        Self {
            reasons: reasons.into_iter().collect(),
        }
    }
}

impl Fact for MissingLicenseInformation {
    const CONTENT_NAME: &'static str = "Missing License Information";

    fn is_empty(&self) -> bool {
        self.reasons.is_empty()
    }

    fn merge_with(mut self, precedent: Self) -> Self {
        self.reasons.extend(precedent.reasons);
        self
    }

    fn describe(&self) -> String {
        self.reasons
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

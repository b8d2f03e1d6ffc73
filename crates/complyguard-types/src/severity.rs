use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The one severity scale every violation is reported on.
///
/// Ordered `Info < Warn < Fail`; thresholds compare with `>=`.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warn,
    Fail,
}

impl Severity {
    pub const ALL: [Severity; 3] = [Severity::Info, Severity::Warn, Severity::Fail];

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warn => "warn",
            Severity::Fail => "fail",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Fail => "FAIL",
        };
        f.write_str(label)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("unknown severity: {value} (expected {expected})")]
pub struct ParseSeverityError {
    pub value: String,
    pub expected: &'static str,
}

impl FromStr for Severity {
    type Err = ParseSeverityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "info" => Ok(Severity::Info),
            "warn" | "warning" => Ok(Severity::Warn),
            "fail" | "error" => Ok(Severity::Fail),
            _ => Err(ParseSeverityError {
                value: s.to_string(),
                expected: "info|warn|fail",
            }),
        }
    }
}

/// Severity vocabulary used by pairwise rule sources.
///
/// Same three-level order as [`Severity`], different names. Converting into
/// [`Severity`] shifts each level down by one name:
///
/// | `RuleSeverity` | `Severity` |
/// |---|---|
/// | `Warn` | `Info` |
/// | `Severe` | `Warn` |
/// | `Critical` | `Fail` |
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum RuleSeverity {
    Warn,
    Severe,
    Critical,
}

impl From<RuleSeverity> for Severity {
    fn from(value: RuleSeverity) -> Self {
        match value {
            RuleSeverity::Warn => Severity::Info,
            RuleSeverity::Severe => Severity::Warn,
            RuleSeverity::Critical => Severity::Fail,
        }
    }
}

impl FromStr for RuleSeverity {
    type Err = ParseSeverityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "warn" => Ok(RuleSeverity::Warn),
            "severe" => Ok(RuleSeverity::Severe),
            "critical" => Ok(RuleSeverity::Critical),
            _ => Err(ParseSeverityError {
                value: s.to_string(),
                expected: "warn|severe|critical",
            }),
        }
    }
}

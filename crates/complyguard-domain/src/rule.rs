//! The rule contract shared by built-in, data-driven and test rules.
//!
//! "Applies but passes" and "does not apply" are both `Ok(None)`.

use crate::violation::Violation;
use complyguard_domain_core::Artifact;
use complyguard_types::Severity;
use std::fmt;
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuleMeta {
    pub id: String,
    pub name: String,
    pub description: String,
    pub severity: Severity,
}

impl RuleMeta {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        severity: impl Into<Severity>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            severity: severity.into(),
        }
    }
}

/// A rule failed for one invocation; the run continues.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("rule {rule_id} failed: {message}")]
pub struct RuleError {
    pub rule_id: String,
    pub message: String,
}

pub trait Rule: Send + Sync + fmt::Debug {
    fn meta(&self) -> &RuleMeta;

    fn id(&self) -> &str {
        &self.meta().id
    }

    fn severity(&self) -> Severity {
        self.meta().severity
    }

    /// A violation of this rule at its configured severity.
    fn violation(
        &self,
        description: impl Into<String>,
        artifacts: impl IntoIterator<Item = Artifact>,
    ) -> Violation
    where
        Self: Sized,
    {
        Violation::new(self.id(), description, self.severity(), artifacts)
    }

    fn error(&self, message: impl Into<String>) -> RuleError
    where
        Self: Sized,
    {
        RuleError {
            rule_id: self.id().to_string(),
            message: message.into(),
        }
    }
}

/// Evaluated once per artifact.
pub trait SingleArtifactRule: Rule {
    fn evaluate(&self, artifact: &Artifact) -> Result<Option<Violation>, RuleError>;
}

/// Evaluated once per unordered pair of distinct artifacts.
pub trait CompareArtifactRule: Rule {
    fn evaluate(&self, left: &Artifact, right: &Artifact) -> Result<Option<Violation>, RuleError>;
}

#[derive(Debug)]
pub enum RuleKind {
    Single(Box<dyn SingleArtifactRule>),
    Compare(Box<dyn CompareArtifactRule>),
}

impl RuleKind {
    pub fn single<R: SingleArtifactRule + 'static>(rule: R) -> Self {
        Self::Single(Box::new(rule))
    }

    pub fn compare<R: CompareArtifactRule + 'static>(rule: R) -> Self {
        Self::Compare(Box::new(rule))
    }

    pub fn meta(&self) -> &RuleMeta {
        match self {
            Self::Single(rule) => rule.meta(),
            Self::Compare(rule) => rule.meta(),
        }
    }

    pub fn id(&self) -> &str {
        &self.meta().id
    }

    pub fn is_compare(&self) -> bool {
        matches!(self, Self::Compare(_))
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Single(_) => "single",
            Self::Compare(_) => "compare",
        }
    }
}

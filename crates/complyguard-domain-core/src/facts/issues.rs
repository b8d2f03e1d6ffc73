use crate::fact::{Fact, SingleValueFact};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueStatus {
    Open,
    Acknowledged,
    Confirmed,
    NotApplicable,
    Resolved,
}

impl IssueStatus {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "open" => Some(Self::Open),
            "acknowledged" => Some(Self::Acknowledged),
            "confirmed" => Some(Self::Confirmed),
            "not_applicable" => Some(Self::NotApplicable),
            "resolved" => Some(Self::Resolved),
            _ => None,
        }
    }
}

impl fmt::Display for IssueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            IssueStatus::Open => "open",
            IssueStatus::Acknowledged => "acknowledged",
            IssueStatus::Confirmed => "confirmed",
            IssueStatus::NotApplicable => "not_applicable",
            IssueStatus::Resolved => "resolved",
        })
    }
}

/// A known vulnerability affecting an artifact.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SecurityIssue {
    pub reference: String,
    /// CVSS-style score.
    pub severity: f64,
    pub status: IssueStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl SecurityIssue {
    pub fn new(reference: impl Into<String>, severity: f64, status: IssueStatus) -> Self {
        Self {
            reference: reference.into(),
            severity,
            status,
            source: None,
            url: None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ArtifactIssues(pub Vec<SecurityIssue>);

impl ArtifactIssues {
    pub fn new(issues: impl IntoIterator<Item = SecurityIssue>) -> Self {
        Self(Vec::new()).merge_distinct(issues)
    }

    /// Append issues not already present, keeping first-seen order.
    pub fn merge_distinct(mut self, issues: impl IntoIterator<Item = SecurityIssue>) -> Self {
        for issue in issues {
            if !self.0.contains(&issue) {
                self.0.push(issue);
            }
        }
        self
    }
}

impl Fact for ArtifactIssues {
    const CONTENT_NAME: &'static str = "Security Issues";

    fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn merge_with(self, precedent: Self) -> Self {
        self.merge_distinct(precedent.0)
    }

    fn describe(&self) -> String {
        self.0
            .iter()
            .map(|i| format!("{} ({}, {})", i.reference, i.severity, i.status))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl SingleValueFact for ArtifactIssues {
    type Payload = Vec<SecurityIssue>;

    fn value(&self) -> &Vec<SecurityIssue> {
        &self.0
    }
}

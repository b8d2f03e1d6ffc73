//! Append-only sink for processing messages.

use crate::violation::Violation;
use complyguard_types::{MessageType, Severity};
use std::sync::{Mutex, PoisonError};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProcessingMessage {
    pub message_type: MessageType,
    /// Artifact labels or the configuration entry concerned.
    pub identifier: Option<String>,
    pub rule_id: Option<String>,
    pub severity: Option<Severity>,
    pub message: String,
}

impl ProcessingMessage {
    pub fn new(message_type: MessageType, message: impl Into<String>) -> Self {
        Self {
            message_type,
            identifier: None,
            rule_id: None,
            severity: None,
            message: message.into(),
        }
    }

    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    /// One entry per surfaced violation; `FAIL` violations are processing
    /// failures whatever the run's threshold.
    pub fn for_violation(violation: &Violation) -> Self {
        let message_type = if violation.severity == Severity::Fail {
            MessageType::ProcessingFailure
        } else {
            MessageType::RuleEngine
        };
        let labels = violation.artifact_labels();
        Self {
            message_type,
            identifier: (!labels.is_empty()).then(|| labels.join(", ")),
            rule_id: Some(violation.rule_id.clone()),
            severity: Some(violation.severity),
            message: format!("{}: {}", violation.severity, violation.description),
        }
    }
}

pub trait ProcessingReporter: Send + Sync {
    fn add(&self, message: ProcessingMessage);
}

/// Mutex-guarded list; safe to share across rayon workers.
#[derive(Debug, Default)]
pub struct ProcessingReport {
    messages: Mutex<Vec<ProcessingMessage>>,
}

impl ProcessingReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot in insertion order.
    pub fn messages(&self) -> Vec<ProcessingMessage> {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn len(&self) -> usize {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_messages(self) -> Vec<ProcessingMessage> {
        self.messages
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl ProcessingReporter for ProcessingReport {
    fn add(&self, message: ProcessingMessage) {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message);
    }
}

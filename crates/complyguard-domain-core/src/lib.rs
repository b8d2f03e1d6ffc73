//! Typed fact model for third-party components (no IO).
//!
//! - `wildcard`: the single `*` matching primitive
//! - `coordinate`: package-URL style identities with wildcard-aware matching
//! - `fact` / `facts`: the open fact store and the built-in fact kinds
//! - `artifact`: one component, its facts and flags
//! - `selector`: predicates used by configuration and rules
//! - `license` / `knowledge_base`: license expressions and the shared lookup table

#![forbid(unsafe_code)]

pub mod artifact;
pub mod coordinate;
pub mod fact;
pub mod facts;
pub mod knowledge_base;
pub mod license;
pub mod selector;
pub mod wildcard;

#[cfg(test)]
mod proptest;

pub use artifact::{Artifact, UNKNOWN_ANALYSIS_SOURCE, flags};
pub use coordinate::{Coordinate, CoordinateBuilder, CoordinateError};
pub use fact::{ArtifactIdentifier, DynFact, Fact, FactFamily, FactKind, FactStore, SingleValueFact};
pub use knowledge_base::{LicenseEntry, LicenseKnowledgeBase, LicenseKnowledgeBaseBuilder};
pub use license::{License, LicenseExpression, LicenseExpressionError};
pub use selector::ArtifactSelector;
pub use wildcard::{PatternError, WildcardPattern};

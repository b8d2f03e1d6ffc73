//! Open, typed fact model.
//!
//! Every fact kind is a Rust type implementing [`Fact`]. A [`FactStore`] keeps at
//! most one value per kind, keyed by the type's `TypeId`; adding a second value
//! of the same kind calls [`Fact::merge_with`] with the new value as precedent.
//! Because the key is the concrete type, two facts of different kinds can never
//! reach the same merge call.

use crate::coordinate::Coordinate;
use std::any::{Any, TypeId};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

/// Groups of fact kinds that can be asked for together.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FactFamily {
    /// Facts that identify an artifact (coordinates, filenames, hashes).
    Identifier,
    /// Identifier facts that can be expressed as package coordinates.
    Coordinate,
    /// Declared, observed, overridden or configured license information.
    License,
    /// Facts pointing at files on disk.
    File,
}

/// A single typed piece of metadata about an artifact.
pub trait Fact: Any + Clone + PartialEq + fmt::Debug + Send + Sync {
    /// Human label for this kind of fact.
    const CONTENT_NAME: &'static str;

    fn is_empty(&self) -> bool;

    /// Combine `self` (already stored) with `precedent` (being added).
    ///
    /// The default is "the precedent replaces the stored value".
    fn merge_with(self, precedent: Self) -> Self {
        precedent
    }

    fn families(&self) -> &'static [FactFamily] {
        &[]
    }

    /// Identifier facts return themselves here.
    fn as_identifier(&self) -> Option<&dyn ArtifactIdentifier> {
        None
    }

    fn describe(&self) -> String {
        format!("{self:?}")
    }
}

/// Facts whose whole content is one payload value.
pub trait SingleValueFact: Fact {
    type Payload;

    fn value(&self) -> &Self::Payload;
}

/// Identity facts that can be compared with wildcard semantics.
pub trait ArtifactIdentifier: DynFact {
    /// Wildcard match with `self` as the pattern.
    ///
    /// Identifiers of a different kind never match.
    fn matches(&self, other: &dyn ArtifactIdentifier) -> bool;

    /// Package coordinates this identifier can be expressed as.
    fn coordinates(&self) -> Vec<Coordinate> {
        Vec::new()
    }
}

/// Object-safe view of a [`Fact`], used for heterogeneous storage.
pub trait DynFact: Any + fmt::Debug + Send + Sync {
    fn kind(&self) -> FactKind;
    fn content_name(&self) -> &'static str;
    fn is_empty(&self) -> bool;
    fn families(&self) -> &'static [FactFamily];
    fn as_identifier(&self) -> Option<&dyn ArtifactIdentifier>;
    fn describe(&self) -> String;
    fn as_any(&self) -> &dyn Any;
    fn into_any(self: Box<Self>) -> Box<dyn Any + Send + Sync>;
    fn clone_box(&self) -> Box<dyn DynFact>;
    fn dyn_eq(&self, other: &dyn DynFact) -> bool;
    /// Add a copy of this fact to `store`, merging with any fact of the same kind.
    fn add_to(&self, store: &mut FactStore);
}

impl<F: Fact> DynFact for F {
    fn kind(&self) -> FactKind {
        FactKind::of::<F>()
    }

    fn content_name(&self) -> &'static str {
        F::CONTENT_NAME
    }

    fn is_empty(&self) -> bool {
        Fact::is_empty(self)
    }

    fn families(&self) -> &'static [FactFamily] {
        Fact::families(self)
    }

    fn as_identifier(&self) -> Option<&dyn ArtifactIdentifier> {
        Fact::as_identifier(self)
    }

    fn describe(&self) -> String {
        Fact::describe(self)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any(self: Box<Self>) -> Box<dyn Any + Send + Sync> {
        self
    }

    fn clone_box(&self) -> Box<dyn DynFact> {
        Box::new(self.clone())
    }

    fn dyn_eq(&self, other: &dyn DynFact) -> bool {
        other
            .as_any()
            .downcast_ref::<F>()
            .is_some_and(|other| other == self)
    }

    fn add_to(&self, store: &mut FactStore) {
        store.add(self.clone());
    }
}

impl Clone for Box<dyn DynFact> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

impl PartialEq for dyn DynFact {
    fn eq(&self, other: &Self) -> bool {
        self.dyn_eq(other)
    }
}

/// Key of a fact kind: the concrete type plus its label for stable ordering.
#[derive(Clone, Copy, Debug)]
pub struct FactKind {
    id: TypeId,
    name: &'static str,
}

impl FactKind {
    pub fn of<F: Fact>() -> Self {
        Self {
            id: TypeId::of::<F>(),
            name: F::CONTENT_NAME,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for FactKind {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for FactKind {}

impl PartialOrd for FactKind {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FactKind {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name.cmp(other.name).then(self.id.cmp(&other.id))
    }
}

/// At most one fact per kind.
#[derive(Clone, Debug, Default)]
pub struct FactStore {
    facts: BTreeMap<FactKind, Box<dyn DynFact>>,
}

impl FactStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `fact`, merging with an existing fact of the same kind.
    pub fn add<F: Fact>(&mut self, fact: F) {
        let kind = FactKind::of::<F>();
        let merged = match self.facts.remove(&kind) {
            Some(existing) => match existing.into_any().downcast::<F>() {
                Ok(existing) => (*existing).merge_with(fact),
                // Keyed by TypeId, so the stored value is always an `F`.
                Err(_) => fact,
            },
            None => fact,
        };
        self.facts.insert(kind, Box::new(merged));
    }

    /// The stored fact of kind `F`, empty or not.
    pub fn get<F: Fact>(&self) -> Option<&F> {
        self.facts
            .get(&FactKind::of::<F>())
            .and_then(|f| f.as_any().downcast_ref::<F>())
    }

    /// The stored fact of kind `F`, unless it is empty.
    pub fn ask_for<F: Fact>(&self) -> Option<&F> {
        self.get::<F>().filter(|f| !Fact::is_empty(*f))
    }

    /// The payload of the stored fact of kind `F`, unless it is empty.
    pub fn ask_for_get<F: SingleValueFact>(&self) -> Option<&F::Payload> {
        self.ask_for::<F>().map(SingleValueFact::value)
    }

    /// Every non-empty fact belonging to `family`.
    pub fn ask_for_all(&self, family: FactFamily) -> Vec<&dyn DynFact> {
        self.iter()
            .filter(|f| f.families().contains(&family))
            .collect()
    }

    /// Every non-empty identifier fact.
    pub fn identifiers(&self) -> Vec<&dyn ArtifactIdentifier> {
        self.iter().filter_map(|f| f.as_identifier()).collect()
    }

    pub fn remove<F: Fact>(&mut self) -> Option<F> {
        self.facts
            .remove(&FactKind::of::<F>())
            .and_then(|f| f.into_any().downcast::<F>().ok())
            .map(|f| *f)
    }

    pub fn contains<F: Fact>(&self) -> bool {
        self.ask_for::<F>().is_some()
    }

    /// Non-empty facts in stable (label) order.
    pub fn iter(&self) -> impl Iterator<Item = &dyn DynFact> {
        self.facts
            .values()
            .map(|f| f.as_ref())
            .filter(|f| !f.is_empty())
    }

    /// Merge every non-empty fact of `precedent` into this store.
    pub fn merge_from(&mut self, precedent: &FactStore) {
        for fact in precedent.iter() {
            fact.add_to(self);
        }
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PartialEq for FactStore {
    fn eq(&self, other: &Self) -> bool {
        self.facts.len() == other.facts.len()
            && self.facts.iter().all(|(kind, fact)| {
                other
                    .facts
                    .get(kind)
                    .is_some_and(|theirs| fact.dyn_eq(theirs.as_ref()))
            })
    }
}

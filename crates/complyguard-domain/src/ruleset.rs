use crate::rule::RuleKind;
use std::collections::BTreeMap;
use std::sync::Arc;

/// A named, versioned group of rules. Immutable once constructed.
#[derive(Debug)]
pub struct Ruleset {
    name: String,
    version: String,
    rules: Vec<RuleKind>,
}

impl Ruleset {
    pub fn new(name: impl Into<String>, version: impl Into<String>, rules: Vec<RuleKind>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            rules,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn rules(&self) -> &[RuleKind] {
        &self.rules
    }

    pub fn rule(&self, id: &str) -> Option<&RuleKind> {
        self.rules.iter().find(|r| r.id() == id)
    }
}

/// Resolves configured ruleset identifiers.
///
/// Implementations may compile rules statically or build them from data;
/// the engine only sees [`Ruleset`].
pub trait RulesetResolver: Send + Sync {
    fn resolve(&self, id: &str) -> Option<Arc<Ruleset>>;

    /// Identifiers this resolver knows, for error messages.
    fn available(&self) -> Vec<String>;
}

/// A fixed table of rulesets keyed by name.
#[derive(Debug, Default)]
pub struct StaticRulesets {
    rulesets: BTreeMap<String, Arc<Ruleset>>,
}

impl StaticRulesets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `ruleset` under its name, replacing an earlier one.
    pub fn insert(&mut self, ruleset: Ruleset) {
        self.rulesets
            .insert(ruleset.name().to_string(), Arc::new(ruleset));
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<Ruleset>> {
        self.rulesets.values()
    }
}

impl RulesetResolver for StaticRulesets {
    fn resolve(&self, id: &str) -> Option<Arc<Ruleset>> {
        self.rulesets.get(id).cloned()
    }

    fn available(&self) -> Vec<String> {
        self.rulesets.keys().cloned().collect()
    }
}

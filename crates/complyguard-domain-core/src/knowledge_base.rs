//! Immutable license lookup table.
//!
//! Built once (defaults plus configured entries) and shared through `Arc`
//! with every stage that needs license names, texts or threat groups.

use crate::license::{License, LicenseExpression, threat_groups};
use std::collections::{BTreeMap, HashMap};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LicenseEntry {
    pub id: String,
    pub name: Option<String>,
    pub text: Option<String>,
    pub threat_group: Option<String>,
}

impl LicenseEntry {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            text: None,
            threat_group: None,
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn threat_group(mut self, group: impl Into<String>) -> Self {
        self.threat_group = Some(group.into());
        self
    }
}

#[derive(Clone, Debug, Default)]
pub struct LicenseKnowledgeBase {
    entries: BTreeMap<String, LicenseEntry>,
    /// Lowercased id or alias -> canonical id.
    lookup: HashMap<String, String>,
}

impl LicenseKnowledgeBase {
    pub fn builder() -> LicenseKnowledgeBaseBuilder {
        LicenseKnowledgeBaseBuilder::default()
    }

    /// Common SPDX licenses with their threat groups.
    pub fn with_defaults() -> Self {
        Self::builder().defaults().build()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&LicenseEntry> {
        self.entries.get(id)
    }

    /// Look up by id or alias, case-insensitively.
    pub fn resolve(&self, id_or_alias: &str) -> Option<&LicenseEntry> {
        if let Some(entry) = self.entries.get(id_or_alias) {
            return Some(entry);
        }
        self.lookup
            .get(&id_or_alias.trim().to_lowercase())
            .and_then(|id| self.entries.get(id))
    }

    pub fn contains(&self, id_or_alias: &str) -> bool {
        self.resolve(id_or_alias).is_some()
    }

    /// Whether the license (ignoring a `WITH` exception) is known.
    pub fn knows(&self, license: &License) -> bool {
        self.resolve(&license.id).is_some() || self.resolve(license.split_exception().0).is_some()
    }

    /// Canonicalize the id and fill in missing name, text and threat group.
    ///
    /// A `WITH` exception is kept; unknown licenses are returned unchanged.
    pub fn enrich(&self, license: License) -> License {
        if let Some(entry) = self.resolve(&license.id) {
            return fill(entry.id.clone(), license, entry);
        }
        let (base, exception) = license.split_exception();
        let Some(entry) = self.resolve(base) else {
            return license;
        };
        let id = match exception {
            Some(exception) => format!("{} WITH {exception}", entry.id),
            None => entry.id.clone(),
        };
        fill(id, license, entry)
    }

    pub fn enrich_expression(&self, expression: LicenseExpression) -> LicenseExpression {
        expression.map_licenses(&mut |license| self.enrich(license))
    }

    pub fn entries(&self) -> impl Iterator<Item = &LicenseEntry> {
        self.entries.values()
    }
}

fn fill(id: String, license: License, entry: &LicenseEntry) -> License {
    License {
        id,
        name: license.name.or_else(|| entry.name.clone()),
        text: license.text.or_else(|| entry.text.clone()),
        threat_group: license.threat_group.or_else(|| entry.threat_group.clone()),
    }
}

#[derive(Clone, Debug, Default)]
pub struct LicenseKnowledgeBaseBuilder {
    entries: BTreeMap<String, LicenseEntry>,
    aliases: Vec<(String, String)>,
}

const DEFAULT_LICENSES: &[(&str, &str, &str)] = &[
    ("Apache-2.0", "Apache License 2.0", threat_groups::PERMISSIVE),
    ("MIT", "MIT License", threat_groups::PERMISSIVE),
    ("BSD-2-Clause", "BSD 2-Clause \"Simplified\" License", threat_groups::PERMISSIVE),
    ("BSD-3-Clause", "BSD 3-Clause \"New\" or \"Revised\" License", threat_groups::PERMISSIVE),
    ("ISC", "ISC License", threat_groups::PERMISSIVE),
    ("Unlicense", "The Unlicense", threat_groups::PERMISSIVE),
    ("CC0-1.0", "Creative Commons Zero v1.0 Universal", threat_groups::PERMISSIVE),
    ("EPL-1.0", "Eclipse Public License 1.0", threat_groups::WEAK_COPYLEFT),
    ("EPL-2.0", "Eclipse Public License 2.0", threat_groups::WEAK_COPYLEFT),
    ("MPL-2.0", "Mozilla Public License 2.0", threat_groups::WEAK_COPYLEFT),
    ("CDDL-1.0", "Common Development and Distribution License 1.0", threat_groups::WEAK_COPYLEFT),
    ("LGPL-2.1-only", "GNU Lesser General Public License v2.1 only", threat_groups::WEAK_COPYLEFT),
    ("LGPL-2.1-or-later", "GNU Lesser General Public License v2.1 or later", threat_groups::WEAK_COPYLEFT),
    ("LGPL-3.0-only", "GNU Lesser General Public License v3.0 only", threat_groups::WEAK_COPYLEFT),
    ("GPL-2.0-only", "GNU General Public License v2.0 only", threat_groups::STRONG_COPYLEFT),
    ("GPL-2.0-or-later", "GNU General Public License v2.0 or later", threat_groups::STRONG_COPYLEFT),
    ("GPL-3.0-only", "GNU General Public License v3.0 only", threat_groups::STRONG_COPYLEFT),
    ("GPL-3.0-or-later", "GNU General Public License v3.0 or later", threat_groups::STRONG_COPYLEFT),
    ("AGPL-3.0-only", "GNU Affero General Public License v3.0", threat_groups::STRONG_COPYLEFT),
];

const DEFAULT_ALIASES: &[(&str, &str)] = &[
    ("Apache 2.0", "Apache-2.0"),
    ("Apache License, Version 2.0", "Apache-2.0"),
    ("The Apache Software License, Version 2.0", "Apache-2.0"),
    ("The MIT License", "MIT"),
    ("GPL-2.0", "GPL-2.0-only"),
    ("GPL-3.0", "GPL-3.0-only"),
    ("LGPL-2.1", "LGPL-2.1-only"),
    ("LGPL-3.0", "LGPL-3.0-only"),
    ("AGPL-3.0", "AGPL-3.0-only"),
];

impl LicenseKnowledgeBaseBuilder {
    pub fn defaults(mut self) -> Self {
        for (id, name, group) in DEFAULT_LICENSES {
            self = self.license(LicenseEntry::new(*id).name(*name).threat_group(*group));
        }
        for (alias, id) in DEFAULT_ALIASES {
            self = self.alias(*alias, *id);
        }
        self
    }

    /// Add or replace an entry; missing fields keep the previous values.
    pub fn license(mut self, entry: LicenseEntry) -> Self {
        let merged = match self.entries.remove(&entry.id) {
            Some(previous) => LicenseEntry {
                id: entry.id,
                name: entry.name.or(previous.name),
                text: entry.text.or(previous.text),
                threat_group: entry.threat_group.or(previous.threat_group),
            },
            None => entry,
        };
        self.entries.insert(merged.id.clone(), merged);
        self
    }

    pub fn alias(mut self, alias: impl Into<String>, id: impl Into<String>) -> Self {
        self.aliases.push((alias.into(), id.into()));
        self
    }

    pub fn build(self) -> LicenseKnowledgeBase {
        let mut lookup = HashMap::new();
        for (id, entry) in &self.entries {
            lookup.insert(id.to_lowercase(), id.clone());
            if let Some(name) = &entry.name {
                lookup.entry(name.to_lowercase()).or_insert_with(|| id.clone());
            }
        }
        for (alias, id) in self.aliases {
            if !self.entries.contains_key(&id) {
                tracing::debug!(%alias, %id, "dropping alias of unknown license");
                continue;
            }
            lookup.insert(alias.trim().to_lowercase(), id);
        }
        LicenseKnowledgeBase {
            entries: self.entries,
            lookup,
        }
    }
}

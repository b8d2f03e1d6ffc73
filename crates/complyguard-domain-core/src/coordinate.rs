//! Structured package identity in package-URL shape.
//!
//! Canonical form: `pkg:<type>/<namespace>/<name>@<version>?<k>=<v>&..#<subpath>`.
//! The type and qualifier keys are lowercased, qualifiers are sorted, empty
//! qualifier values are dropped, and components are percent-encoded except for
//! unreserved characters, `*`, `:` and `+`. Equality, ordering and hashing all use
//! the canonical string.

use crate::wildcard;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use thiserror::Error;

pub const SCHEME: &str = "pkg";

/// Well-known coordinate types.
pub mod types {
    pub const MAVEN: &str = "maven";
    pub const NPM: &str = "npm";
    pub const NUGET: &str = "nuget";
    pub const P2: &str = "p2";
    pub const GENERIC: &str = "generic";
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum CoordinateError {
    #[error("coordinate {0:?} does not start with `pkg:`")]
    MissingScheme(String),
    #[error("coordinate {0:?} has no type")]
    MissingType(String),
    #[error("coordinate type {0:?} contains characters outside [a-z0-9.+-]")]
    InvalidType(String),
    #[error("coordinate {0:?} has no name")]
    MissingName(String),
    #[error("coordinate {input:?} has an invalid percent-escape")]
    InvalidEscape { input: String },
}

#[derive(Clone)]
pub struct Coordinate {
    ty: String,
    namespace: Option<String>,
    name: String,
    version: Option<String>,
    qualifiers: BTreeMap<String, String>,
    subpath: Option<String>,
    canonical: String,
}

impl Coordinate {
    pub fn builder(ty: impl Into<String>, name: impl Into<String>) -> CoordinateBuilder {
        CoordinateBuilder {
            ty: ty.into(),
            name: name.into(),
            namespace: None,
            version: None,
            qualifiers: BTreeMap::new(),
            subpath: None,
        }
    }

    /// Shorthand for `pkg:generic/<name>@<version>`.
    pub fn generic(name: &str, version: Option<&str>) -> Result<Self, CoordinateError> {
        let mut b = Self::builder(types::GENERIC, name);
        if let Some(v) = version {
            b = b.version(v);
        }
        b.build()
    }

    pub fn parse(input: &str) -> Result<Self, CoordinateError> {
        let trimmed = input.trim();
        let rest = strip_scheme(trimmed)
            .ok_or_else(|| CoordinateError::MissingScheme(input.to_string()))?;
        let rest = rest.trim_start_matches('/');

        let (rest, subpath) = match rest.split_once('#') {
            Some((head, sub)) => (head, Some(sub)),
            None => (rest, None),
        };
        let (rest, qualifiers) = match rest.split_once('?') {
            Some((head, q)) => (head, Some(q)),
            None => (rest, None),
        };

        let Some((ty, path)) = rest.split_once('/') else {
            return if rest.is_empty() {
                Err(CoordinateError::MissingType(input.to_string()))
            } else {
                Err(CoordinateError::MissingName(input.to_string()))
            };
        };
        if ty.is_empty() {
            return Err(CoordinateError::MissingType(input.to_string()));
        }

        let (path, version) = match path.rsplit_once('@') {
            Some((head, v)) => (head, Some(v)),
            None => (path, None),
        };

        let mut segments: Vec<String> = path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| decode(s, input))
            .collect::<Result<_, _>>()?;
        let name = segments
            .pop()
            .ok_or_else(|| CoordinateError::MissingName(input.to_string()))?;

        let mut b = Self::builder(ty, name);
        if !segments.is_empty() {
            b = b.namespace(segments.join("/"));
        }
        if let Some(v) = version {
            b = b.version(decode(v, input)?);
        }
        if let Some(q) = qualifiers {
            for pair in q.split('&').filter(|p| !p.is_empty()) {
                let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
                b = b.qualifier(decode(k, input)?, decode(v, input)?);
            }
        }
        if let Some(sub) = subpath {
            let segments: Vec<String> = sub
                .split('/')
                .filter(|s| !s.is_empty() && *s != "." && *s != "..")
                .map(|s| decode(s, input))
                .collect::<Result<_, _>>()?;
            if !segments.is_empty() {
                b = b.subpath(segments.join("/"));
            }
        }
        b.build()
    }

    pub fn scheme(&self) -> &'static str {
        SCHEME
    }

    pub fn ty(&self) -> &str {
        &self.ty
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn qualifiers(&self) -> &BTreeMap<String, String> {
        &self.qualifiers
    }

    pub fn subpath(&self) -> Option<&str> {
        self.subpath.as_deref()
    }

    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    /// Field-wise wildcard match with `self` as the pattern.
    ///
    /// Absent pattern fields are "don't care"; every qualifier present on the
    /// pattern must match the other coordinate's qualifier of the same key.
    pub fn matches(&self, other: &Coordinate) -> bool {
        wildcard::matches(Some(&self.ty), Some(&other.ty))
            && wildcard::matches(self.namespace(), other.namespace())
            && wildcard::matches(Some(&self.name), Some(&other.name))
            && wildcard::matches(self.version(), other.version())
            && wildcard::matches(self.subpath(), other.subpath())
            && self.qualifiers.iter().all(|(k, v)| {
                wildcard::matches(Some(v), other.qualifiers.get(k).map(String::as_str))
            })
    }
}

impl PartialEq for Coordinate {
    fn eq(&self, other: &Self) -> bool {
        self.canonical == other.canonical
    }
}

impl Eq for Coordinate {}

impl Hash for Coordinate {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical.hash(state);
    }
}

impl PartialOrd for Coordinate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Coordinate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.canonical.cmp(&other.canonical)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical)
    }
}

impl fmt::Debug for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Coordinate({})", self.canonical)
    }
}

impl FromStr for Coordinate {
    type Err = CoordinateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for Coordinate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.canonical)
    }
}

impl<'de> Deserialize<'de> for Coordinate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Coordinate::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[derive(Clone, Debug)]
pub struct CoordinateBuilder {
    ty: String,
    name: String,
    namespace: Option<String>,
    version: Option<String>,
    qualifiers: BTreeMap<String, String>,
    subpath: Option<String>,
}

impl CoordinateBuilder {
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        let namespace = namespace.into();
        self.namespace = (!namespace.is_empty()).then_some(namespace);
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        let version = version.into();
        self.version = (!version.is_empty()).then_some(version);
        self
    }

    pub fn qualifier(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let value = value.into();
        if !value.is_empty() {
            self.qualifiers
                .insert(key.into().to_ascii_lowercase(), value);
        }
        self
    }

    pub fn subpath(mut self, subpath: impl Into<String>) -> Self {
        let subpath = subpath.into();
        self.subpath = (!subpath.is_empty()).then_some(subpath);
        self
    }

    pub fn build(self) -> Result<Coordinate, CoordinateError> {
        let ty = self.ty.trim().to_ascii_lowercase();
        if ty.is_empty() {
            return Err(CoordinateError::MissingType(self.name));
        }
        if !ty
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '+' | '-' | '*'))
        {
            return Err(CoordinateError::InvalidType(ty));
        }
        if self.name.is_empty() {
            return Err(CoordinateError::MissingName(format!("{SCHEME}:{ty}/")));
        }

        let mut canonical = format!("{SCHEME}:{ty}/");
        if let Some(ns) = &self.namespace {
            let encoded: Vec<String> = ns
                .split('/')
                .filter(|s| !s.is_empty())
                .map(encode)
                .collect();
            if !encoded.is_empty() {
                canonical.push_str(&encoded.join("/"));
                canonical.push('/');
            }
        }
        canonical.push_str(&encode(&self.name));
        if let Some(v) = &self.version {
            canonical.push('@');
            canonical.push_str(&encode(v));
        }
        if !self.qualifiers.is_empty() {
            let pairs: Vec<String> = self
                .qualifiers
                .iter()
                .map(|(k, v)| format!("{}={}", encode(k), encode(v)))
                .collect();
            canonical.push('?');
            canonical.push_str(&pairs.join("&"));
        }
        if let Some(sub) = &self.subpath {
            let encoded: Vec<String> = sub
                .split('/')
                .filter(|s| !s.is_empty())
                .map(encode)
                .collect();
            canonical.push('#');
            canonical.push_str(&encoded.join("/"));
        }

        Ok(Coordinate {
            ty,
            namespace: self.namespace,
            name: self.name,
            version: self.version,
            qualifiers: self.qualifiers,
            subpath: self.subpath,
            canonical,
        })
    }
}

fn strip_scheme(input: &str) -> Option<&str> {
    let (scheme, rest) = input.split_once(':')?;
    scheme.eq_ignore_ascii_case(SCHEME).then_some(rest)
}

fn is_kept(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b'.' | b'_' | b'~' | b'*' | b':' | b'+')
}

fn encode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        if is_kept(b) {
            out.push(b as char);
        } else {
            out.push_str(&format!("%{b:02X}"));
        }
    }
    out
}

fn decode(s: &str, input: &str) -> Result<String, CoordinateError> {
    let invalid = || CoordinateError::InvalidEscape {
        input: input.to_string(),
    };
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = s.get(i + 1..i + 3).ok_or_else(invalid)?;
            let value = u8::from_str_radix(hex, 16).map_err(|_| invalid())?;
            out.push(value);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).map_err(|_| invalid())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(s: &str) -> Coordinate {
        Coordinate::parse(s).expect("valid coordinate")
    }

    #[test]
    fn parses_all_components() {
        let coord = c("pkg:maven/org.apache.commons/commons-lang3@3.12.0?type=jar#src/main");
        assert_eq!(coord.scheme(), "pkg");
        assert_eq!(coord.ty(), "maven");
        assert_eq!(coord.namespace(), Some("org.apache.commons"));
        assert_eq!(coord.name(), "commons-lang3");
        assert_eq!(coord.version(), Some("3.12.0"));
        assert_eq!(coord.qualifiers().get("type").map(String::as_str), Some("jar"));
        assert_eq!(coord.subpath(), Some("src/main"));
    }

    #[test]
    fn equal_constructions_compare_equal() {
        let parsed = c("PKG:Maven/org.example/util@1.0?b=2&a=1");
        let built = Coordinate::builder("maven", "util")
            .namespace("org.example")
            .version("1.0")
            .qualifier("A", "1")
            .qualifier("b", "2")
            .build()
            .expect("build");
        assert_eq!(parsed, built);
        assert_eq!(parsed.canonical(), "pkg:maven/org.example/util@1.0?a=1&b=2");
    }

    #[test]
    fn npm_scope_round_trips_through_percent_encoding() {
        let coord = Coordinate::builder(types::NPM, "core")
            .namespace("@angular")
            .version("17.0.0")
            .build()
            .expect("build");
        assert_eq!(coord.canonical(), "pkg:npm/%40angular/core@17.0.0");
        assert_eq!(c(coord.canonical()), coord);
        assert_eq!(c(coord.canonical()).namespace(), Some("@angular"));
    }

    #[test]
    fn wildcards_survive_canonicalization() {
        assert_eq!(c("pkg:generic/foo@*").canonical(), "pkg:generic/foo@*");
    }

    #[test]
    fn malformed_inputs_are_rejected() {
        assert!(matches!(
            Coordinate::parse("maven/org/x@1"),
            Err(CoordinateError::MissingScheme(_))
        ));
        assert!(matches!(
            Coordinate::parse("pkg:"),
            Err(CoordinateError::MissingType(_))
        ));
        assert!(matches!(
            Coordinate::parse("pkg:maven"),
            Err(CoordinateError::MissingName(_))
        ));
        assert!(matches!(
            Coordinate::parse("pkg:maven/"),
            Err(CoordinateError::MissingName(_))
        ));
        assert!(matches!(
            Coordinate::parse("pkg:ma ven/x"),
            Err(CoordinateError::InvalidType(_))
        ));
        assert!(matches!(
            Coordinate::parse("pkg:generic/foo%zz"),
            Err(CoordinateError::InvalidEscape { .. })
        ));
    }

    #[test]
    fn pattern_matches_field_by_field() {
        let pattern = c("pkg:maven/org.example/*@1.*");
        assert!(pattern.matches(&c("pkg:maven/org.example/util@1.4")));
        assert!(!pattern.matches(&c("pkg:maven/org.example/util@2.0")));
        assert!(!pattern.matches(&c("pkg:npm/org.example/util@1.4")));
        assert!(!pattern.matches(&c("pkg:maven/org.other/util@1.4")));
    }

    #[test]
    fn absent_pattern_fields_do_not_constrain() {
        let pattern = c("pkg:generic/foo");
        assert!(pattern.matches(&c("pkg:generic/foo@1.0")));
        assert!(pattern.matches(&c("pkg:generic/foo@2.0?arch=x86")));
    }

    #[test]
    fn wildcard_match_is_directional() {
        let concrete = c("pkg:generic/foo@1.0");
        let wild = c("pkg:generic/foo@*");
        assert!(wild.matches(&concrete));
        assert!(!concrete.matches(&wild));
        assert_ne!(wild, concrete);
    }

    #[test]
    fn qualifiers_on_pattern_must_match() {
        let pattern = c("pkg:maven/g/a@1?type=jar");
        assert!(pattern.matches(&c("pkg:maven/g/a@1?type=jar&classifier=x")));
        assert!(!pattern.matches(&c("pkg:maven/g/a@1")));
    }

    #[test]
    fn serde_uses_canonical_string() {
        let coord = c("pkg:generic/foo@1.0");
        let json = serde_json::to_string(&coord).unwrap();
        assert_eq!(json, "\"pkg:generic/foo@1.0\"");
        let back: Coordinate = serde_json::from_str(&json).unwrap();
        assert_eq!(back, coord);
        assert!(serde_json::from_str::<Coordinate>("\"not-a-purl\"").is_err());
    }
}

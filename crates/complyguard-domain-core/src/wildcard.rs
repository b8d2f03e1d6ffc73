//! The single wildcard primitive behind every structured comparison.
//!
//! `*` matches any (possibly empty) run of characters; every other character,
//! including regex metacharacters such as `.`, matches itself. Matching is
//! always against the full value.

use regex::Regex;
use std::collections::HashMap;
use std::sync::{LazyLock, PoisonError, RwLock};
use thiserror::Error;

/// Compiled patterns kept by [`matches`]; cleared when full.
const CACHE_LIMIT: usize = 4096;

static CACHE: LazyLock<RwLock<HashMap<String, Option<Regex>>>> = LazyLock::new(RwLock::default);

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("wildcard pattern {0:?} contains a control character")]
    ControlCharacter(String),
    #[error("wildcard pattern {pattern:?} cannot be compiled: {reason}")]
    Compile { pattern: String, reason: String },
}

/// A compiled `*` wildcard pattern.
#[derive(Clone, Debug)]
pub struct WildcardPattern {
    source: String,
    regex: Regex,
}

impl WildcardPattern {
    pub fn new(pattern: &str) -> Result<Self, PatternError> {
        if pattern.chars().any(char::is_control) {
            return Err(PatternError::ControlCharacter(pattern.to_string()));
        }
        let regex = Regex::new(&to_regex(pattern)).map_err(|e| PatternError::Compile {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            source: pattern.to_string(),
            regex,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// A `None` value is compared as the empty string.
    pub fn is_match(&self, value: Option<&str>) -> bool {
        let value = value.unwrap_or("");
        self.source == value || self.regex.is_match(value)
    }
}

impl PartialEq for WildcardPattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for WildcardPattern {}

/// Check that a configured pattern is usable before any evaluation starts.
pub fn validate(pattern: &str) -> Result<(), PatternError> {
    WildcardPattern::new(pattern).map(|_| ())
}

/// Wildcard comparison of `value` against `pattern`.
///
/// - a `None` pattern matches everything
/// - an exactly equal pattern matches
/// - otherwise `*` is "any run of characters" and the whole value must match
///
/// Never fails: a pattern that cannot be compiled matches nothing but itself.
pub fn matches(pattern: Option<&str>, value: Option<&str>) -> bool {
    let Some(pattern) = pattern else {
        return true;
    };
    let value = value.unwrap_or("");
    if pattern == value {
        return true;
    }
    if !pattern.contains('*') {
        return false;
    }
    compiled(pattern).is_some_and(|regex| regex.is_match(value))
}

/// The regex for `pattern`, compiled at most once per cache generation.
fn compiled(pattern: &str) -> Option<Regex> {
    if let Some(hit) = CACHE
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(pattern)
    {
        return hit.clone();
    }
    let regex = match WildcardPattern::new(pattern) {
        Ok(compiled) => Some(compiled.regex),
        Err(err) => {
            tracing::debug!(%err, "ignoring uncompilable wildcard pattern");
            None
        }
    };
    let mut cache = CACHE.write().unwrap_or_else(PoisonError::into_inner);
    if cache.len() >= CACHE_LIMIT {
        cache.clear();
    }
    cache.insert(pattern.to_string(), regex.clone());
    regex
}

fn to_regex(pattern: &str) -> String {
    let body = pattern
        .split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*?");
    format!(r"\A(?s:{body})\z")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_pattern_matches_anything() {
        assert!(matches(None, Some("abc")));
        assert!(matches(None, None));
    }

    #[test]
    fn star_spans_any_run() {
        assert!(matches(Some("a*c"), Some("abc")));
        assert!(matches(Some("a*c"), Some("ac")));
        assert!(matches(Some("a*c"), Some("abbbbc")));
        assert!(!matches(Some("a*c"), Some("abd")));
        assert!(matches(Some("*"), Some("")));
        assert!(matches(Some("*"), None));
    }

    #[test]
    fn dots_are_literal() {
        assert!(matches(Some("A.B"), Some("A.B")));
        assert!(!matches(Some("A.B"), Some("AxB")));
        assert!(matches(Some("1.*"), Some("1.2.3")));
        assert!(!matches(Some("1.*"), Some("102")));
    }

    #[test]
    fn full_string_match_is_required() {
        assert!(!matches(Some("foo"), Some("foobar")));
        assert!(!matches(Some("foo*"), Some("xfoobar")));
        assert!(matches(Some("*bar"), Some("foobar")));
    }

    #[test]
    fn none_value_compares_as_empty_string() {
        assert!(matches(Some(""), None));
        assert!(!matches(Some("x"), None));
    }

    #[test]
    fn metacharacters_are_escaped() {
        assert!(matches(Some("a+(b)?[c]"), Some("a+(b)?[c]")));
        assert!(matches(Some("a+*"), Some("a+anything")));
        assert!(!matches(Some("a+*"), Some("aa")));
    }

    #[test]
    fn multiline_values_match_across_newlines() {
        assert!(matches(Some("first*last"), Some("first\nmiddle\nlast")));
    }

    #[test]
    fn control_characters_are_rejected_at_validation() {
        assert_eq!(
            validate("bad\u{7}pattern"),
            Err(PatternError::ControlCharacter("bad\u{7}pattern".to_string()))
        );
        assert!(validate("org.example.*").is_ok());
    }

    #[test]
    fn repeated_lookups_reuse_the_compiled_regex() {
        let first = compiled("org.example.*").expect("compile");
        let second = compiled("org.example.*").expect("cached");
        assert_eq!(first.as_str(), second.as_str());
        assert!(second.is_match("org.example.lib"));
        assert!(compiled("bad\u{7}*").is_none());
        assert!(!matches(Some("bad\u{7}*"), Some("bad\u{7}x")));
    }

    #[test]
    fn compiled_pattern_agrees_with_free_function() {
        let compiled = WildcardPattern::new("lib-*.jar").expect("compile");
        for value in ["lib-1.0.jar", "lib-.jar", "lib.jar", "xlib-1.jar"] {
            assert_eq!(
                compiled.is_match(Some(value)),
                matches(Some("lib-*.jar"), Some(value)),
                "{value}"
            );
        }
    }
}

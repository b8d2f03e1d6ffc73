//! License model: single licenses and SPDX-style license expressions.
//!
//! Expressions are parsed with the usual precedence (`AND` binds tighter than
//! `OR`, parentheses group). `WITH` exceptions stay part of the license id,
//! so `GPL-2.0-only WITH Classpath-exception-2.0` is one license.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub mod threat_groups {
    pub const PERMISSIVE: &str = "permissive";
    pub const WEAK_COPYLEFT: &str = "weak-copyleft";
    pub const STRONG_COPYLEFT: &str = "strong-copyleft";
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LicenseExpressionError {
    #[error("license expression {input:?}: unexpected {token:?} at token {position}")]
    UnexpectedToken {
        input: String,
        token: String,
        position: usize,
    },
    #[error("license expression {input:?} ends unexpectedly")]
    UnexpectedEnd { input: String },
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct License {
    pub id: String,
    pub name: Option<String>,
    pub text: Option<String>,
    pub threat_group: Option<String>,
}

impl License {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            text: None,
            threat_group: None,
        }
    }

    /// Split `X WITH exception` into the base id and the exception.
    pub fn split_exception(&self) -> (&str, Option<&str>) {
        match self.id.split_once(" WITH ") {
            Some((base, exception)) => (base, Some(exception)),
            None => (self.id.as_str(), None),
        }
    }

    pub fn has_text(&self) -> bool {
        self.text.as_deref().is_some_and(|t| !t.trim().is_empty())
    }

    pub fn is_in_threat_group(&self, group: &str) -> bool {
        self.threat_group
            .as_deref()
            .is_some_and(|g| g.eq_ignore_ascii_case(group))
    }
}

impl fmt::Display for License {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum LicenseExpression {
    #[default]
    Empty,
    Single(License),
    And(Vec<LicenseExpression>),
    Or(Vec<LicenseExpression>),
}

impl LicenseExpression {
    pub fn single(id: impl Into<String>) -> Self {
        Self::Single(License::new(id))
    }

    pub fn parse(input: &str) -> Result<Self, LicenseExpressionError> {
        let tokens = tokenize(input);
        if tokens.is_empty() {
            return Ok(Self::Empty);
        }
        let mut parser = Parser {
            input,
            tokens,
            pos: 0,
        };
        let expr = parser.or_expr()?;
        match parser.peek() {
            None => Ok(expr),
            Some(token) => Err(parser.unexpected(token)),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Single(_) => false,
            Self::And(items) | Self::Or(items) => items.iter().all(Self::is_empty),
        }
    }

    /// Every license mentioned, in expression order.
    pub fn licenses(&self) -> Vec<&License> {
        let mut out = Vec::new();
        self.collect_licenses(&mut out);
        out
    }

    fn collect_licenses<'a>(&'a self, out: &mut Vec<&'a License>) {
        match self {
            Self::Empty => {}
            Self::Single(license) => out.push(license),
            Self::And(items) | Self::Or(items) => {
                for item in items {
                    item.collect_licenses(out);
                }
            }
        }
    }

    /// Conjunction; an empty side is neutral.
    pub fn and(self, other: Self) -> Self {
        match (self, other) {
            (Self::Empty, other) => other,
            (this, Self::Empty) => this,
            (this, other) => {
                let mut items = Vec::new();
                for part in [this, other] {
                    match part {
                        Self::And(nested) => items.extend(nested),
                        part => items.push(part),
                    }
                }
                Self::And(items)
            }
        }
    }

    pub fn map_licenses<F>(self, f: &mut F) -> Self
    where
        F: FnMut(License) -> License,
    {
        match self {
            Self::Empty => Self::Empty,
            Self::Single(license) => Self::Single(f(license)),
            Self::And(items) => Self::And(items.into_iter().map(|i| i.map_licenses(f)).collect()),
            Self::Or(items) => Self::Or(items.into_iter().map(|i| i.map_licenses(f)).collect()),
        }
    }

    /// Whether a license choice exists that avoids every license for which
    /// `avoid` returns true. `OR` offers a choice, `AND` does not.
    pub fn satisfiable_without<F>(&self, avoid: &F) -> bool
    where
        F: Fn(&License) -> bool,
    {
        match self {
            Self::Empty => true,
            Self::Single(license) => !avoid(license),
            Self::And(items) => items.iter().all(|i| i.satisfiable_without(avoid)),
            Self::Or(items) => items.iter().any(|i| i.satisfiable_without(avoid)),
        }
    }

    fn fmt_operand(&self, f: &mut fmt::Formatter<'_>, in_and: bool) -> fmt::Result {
        match self {
            Self::Or(items) if in_and && items.len() > 1 => write!(f, "({self})"),
            _ => write!(f, "{self}"),
        }
    }
}

impl fmt::Display for LicenseExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (items, sep, in_and) = match self {
            Self::Empty => return Ok(()),
            Self::Single(license) => return write!(f, "{license}"),
            Self::And(items) => (items, " AND ", true),
            Self::Or(items) => (items, " OR ", false),
        };
        for (i, item) in items.iter().filter(|i| !i.is_empty()).enumerate() {
            if i > 0 {
                f.write_str(sep)?;
            }
            item.fmt_operand(f, in_and)?;
        }
        Ok(())
    }
}

impl FromStr for LicenseExpression {
    type Err = LicenseExpressionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Token {
    Open,
    Close,
    And,
    Or,
    With,
    Id(String),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Open => f.write_str("("),
            Token::Close => f.write_str(")"),
            Token::And => f.write_str("AND"),
            Token::Or => f.write_str("OR"),
            Token::With => f.write_str("WITH"),
            Token::Id(id) => f.write_str(id),
        }
    }
}

fn tokenize(input: &str) -> Vec<Token> {
    let spaced = input.replace('(', " ( ").replace(')', " ) ");
    spaced
        .split_whitespace()
        .map(|word| match word {
            "(" => Token::Open,
            ")" => Token::Close,
            w if w.eq_ignore_ascii_case("and") => Token::And,
            w if w.eq_ignore_ascii_case("or") => Token::Or,
            w if w.eq_ignore_ascii_case("with") => Token::With,
            w => Token::Id(w.to_string()),
        })
        .collect()
}

struct Parser<'a> {
    input: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).cloned()
    }

    fn next(&mut self) -> Result<Token, LicenseExpressionError> {
        let token = self
            .tokens
            .get(self.pos)
            .cloned()
            .ok_or_else(|| LicenseExpressionError::UnexpectedEnd {
                input: self.input.to_string(),
            })?;
        self.pos += 1;
        Ok(token)
    }

    fn unexpected(&self, token: Token) -> LicenseExpressionError {
        LicenseExpressionError::UnexpectedToken {
            input: self.input.to_string(),
            token: token.to_string(),
            position: self.pos,
        }
    }

    /// Join `first` with the identifier words that follow it, so license
    /// names such as "The MIT License" stay one id.
    fn words(&mut self, first: String) -> String {
        let mut id = first;
        while let Some(Token::Id(word)) = self.peek() {
            id.push(' ');
            id.push_str(&word);
            self.pos += 1;
        }
        id
    }

    fn or_expr(&mut self) -> Result<LicenseExpression, LicenseExpressionError> {
        let mut items = vec![self.and_expr()?];
        while self.peek() == Some(Token::Or) {
            self.pos += 1;
            items.push(self.and_expr()?);
        }
        Ok(collapse(items, false))
    }

    fn and_expr(&mut self) -> Result<LicenseExpression, LicenseExpressionError> {
        let mut items = vec![self.atom()?];
        while self.peek() == Some(Token::And) {
            self.pos += 1;
            items.push(self.atom()?);
        }
        Ok(collapse(items, true))
    }

    fn atom(&mut self) -> Result<LicenseExpression, LicenseExpressionError> {
        match self.next()? {
            Token::Open => {
                let inner = self.or_expr()?;
                match self.next()? {
                    Token::Close => Ok(inner),
                    other => {
                        self.pos -= 1;
                        Err(self.unexpected(other))
                    }
                }
            }
            Token::Id(first) => {
                let id = self.words(first);
                if self.peek() == Some(Token::With) {
                    self.pos += 1;
                    match self.next()? {
                        Token::Id(first) => {
                            let exception = self.words(first);
                            Ok(LicenseExpression::single(format!("{id} WITH {exception}")))
                        }
                        other => {
                            self.pos -= 1;
                            Err(self.unexpected(other))
                        }
                    }
                } else {
                    Ok(LicenseExpression::single(id))
                }
            }
            other => {
                self.pos -= 1;
                Err(self.unexpected(other))
            }
        }
    }
}

/// Flatten nested operands of the same operator; a single operand stands alone.
fn collapse(items: Vec<LicenseExpression>, is_and: bool) -> LicenseExpression {
    if items.len() == 1 {
        return items.into_iter().next().unwrap_or_default();
    }
    let mut flat = Vec::with_capacity(items.len());
    for item in items {
        match item {
            LicenseExpression::And(nested) if is_and => flat.extend(nested),
            LicenseExpression::Or(nested) if !is_and => flat.extend(nested),
            item => flat.push(item),
        }
    }
    if is_and {
        LicenseExpression::And(flat)
    } else {
        LicenseExpression::Or(flat)
    }
}

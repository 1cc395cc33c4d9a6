//! Single-token patterns

use crate::vbs::error::{Result, VbsError};
use crate::vbs::token::{Attribute, Token, TokenKind};
use regex::Regex;

/// How attribute constraints are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Comparison {
    #[default]
    Exact,
    /// Regex search anywhere in the attribute value.
    Regex,
}

#[derive(Debug, Clone)]
enum Constraint {
    Exact(String),
    Regex(Regex),
}

impl Constraint {
    fn accepts(&self, value: &str) -> bool {
        match self {
            Constraint::Exact(expected) => value == expected,
            Constraint::Regex(re) => re.is_match(value),
        }
    }
}

/// A compiled test for one token.
#[derive(Debug, Clone)]
pub struct TokenPattern {
    kind: TokenKind,
    constraints: Vec<(Attribute, Constraint)>,
    optional: bool,
}

impl TokenPattern {
    /// Matches any token of `kind`.
    pub fn any(kind: TokenKind) -> Self {
        Self {
            kind,
            constraints: Vec::new(),
            optional: false,
        }
    }

    pub fn new(
        kind: TokenKind,
        pairs: &[(&str, &str)],
        comparison: Comparison,
        optional: bool,
    ) -> Result<Self> {
        let mut constraints = Vec::with_capacity(pairs.len());
        for (name, value) in pairs {
            let attribute: Attribute = name.parse()?;
            let constraint = match comparison {
                Comparison::Exact => Constraint::Exact(value.to_string()),
                Comparison::Regex => Constraint::Regex(Regex::new(value).map_err(|e| {
                    VbsError::PatternCompile(format!(
                        "{} constraint on {}: {}",
                        attribute, kind, e
                    ))
                })?),
            };
            constraints.push((attribute, constraint));
        }
        Ok(Self {
            kind,
            constraints,
            optional,
        })
    }

    pub fn exact(kind: TokenKind, pairs: &[(&str, &str)]) -> Result<Self> {
        Self::new(kind, pairs, Comparison::Exact, false)
    }

    pub fn regex(kind: TokenKind, pairs: &[(&str, &str)]) -> Result<Self> {
        Self::new(kind, pairs, Comparison::Regex, false)
    }

    /// Marks the pattern as satisfied even when its test fails.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    pub fn target(&self) -> TokenKind {
        self.kind
    }

    pub fn test(&self, token: &Token) -> bool {
        if token.kind() != self.kind {
            return false;
        }
        self.constraints
            .iter()
            .all(|(attribute, constraint)| match token.attribute(*attribute) {
                Some(value) => constraint.accepts(value),
                None => false,
            })
    }
}

/// The convenience forms a matcher can be built from.
#[derive(Debug, Clone)]
pub enum PatternSpec {
    Kind(TokenKind),
    Constrained {
        kind: TokenKind,
        pairs: Vec<(String, String)>,
        comparison: Comparison,
        optional: bool,
    },
    Pattern(TokenPattern),
}

impl PatternSpec {
    pub fn compile(self) -> Result<TokenPattern> {
        match self {
            PatternSpec::Kind(kind) => Ok(TokenPattern::any(kind)),
            PatternSpec::Constrained {
                kind,
                pairs,
                comparison,
                optional,
            } => {
                let borrowed: Vec<(&str, &str)> = pairs
                    .iter()
                    .map(|(k, v)| (k.as_str(), v.as_str()))
                    .collect();
                TokenPattern::new(kind, &borrowed, comparison, optional)
            }
            PatternSpec::Pattern(pattern) => Ok(pattern),
        }
    }
}

fn owned_pairs(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

impl From<TokenKind> for PatternSpec {
    fn from(kind: TokenKind) -> Self {
        PatternSpec::Kind(kind)
    }
}

impl From<TokenPattern> for PatternSpec {
    fn from(pattern: TokenPattern) -> Self {
        PatternSpec::Pattern(pattern)
    }
}

impl<const N: usize> From<(TokenKind, [(&str, &str); N])> for PatternSpec {
    fn from((kind, pairs): (TokenKind, [(&str, &str); N])) -> Self {
        PatternSpec::Constrained {
            kind,
            pairs: owned_pairs(&pairs),
            comparison: Comparison::Exact,
            optional: false,
        }
    }
}

impl<const N: usize> From<(TokenKind, [(&str, &str); N], Comparison)> for PatternSpec {
    fn from((kind, pairs, comparison): (TokenKind, [(&str, &str); N], Comparison)) -> Self {
        PatternSpec::Constrained {
            kind,
            pairs: owned_pairs(&pairs),
            comparison,
            optional: false,
        }
    }
}

impl<const N: usize> From<(TokenKind, [(&str, &str); N], Comparison, bool)> for PatternSpec {
    fn from(
        (kind, pairs, comparison, optional): (TokenKind, [(&str, &str); N], Comparison, bool),
    ) -> Self {
        PatternSpec::Constrained {
            kind,
            pairs: owned_pairs(&pairs),
            comparison,
            optional,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn op(s: &str) -> Token {
        Token::Operator(s.to_string())
    }

    #[test]
    fn test_variant_must_match() {
        let pattern = TokenPattern::any(TokenKind::Numeric);
        assert!(pattern.test(&Token::Numeric("1".to_string())));
        assert!(!pattern.test(&Token::Variable("x".to_string())));
    }

    #[test]
    fn test_exact_constraint() {
        let pattern = TokenPattern::exact(TokenKind::Operator, &[("value", "=")]).unwrap();
        assert!(pattern.test(&op("=")));
        assert!(!pattern.test(&op("+=")));
    }

    #[test]
    fn test_regex_constraint_searches() {
        let pattern = TokenPattern::regex(TokenKind::Operator, &[("value", "[^=]")]).unwrap();
        assert!(pattern.test(&op("+")));
        assert!(pattern.test(&op("+=")));
        assert!(!pattern.test(&op("=")));
    }

    #[test]
    fn test_missing_attribute_fails() {
        let pattern = TokenPattern::exact(TokenKind::Variable, &[("data", "x")]).unwrap();
        assert!(!pattern.test(&Token::Variable("x".to_string())));
    }

    #[test]
    fn test_data_and_name_attributes() {
        let data = TokenPattern::exact(TokenKind::String, &[("data", "ab")]).unwrap();
        assert!(data.test(&Token::String("\"ab\"".to_string())));

        let name = TokenPattern::regex(TokenKind::Function, &[("name", "(?i)^chr$")]).unwrap();
        assert!(name.test(&Token::Function("Chr(65)".to_string())));
        assert!(!name.test(&Token::Function("ChrW(65)".to_string())));
    }

    #[test]
    fn test_compile_errors() {
        assert!(matches!(
            TokenPattern::exact(TokenKind::Operator, &[("colour", "=")]),
            Err(VbsError::PatternCompile(_))
        ));
        assert!(matches!(
            TokenPattern::regex(TokenKind::Operator, &[("value", "(")]),
            Err(VbsError::PatternCompile(_))
        ));
    }

    #[test]
    fn test_spec_forms() {
        let from_kind = PatternSpec::from(TokenKind::String).compile().unwrap();
        assert_eq!(from_kind.target(), TokenKind::String);

        let from_tuple = PatternSpec::from((TokenKind::Operator, [("value", "&")]))
            .compile()
            .unwrap();
        assert!(from_tuple.test(&op("&")));

        let optional = PatternSpec::from((
            TokenKind::Keyword,
            [("value", "(?i)^set$")],
            Comparison::Regex,
            true,
        ))
        .compile()
        .unwrap();
        assert!(optional.is_optional());
    }
}

//! Standard expressions
//!
//! Named token matchers shared by the heuristics and the resolver. The
//! registry is immutable once built; [`EXPRESSIONS`] holds the default set.

use super::matcher::TokenMatcher;
use super::pattern::{Comparison, PatternSpec};
use crate::vbs::error::Result;
use crate::vbs::token::TokenKind;
use once_cell::sync::Lazy;
use std::collections::HashMap;

pub const MATH: &str = "math";
pub const MATH_NEGATED: &str = "math.negated";
pub const STRING_CONCATENATE: &str = "string.concatenate";
pub const FUNCTION_PROTOTYPE: &str = "function.prototype";
pub const FUNCTION_END: &str = "function.end";
pub const VARIABLE_ASSIGNMENT: &str = "variable.assignment";
pub const VARIABLE_DECLARATION: &str = "variable.declaration";

pub static EXPRESSIONS: Lazy<ExpressionRegistry> = Lazy::new(|| {
    ExpressionRegistry::with_defaults().expect("standard expressions compile")
});

/// Registry of named token matchers.
#[derive(Debug, Clone, Default)]
pub struct ExpressionRegistry {
    matchers: HashMap<String, TokenMatcher>,
}

impl ExpressionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_defaults() -> Result<Self> {
        let mut registry = Self::new();

        // 5 + 2, 4 \ 2
        registry.register(
            MATH,
            TokenMatcher::new(vec![
                PatternSpec::from(TokenKind::Numeric),
                PatternSpec::from((TokenKind::Operator, [("value", "[^=]")], Comparison::Regex)),
                PatternSpec::from(TokenKind::Numeric),
            ])?,
        );

        // 5 - - 2
        registry.register(
            MATH_NEGATED,
            TokenMatcher::new(vec![
                PatternSpec::from(TokenKind::Numeric),
                PatternSpec::from((TokenKind::Operator, [("value", "[^=]")], Comparison::Regex)),
                PatternSpec::from((TokenKind::Operator, [("value", "-")])),
                PatternSpec::from(TokenKind::Numeric),
            ])?,
        );

        // "ab" & "cd", "ab" + "cd"
        registry.register(
            STRING_CONCATENATE,
            TokenMatcher::new(vec![
                PatternSpec::from(TokenKind::String),
                PatternSpec::from((TokenKind::Operator, [("value", "^[+&]$")], Comparison::Regex)),
                PatternSpec::from(TokenKind::String),
            ])?,
        );

        // Sub Main(), Function f(a, b)
        registry.register(
            FUNCTION_PROTOTYPE,
            TokenMatcher::new(vec![
                PatternSpec::from((
                    TokenKind::Keyword,
                    [("value", "(?i)^(?:Sub|Function)$")],
                    Comparison::Regex,
                )),
                PatternSpec::from(TokenKind::Function),
            ])?,
        );

        // End Sub, End Function
        registry.register(
            FUNCTION_END,
            TokenMatcher::new(vec![
                PatternSpec::from((
                    TokenKind::Keyword,
                    [("value", "(?i)^End$")],
                    Comparison::Regex,
                )),
                PatternSpec::from((
                    TokenKind::Keyword,
                    [("value", "(?i)^(?:Sub|Function)$")],
                    Comparison::Regex,
                )),
            ])?,
        );

        // x = ...
        registry.register(
            VARIABLE_ASSIGNMENT,
            TokenMatcher::new(vec![
                PatternSpec::from(TokenKind::Variable),
                PatternSpec::from((TokenKind::Operator, [("value", "=")])),
            ])?,
        );

        // Dim x, ReDim x(10)
        registry.register(
            VARIABLE_DECLARATION,
            TokenMatcher::new(vec![
                PatternSpec::from((
                    TokenKind::Keyword,
                    [("value", "(?i)^(?:Re)?Dim$")],
                    Comparison::Regex,
                )),
                PatternSpec::from(TokenKind::Variable),
            ])?,
        );

        Ok(registry)
    }

    pub fn register(&mut self, name: impl Into<String>, matcher: TokenMatcher) {
        self.matchers.insert(name.into(), matcher);
    }

    pub fn get(&self, name: &str) -> Option<&TokenMatcher> {
        self.matchers.get(name)
    }

    pub fn has(&self, name: &str) -> bool {
        self.matchers.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn list_all(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.matchers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

//! Fixed-length token matchers

use super::pattern::{PatternSpec, TokenPattern};
use crate::vbs::error::{Result, VbsError};
use crate::vbs::token::Token;
use std::ops::Range;

/// A satisfied window: the searched tokens plus the half-open span that matched.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenMatch<'a> {
    source: &'a [Token],
    span: Range<usize>,
}

impl<'a> TokenMatch<'a> {
    pub fn source(&self) -> &'a [Token] {
        self.source
    }

    pub fn span(&self) -> Range<usize> {
        self.span.clone()
    }

    pub fn matched(&self) -> &'a [Token] {
        &self.source[self.span.clone()]
    }

    /// Tokens before the match.
    pub fn prefix(&self) -> &'a [Token] {
        &self.source[..self.span.start]
    }

    /// Tokens after the match.
    pub fn suffix(&self) -> &'a [Token] {
        &self.source[self.span.end..]
    }
}

#[derive(Debug, Clone)]
pub struct TokenMatcher {
    patterns: Vec<TokenPattern>,
}

impl TokenMatcher {
    /// Compiles every pattern up front. An empty sequence is rejected.
    pub fn new<I, P>(specs: I) -> Result<Self>
    where
        I: IntoIterator<Item = P>,
        P: Into<PatternSpec>,
    {
        let patterns = specs
            .into_iter()
            .map(|spec| spec.into().compile())
            .collect::<Result<Vec<_>>>()?;
        if patterns.is_empty() {
            return Err(VbsError::PatternCompile(
                "a token matcher needs at least one pattern".to_string(),
            ));
        }
        Ok(Self { patterns })
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn patterns(&self) -> &[TokenPattern] {
        &self.patterns
    }

    fn accepts(&self, window: &[Token]) -> bool {
        self.patterns
            .iter()
            .zip(window)
            .all(|(pattern, token)| pattern.optional_or_test(token))
    }

    /// Tests the first `len()` tokens.
    pub fn match_at_start<'a>(&self, tokens: &'a [Token]) -> Option<TokenMatch<'a>> {
        let width = self.len();
        if tokens.len() < width || !self.accepts(&tokens[..width]) {
            return None;
        }
        Some(TokenMatch {
            source: tokens,
            span: 0..width,
        })
    }

    /// Lowest offset whose window satisfies every pattern.
    pub fn first_match<'a>(&self, tokens: &'a [Token]) -> Option<TokenMatch<'a>> {
        self.offsets(tokens).next().map(|start| TokenMatch {
            source: tokens,
            span: start..start + self.len(),
        })
    }

    /// Every satisfying offset, lowest first. Windows may overlap.
    pub fn all_matches<'a>(&self, tokens: &'a [Token]) -> Vec<TokenMatch<'a>> {
        self.offsets(tokens)
            .map(|start| TokenMatch {
                source: tokens,
                span: start..start + self.len(),
            })
            .collect()
    }

    pub fn is_match(&self, tokens: &[Token]) -> bool {
        self.offsets(tokens).next().is_some()
    }

    fn offsets<'s>(&'s self, tokens: &'s [Token]) -> impl Iterator<Item = usize> + 's {
        let width = self.len();
        tokens
            .windows(width)
            .enumerate()
            .filter(move |(_, window)| self.accepts(window))
            .map(|(start, _)| start)
    }
}

impl TokenPattern {
    fn optional_or_test(&self, token: &Token) -> bool {
        self.is_optional() || self.test(token)
    }
}

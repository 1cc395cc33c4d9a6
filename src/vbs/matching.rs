//! Structural matching over token sequences
//!
//! A [`TokenPattern`] tests one token: its variant, plus optional constraints
//! on its named attributes compared exactly or by regex search. A
//! [`TokenMatcher`] is a fixed-length sequence of patterns tested against a
//! window of tokens at the start, at the first offset that works, or at every
//! offset.
//!
//! Patterns are compiled when the matcher is built, so a bad attribute name or
//! regex fails before any matching happens.

pub mod matcher;
pub mod pattern;
pub mod standard;

pub use matcher::{TokenMatch, TokenMatcher};
pub use pattern::{Comparison, PatternSpec, TokenPattern};
pub use standard::{ExpressionRegistry, EXPRESSIONS};

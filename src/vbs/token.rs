//! Token model
//!
//! A token is an immutable, typed fragment of one source line. The variant set
//! is closed: every component that needs to tell tokens apart (the lexer's
//! definition table, the pattern tester, the renderer) matches on [`Token`]
//! exhaustively.

pub mod base;
pub mod function;

pub use base::{Attribute, Token, TokenKind};
pub use function::{parse_arguments, split_call};

/// The tokens produced from exactly one line of input.
pub type Line = Vec<Token>;

//! Lexer
//!
//! Turns one line of VBScript into typed tokens without a grammar. A window
//! over the line grows one character at a time and is checked against an
//! ordered table of token definitions (see [`definitions`]); each definition
//! has a content regex plus optional regexes over the text before and after
//! the window. A token is emitted when the window is valid but growing it by
//! one more character is not, so tokens are the longest still-valid windows.
//!
//! The inverse operations live next to it:
//! - [`detokenizer`]: space-joins lexemes back into a line.
//! - [`render`]: rebuilds block indentation from keyword deltas.
//!
//! The VBScript table is compiled once into [`VB_LEXER`]; the free functions in
//! this module are shortcuts over it.

pub mod definitions;
pub mod detokenizer;
pub mod render;
pub mod tokenizer;

pub use definitions::TokenDefinition;
pub use detokenizer::{untokenize, ToSource};
pub use render::{BlockDelta, BlockKeywords, DEFAULT_INDENT};
pub use tokenizer::{Lexer, VB_LEXER};

use crate::vbs::token::Line;

/// Tokenizes one line with the VBScript lexer.
pub fn tokenize(line: &str) -> Line {
    VB_LEXER.tokenize(line)
}

/// Tokenizes each line with the VBScript lexer.
pub fn tokenize_lines<S: AsRef<str>>(lines: &[S]) -> Vec<Line> {
    VB_LEXER.tokenize_lines(lines)
}

/// Renders token lines with the VBScript block table and tab indentation.
pub fn render(lines: &[Line]) -> Vec<String> {
    VB_LEXER.render(lines, DEFAULT_INDENT)
}

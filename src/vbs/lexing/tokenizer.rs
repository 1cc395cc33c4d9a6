//! Window-growing tokenizer

use super::definitions::{vbscript_definitions, TokenDefinition};
use super::render::BlockKeywords;
use crate::vbs::error::Result;
use crate::vbs::token::{Line, Token, TokenKind};
use once_cell::sync::Lazy;
use tracing::trace;

/// The VBScript lexer, compiled once.
pub static VB_LEXER: Lazy<Lexer> =
    Lazy::new(|| Lexer::vbscript().expect("built-in VBScript token table compiles"));

/// A table-driven lexer plus the block keywords its renderer indents by.
#[derive(Debug, Clone)]
pub struct Lexer {
    definitions: Vec<TokenDefinition>,
    blocks: BlockKeywords,
}

impl Lexer {
    pub fn new(definitions: Vec<TokenDefinition>, blocks: BlockKeywords) -> Self {
        Self {
            definitions,
            blocks,
        }
    }

    pub fn vbscript() -> Result<Self> {
        Ok(Self::new(vbscript_definitions()?, BlockKeywords::vbscript()))
    }

    pub fn definitions(&self) -> &[TokenDefinition] {
        &self.definitions
    }

    pub fn blocks(&self) -> &BlockKeywords {
        &self.blocks
    }

    /// First definition accepting `line[start..end]`.
    fn classify(&self, line: &str, start: usize, end: usize) -> Option<TokenKind> {
        self.definitions
            .iter()
            .find(|def| def.accepts(line, start, end))
            .map(TokenDefinition::kind)
    }

    /// Tokenizes one line. Leading and trailing whitespace is ignored; text
    /// that no definition accepts ends up in a trailing Generic token, so no
    /// input is lost apart from separators.
    pub fn tokenize(&self, line: &str) -> Line {
        let line = line.trim();
        // Byte offset of every char, plus the end of the line.
        let bounds: Vec<usize> = line
            .char_indices()
            .map(|(i, _)| i)
            .chain(std::iter::once(line.len()))
            .collect();
        let len = bounds.len() - 1;

        let mut tokens = Vec::new();
        let mut start = 0;
        let mut offset = 1;

        while start + offset < len {
            let (from, to) = (bounds[start], bounds[start + offset]);
            let window = &line[from..to];
            if window == "," || window.chars().all(char::is_whitespace) {
                start += 1;
                continue;
            }

            if let Some(kind) = self.classify(line, from, to) {
                if self.classify(line, from, bounds[start + offset + 1]).is_none() {
                    trace!(%kind, lexeme = window, "token");
                    tokens.push(Token::new(kind, window));
                    start += offset;
                    offset = 1;
                    continue;
                }
            }
            offset += 1;
        }

        if start < len {
            let from = bounds[start];
            let kind = self
                .classify(line, from, line.len())
                .unwrap_or(TokenKind::Generic);
            trace!(%kind, lexeme = &line[from..], "tail token");
            tokens.push(Token::new(kind, &line[from..]));
        }

        tokens
    }

    pub fn tokenize_lines<S: AsRef<str>>(&self, lines: &[S]) -> Vec<Line> {
        lines.iter().map(|line| self.tokenize(line.as_ref())).collect()
    }
}

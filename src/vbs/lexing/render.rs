//! Block-aware renderer
//!
//! Source indentation is discarded by the lexer. Rendering rebuilds it from a
//! table of block keywords, each carrying a pair of deltas: one applied to the
//! nesting level before its line is written and one applied after.

use super::detokenizer::untokenize;
use super::tokenizer::Lexer;
use crate::vbs::token::{Line, Token};
use std::collections::HashMap;

pub const DEFAULT_INDENT: &str = "\t";

/// Nesting change around a block keyword line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockDelta {
    pub before: i32,
    pub after: i32,
}

/// Block keywords, keyed case-insensitively by a line's first word or first two
/// words.
#[derive(Debug, Clone, Default)]
pub struct BlockKeywords {
    entries: HashMap<String, BlockDelta>,
}

impl BlockKeywords {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, keyword: &str, before: i32, after: i32) {
        self.entries
            .insert(keyword.to_lowercase(), BlockDelta { before, after });
    }

    pub fn vbscript() -> Self {
        let mut blocks = Self::new();
        for opener in ["Function", "Sub", "If", "#If", "Select", "For", "Do", "While"] {
            blocks.insert(opener, 0, 1);
        }
        for middle in ["Else", "#Else", "ElseIf", "Case"] {
            blocks.insert(middle, -1, 1);
        }
        for closer in ["End", "#End", "Next", "Loop", "Wend"] {
            blocks.insert(closer, -1, 0);
        }
        for scoped in [
            "Private Sub",
            "Public Sub",
            "Private Function",
            "Public Function",
        ] {
            blocks.insert(scoped, 0, 1);
        }
        blocks
    }

    pub fn get(&self, keyword: &str) -> Option<BlockDelta> {
        self.entries.get(&keyword.to_lowercase()).copied()
    }

    /// Delta for a whole line: its first token, else its first two tokens.
    pub fn lookup(&self, line: &[Token]) -> Option<BlockDelta> {
        let first = line.first()?;
        self.get(first.lexeme()).or_else(|| {
            let second = line.get(1)?;
            self.get(&format!("{} {}", first.lexeme(), second.lexeme()))
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Lexer {
    /// Renders token lines, one string per non-empty line, indented by
    /// `indent` once per nesting level. The level never drops below zero.
    pub fn render(&self, lines: &[Line], indent: &str) -> Vec<String> {
        let mut depth: i32 = 0;
        let mut out = Vec::with_capacity(lines.len());

        for line in lines.iter().filter(|line| !line.is_empty()) {
            let delta = self.blocks().lookup(line);
            if let Some(delta) = delta {
                depth = (depth + delta.before).max(0);
            }
            out.push(format!(
                "{}{}",
                indent.repeat(depth as usize),
                untokenize(line)
            ));
            if let Some(delta) = delta {
                depth = (depth + delta.after).max(0);
            }
        }

        out
    }
}

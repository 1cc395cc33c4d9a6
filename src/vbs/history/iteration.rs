//! One version of the tokenized source

use crate::vbs::lexing::{untokenize, Lexer, DEFAULT_INDENT, VB_LEXER};
use crate::vbs::token::{Line, Token, TokenKind};
use serde::{Deserialize, Serialize};

/// Index of an iteration in its history.
pub type IterationId = usize;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Iteration {
    id: IterationId,
    lines: Vec<Line>,
    parent: Option<IterationId>,
    children: Vec<IterationId>,
}

impl Iteration {
    pub(crate) fn new(id: IterationId, lines: Vec<Line>, parent: Option<IterationId>) -> Self {
        Self {
            id,
            lines,
            parent,
            children: Vec::new(),
        }
    }

    /// Records a successor. Ids already present are ignored.
    pub(crate) fn add_child(&mut self, child: IterationId) {
        if !self.children.contains(&child) {
            self.children.push(child);
        }
    }

    pub fn id(&self) -> IterationId {
        self.id
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// The iteration this one was derived from; `None` for the root.
    pub fn parent(&self) -> Option<IterationId> {
        self.parent
    }

    /// Iterations derived from this one, in push order.
    pub fn children(&self) -> &[IterationId] {
        &self.children
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Number of lines, empty ones included.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn line(&self, index: usize) -> Option<&Line> {
        self.lines.get(index)
    }

    /// Untokenized text of one line, without indentation.
    pub fn line_text(&self, index: usize) -> Option<String> {
        self.lines.get(index).map(|line| untokenize(line))
    }

    pub fn render(&self, lexer: &Lexer, indent: &str) -> Vec<String> {
        lexer.render(&self.lines, indent)
    }

    /// Rendered code using the VBScript lexer and tab indentation.
    pub fn code(&self) -> Vec<String> {
        self.render(&VB_LEXER, DEFAULT_INDENT)
    }

    /// Every Function token with the index of its line.
    pub fn functions(&self) -> Vec<(usize, &Token)> {
        self.tokens_of(TokenKind::Function)
    }

    /// Every String token with the index of its line.
    pub fn strings(&self) -> Vec<(usize, &Token)> {
        self.tokens_of(TokenKind::String)
    }

    fn tokens_of(&self, kind: TokenKind) -> Vec<(usize, &Token)> {
        self.lines
            .iter()
            .enumerate()
            .flat_map(|(i, line)| line.iter().filter(|t| t.is(kind)).map(move |t| (i, t)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vbs::lexing::tokenize_lines;

    fn iteration(lines: &[&str]) -> Iteration {
        Iteration::new(0, tokenize_lines(lines), None)
    }

    #[test]
    fn test_derived_properties() {
        let it = iteration(&["Sub Main()", "x = Chr(65) & \"b\"", "End Sub"]);
        assert!(it.is_root());
        assert_eq!(it.len(), 3);
        assert_eq!(it.line_text(1).as_deref(), Some("x = Chr(65) & \"b\""));
        assert_eq!(it.line_text(3), None);
        assert_eq!(it.code(), vec!["Sub Main()", "\tx = Chr(65) & \"b\"", "End Sub"]);

        let functions: Vec<(usize, &str)> = it
            .functions()
            .into_iter()
            .map(|(i, t)| (i, t.lexeme()))
            .collect();
        assert_eq!(functions, vec![(0, "Main()"), (1, "Chr(65)")]);
        assert_eq!(it.strings().len(), 1);
    }

    #[test]
    fn test_children_are_a_set() {
        let mut it = iteration(&["x = 1"]);
        it.add_child(3);
        it.add_child(5);
        it.add_child(3);
        assert_eq!(it.children(), &[3, 5]);
    }
}

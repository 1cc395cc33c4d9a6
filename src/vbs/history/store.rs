//! The iteration arena and its active cursor

use super::iteration::{Iteration, IterationId};
use crate::vbs::digest::ContentDigest;
use crate::vbs::error::{Result, VbsError};
use crate::vbs::lexing::{Lexer, DEFAULT_INDENT, VB_LEXER};
use std::fs;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct History {
    iterations: Vec<Iteration>,
    active: Option<IterationId>,
    lexer: &'static Lexer,
    indent: String,
}

impl History {
    /// An empty history using the VBScript lexer and tab indentation.
    pub fn new() -> Self {
        Self::with_lexer(&VB_LEXER, DEFAULT_INDENT)
    }

    pub fn with_lexer(lexer: &'static Lexer, indent: impl Into<String>) -> Self {
        Self {
            iterations: Vec::new(),
            active: None,
            lexer,
            indent: indent.into(),
        }
    }

    /// Sets the indentation unit used when rendering. Iterations are unaffected.
    pub fn with_indent(mut self, indent: impl Into<String>) -> Self {
        self.indent = indent.into();
        self
    }

    /// A history whose root iteration holds `lines`.
    pub fn from_lines<S: AsRef<str>>(lines: &[S]) -> Result<Self> {
        let mut history = Self::new();
        history.push_lines(lines)?;
        Ok(history)
    }

    /// A history whose root iteration holds the lines of the file at `path`.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let mut history = Self::new();
        history.load_path(path)?;
        Ok(history)
    }

    /// Pushes the lines of the file at `path`. Bytes that are not UTF-8, as in
    /// Windows-1252 samples, decode to U+FFFD.
    pub fn load_path(&mut self, path: impl AsRef<Path>) -> Result<&Iteration> {
        let bytes = fs::read(path.as_ref())?;
        let source = String::from_utf8_lossy(&bytes);
        let lines: Vec<&str> = source.lines().collect();
        debug!(path = %path.as_ref().display(), lines = lines.len(), "loaded source");
        self.push_lines(&lines)
    }

    pub(crate) fn from_parts(iterations: Vec<Iteration>, active: Option<IterationId>) -> Self {
        Self {
            iterations,
            active,
            ..Self::new()
        }
    }

    pub fn lexer(&self) -> &'static Lexer {
        self.lexer
    }

    pub fn indent(&self) -> &str {
        &self.indent
    }

    /// Records `lines` as a new iteration derived from the active one.
    ///
    /// Content identical to the active iteration's rendered code is not pushed
    /// again; the active iteration is returned instead. `None` pushes an empty
    /// iteration, which must be allowed explicitly.
    pub fn push<S: AsRef<str>>(
        &mut self,
        lines: Option<&[S]>,
        allow_empty: bool,
    ) -> Result<&Iteration> {
        let tokenized = match lines {
            Some(lines) => self.lexer.tokenize_lines(lines),
            None if allow_empty => Vec::new(),
            None => {
                return Err(VbsError::InvalidInput(
                    "push called without lines and without allow_empty".to_string(),
                ))
            }
        };

        if let Some(active) = self.active {
            let candidate = ContentDigest::of_lines(&self.lexer.render(&tokenized, &self.indent));
            let current =
                ContentDigest::of_lines(&self.iterations[active].render(self.lexer, &self.indent));
            if candidate == current {
                debug!(id = active, digest = %current, "push deduplicated");
                return Ok(&self.iterations[active]);
            }
        }

        let id = self.iterations.len();
        self.iterations.push(Iteration::new(id, tokenized, self.active));
        if let Some(parent) = self.active {
            self.iterations[parent].add_child(id);
        }
        debug!(id, parent = ?self.active, lines = self.iterations[id].len(), "pushed iteration");
        self.active = Some(id);
        Ok(&self.iterations[id])
    }

    pub fn push_lines<S: AsRef<str>>(&mut self, lines: &[S]) -> Result<&Iteration> {
        self.push(Some(lines), false)
    }

    pub fn push_empty(&mut self) -> Result<&Iteration> {
        self.push::<&str>(None, true)
    }

    /// Makes `id` the active iteration. Out-of-range ids leave the cursor
    /// where it was.
    pub fn jump(&mut self, id: IterationId) -> Option<&Iteration> {
        if id < self.iterations.len() {
            debug!(from = ?self.active, to = id, "jump");
            self.active = Some(id);
        }
        self.current()
    }

    /// Walks `count` predecessor links back from the active iteration, stopping
    /// at the root.
    pub fn back(&mut self, count: usize) -> Option<&Iteration> {
        let mut id = self.active?;
        for _ in 0..count {
            match self.iterations[id].parent() {
                Some(parent) => id = parent,
                None => break,
            }
        }
        self.jump(id)
    }

    /// Successors of the active iteration, if it has any.
    pub fn peek(&self) -> Option<&[IterationId]> {
        let children = self.current()?.children();
        if children.is_empty() {
            None
        } else {
            Some(children)
        }
    }

    pub fn current(&self) -> Option<&Iteration> {
        self.active.map(|id| &self.iterations[id])
    }

    pub fn active_id(&self) -> Option<IterationId> {
        self.active
    }

    pub fn get(&self, id: IterationId) -> Option<&Iteration> {
        self.iterations.get(id)
    }

    pub fn iterations(&self) -> &[Iteration] {
        &self.iterations
    }

    pub fn len(&self) -> usize {
        self.iterations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.iterations.is_empty()
    }

    /// Rendered code of the active iteration; empty when there is none.
    pub fn code(&self) -> Vec<String> {
        self.current()
            .map(|it| it.render(self.lexer, &self.indent))
            .unwrap_or_default()
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_push_is_root() {
        let history = History::from_lines(&["Dim x", "x = 1"]).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history.active_id(), Some(0));
        assert!(history.current().unwrap().is_root());
        assert_eq!(history.peek(), None);
    }

    #[test]
    fn test_non_utf8_file_loads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cp1252.vbs");
        fs::write(&path, b"x = \"caf\xe9\"\r\nMsgBox x\r\n").unwrap();

        let history = History::from_path(&path).unwrap();
        assert_eq!(history.code(), vec!["x = \"caf\u{FFFD}\"", "MsgBox x"]);
    }

    #[test]
    fn test_push_without_lines_is_invalid() {
        let mut history = History::new();
        assert!(matches!(
            history.push::<&str>(None, false),
            Err(VbsError::InvalidInput(_))
        ));
        assert!(history.is_empty());

        let empty = history.push_empty().unwrap();
        assert!(empty.is_empty());
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_identical_push_is_deduplicated() {
        let mut history = History::from_lines(&["x = 1"]).unwrap();
        history.push_lines(&["x = 1"]).unwrap();
        history.push_lines(&["   x=1   "]).unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history.active_id(), Some(0));
    }

    #[test]
    fn test_indented_content_is_deduplicated() {
        let mut history = History::from_lines(&["If x Then", "y = 1", "End If"]).unwrap();
        let code = history.code();
        assert_eq!(code[1], "\ty = 1");
        history.push_lines(&code).unwrap();
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_links_and_peek() {
        let mut history = History::from_lines(&["x = 1"]).unwrap();
        let second = history.push_lines(&["x = 2"]).unwrap().id();
        assert_eq!(second, 1);
        assert_eq!(history.get(1).unwrap().parent(), Some(0));

        history.jump(0);
        assert_eq!(history.peek(), Some(&[1][..]));
    }

    #[test]
    fn test_jump_out_of_range_is_a_no_op() {
        let mut history = History::from_lines(&["x = 1"]).unwrap();
        history.push_lines(&["x = 2"]).unwrap();
        assert_eq!(history.jump(7).map(Iteration::id), Some(1));
        assert_eq!(history.active_id(), Some(1));
    }

    #[test]
    fn test_fork_after_jump() {
        let mut history = History::from_lines(&["x = 1"]).unwrap();
        history.push_lines(&["x = 2"]).unwrap();
        history.jump(0);
        history.push_lines(&["x = 3"]).unwrap();

        assert_eq!(history.len(), 3);
        assert_eq!(history.get(0).unwrap().children(), &[1, 2]);
        assert_eq!(history.get(2).unwrap().parent(), Some(0));
    }

    #[test]
    fn test_back_stops_at_root() {
        let mut history = History::from_lines(&["a = 1"]).unwrap();
        history.push_lines(&["a = 2"]).unwrap();
        history.push_lines(&["a = 3"]).unwrap();
        assert_eq!(history.back(1).map(Iteration::id), Some(1));
        assert_eq!(history.back(10).map(Iteration::id), Some(0));
    }

    #[test]
    fn test_custom_indent() {
        let history = History::from_lines(&["Sub Main()", "x = 1", "End Sub"])
            .unwrap()
            .with_indent("    ");
        assert_eq!(history.code()[1], "    x = 1");
    }
}

//! Scope stack for variable resolution
//!
//! Frames map case-insensitive names to the token line last assigned to them.
//! A name declared in a frame without a known value shadows outer frames, so
//! a procedure parameter never resolves to a same-named global.

use crate::vbs::token::{Line, Token};
use std::collections::HashMap;

/// Nested substitutions deeper than this are left as-is.
pub const MAX_RESOLVE_DEPTH: usize = 16;

#[derive(Debug, Clone)]
pub struct ScopeStack {
    frames: Vec<HashMap<String, Option<Line>>>,
}

impl ScopeStack {
    /// A stack holding only the global frame.
    pub fn new() -> Self {
        Self {
            frames: vec![HashMap::new()],
        }
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn push_scope(&mut self) {
        self.frames.push(HashMap::new());
    }

    /// Pops the innermost frame. The global frame is never popped.
    pub fn pop_scope(&mut self) -> bool {
        if self.frames.len() > 1 {
            self.frames.pop();
            true
        } else {
            false
        }
    }

    /// Declares `name` in the innermost frame with no known value.
    pub fn declare(&mut self, name: &str) {
        if let Some(frame) = self.frames.last_mut() {
            frame.insert(key(name), None);
        }
    }

    /// Sets `name` in the innermost frame that knows it, else in the innermost
    /// frame.
    pub fn assign(&mut self, name: &str, value: Line) {
        let key = key(name);
        match self.frames.iter_mut().rev().find(|f| f.contains_key(&key)) {
            Some(frame) => {
                frame.insert(key, Some(value));
            }
            None => {
                if let Some(frame) = self.frames.last_mut() {
                    frame.insert(key, Some(value));
                }
            }
        }
    }

    /// Drops the known value of `name`, keeping it declared.
    pub fn forget(&mut self, name: &str) {
        let key = key(name);
        if let Some(frame) = self.frames.iter_mut().rev().find(|f| f.contains_key(&key)) {
            frame.insert(key, None);
        }
    }

    /// The value of `name` in the innermost frame that knows it.
    pub fn lookup(&self, name: &str) -> Option<&Line> {
        let key = key(name);
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.get(&key))
            .and_then(Option::as_ref)
    }

    /// Replaces Variable tokens by their known values, recursively and inside
    /// call arguments. Unknown names and cycles are left as they are.
    pub fn resolve(&self, tokens: &[Token]) -> Line {
        let mut visiting = Vec::new();
        self.resolve_at(tokens, &mut visiting)
    }

    fn resolve_at(&self, tokens: &[Token], visiting: &mut Vec<String>) -> Line {
        let mut out = Vec::with_capacity(tokens.len());
        for token in tokens {
            match token {
                Token::Variable(name) => {
                    let name_key = key(name);
                    match self.lookup(name) {
                        Some(value)
                            if visiting.len() < MAX_RESOLVE_DEPTH
                                && !visiting.contains(&name_key) =>
                        {
                            visiting.push(name_key);
                            out.extend(self.resolve_at(value, visiting));
                            visiting.pop();
                        }
                        _ => out.push(token.clone()),
                    }
                }
                Token::Function(_) => out.push(self.resolve_call(token, visiting)),
                other => out.push(other.clone()),
            }
        }
        out
    }

    fn resolve_call(&self, token: &Token, visiting: &mut Vec<String>) -> Token {
        let (Some(name), Some(arguments)) = (token.name(), token.arguments()) else {
            return token.clone();
        };
        let resolved: Vec<Line> = arguments
            .iter()
            .map(|arg| self.resolve_at(arg, visiting))
            .collect();
        if resolved == arguments {
            token.clone()
        } else {
            Token::function(name, &resolved)
        }
    }
}

impl Default for ScopeStack {
    fn default() -> Self {
        Self::new()
    }
}

fn key(name: &str) -> String {
    name.to_lowercase()
}

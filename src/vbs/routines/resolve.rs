//! Variable resolution
//!
//! Walks the whole source once with a [`ScopeStack`], substituting reads of
//! variables whose value is a known constant. A binding is recorded only for
//! a name assigned exactly once in the source, at the top level of its
//! procedure, to a single String or Numeric token. Everything else is
//! forgotten, so the rewrite stays sound for code that reassigns in loops.
//! A variable passed as a bare argument to one of the source's own Subs or
//! Functions counts as assigned there, since VBScript passes ByRef by default.
//! Lines with nothing to substitute keep their original text.
//!
//! Opt-in: it is not part of the default routine list.

use crate::vbs::lexing::{tokenize, untokenize, VB_LEXER};
use crate::vbs::matching::standard::{
    EXPRESSIONS, FUNCTION_END, FUNCTION_PROTOTYPE, VARIABLE_ASSIGNMENT, VARIABLE_DECLARATION,
};
use crate::vbs::routine::{Handler, Phase, Routine};
use crate::vbs::scope::ScopeStack;
use crate::vbs::token::{Line, Token, TokenKind};
use std::collections::{HashMap, HashSet};
use tracing::debug;

pub fn routine() -> Routine {
    Routine::new(super::RESOLVE, Phase::MULTILINE)
        .with_handler(Handler::map("resolve-variables", resolve_source))
}

/// Rewrites `source` (lines joined by `\n`) with constant reads substituted.
pub fn resolve_source(source: &str) -> String {
    let texts: Vec<&str> = source.split('\n').collect();
    let lines: Vec<Line> = texts.iter().map(|text| tokenize(text)).collect();
    let counts = assignment_counts(&lines);

    let mut resolver = Resolver {
        counts,
        scopes: ScopeStack::new(),
        depth: 0,
        saved_depths: Vec::new(),
    };
    texts
        .iter()
        .zip(&lines)
        .map(|(text, line)| {
            let rewritten = resolver.line(line);
            if rewritten == *line {
                text.to_string()
            } else {
                untokenize(&rewritten)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

struct Resolver {
    counts: HashMap<String, usize>,
    scopes: ScopeStack,
    /// Control-block nesting inside the current procedure.
    depth: i32,
    saved_depths: Vec<i32>,
}

impl Resolver {
    fn line(&mut self, line: &[Token]) -> Line {
        if let Some(parameters) = procedure_parameters(line) {
            self.scopes.push_scope();
            for parameter in &parameters {
                self.scopes.declare(parameter);
            }
            self.saved_depths.push(self.depth);
            self.depth = 0;
            return line.to_vec();
        }
        if is_procedure_end(line) {
            self.scopes.pop_scope();
            self.depth = self.saved_depths.pop().unwrap_or(0);
            return line.to_vec();
        }

        let delta = VB_LEXER.blocks().lookup(line);
        if let Some(delta) = delta {
            self.depth = (self.depth + delta.before).max(0);
        }
        let rewritten = self.rewrite(line);
        if let Some(delta) = delta {
            self.depth = (self.depth + delta.after).max(0);
        }
        rewritten
    }

    fn rewrite(&mut self, line: &[Token]) -> Line {
        if let Some(names) = declared_names(line) {
            for name in names {
                self.scopes.declare(&name);
            }
            return line.to_vec();
        }

        let lead = line
            .iter()
            .take_while(|t| matches!(t, Token::Keyword(k) if is_assignment_lead(k)))
            .count();
        let is_assignment = EXPRESSIONS
            .get(VARIABLE_ASSIGNMENT)
            .and_then(|matcher| matcher.match_at_start(&line[lead..]))
            .is_some();
        if !is_assignment {
            return self.scopes.resolve(line);
        }

        let target = line[lead].lexeme();
        let value = self.scopes.resolve(&line[lead + 2..]);
        let is_set = line[..lead]
            .iter()
            .any(|t| t.lexeme().eq_ignore_ascii_case("set"));

        let assigned_once = self.counts.get(&key(target)) == Some(&1);
        if !is_set && self.depth == 0 && assigned_once && is_constant(&value) {
            debug!(name = target, value = %untokenize(&value), "bound constant");
            self.scopes.assign(target, value.clone());
        } else {
            self.scopes.forget(target);
        }

        let mut out = line[..lead + 2].to_vec();
        out.extend(value);
        out
    }
}

/// Counts, per lowercase name, the places it may be assigned. Over-counting
/// only makes resolution more conservative.
fn assignment_counts(lines: &[Line]) -> HashMap<String, usize> {
    let procedures: HashSet<String> = lines
        .iter()
        .filter_map(|line| procedure_name(line))
        .map(|name| key(&name))
        .collect();

    let mut counts = HashMap::new();
    for line in lines {
        for name in byref_arguments(line, &procedures) {
            *counts.entry(key(&name)).or_insert(0) += 1;
        }
        for (i, pair) in line.windows(2).enumerate() {
            let assigns = pair[0].is(TokenKind::Variable)
                && matches!(&pair[1], Token::Operator(op) if op == "=")
                && (i == 0 || line[i - 1].is(TokenKind::Keyword));
            if assigns {
                *counts.entry(key(pair[0].lexeme())).or_insert(0) += 1;
            }
        }
    }
    counts
}

/// Name of the Sub or Function opened by `line`.
fn procedure_name(line: &[Token]) -> Option<String> {
    let rest = match line.first() {
        Some(Token::Keyword(k)) if is_visibility(k) => &line[1..],
        _ => line,
    };
    match rest {
        [Token::Keyword(k), Token::Function(_), ..] if is_procedure(k) => {
            rest[1].name().map(|name| name.trim().to_string())
        }
        [Token::Keyword(k), Token::Variable(name), ..] if is_procedure(k) => Some(name.clone()),
        _ => None,
    }
}

/// Variables handed as bare arguments to one of `procedures`, either as
/// `Change x, y` / `Call Change(x)` statements or as `Change(x)` inside an
/// expression.
fn byref_arguments(line: &[Token], procedures: &HashSet<String>) -> Vec<String> {
    if procedure_name(line).is_some() {
        return Vec::new();
    }

    let mut names = Vec::new();
    for token in line {
        let calls_procedure = token
            .name()
            .is_some_and(|name| procedures.contains(&key(name.trim())));
        if !calls_procedure {
            continue;
        }
        for argument in token.arguments().unwrap_or_default() {
            if let [Token::Variable(name)] = argument.as_slice() {
                names.push(name.clone());
            }
        }
    }

    let rest = match line.first() {
        Some(Token::Keyword(k)) if k.eq_ignore_ascii_case("call") => &line[1..],
        _ => line,
    };
    if let [Token::Variable(called), arguments @ ..] = rest {
        let is_assignment = matches!(arguments.first(), Some(Token::Operator(op)) if op == "=");
        if procedures.contains(&key(called)) && !is_assignment {
            names.extend(
                arguments
                    .iter()
                    .filter(|t| t.is(TokenKind::Variable))
                    .map(|t| t.lexeme().to_string()),
            );
        }
    }
    names
}

/// Parameter names when `line` opens a Sub or Function.
fn procedure_parameters(line: &[Token]) -> Option<Vec<String>> {
    let rest = match line.first() {
        Some(Token::Keyword(k)) if is_visibility(k) => &line[1..],
        _ => line,
    };

    if let Some(found) = EXPRESSIONS
        .get(FUNCTION_PROTOTYPE)
        .and_then(|matcher| matcher.match_at_start(rest))
    {
        let arguments = found.matched()[1].arguments().unwrap_or_default();
        return Some(
            arguments
                .iter()
                .filter_map(|arg| arg.iter().rev().find(|t| t.is(TokenKind::Variable)))
                .map(|t| t.lexeme().to_string())
                .collect(),
        );
    }

    // Sub Main
    match rest {
        [Token::Keyword(k), Token::Variable(_), ..] if is_procedure(k) => Some(Vec::new()),
        _ => None,
    }
}

fn is_procedure_end(line: &[Token]) -> bool {
    EXPRESSIONS
        .get(FUNCTION_END)
        .and_then(|matcher| matcher.match_at_start(line))
        .is_some()
}

/// Names declared by a `Dim`/`ReDim` line, array bounds stripped.
fn declared_names(line: &[Token]) -> Option<Vec<String>> {
    EXPRESSIONS
        .get(VARIABLE_DECLARATION)
        .and_then(|matcher| matcher.match_at_start(line))?;
    Some(
        line[1..]
            .iter()
            .filter(|t| t.is(TokenKind::Variable))
            .map(|t| {
                let name = t.lexeme();
                name.split_once('(').map_or(name, |(base, _)| base).to_string()
            })
            .collect(),
    )
}

fn is_constant(value: &[Token]) -> bool {
    matches!(value, [Token::String(_) | Token::Numeric(_)])
}

fn is_visibility(keyword: &str) -> bool {
    keyword.eq_ignore_ascii_case("private") || keyword.eq_ignore_ascii_case("public")
}

fn is_procedure(keyword: &str) -> bool {
    keyword.eq_ignore_ascii_case("sub") || keyword.eq_ignore_ascii_case("function")
}

fn is_assignment_lead(keyword: &str) -> bool {
    ["const", "set", "let", "private", "public"]
        .iter()
        .any(|lead| keyword.eq_ignore_ascii_case(lead))
}

fn key(name: &str) -> String {
    name.to_lowercase()
}

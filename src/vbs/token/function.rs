//! Function-call tokens
//!
//! A Function token only stores its lexeme. The called name and the argument
//! list are recovered on demand by splitting the text between the parentheses
//! on commas and re-lexing the pieces. Commas inside string literals or nested
//! calls break the naive split, so adjacent pieces are merged until each one
//! lexes to typed tokens. This is best effort: calls nested deeper than the
//! lexer's own Function rule (which stops at the first closing parenthesis)
//! are not recovered, and when nothing can be typed the whole argument text
//! becomes one Generic argument.

use super::{Line, Token};
use crate::vbs::lexing::{untokenize, Lexer, VB_LEXER};
use once_cell::sync::Lazy;
use regex::Regex;

static CALL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?P<name>[^(]+)\((?P<args>[^)]*?)\)$").unwrap());

/// Splits a call lexeme into `(name, raw argument text)`.
pub fn split_call(lexeme: &str) -> Option<(&str, &str)> {
    let caps = CALL.captures(lexeme)?;
    let name = caps.name("name")?.as_str();
    let args = caps.name("args")?.as_str();
    Some((name, args))
}

/// Recovers the argument token lines of a raw argument list.
pub fn parse_arguments(args: &str, lexer: &Lexer) -> Vec<Line> {
    if args.trim().is_empty() {
        return Vec::new();
    }

    let pieces: Vec<&str> = args.split(',').collect();
    let mut arguments = Vec::new();
    let mut first = 0;
    let mut width = 1;

    while first + width <= pieces.len() {
        let tokens = lexer.tokenize(&pieces[first..first + width].join(","));
        if !tokens.is_empty() && !tokens.iter().any(|t| matches!(t, Token::Generic(_))) {
            arguments.push(tokens);
            first += width;
            width = 1;
        } else {
            width += 1;
        }
    }

    if first < pieces.len() {
        let rest = lexer.tokenize(&pieces[first..].join(","));
        if !rest.is_empty() {
            arguments.push(rest);
        }
    }

    if arguments.is_empty() {
        arguments.push(vec![Token::Generic(args.to_string())]);
    }
    arguments
}

impl Token {
    /// Builds a Function token from a name and argument token lines.
    pub fn function(name: &str, arguments: &[Line]) -> Token {
        let rendered: Vec<String> = arguments.iter().map(|arg| untokenize(arg)).collect();
        Token::Function(format!("{}({})", name, rendered.join(", ")))
    }

    /// The called name of a Function token.
    pub fn name(&self) -> Option<&str> {
        match self {
            Token::Function(lexeme) => split_call(lexeme).map(|(name, _)| name),
            _ => None,
        }
    }

    /// The arguments of a Function token, one token line per argument.
    pub fn arguments(&self) -> Option<Vec<Line>> {
        match self {
            Token::Function(lexeme) => {
                split_call(lexeme).map(|(_, args)| parse_arguments(args, &VB_LEXER))
            }
            _ => None,
        }
    }

    /// Canonical rendering: Function tokens as `name(arg, arg)`, everything
    /// else as its lexeme.
    pub fn normalized(&self) -> String {
        match self {
            Token::Function(lexeme) => match (self.name(), self.arguments()) {
                (Some(name), Some(args)) => Token::function(name, &args).lexeme().to_string(),
                _ => lexeme.clone(),
            },
            other => other.lexeme().to_string(),
        }
    }
}

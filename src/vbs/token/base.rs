//! Token variants and attributes

use crate::vbs::error::VbsError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A lexed fragment of source text. Each variant wraps the exact substring it
/// was built from (its lexeme).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Token {
    Keyword(String),
    Variable(String),
    /// A call such as `Left("abc", 2)`. Name and arguments are derived on demand.
    Function(String),
    Numeric(String),
    /// A double-quoted literal, quotes included.
    String(String),
    Comment(String),
    Operator(String),
    /// Unclassified text the lexer could not type.
    Generic(String),
}

/// The variant of a [`Token`] without its lexeme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TokenKind {
    Keyword,
    Variable,
    Function,
    Numeric,
    String,
    Comment,
    Operator,
    Generic,
}

/// Named attributes a token pattern can constrain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Attribute {
    /// The lexeme. Present on every token.
    Value,
    /// The called name. Function tokens only.
    Name,
    /// The literal's content without quotes. String tokens only.
    Data,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: impl Into<String>) -> Self {
        let lexeme = lexeme.into();
        match kind {
            TokenKind::Keyword => Token::Keyword(lexeme),
            TokenKind::Variable => Token::Variable(lexeme),
            TokenKind::Function => Token::Function(lexeme),
            TokenKind::Numeric => Token::Numeric(lexeme),
            TokenKind::String => Token::String(lexeme),
            TokenKind::Comment => Token::Comment(lexeme),
            TokenKind::Operator => Token::Operator(lexeme),
            TokenKind::Generic => Token::Generic(lexeme),
        }
    }

    pub fn kind(&self) -> TokenKind {
        match self {
            Token::Keyword(_) => TokenKind::Keyword,
            Token::Variable(_) => TokenKind::Variable,
            Token::Function(_) => TokenKind::Function,
            Token::Numeric(_) => TokenKind::Numeric,
            Token::String(_) => TokenKind::String,
            Token::Comment(_) => TokenKind::Comment,
            Token::Operator(_) => TokenKind::Operator,
            Token::Generic(_) => TokenKind::Generic,
        }
    }

    pub fn lexeme(&self) -> &str {
        match self {
            Token::Keyword(s)
            | Token::Variable(s)
            | Token::Function(s)
            | Token::Numeric(s)
            | Token::String(s)
            | Token::Comment(s)
            | Token::Operator(s)
            | Token::Generic(s) => s,
        }
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind() == kind
    }

    /// Content of a string literal without its surrounding quotes.
    pub fn data(&self) -> Option<&str> {
        match self {
            Token::String(s) => {
                let inner = s.strip_prefix('"').unwrap_or(s);
                Some(inner.strip_suffix('"').unwrap_or(inner))
            }
            _ => None,
        }
    }

    /// Looks up a named attribute. `None` when this variant lacks it.
    pub fn attribute(&self, attribute: Attribute) -> Option<&str> {
        match attribute {
            Attribute::Value => Some(self.lexeme()),
            Attribute::Name => self.name(),
            Attribute::Data => self.data(),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.lexeme())
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Keyword => "Keyword",
            TokenKind::Variable => "Variable",
            TokenKind::Function => "Function",
            TokenKind::Numeric => "Numeric",
            TokenKind::String => "String",
            TokenKind::Comment => "Comment",
            TokenKind::Operator => "Operator",
            TokenKind::Generic => "Generic",
        };
        f.write_str(name)
    }
}

impl Attribute {
    pub fn as_str(&self) -> &'static str {
        match self {
            Attribute::Value => "value",
            Attribute::Name => "name",
            Attribute::Data => "data",
        }
    }
}

impl FromStr for Attribute {
    type Err = VbsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "value" => Ok(Attribute::Value),
            "name" => Ok(Attribute::Name),
            "data" => Ok(Attribute::Data),
            other => Err(VbsError::PatternCompile(format!(
                "unknown token attribute '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

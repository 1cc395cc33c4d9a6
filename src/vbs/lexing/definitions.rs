//! Token definition table
//!
//! Order matters: the first definition that accepts a window decides its type.
//! Keywords come first so `Dim` is never a Variable, array declarations come
//! before calls so `Dim a(3)` is not a Function, and the plain Variable rule
//! only accepts a window followed by whitespace, a comma, an operator character
//! or the end of the line.

use crate::vbs::error::{Result, VbsError};
use crate::vbs::token::TokenKind;
use regex::Regex;

pub const KEYWORDS: &[&str] = &[
    "AddHandler", "AddressOf", "Alias", "And", "AndAlso", "As", "Boolean", "ByRef", "Byte",
    "ByVal", "Call", "Case", "Catch", "CBool", "CByte", "CChar", "CDate", "CDec", "CDbl",
    "Char", "CInt", "Class", "CLng", "CObj", "Const", "Continue", "CSByte", "CShort", "CSng",
    "CStr", "CType", "CUInt", "CULng", "CUShort", "Date", "Decimal", "Declare", "Default",
    "Delegate", "Dim", "DirectCast", "Do", "Double", "Each", "Else", "ElseIf", "End", "EndIf",
    "Enum", "Erase", "Error", "Event", "Exit", "False", "Finally", "For", "Friend", "Function",
    "Get", "GetType", "GetXMLNamespace", "Global", "GoSub", "GoTo", "Handles", "If",
    "Implements", "Imports", "In", "Inherits", "Integer", "Interface", "Is", "IsNot", "Let",
    "Lib", "Like", "Long", "Loop", "Me", "Mod", "Module", "MustInherit", "MustOverride",
    "MyBase", "MyClass", "Namespace", "Narrowing", "New", "Next", "Not", "Nothing",
    "NotInheritable", "NotOverridable", "Object", "Of", "On", "Operator", "Option", "Optional",
    "Or", "OrElse", "Overloads", "Overridable", "Overrides", "ParamArray", "Partial", "Private",
    "Property", "Protected", "Public", "RaiseEvent", "ReadOnly", "ReDim", "REM",
    "RemoveHandler", "Resume", "Return", "SByte", "Select", "Set", "Shadows", "Shared", "Short",
    "Single", "Static", "Step", "Stop", "String", "Structure", "Sub", "SyncLock", "Then",
    "Throw", "To", "True", "Try", "TryCast", "TypeOf", "Variant", "Wend", "UInteger", "ULong",
    "UShort", "Using", "When", "While", "Widening", "With", "WithEvents", "WriteOnly", "Xor",
    "#Const", "#Else", "#ElseIf", "#End", "#If",
];

pub const OPERATORS: &[&str] = &[
    "=", "&", "&=", "*", "*=", "/", "/=", "\\", "\\=", "^", "^=", "+", "+=", "-", "-=", ">>",
    ">>=", "<<", "<<=", "<>", "<", ">", "<=", ">=",
];

/// One row of the lexer table.
#[derive(Debug, Clone)]
pub struct TokenDefinition {
    kind: TokenKind,
    expr: Regex,
    before: Option<Regex>,
    after: Option<Regex>,
}

impl TokenDefinition {
    /// A definition whose content regex must match the whole window. Anchor
    /// the pattern yourself.
    pub fn new(kind: TokenKind, expr: &str) -> Result<Self> {
        Ok(Self {
            kind,
            expr: compile(expr)?,
            before: None,
            after: None,
        })
    }

    /// Requires a match somewhere in the text preceding the window.
    pub fn with_before(mut self, pattern: &str) -> Result<Self> {
        self.before = Some(compile(pattern)?);
        Ok(self)
    }

    /// Requires a match somewhere in the text following the window.
    pub fn with_after(mut self, pattern: &str) -> Result<Self> {
        self.after = Some(compile(pattern)?);
        Ok(self)
    }

    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    /// Tests the window `line[start..end]` (byte offsets on char boundaries).
    pub fn accepts(&self, line: &str, start: usize, end: usize) -> bool {
        if !self.expr.is_match(&line[start..end]) {
            return false;
        }
        if let Some(before) = &self.before {
            if !before.is_match(&line[..start]) {
                return false;
            }
        }
        if let Some(after) = &self.after {
            if !after.is_match(&line[end..]) {
                return false;
            }
        }
        true
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| VbsError::PatternCompile(e.to_string()))
}

fn class_escape(c: char) -> String {
    match c {
        '\\' | '^' | '-' | '[' | ']' | '&' | '~' => format!("\\{}", c),
        _ => c.to_string(),
    }
}

/// The VBScript definition table, in priority order.
pub fn vbscript_definitions() -> Result<Vec<TokenDefinition>> {
    let keywords = KEYWORDS
        .iter()
        .map(|k| regex::escape(k))
        .collect::<Vec<_>>()
        .join("|");
    let operators = OPERATORS
        .iter()
        .map(|op| regex::escape(op))
        .collect::<Vec<_>>()
        .join("|");

    let mut operator_chars: Vec<char> = OPERATORS.iter().flat_map(|op| op.chars()).collect();
    operator_chars.sort_unstable();
    operator_chars.dedup();
    let operator_class: String = operator_chars.into_iter().map(class_escape).collect();

    Ok(vec![
        TokenDefinition::new(TokenKind::Keyword, &format!(r"(?i)^(?:{})$", keywords))?
            .with_before(r"(?:^|\s+)$")?
            .with_after(r"^(?:\s+|$)")?,
        // Array declarations: Dim buffer(63) As Long
        TokenDefinition::new(
            TokenKind::Variable,
            r"(?i)^[a-z][^.!@&$#\s(,]*\(\d+(?:,\d+)*\)$",
        )?
        .with_before(r"(?i)(?:Re)?Dim\s+(?:Preserve\s+)?$")?,
        TokenDefinition::new(TokenKind::Function, r"^[^(]+\([^)]*\)$")?,
        TokenDefinition::new(TokenKind::Numeric, r"^\d+(?:\.\d+)?$")?.with_after(r"^(?:[^.]|$)")?,
        TokenDefinition::new(TokenKind::String, r#"^"(?:\\.|[^\\])*"$"#)?,
        TokenDefinition::new(TokenKind::Variable, r"(?i)^[a-z][^.!@&$#\s(,]*$")?
            .with_after(&format!(r"^(?:[{}\s,]|$)", operator_class))?,
        TokenDefinition::new(TokenKind::Comment, r"^'.*$")?,
        TokenDefinition::new(TokenKind::Operator, &format!(r"^(?:{})$", operators))?,
    ])
}

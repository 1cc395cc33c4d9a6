//! Detokenizer
//!
//! Converts tokens back to source text. Lexemes are emitted verbatim and
//! separated by one space, so the result is whitespace-equivalent to the line
//! the tokens came from (separating commas aside).

use crate::vbs::token::Token;

/// Trait for converting tokens back to VBScript source.
pub trait ToSource {
    fn to_source(&self) -> String;
}

impl ToSource for Token {
    fn to_source(&self) -> String {
        self.lexeme().to_string()
    }
}

impl ToSource for [Token] {
    fn to_source(&self) -> String {
        untokenize(self)
    }
}

/// Space-joins lexemes. Empty input gives an empty string.
pub fn untokenize(tokens: &[Token]) -> String {
    let mut out = String::new();
    for (i, token) in tokens.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push_str(token.lexeme());
    }
    out
}

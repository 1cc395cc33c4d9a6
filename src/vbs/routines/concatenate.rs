//! String concatenation folding

use crate::vbs::error::{BoxError, Result};
use crate::vbs::lexing::{tokenize, untokenize};
use crate::vbs::matching::standard::{EXPRESSIONS, STRING_CONCATENATE};
use crate::vbs::routine::{Handler, Matcher, Phase, Routine};
use crate::vbs::token::Token;

pub fn routine() -> Result<Routine> {
    Ok(Routine::new(super::CONCATENATE, Phase::PRE | Phase::POST)
        .with_matcher(Matcher::expression(STRING_CONCATENATE)?)
        .with_handler(Handler::from_fn("merge-strings", merge_first))
        .with_fixpoint())
}

/// Merges the first `String (+|&) String` run of `line` into one literal.
pub fn merge_first(line: &str) -> std::result::Result<String, BoxError> {
    let matcher = EXPRESSIONS
        .get(STRING_CONCATENATE)
        .ok_or("string concatenation expression is not registered")?;
    let tokens = tokenize(line);
    let Some(found) = matcher.first_match(&tokens) else {
        return Ok(line.to_string());
    };

    let matched = found.matched();
    let (Some(left), Some(right)) = (matched[0].data(), matched[2].data()) else {
        return Err("concatenation operands are not string literals".into());
    };
    let merged = Token::String(format!("\"{}{}\"", left, right));

    let mut out = found.prefix().to_vec();
    out.push(merged);
    out.extend_from_slice(found.suffix());
    Ok(untokenize(&out))
}

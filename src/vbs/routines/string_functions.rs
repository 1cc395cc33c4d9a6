//! String function evaluation
//!
//! Resolves calls of the VBScript string functions whose first argument is a
//! literal: `Left("hello", 3)` becomes `"hel"`. Numeric arguments may be
//! quoted. Nested calls resolve from the inside out over fixpoint passes.

use crate::vbs::error::{BoxError, Result};
use crate::vbs::routine::{Handler, Matcher, Phase, Routine};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static CALL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)\b(Left|Right|LCase|UCase|Mid|StrReverse)\$?\(\s*"([^"]*)"\s*((?:,\s*[^,()]*?\s*)*)\)"#,
    )
    .unwrap()
});

pub fn routine() -> Result<Routine> {
    Ok(Routine::new(super::STR_FUNCTIONS, Phase::MAIN)
        .with_matcher(Matcher::regex("string-function-call", CALL.clone()))
        .with_handler(Handler::from_fn("evaluate-string-functions", resolve))
        .with_fixpoint())
}

/// Replaces every resolvable call in `line` with its quoted result.
pub fn resolve(line: &str) -> std::result::Result<String, BoxError> {
    let mut out = line.to_string();
    for caps in CALL.captures_iter(line) {
        let whole = &caps[0];
        let value = evaluate_call(&caps)?;
        out = out.replace(whole, &format!("\"{}\"", value));
    }
    Ok(out)
}

fn evaluate_call(caps: &Captures<'_>) -> std::result::Result<String, BoxError> {
    let function = caps[1].to_ascii_lowercase();
    let data = &caps[2];
    let args: Vec<&str> = caps[3]
        .split(',')
        .skip(1)
        .map(|arg| arg.trim().trim_matches('"'))
        .collect();
    apply(&function, data, &args)
}

/// Evaluates one string function. `function` is lowercase.
pub fn apply(function: &str, data: &str, args: &[&str]) -> std::result::Result<String, BoxError> {
    let chars: Vec<char> = data.chars().collect();
    match (function, args) {
        ("left", [count]) => {
            let count = parse_count(count)?.min(chars.len());
            Ok(chars[..count].iter().collect())
        }
        ("right", [count]) => {
            let count = parse_count(count)?.min(chars.len());
            Ok(chars[chars.len() - count..].iter().collect())
        }
        ("mid", [start, rest @ ..]) if rest.len() <= 1 => {
            let start = parse_count(start)?;
            if start == 0 {
                return Err("Mid start must be at least 1".into());
            }
            let from = (start - 1).min(chars.len());
            let to = match rest.first() {
                Some(count) => from.saturating_add(parse_count(count)?).min(chars.len()),
                None => chars.len(),
            };
            Ok(chars[from..to].iter().collect())
        }
        ("lcase", []) => Ok(data.to_lowercase()),
        ("ucase", []) => Ok(data.to_uppercase()),
        ("strreverse", []) => Ok(chars.iter().rev().collect()),
        _ => Err(format!("{} does not take {} extra argument(s)", function, args.len()).into()),
    }
}

fn parse_count(arg: &str) -> std::result::Result<usize, BoxError> {
    arg.parse::<usize>()
        .map_err(|_| format!("'{}' is not a non-negative integer", arg).into())
}

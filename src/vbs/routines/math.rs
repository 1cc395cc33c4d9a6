//! Arithmetic folding
//!
//! Folds runs of numeric literals joined by `+ - * / \` into their value.
//! A run is left alone when it sits inside a string literal or a trailing
//! comment, or when it is glued to a higher-precedence operator on either
//! side (`a * 2 + 3` must not become `a * 5`).

use crate::vbs::error::{BoxError, Result, VbsError};
use crate::vbs::lexing::tokenize;
use crate::vbs::matching::standard::{EXPRESSIONS, MATH, MATH_NEGATED};
use crate::vbs::routine::{Handler, Matcher, Phase, Routine};
use once_cell::sync::Lazy;
use regex::Regex;

static ARITHMETIC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"-?\b\d+(?:\.\d+)?\b(?:\s*[-+*/\\]\s*(?:-\s*)?\b\d+(?:\.\d+)?\b)+").unwrap()
});

static OPERAND: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+(?:\.\d+)?|[-+*/\\]").unwrap());

pub fn routine() -> Result<Routine> {
    Ok(Routine::new(super::MATH, Phase::MAIN | Phase::POST)
        .with_matcher(arithmetic_matcher()?)
        .with_handler(Handler::from_fn("fold-arithmetic", fold)))
}

/// Accepts `5 + 2` as well as `5 - - 2`, which the lexer splits into two
/// operators.
fn arithmetic_matcher() -> Result<Matcher> {
    let mut matchers = Vec::new();
    for name in [MATH, MATH_NEGATED] {
        let matcher = EXPRESSIONS.get(name).cloned().ok_or_else(|| {
            VbsError::PatternCompile(format!("unknown expression '{}'", name))
        })?;
        matchers.push(matcher);
    }
    Ok(Matcher::predicate(MATH, move |input| {
        let tokens = tokenize(input);
        matchers.iter().any(|matcher| matcher.is_match(&tokens))
    }))
}

/// Folds every standalone arithmetic run in `line`.
pub fn fold(line: &str) -> std::result::Result<String, BoxError> {
    let code_end = code_end(line);
    let mut replacements = Vec::new();

    for found in ARITHMETIC.find_iter(line) {
        if found.end() > code_end || inside_string(&line[..found.start()]) {
            continue;
        }
        if binds_tighter(&line[..found.start()], true) || binds_tighter(&line[found.end()..], false)
        {
            continue;
        }
        let value = evaluate(found.as_str())?;
        replacements.push((found.range(), format_number(value)));
    }

    let mut out = line.to_string();
    for (range, value) in replacements.into_iter().rev() {
        out.replace_range(range, &value);
    }
    Ok(out)
}

/// Byte offset where a trailing comment starts, or the line length.
fn code_end(line: &str) -> usize {
    let mut in_string = false;
    for (i, c) in line.char_indices() {
        match c {
            '"' => in_string = !in_string,
            '\'' if !in_string => return i,
            _ => {}
        }
    }
    line.len()
}

fn inside_string(before: &str) -> bool {
    before.matches('"').count() % 2 == 1
}

/// Whether the text next to a run holds an operator that binds tighter than
/// `+` or `-` (or, before the run, a `-` that would change the run's sign).
fn binds_tighter(side: &str, before: bool) -> bool {
    let trimmed = if before {
        side.trim_end()
    } else {
        side.trim_start()
    };
    let neighbour = if before {
        trimmed.chars().last()
    } else {
        trimmed.chars().next()
    };
    if matches!(neighbour, Some('*' | '/' | '\\' | '^')) || (before && neighbour == Some('-')) {
        return true;
    }
    let word = if before {
        trimmed.rsplit(char::is_whitespace).next()
    } else {
        trimmed.split(char::is_whitespace).next()
    };
    word.is_some_and(|w| w.eq_ignore_ascii_case("mod"))
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Item {
    Number(f64),
    Op(char),
}

/// Evaluates an arithmetic run with VBScript precedence: `* /`, then `\`,
/// then `+ -`, each left to right.
pub fn evaluate(expr: &str) -> std::result::Result<f64, BoxError> {
    let mut items = Vec::new();
    let mut negate = false;
    for piece in OPERAND.find_iter(expr).map(|m| m.as_str()) {
        let expecting_number = matches!(items.last(), None | Some(Item::Op(_)));
        match piece.parse::<f64>() {
            Ok(number) => {
                items.push(Item::Number(if negate { -number } else { number }));
                negate = false;
            }
            Err(_) if expecting_number && piece == "-" => negate = !negate,
            Err(_) => {
                let op = piece.chars().next().ok_or("empty operator")?;
                items.push(Item::Op(op));
            }
        }
    }

    let items = reduce(items, &['*', '/'])?;
    let items = reduce(items, &['\\'])?;
    let items = reduce(items, &['+', '-'])?;
    match items.as_slice() {
        [Item::Number(value)] => Ok(*value),
        _ => Err(format!("malformed arithmetic '{}'", expr).into()),
    }
}

fn reduce(items: Vec<Item>, ops: &[char]) -> std::result::Result<Vec<Item>, BoxError> {
    let mut out: Vec<Item> = Vec::with_capacity(items.len());
    let mut iter = items.into_iter();
    while let Some(item) = iter.next() {
        match item {
            Item::Op(op) if ops.contains(&op) => {
                let Some(Item::Number(lhs)) = out.pop() else {
                    return Err(format!("operator '{}' without left operand", op).into());
                };
                let Some(Item::Number(rhs)) = iter.next() else {
                    return Err(format!("operator '{}' without right operand", op).into());
                };
                out.push(Item::Number(apply(op, lhs, rhs)?));
            }
            other => out.push(other),
        }
    }
    Ok(out)
}

fn apply(op: char, lhs: f64, rhs: f64) -> std::result::Result<f64, BoxError> {
    let value = match op {
        '+' => lhs + rhs,
        '-' => lhs - rhs,
        '*' => lhs * rhs,
        '/' if rhs == 0.0 => return Err("division by zero".into()),
        '/' => lhs / rhs,
        '\\' => {
            // Operands round half to even before dividing.
            let divisor = rhs.round_ties_even();
            if divisor == 0.0 {
                return Err("division by zero".into());
            }
            (lhs.round_ties_even() / divisor).trunc()
        }
        other => return Err(format!("unsupported operator '{}'", other).into()),
    };
    if value.is_finite() {
        Ok(value)
    } else {
        Err("arithmetic overflow".into())
    }
}

/// Integral values print without a fraction; others to at most 12 decimals.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        let rounded = (value * 1e12).round() / 1e12;
        format!("{}", rounded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("garbage = 5 + 2 - 7", "garbage = 0")]
    #[case("x = 2 + 3 * 4", "x = 14")]
    #[case("x = 7 / 2", "x = 3.5")]
    #[case("x = 7 \\ 2", "x = 3")]
    #[case("x = -5 + 2", "x = -3")]
    #[case("x = 1.5 + 2", "x = 3.5")]
    #[case("x = 10 - 2 - 3", "x = 5")]
    #[case("x = 5 - -3", "x = 8")]
    #[case("x = 5 - - 3", "x = 8")]
    #[case("x = 2.5 \\ 1", "x = 2")]
    #[case("x = 3.5 \\ 1", "x = 4")]
    #[case("x = Chr(100 - 35) & Chr(60 + 6)", "x = Chr(65) & Chr(66)")]
    fn test_folds(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(fold(input).unwrap(), expected);
    }

    #[rstest]
    #[case("x = a * 2 + 3")]
    #[case("x = a - 2 + 3")]
    #[case("x = 2 + 3 * a")]
    #[case("x = a Mod 2 + 3")]
    #[case("x = \"1 + 2\"")]
    #[case("x = y ' 1 + 2")]
    #[case("x = a1 + 2")]
    fn test_leaves_unsafe_runs(#[case] input: &str) {
        assert_eq!(fold(input).unwrap(), input);
    }

    #[test]
    fn test_division_by_zero_fails() {
        assert!(fold("x = 1 / 0").is_err());
        assert!(evaluate("4 \\ 0").is_err());
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0.0), "0");
        assert_eq!(format_number(-12.0), "-12");
        assert_eq!(format_number(0.1 + 0.2), "0.3");
    }

    #[test]
    fn test_routine_only_touches_matching_lines() {
        let routine = routine().unwrap();
        let outcome = routine.run("x = 3 + 4").unwrap();
        assert!(outcome.matched);
        assert_eq!(outcome.output, "x = 7");
        assert!(!routine.run("x = y + 1").unwrap().matched);
    }

    #[test]
    fn test_routine_folds_negated_operand() {
        let routine = routine().unwrap();
        let outcome = routine.run("x = 5 - - 3").unwrap();
        assert!(outcome.matched);
        assert_eq!(outcome.output, "x = 8");
    }
}

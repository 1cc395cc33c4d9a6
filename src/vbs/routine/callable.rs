//! Named matcher and handler callables
//!
//! Both wrap a shared closure together with a name used when the closure fails.
//! Failures, whether an `Err` or a panic, surface as
//! [`VbsError::HandlerFault`].

use crate::vbs::error::{BoxError, Result, VbsError};
use crate::vbs::lexing::tokenize;
use crate::vbs::matching::{TokenMatcher, EXPRESSIONS};
use regex::Regex;
use std::any::Any;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

type MatchFn = dyn Fn(&str) -> std::result::Result<bool, BoxError> + Send + Sync;
type HandleFn = dyn Fn(&str) -> std::result::Result<String, BoxError> + Send + Sync;

/// Decides whether a routine applies to its input.
#[derive(Clone)]
pub struct Matcher {
    name: String,
    run_fn: Arc<MatchFn>,
}

impl Matcher {
    pub fn from_fn<F>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&str) -> std::result::Result<bool, BoxError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            run_fn: Arc::new(f),
        }
    }

    /// A matcher that cannot fail.
    pub fn predicate<F>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        Self::from_fn(name, move |input| Ok(f(input)))
    }

    /// Matches when the input line contains a window accepted by `matcher`.
    pub fn tokens(name: impl Into<String>, matcher: TokenMatcher) -> Self {
        Self::predicate(name, move |input| matcher.is_match(&tokenize(input)))
    }

    /// A token matcher from the standard expression registry.
    pub fn expression(name: &str) -> Result<Self> {
        let matcher = EXPRESSIONS.get(name).cloned().ok_or_else(|| {
            VbsError::PatternCompile(format!("unknown expression '{}'", name))
        })?;
        Ok(Self::tokens(name, matcher))
    }

    /// Matches when `re` finds a match anywhere in the input.
    pub fn regex(name: impl Into<String>, re: Regex) -> Self {
        Self::predicate(name, move |input| re.is_match(input))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn test(&self, input: &str) -> Result<bool> {
        guarded(&self.name, || (self.run_fn)(input))
    }
}

/// Rewrites a routine's input.
#[derive(Clone)]
pub struct Handler {
    name: String,
    run_fn: Arc<HandleFn>,
}

impl Handler {
    pub fn from_fn<F>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&str) -> std::result::Result<String, BoxError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            run_fn: Arc::new(f),
        }
    }

    /// A handler that cannot fail.
    pub fn map<F>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        Self::from_fn(name, move |input| Ok(f(input)))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn apply(&self, input: &str) -> Result<String> {
        guarded(&self.name, || (self.run_fn)(input))
    }
}

fn guarded<T>(
    name: &str,
    f: impl FnOnce() -> std::result::Result<T, BoxError>,
) -> Result<T> {
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(VbsError::HandlerFault {
            callable: name.to_string(),
            message: err.to_string(),
        }),
        Err(payload) => Err(VbsError::HandlerFault {
            callable: name.to_string(),
            message: panic_message(payload.as_ref()),
        }),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "panicked".to_string()
    }
}

impl fmt::Debug for Matcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Matcher").field("name", &self.name).finish()
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler").field("name", &self.name).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_errors_become_faults() {
        let handler = Handler::from_fn("fails", |_| Err("nope".into()));
        match handler.apply("x") {
            Err(VbsError::HandlerFault { callable, message }) => {
                assert_eq!(callable, "fails");
                assert_eq!(message, "nope");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_panics_become_faults() {
        let matcher = Matcher::predicate("panics", |_| panic!("boom"));
        assert!(matches!(
            matcher.test("x"),
            Err(VbsError::HandlerFault { .. })
        ));
    }

    #[test]
    fn test_expression_matcher() {
        let matcher = Matcher::expression("math").unwrap();
        assert_eq!(matcher.name(), "math");
        assert!(matcher.test("x = 1 + 2").unwrap());
        assert!(!matcher.test("x = 1").unwrap());
        assert!(Matcher::expression("nope").is_err());
    }

    #[test]
    fn test_regex_matcher() {
        let matcher = Matcher::regex("dim", Regex::new("(?i)^dim ").unwrap());
        assert!(matcher.test("DIM x").unwrap());
        assert!(!matcher.test("x = 1").unwrap());
    }
}

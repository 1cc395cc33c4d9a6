//! Routines
//!
//! A routine pairs optional matchers with an optional chain of handlers and
//! tags them with a [`Phase`] mask. Two flags change how the pipeline treats
//! it:
//!
//! - drop-on-match: a matched line (or blob) is removed instead of rewritten.
//! - reapply-to-fixpoint: the handlers are re-run on their own output until
//!   its digest stops changing, at most `max_passes` times.
//!
//! Routines hold no state between calls.

pub mod callable;
pub mod phase;

pub use callable::{Handler, Matcher};
pub use phase::Phase;

use crate::vbs::digest::ContentDigest;
use crate::vbs::error::{Result, VbsError};
use tracing::warn;

/// Pass limit used when a routine does not set one.
pub const DEFAULT_MAX_PASSES: usize = 64;

#[derive(Debug, Clone)]
pub struct Routine {
    name: String,
    phase: Phase,
    matchers: Vec<Matcher>,
    handlers: Vec<Handler>,
    drop_on_match: bool,
    reapply_to_fixpoint: bool,
    max_passes: usize,
}

/// What one call to [`Routine::run`] produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutineOutcome {
    /// Whether the first pass matched. Later fixpoint passes don't change it.
    pub matched: bool,
    pub output: String,
    /// Handler passes executed.
    pub passes: usize,
}

impl RoutineOutcome {
    pub fn unchanged(input: impl Into<String>) -> Self {
        Self {
            matched: false,
            output: input.into(),
            passes: 0,
        }
    }
}

impl Routine {
    pub fn new(name: impl Into<String>, phase: Phase) -> Self {
        Self {
            name: name.into(),
            phase,
            matchers: Vec::new(),
            handlers: Vec::new(),
            drop_on_match: false,
            reapply_to_fixpoint: false,
            max_passes: DEFAULT_MAX_PASSES,
        }
    }

    /// Adds a matcher. With several, all of them must accept the same input.
    pub fn with_matcher(mut self, matcher: Matcher) -> Self {
        self.matchers.push(matcher);
        self
    }

    /// Appends a handler. Handlers run in order, each fed the previous output.
    pub fn with_handler(mut self, handler: Handler) -> Self {
        self.handlers.push(handler);
        self
    }

    pub fn with_drop_on_match(mut self) -> Self {
        self.drop_on_match = true;
        self
    }

    pub fn with_fixpoint(mut self) -> Self {
        self.reapply_to_fixpoint = true;
        self
    }

    pub fn with_max_passes(mut self, max_passes: usize) -> Self {
        self.max_passes = max_passes.max(1);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_multiline(&self) -> bool {
        self.phase.contains(Phase::MULTILINE)
    }

    pub fn drop_on_match(&self) -> bool {
        self.drop_on_match
    }

    pub fn reapply_to_fixpoint(&self) -> bool {
        self.reapply_to_fixpoint
    }

    pub fn max_passes(&self) -> usize {
        self.max_passes
    }

    /// True without matchers. A failing matcher counts as a non-match.
    pub fn matches(&self, input: &str) -> bool {
        self.matchers.iter().all(|matcher| match matcher.test(input) {
            Ok(matched) => matched,
            Err(err) => {
                warn!(
                    routine = %self.name,
                    matcher = matcher.name(),
                    error = %err,
                    "matcher failed"
                );
                false
            }
        })
    }

    /// Threads `input` through the handler chain. A failing stage passes its
    /// own input through unchanged.
    pub fn execute(&self, input: &str) -> String {
        let mut current = input.to_string();
        for handler in &self.handlers {
            match handler.apply(&current) {
                Ok(output) => current = output,
                Err(err) => {
                    warn!(
                        routine = %self.name,
                        handler = handler.name(),
                        error = %err,
                        "handler failed"
                    );
                }
            }
        }
        current
    }

    /// Matches, then executes. With reapply-to-fixpoint set, keeps matching and
    /// executing on the output until its digest stops changing.
    pub fn run(&self, input: &str) -> Result<RoutineOutcome> {
        if !self.matches(input) {
            return Ok(RoutineOutcome::unchanged(input));
        }

        let mut previous = ContentDigest::of_text(input);
        let mut output = self.execute(input);
        let mut passes = 1;

        if self.reapply_to_fixpoint {
            loop {
                let digest = ContentDigest::of_text(&output);
                if digest == previous || !self.matches(&output) {
                    break;
                }
                if passes >= self.max_passes {
                    return Err(VbsError::DidNotConverge {
                        routine: self.name.clone(),
                        passes,
                    });
                }
                previous = digest;
                output = self.execute(&output);
                passes += 1;
            }
        }

        Ok(RoutineOutcome {
            matched: true,
            output,
            passes,
        })
    }
}

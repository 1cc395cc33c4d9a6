//! The simplifier pipeline
//!
//! Holds a [`History`] and an ordered list of registered routines. Each routine
//! invocation reads the active iteration and pushes at most one new iteration:
//!
//! - single-line routines run on the untokenized text of every line; matched
//!   lines are dropped when the routine says so.
//! - multiline routines run once on the whole rendered source.
//!
//! Handler faults and non-converging fixpoints are logged and leave the
//! affected input unchanged. Only invalid input and pattern compile errors
//! (plus I/O at the boundaries) abort a run.

use crate::vbs::error::{Result, VbsError};
use crate::vbs::history::{History, IterationId};
use crate::vbs::routine::{Phase, Routine, RoutineOutcome};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct Simplifier {
    history: History,
    routines: Vec<Arc<Routine>>,
}

impl Simplifier {
    pub fn new(history: History) -> Self {
        Self {
            history,
            routines: Vec::new(),
        }
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(History::from_path(path)?))
    }

    pub fn from_lines<S: AsRef<str>>(lines: &[S]) -> Result<Self> {
        Ok(Self::new(History::from_lines(lines)?))
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn history_mut(&mut self) -> &mut History {
        &mut self.history
    }

    pub fn into_history(self) -> History {
        self.history
    }

    pub fn routines(&self) -> &[Arc<Routine>] {
        &self.routines
    }

    pub fn register(&mut self, routine: impl Into<Arc<Routine>>) {
        self.routines.push(routine.into());
    }

    /// Registers `routine` and runs it once right away.
    pub fn register_and_run(
        &mut self,
        routine: impl Into<Arc<Routine>>,
    ) -> Result<Option<IterationId>> {
        let routine = routine.into();
        self.routines.push(Arc::clone(&routine));
        self.run_routine(&routine)
    }

    /// Removes every routine named `name`. Returns whether any was removed.
    pub fn unregister(&mut self, name: &str) -> bool {
        let before = self.routines.len();
        self.routines.retain(|routine| routine.name() != name);
        self.routines.len() != before
    }

    /// Runs one routine against the active iteration and returns the id of the
    /// iteration that is active afterwards.
    pub fn run_routine(&mut self, routine: &Routine) -> Result<Option<IterationId>> {
        if self.history.current().is_none() {
            return Err(VbsError::InvalidInput(format!(
                "routine '{}' run on an empty history",
                routine.name()
            )));
        }
        if routine.is_multiline() {
            self.run_multiline(routine)
        } else {
            self.run_lines(routine)
        }
    }

    fn run_lines(&mut self, routine: &Routine) -> Result<Option<IterationId>> {
        let Some(current) = self.history.current() else {
            return Ok(None);
        };

        let mut lines = Vec::with_capacity(current.len());
        let (mut matched, mut dropped) = (0usize, 0usize);
        for index in 0..current.len() {
            let text = current.line_text(index).unwrap_or_default();
            let outcome = run_guarded(routine, text)?;
            if outcome.matched {
                matched += 1;
                if routine.drop_on_match() {
                    dropped += 1;
                    continue;
                }
            }
            lines.extend(outcome.output.split('\n').map(str::to_string));
        }

        let id = self.history.push_lines(&lines)?.id();
        info!(
            routine = routine.name(),
            phase = ?routine.phase(),
            matched,
            dropped,
            iteration = id,
            "routine applied"
        );
        Ok(Some(id))
    }

    fn run_multiline(&mut self, routine: &Routine) -> Result<Option<IterationId>> {
        let text = self.history.code().join("\n");
        let outcome = run_guarded(routine, text)?;

        if outcome.matched && routine.drop_on_match() {
            info!(
                routine = routine.name(),
                phase = ?routine.phase(),
                "multiline routine matched, source kept"
            );
            return Ok(self.history.active_id());
        }

        let lines: Vec<&str> = outcome.output.split('\n').collect();
        let id = self.history.push_lines(&lines)?.id();
        info!(
            routine = routine.name(),
            phase = ?routine.phase(),
            matched = outcome.matched,
            iteration = id,
            "multiline routine applied"
        );
        Ok(Some(id))
    }

    /// Runs every routine whose phase intersects each bit of `mask`, bits from
    /// least to most significant and routines in registration order.
    pub fn run(&mut self, mask: Phase) -> Result<()> {
        for bit in mask.bits_ascending() {
            let selected: Vec<Arc<Routine>> = self
                .routines
                .iter()
                .filter(|routine| routine.phase().intersects(bit))
                .cloned()
                .collect();
            for routine in selected {
                self.run_routine(&routine)?;
            }
        }
        Ok(())
    }

    /// Rendered code of the active iteration.
    pub fn code(&self) -> Vec<String> {
        self.history.code()
    }

    /// Writes the active iteration, one line per row, optionally prefixed with
    /// its zero-based index.
    pub fn dump<W: Write>(&self, writer: &mut W, show_line_numbers: bool) -> Result<()> {
        for (index, line) in self.code().iter().enumerate() {
            if show_line_numbers {
                write!(writer, "{} | ", index)?;
            }
            writeln!(writer, "{}", line)?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn dump_to_path(&self, path: impl AsRef<Path>, show_line_numbers: bool) -> Result<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        self.dump(&mut writer, show_line_numbers)
    }
}

/// Runs `routine`, turning recoverable failures into an unchanged outcome.
fn run_guarded(routine: &Routine, input: String) -> Result<RoutineOutcome> {
    match routine.run(&input) {
        Ok(outcome) => Ok(outcome),
        Err(err) if !err.is_fatal() => {
            warn!(routine = routine.name(), error = %err, "routine left input unchanged");
            Ok(RoutineOutcome::unchanged(input))
        }
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vbs::routine::{Handler, Matcher};

    fn comments() -> Routine {
        Routine::new("comments", Phase::PRE)
            .with_matcher(Matcher::predicate("comment", |s| s.trim_start().starts_with('\'')))
            .with_drop_on_match()
    }

    #[test]
    fn test_drop_on_match_removes_lines() {
        let mut simplifier =
            Simplifier::from_lines(&["' one", "x = 1", "' two", "y = 2"]).unwrap();
        simplifier.register(comments());
        simplifier.run(Phase::all()).unwrap();

        assert_eq!(simplifier.code(), vec!["x = 1", "y = 2"]);
        assert_eq!(simplifier.history().current().unwrap().len(), 2);
        assert_eq!(simplifier.history().len(), 2);
    }

    #[test]
    fn test_one_iteration_per_invocation_and_dedup() {
        let mut simplifier = Simplifier::from_lines(&["a = 1", "b = 2"]).unwrap();
        simplifier.register(
            Routine::new("rename", Phase::MAIN)
                .with_handler(Handler::map("rename", |s| s.replace("a =", "c ="))),
        );
        simplifier.run(Phase::MAIN).unwrap();
        assert_eq!(simplifier.history().len(), 2);

        // Nothing left to rename: the identical result is not pushed again.
        simplifier.run(Phase::MAIN).unwrap();
        assert_eq!(simplifier.history().len(), 2);
        assert_eq!(simplifier.code(), vec!["c = 1", "b = 2"]);
    }

    #[test]
    fn test_phase_order_and_repeated_bits() {
        let mut simplifier = Simplifier::from_lines(&["x"]).unwrap();
        simplifier.register(
            Routine::new("post", Phase::POST)
                .with_handler(Handler::map("post", |s| format!("{} post", s))),
        );
        simplifier.register(
            Routine::new("pre-main", Phase::PRE | Phase::MAIN)
                .with_handler(Handler::map("pre", |s| format!("{} pre", s))),
        );
        simplifier.run(Phase::LINES).unwrap();
        assert_eq!(simplifier.code(), vec!["x pre pre post"]);
    }

    #[test]
    fn test_multiline_routine_sees_rendered_source() {
        let mut simplifier = Simplifier::from_lines(&["Sub Main()", "x = 1", "End Sub"]).unwrap();
        simplifier.register(
            Routine::new("wrap", Phase::MULTILINE).with_handler(Handler::map("wrap", |s| {
                assert!(s.contains("\tx = 1"));
                format!("' header\n{}", s)
            })),
        );
        simplifier.run(Phase::MULTILINE).unwrap();
        assert_eq!(simplifier.code(), vec!["' header", "Sub Main()", "\tx = 1", "End Sub"]);
    }

    #[test]
    fn test_multiline_drop_keeps_source() {
        let mut simplifier = Simplifier::from_lines(&["x = 1"]).unwrap();
        simplifier.register(
            Routine::new("report", Phase::MULTILINE)
                .with_handler(Handler::map("erase", |_| String::new()))
                .with_drop_on_match(),
        );
        let routine = Arc::clone(&simplifier.routines()[0]);
        assert_eq!(simplifier.run_routine(&routine).unwrap(), Some(0));
        assert_eq!(simplifier.code(), vec!["x = 1"]);
    }

    #[test]
    fn test_non_converging_routine_keeps_lines() {
        let mut simplifier = Simplifier::from_lines(&["x = 1"]).unwrap();
        simplifier.register(
            Routine::new("grow", Phase::MAIN)
                .with_handler(Handler::map("grow", |s| format!("{} + 1", s)))
                .with_fixpoint()
                .with_max_passes(4),
        );
        simplifier.run(Phase::MAIN).unwrap();
        assert_eq!(simplifier.code(), vec!["x = 1"]);
    }

    #[test]
    fn test_unregister() {
        let mut simplifier = Simplifier::from_lines(&["' c", "x = 1"]).unwrap();
        simplifier.register(comments());
        assert!(simplifier.unregister("comments"));
        assert!(!simplifier.unregister("comments"));
        simplifier.run(Phase::all()).unwrap();
        assert_eq!(simplifier.history().len(), 1);
    }

    #[test]
    fn test_register_and_run() {
        let mut simplifier = Simplifier::from_lines(&["' c", "x = 1"]).unwrap();
        let id = simplifier.register_and_run(comments()).unwrap();
        assert_eq!(id, Some(1));
        assert_eq!(simplifier.routines().len(), 1);
    }

    #[test]
    fn test_dump_with_line_numbers() {
        let simplifier = Simplifier::from_lines(&["If x Then", "y = 1", "End If"]).unwrap();
        let mut out = Vec::new();
        simplifier.dump(&mut out, true).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "0 | If x Then\n1 | \ty = 1\n2 | End If\n"
        );
    }

    #[test]
    fn test_empty_history_is_invalid() {
        let mut simplifier = Simplifier::new(History::new());
        assert!(matches!(
            simplifier.run_routine(&comments()),
            Err(VbsError::InvalidInput(_))
        ));
    }
}

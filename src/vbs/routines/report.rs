//! Token reports
//!
//! The `strings` and `functions` routines collect every String or Function
//! token of the whole source into a shared [`Report`]. They are drop-on-match
//! multiline routines, so the code itself is never changed.

use crate::vbs::lexing::tokenize;
use crate::vbs::routine::{Handler, Phase, Routine};
use crate::vbs::token::TokenKind;
use serde::Serialize;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportEntry {
    pub kind: TokenKind,
    /// Zero-based line of the rendered source.
    pub line: usize,
    pub text: String,
}

impl fmt::Display for ReportEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} | {}", self.line, self.text)
    }
}

/// Shared sink for report routines. Clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct Report {
    entries: Arc<Mutex<Vec<ReportEntry>>>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, entry: ReportEntry) {
        self.lock().push(entry);
    }

    pub fn entries(&self) -> Vec<ReportEntry> {
        self.lock().clone()
    }

    pub fn of_kind(&self, kind: TokenKind) -> Vec<ReportEntry> {
        self.lock()
            .iter()
            .filter(|entry| entry.kind == kind)
            .cloned()
            .collect()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<ReportEntry>> {
        // Entries stay consistent even if a holder panicked.
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn collect(&self, kind: TokenKind, source: &str) {
        for (line, text) in source.split('\n').enumerate() {
            for token in tokenize(text).into_iter().filter(|t| t.is(kind)) {
                self.push(ReportEntry {
                    kind,
                    line,
                    text: token.lexeme().to_string(),
                });
            }
        }
    }
}

pub fn strings(report: &Report) -> Routine {
    reporter(super::STRINGS, TokenKind::String, report)
}

pub fn functions(report: &Report) -> Routine {
    reporter(super::FUNCTIONS, TokenKind::Function, report)
}

fn reporter(name: &str, kind: TokenKind, report: &Report) -> Routine {
    let report = report.clone();
    Routine::new(name, Phase::MULTILINE)
        .with_handler(Handler::map(format!("report-{}", name), move |source| {
            report.collect(kind, source);
            source.to_string()
        }))
        .with_drop_on_match()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strings_are_collected_with_lines() {
        let report = Report::new();
        let routine = strings(&report);
        let outcome = routine.run("x = \"a\"\n\tIf y Then\n\t\tz = \"b\" & \"c\"").unwrap();

        assert!(outcome.matched);
        let texts: Vec<(usize, String)> =
            report.entries().into_iter().map(|e| (e.line, e.text)).collect();
        assert_eq!(
            texts,
            vec![
                (0, "\"a\"".to_string()),
                (2, "\"b\"".to_string()),
                (2, "\"c\"".to_string()),
            ]
        );
    }

    #[test]
    fn test_functions_share_the_sink() {
        let report = Report::new();
        strings(&report).run("x = Chr(65) & \"a\"").unwrap();
        functions(&report).run("x = Chr(65) & \"a\"").unwrap();

        assert_eq!(report.len(), 2);
        assert_eq!(report.of_kind(TokenKind::Function)[0].text, "Chr(65)");
        assert_eq!(report.of_kind(TokenKind::String)[0].to_string(), "0 | \"a\"");

        report.clear();
        assert!(report.is_empty());
    }

    #[test]
    fn test_report_routines_drop() {
        let report = Report::new();
        assert!(strings(&report).drop_on_match());
        assert!(functions(&report).is_multiline());
    }
}

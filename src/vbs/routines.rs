//! Deobfuscation heuristics
//!
//! Each submodule builds one [`Routine`] on top of the core. The
//! [`RoutineRegistry`] keeps them by name so front ends can pick a subset.

pub mod comments;
pub mod concatenate;
pub mod math;
pub mod report;
pub mod resolve;
pub mod string_functions;

pub use report::{Report, ReportEntry};

use crate::vbs::error::Result;
use crate::vbs::routine::Routine;
use std::collections::HashMap;
use std::sync::Arc;

pub const COMMENTS: &str = "comments";
pub const MATH: &str = "math";
pub const STR_FUNCTIONS: &str = "str_functions";
pub const CONCATENATE: &str = "concatenate";
pub const STRINGS: &str = "strings";
pub const FUNCTIONS: &str = "functions";
pub const RESOLVE: &str = "resolve";

/// Routines by name, plus the report sink the reporting routines write to.
#[derive(Debug, Clone, Default)]
pub struct RoutineRegistry {
    routines: HashMap<String, Arc<Routine>>,
    report: Report,
}

impl RoutineRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every built-in routine, each limited to `max_passes` fixpoint passes.
    pub fn with_defaults(max_passes: usize) -> Result<Self> {
        let mut registry = Self::new();
        let report = registry.report.clone();
        for routine in [
            comments::routine(),
            math::routine()?,
            string_functions::routine()?,
            concatenate::routine()?,
            report::strings(&report),
            report::functions(&report),
            resolve::routine(),
        ] {
            registry.register(routine.with_max_passes(max_passes));
        }
        Ok(registry)
    }

    /// Adds or replaces the routine registered under its name.
    pub fn register(&mut self, routine: Routine) {
        self.routines
            .insert(routine.name().to_string(), Arc::new(routine));
    }

    pub fn get(&self, name: &str) -> Option<Arc<Routine>> {
        self.routines.get(name).cloned()
    }

    pub fn has(&self, name: &str) -> bool {
        self.routines.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn list_all(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.routines.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn report(&self) -> &Report {
        &self.report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vbs::routine::Phase;

    #[test]
    fn test_defaults_are_registered() {
        let registry = RoutineRegistry::with_defaults(8).unwrap();
        assert_eq!(
            registry.list_all(),
            vec![COMMENTS, CONCATENATE, FUNCTIONS, MATH, RESOLVE, STR_FUNCTIONS, STRINGS]
        );
        assert_eq!(registry.get(MATH).unwrap().max_passes(), 8);
        assert!(registry.get(STRINGS).unwrap().phase().contains(Phase::MULTILINE));
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn test_register_replaces_by_name() {
        let mut registry = RoutineRegistry::new();
        registry.register(Routine::new("x", Phase::PRE));
        registry.register(Routine::new("x", Phase::POST));
        assert_eq!(registry.list_all(), vec!["x"]);
        assert_eq!(registry.get("x").unwrap().phase(), Phase::POST);
    }

    #[test]
    fn test_report_routines_write_to_registry_sink() {
        let registry = RoutineRegistry::with_defaults(8).unwrap();
        registry
            .get(STRINGS)
            .unwrap()
            .run("x = \"a\"")
            .unwrap();
        assert_eq!(registry.report().len(), 1);
    }
}

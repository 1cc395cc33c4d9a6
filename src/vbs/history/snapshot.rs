//! Persisted form of a history
//!
//! A snapshot is the iteration list (lines as tokens, predecessor id, successor
//! ids), the active cursor and the rendering indent. Loading validates the
//! links so a hand-edited file cannot produce a cursor or a link pointing
//! outside the arena, or a successor list that disagrees with the predecessors.

use super::iteration::{Iteration, IterationId};
use super::store::History;
use crate::vbs::error::{Result, VbsError};
use crate::vbs::lexing::DEFAULT_INDENT;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistorySnapshot {
    pub iterations: Vec<Iteration>,
    pub active: Option<IterationId>,
    #[serde(default = "default_indent")]
    pub indent: String,
}

fn default_indent() -> String {
    DEFAULT_INDENT.to_string()
}

impl HistorySnapshot {
    fn validate(&self) -> Result<()> {
        let len = self.iterations.len();
        if let Some(active) = self.active {
            if active >= len {
                return Err(VbsError::InvalidInput(format!(
                    "active iteration {} out of range ({} iterations)",
                    active, len
                )));
            }
        }
        for (index, iteration) in self.iterations.iter().enumerate() {
            if iteration.id() != index {
                return Err(VbsError::InvalidInput(format!(
                    "iteration at position {} has id {}",
                    index,
                    iteration.id()
                )));
            }
            // Links only ever point from older to newer iterations.
            if iteration.parent().is_some_and(|parent| parent >= index) {
                return Err(VbsError::InvalidInput(format!(
                    "iteration {} has an invalid predecessor",
                    index
                )));
            }
            if iteration
                .children()
                .iter()
                .any(|&child| child <= index || child >= len)
            {
                return Err(VbsError::InvalidInput(format!(
                    "iteration {} has an invalid successor",
                    index
                )));
            }
        }

        // Every successor names its lister as predecessor, and every
        // predecessor lists its successor.
        for (index, iteration) in self.iterations.iter().enumerate() {
            if let Some(&child) = iteration
                .children()
                .iter()
                .find(|&&child| self.iterations[child].parent() != Some(index))
            {
                return Err(VbsError::InvalidInput(format!(
                    "iteration {} lists {} as successor, but its predecessor is {:?}",
                    index,
                    child,
                    self.iterations[child].parent()
                )));
            }
            if let Some(parent) = iteration.parent() {
                if !self.iterations[parent].children().contains(&index) {
                    return Err(VbsError::InvalidInput(format!(
                        "iteration {} is missing from the successors of {}",
                        index, parent
                    )));
                }
            }
        }
        Ok(())
    }
}

impl History {
    pub fn to_snapshot(&self) -> HistorySnapshot {
        HistorySnapshot {
            iterations: self.iterations().to_vec(),
            active: self.active_id(),
            indent: self.indent().to_string(),
        }
    }

    /// Rebuilds a history with the VBScript lexer and the persisted indent.
    pub fn from_snapshot(snapshot: HistorySnapshot) -> Result<Self> {
        snapshot.validate()?;
        Ok(History::from_parts(snapshot.iterations, snapshot.active).with_indent(snapshot.indent))
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_snapshot())?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Self::from_snapshot(serde_json::from_str(json)?)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(&self.to_snapshot())?)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Self::from_snapshot(serde_yaml::from_str(yaml)?)
    }
}

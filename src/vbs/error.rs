//! Error types shared across the engine

use thiserror::Error;

/// Error type returned by client matchers and handlers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

pub type Result<T> = std::result::Result<T, VbsError>;

#[derive(Debug, Error)]
pub enum VbsError {
    /// Bad arguments to a core operation, e.g. pushing no data without allowing it.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A token pattern could not be compiled into a matcher.
    #[error("pattern compile error: {0}")]
    PatternCompile(String),

    /// A matcher or handler failed while running.
    #[error("'{callable}' failed: {message}")]
    HandlerFault { callable: String, message: String },

    /// A re-apply-until-unchanged routine kept changing its output.
    #[error("routine '{routine}' did not converge after {passes} passes")]
    DidNotConverge { routine: String, passes: usize },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl VbsError {
    /// Errors that may abort a pipeline run. Everything else degrades to a no-op
    /// for the call that produced it.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            VbsError::HandlerFault { .. } | VbsError::DidNotConverge { .. }
        )
    }
}

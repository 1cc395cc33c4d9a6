//! Configuration loading
//!
//! `defaults/vbsimplify.default.toml` is embedded into the binary. User files
//! and single-key overrides are layered on top with [`Loader`] before the
//! result is deserialized into [`SimplifierConfig`].

use crate::vbs::error::Result;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, File, FileFormat, ValueKind};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_TOML: &str = include_str!("../../defaults/vbsimplify.default.toml");

#[derive(Debug, Clone, Deserialize)]
pub struct SimplifierConfig {
    pub render: RenderConfig,
    pub pipeline: PipelineConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RenderConfig {
    /// Emitted once per block nesting level.
    pub indent: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    pub max_fixpoint_passes: usize,
    /// Routine names enabled by `--all`, in registration order.
    pub routines: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    pub show_line_numbers: bool,
}

/// Layers user configuration over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layers a TOML file that must exist.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layers a TOML file, ignored when absent.
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    pub fn build(self) -> Result<SimplifierConfig> {
        Ok(self.builder.build()?.try_deserialize()?)
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

pub fn load_defaults() -> Result<SimplifierConfig> {
    Loader::new().build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_default_config() {
        let config = load_defaults().expect("defaults to deserialize");
        assert_eq!(config.render.indent, "\t");
        assert_eq!(config.pipeline.max_fixpoint_passes, 64);
        assert_eq!(
            config.pipeline.routines,
            vec!["comments", "math", "str_functions", "concatenate"]
        );
        assert!(!config.output.show_line_numbers);
    }

    #[test]
    fn supports_overrides() {
        let config = Loader::new()
            .set_override("render.indent", "    ")
            .expect("override to apply")
            .set_override("pipeline.max_fixpoint_passes", 8i64)
            .expect("override to apply")
            .build()
            .expect("config to build");
        assert_eq!(config.render.indent, "    ");
        assert_eq!(config.pipeline.max_fixpoint_passes, 8);
    }

    #[test]
    fn layers_user_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "[output]\nshow_line_numbers = true").unwrap();
        let config = Loader::new().with_file(file.path()).build().unwrap();
        assert!(config.output.show_line_numbers);
        assert_eq!(config.render.indent, "\t");
    }

    #[test]
    fn missing_required_file_fails() {
        let result = Loader::new().with_file("/nonexistent/vbsimplify.toml").build();
        assert!(result.is_err());
        let config = Loader::new()
            .with_optional_file("/nonexistent/vbsimplify.toml")
            .build()
            .unwrap();
        assert_eq!(config.pipeline.max_fixpoint_passes, 64);
    }
}

//! Configuration file handling

use miette::{IntoDiagnostic, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::args::OutputFormat;

pub const CONFIG_FILE_NAME: &str = "sqlgate.toml";

const DEFAULT_DIALECT: &str = "sqlserver";

/// Configuration for sqlgate
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// SQL dialect name or alias
    #[serde(default)]
    pub dialect: Option<String>,

    /// SQL file paths or glob patterns to check
    #[serde(default)]
    pub files: Vec<String>,

    /// Output format
    #[serde(default)]
    pub format: Option<OutputFormat>,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).into_diagnostic()?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents).into_diagnostic()
    }

    /// Try to find and load sqlgate.toml in current directory or parent directories
    pub fn find_and_load() -> Result<Option<Self>> {
        let mut current_dir = std::env::current_dir().into_diagnostic()?;

        loop {
            let config_path = current_dir.join(CONFIG_FILE_NAME);
            if config_path.exists() {
                tracing::info!(path = %config_path.display(), "using configuration file");
                return Ok(Some(Self::from_file(&config_path)?));
            }

            if !current_dir.pop() {
                break;
            }
        }

        Ok(None)
    }

    /// Merge CLI arguments into configuration
    /// CLI arguments take precedence over config file values
    pub fn merge_with_args(
        mut self,
        files: &[PathBuf],
        dialect: &Option<String>,
        format: &Option<OutputFormat>,
    ) -> Self {
        if !files.is_empty() {
            self.files = files.iter().map(|p| p.display().to_string()).collect();
        }

        if dialect.is_some() {
            self.dialect = dialect.clone();
        }

        if format.is_some() {
            self.format = *format;
        }

        self
    }

    pub fn dialect_name(&self) -> &str {
        self.dialect.as_deref().unwrap_or(DEFAULT_DIALECT)
    }

    pub fn output_format(&self) -> OutputFormat {
        self.format.unwrap_or_default()
    }
}

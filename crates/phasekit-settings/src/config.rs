//! Run configuration
//!
//! Everything a run needs is carried by one [`RunConfig`] value passed to the
//! entry point. It is built from command-line flags, optionally on top of a
//! JSON or TOML file.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{ConfigError, SettingsResult};

/// Prefix of the default output file name
pub const OUTPUT_PREFIX: &str = "modified_";

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human readable, multi-line
    #[default]
    Pretty,
    /// One JSON object per event
    Json,
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pretty => write!(f, "pretty"),
            Self::Json => write!(f, "json"),
        }
    }
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Configuration of one rewrite run
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// G-code file to rewrite
    pub input: PathBuf,
    /// Parameter text file
    pub parameters: PathBuf,
    /// Destination; defaults to `modified_<input name>` next to the input
    pub output: Option<PathBuf>,
    pub log_format: LogFormat,
}

impl RunConfig {
    /// Create a config with the default output path
    pub fn new(input: impl Into<PathBuf>, parameters: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            parameters: parameters.into(),
            output: None,
            log_format: LogFormat::default(),
        }
    }

    /// Set an explicit output path
    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = Some(output.into());
        self
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let content = std::fs::read_to_string(path)?;

        let config: Self = if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content)?
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            toml::from_str(&content)?
        } else {
            let ext = path
                .extension()
                .map(|e| e.to_string_lossy().to_string())
                .unwrap_or_default();
            return Err(ConfigError::UnsupportedFormat(ext).into());
        };

        tracing::debug!("Loaded run config from {}", path.display());
        Ok(config)
    }

    /// Resolve the output path
    pub fn output_path(&self) -> PathBuf {
        if let Some(output) = &self.output {
            return output.clone();
        }
        let name = self
            .input
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        self.input.with_file_name(format!("{OUTPUT_PREFIX}{name}"))
    }

    /// Check that the paths can be used
    pub fn validate(&self) -> SettingsResult<()> {
        if self.input.as_os_str().is_empty() {
            return Err(ConfigError::MissingKey("input".to_string()).into());
        }
        if self.parameters.as_os_str().is_empty() {
            return Err(ConfigError::MissingKey("parameters".to_string()).into());
        }
        if self.input.file_name().is_none() {
            return Err(ConfigError::InvalidPath {
                key: "input".to_string(),
                reason: "not a file path".to_string(),
            }
            .into());
        }
        if same_file(&self.output_path(), &self.input) {
            return Err(ConfigError::InvalidPath {
                key: "output".to_string(),
                reason: "must differ from the input file".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

/// Compare two paths, resolving them when both exist on disk
fn same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

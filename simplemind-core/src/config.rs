//! Configuration parsing and management.

use crate::pipeline::PipelineSpec;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    ParseError(#[from] serde_yaml::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),
}

/// Main configuration struct matching the simplemind.yml schema
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_content_root")]
    pub content_root: PathBuf,

    /// Parser names run in order over every file
    #[serde(default = "default_parsers")]
    pub parsers: Vec<String>,

    /// Filter names run in order over the rendered HTML
    #[serde(default = "default_filters")]
    pub filters: Vec<String>,

    #[serde(default = "default_highlight_theme")]
    pub highlight_theme: String,

    /// Drop the blank line the metadata splitter leaves at the top of the body
    #[serde(default)]
    pub trim_content_delimiter: bool,

    // Internal: path to config file (for relative path resolution)
    #[serde(skip)]
    config_path: Option<PathBuf>,
}

fn default_content_root() -> PathBuf {
    PathBuf::from("content")
}

fn default_parsers() -> Vec<String> {
    vec![
        "split_metadata_and_content".to_string(),
        "extract_title".to_string(),
    ]
}

fn default_filters() -> Vec<String> {
    vec!["highlight_source_code".to_string()]
}

pub(crate) fn default_highlight_theme() -> String {
    String::from("InspiredGitHub")
}

impl Default for Config {
    fn default() -> Self {
        Self::new(default_content_root())
    }
}

impl Config {
    /// In-memory config with default pipeline settings
    pub fn new(content_root: impl Into<PathBuf>) -> Self {
        Self {
            content_root: content_root.into(),
            parsers: default_parsers(),
            filters: default_filters(),
            highlight_theme: default_highlight_theme(),
            trim_content_delimiter: false,
            config_path: None,
        }
    }

    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let mut config: Config = serde_yaml::from_str(&contents)?;

        if config.content_root.as_os_str().is_empty() {
            return Err(ConfigError::MissingField("content_root".to_string()));
        }

        // Store config file path for relative path resolution
        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    /// Get the content directory, resolved relative to the config file
    pub fn content_dir(&self) -> PathBuf {
        self.resolve_path(&self.content_root)
    }

    /// Validate parser and filter names into a pipeline spec
    pub fn pipeline_spec(&self) -> crate::Result<PipelineSpec> {
        PipelineSpec::parse(&self.parsers, &self.filters)
    }

    /// Resolve a path relative to the config file location
    fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else if let Some(config_path) = &self.config_path {
            if let Some(parent) = config_path.parent() {
                parent.join(path)
            } else {
                path.to_path_buf()
            }
        } else {
            path.to_path_buf()
        }
    }
}

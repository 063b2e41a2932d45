//! Configuration: an optional TOML file merged under command-line flags.
//!
//! ```toml
//! function = "wrapped"
//! alias_prefix = "connAlias"
//! header = true
//! meta = ["metadata/stdlib.jsonl", "metadata/local.jsonl"]
//! ```
//!
//! Relative `meta` paths are resolved against the directory holding the file.

use crate::cli::Cli;
use propagate_kernel::GenerateOptions;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_META_PATH: &str = ".ifacepropagate/packages.jsonl";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub function: Option<String>,
    #[serde(default)]
    pub alias_prefix: Option<String>,
    #[serde(default)]
    pub header: Option<bool>,
    #[serde(default)]
    pub meta: Vec<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {message}")]
    Io { path: String, message: String },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        let mut config: FileConfig = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        if let Some(base) = path.parent() {
            config.meta = config
                .meta
                .into_iter()
                .map(|p| if p.is_relative() { base.join(p) } else { p })
                .collect();
        }
        Ok(config)
    }
}

/// Effective settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub options: GenerateOptions,
    pub meta: Vec<PathBuf>,
}

impl Settings {
    /// Flags win over the file; the file wins over built-in defaults.
    pub fn resolve(cli: &Cli, file: FileConfig) -> Self {
        let defaults = GenerateOptions::default();
        let options = GenerateOptions {
            dispatch_name: cli
                .function
                .clone()
                .or(file.function)
                .unwrap_or(defaults.dispatch_name),
            alias_prefix: cli
                .alias_prefix
                .clone()
                .or(file.alias_prefix)
                .unwrap_or(defaults.alias_prefix),
            header: !cli.no_header && file.header.unwrap_or(defaults.header),
        };

        let meta = if !cli.meta.is_empty() {
            cli.meta.iter().map(PathBuf::from).collect()
        } else if !file.meta.is_empty() {
            file.meta
        } else {
            vec![PathBuf::from(DEFAULT_META_PATH)]
        };

        Self { options, meta }
    }
}

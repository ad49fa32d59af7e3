use std::path::{Path, PathBuf};

use anyhow::Context;
use mdag_core::DagConfig;
use serde::{Deserialize, Serialize};

/// Config file read when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "mdag.toml";

/// Settings for the `mdag` binary.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Object store directory.
    pub store: PathBuf,
    /// Entry names skipped when adding a directory.
    pub ignore: Vec<String>,
    /// Build settings.
    pub dag: DagConfig,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            store: PathBuf::from(".mdag"),
            ignore: vec![".mdag".into(), ".git".into()],
            dag: DagConfig::default(),
        }
    }
}

impl CliConfig {
    /// Load from `path`, or from [`DEFAULT_CONFIG_FILE`] if it exists.
    ///
    /// An explicitly named file must exist; a missing default file yields the
    /// defaults.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let (path, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
        };
        if !required && !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: Self =
            toml::from_str(&text).with_context(|| format!("parsing config {}", path.display()))?;
        config.dag.validate()?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Apply command-line overrides.
    pub fn with_store(mut self, store: Option<PathBuf>) -> Self {
        if let Some(store) = store {
            self.store = store;
        }
        self
    }
}

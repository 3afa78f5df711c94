//! Cortex configuration file handling
//!
//! Cortex projects carry a single `cortex.toml` at the project root with
//! project metadata and inference defaults.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize, Serialize)]
pub struct CortexConfig {
    #[serde(default)]
    pub project: ProjectConfig,
    #[serde(default)]
    pub inference: InferenceConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ProjectConfig {
    #[serde(default = "default_name")]
    pub name: String,
}

fn default_name() -> String {
    "cortex-project".to_string()
}

#[derive(Debug, Deserialize, Serialize)]
pub struct InferenceConfig {
    /// Upper bound on rounds per `update_marginals` call.
    #[serde(default = "default_max_rounds")]
    pub max_rounds: usize,
    /// Enable the round/execution tracer by default.
    #[serde(default)]
    pub trace: bool,
}

fn default_max_rounds() -> usize {
    1000
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            max_rounds: default_max_rounds(),
            trace: false,
        }
    }
}

impl Default for CortexConfig {
    fn default() -> Self {
        Self {
            project: ProjectConfig::default(),
            inference: InferenceConfig::default(),
        }
    }
}

impl CortexConfig {
    /// Load `cortex.toml` from `path`, falling back to defaults if the file
    /// doesn't exist.
    pub fn load_from_dir(path: &Path) -> Result<Self> {
        let config_path = path.join("cortex.toml");
        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("failed to read {}", config_path.display()))?;
        let config: CortexConfig = toml::from_str(&content)
            .with_context(|| format!("failed to parse {}", config_path.display()))?;
        Ok(config)
    }
}

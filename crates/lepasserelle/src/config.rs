// Application Configuration
//
// *La Configuration* (The Configuration) - `lesuivi.toml` plus environment overrides

use anyhow::{bail, Context, Result};
use lerecit::ModelConfig;
use leserve::ServerConfig;
use lestockage::StorageConfig;
use lexport::DEFAULT_PROJECT_KEY;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "lesuivi.toml";

/// Export defaults, the `[export]` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Jira project key written on every issue
    pub jira_project_key: String,

    /// Jira assignee; unassigned when absent
    pub jira_assignee: Option<String>,

    /// Directory export files are written to
    pub out_dir: PathBuf,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            jira_project_key: DEFAULT_PROJECT_KEY.to_string(),
            jira_assignee: None,
            out_dir: PathBuf::from("."),
        }
    }
}

/// Whole application configuration. Every table is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// HTTP server settings
    pub server: ServerConfig,

    /// Database settings
    pub storage: StorageConfig,

    /// Summarization model backend
    pub summarizer: ModelConfig,

    /// Export defaults
    pub export: ExportConfig,
}

impl AppConfig {
    /// Load configuration
    ///
    /// An explicit path must exist. Without one, `lesuivi.toml` in the
    /// working directory is used when present and defaults otherwise.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !default.exists() {
                    return Ok(AppConfig::default());
                }
                default
            }
        };

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    /// Parse TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Write configuration as TOML
    pub fn save(&self, path: &Path) -> Result<()> {
        let toml_string = toml::to_string_pretty(self).context("Failed to serialize configuration")?;
        fs::write(path, toml_string)
            .with_context(|| format!("Failed to write config file: {:?}", path))?;
        Ok(())
    }

    /// Apply `LESUIVI_HOST`, `LESUIVI_PORT`, `LESUIVI_LOG_LEVEL` and `LESUIVI_DB_PATH`
    pub fn apply_env(&mut self) {
        self.server.apply_env();
        if let Ok(db_path) = std::env::var("LESUIVI_DB_PATH") {
            self.storage.db_path = db_path;
        }
    }

    /// Validate every section
    pub fn validate(&self) -> Result<()> {
        if let Err(e) = self.server.validate() {
            bail!("Invalid [server] configuration: {}", e);
        }
        if self.storage.db_path.trim().is_empty() {
            bail!("Invalid [storage] configuration: db_path cannot be empty");
        }
        if let Err(e) = self.summarizer.validate() {
            bail!("Invalid [summarizer] configuration: {}", e);
        }
        if self.export.jira_project_key.trim().is_empty() {
            bail!("Invalid [export] configuration: jira_project_key cannot be empty");
        }
        Ok(())
    }
}

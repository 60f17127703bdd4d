use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use anyhow::{Result, anyhow};

use crate::submitter::{SubmitterOptions, DEFAULT_MAX_RESULTS};
use crate::variant::Variant;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub default_mode: String,
    pub max_results: u32,
    pub fence_stale_responses: bool,
    pub request_timeout_secs: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        Self {
            default_mode: Variant::Search.as_str().to_string(),
            max_results: DEFAULT_MAX_RESULTS,
            fence_stale_responses: true,
            request_timeout_secs: None,
        }
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(config_path)?;
        let config: Config = serde_json::from_str(&config_content)?;
        Ok(config)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(config_path, config_content)?;
        Ok(())
    }

    /// Configured start-up mode; unknown names fall back to search
    pub fn mode(&self) -> Variant {
        Variant::from_str(&self.default_mode).unwrap_or(Variant::Search)
    }

    pub fn submitter_options(&self) -> SubmitterOptions {
        SubmitterOptions {
            max_results: self.max_results,
            fence_stale_responses: self.fence_stale_responses,
        }
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("paper-search").join("config.json"))
    }
}

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::monitor::DEFAULT_HISTORY_SIZE;

/// Engine settings, passed explicitly to discovery, the orchestrator and the runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Cadence of the shared tick
    pub tick_interval_ms: u64,
    /// Slots per rolling window
    pub history_capacity: usize,
    /// Discard one reading per source before the first tick
    pub warm_up: bool,
    /// Publish one reading per logical core
    pub per_core: bool,
    pub enable_gpu: bool,
    pub enable_network: bool,
    pub enable_disks: bool,
    /// Interface to chart instead of the automatic choice
    pub preferred_interface: Option<String>,
    /// Tokio worker threads for the monitor runtime
    pub worker_threads: usize,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 500,
            history_capacity: DEFAULT_HISTORY_SIZE,
            warm_up: true,
            per_core: true,
            enable_gpu: true,
            enable_network: true,
            enable_disks: true,
            preferred_interface: None,
            worker_threads: 2,
        }
    }
}

impl MonitorConfig {
    /// Load from the default location, falling back to defaults.
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let data = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {:?}", config_path))?;

        if data.trim().is_empty() {
            return Ok(Self::default());
        }

        // a corrupted file should not keep the monitor from starting
        Ok(serde_json::from_str(&data).unwrap_or_else(|e| {
            log::warn!("Ignoring invalid config {:?}: {}", config_path, e);
            Self::default()
        }))
    }

    /// Load from an explicit file. Unlike [`MonitorConfig::load`], errors are reported.
    pub fn load_from(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: Self = serde_json::from_str(&data)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let data = serde_json::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(path, data)
            .with_context(|| format!("Failed to write config file: {:?}", path))?;

        Ok(())
    }

    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir =
            dirs::config_dir().with_context(|| "Could not determine config directory")?;

        Ok(config_dir.join("hwscope").join("monitor.json"))
    }

    pub fn validate(&self) -> Result<()> {
        if self.tick_interval_ms == 0 {
            bail!("tick_interval_ms must be greater than zero");
        }
        if self.history_capacity == 0 {
            bail!("history_capacity must be greater than zero");
        }
        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

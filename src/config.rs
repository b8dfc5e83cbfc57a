use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectConfig {
    pub name: String,
    pub version: String,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            name: "Ghost: Black Ops".to_string(),
            version: "1.0.0".to_string(),
        }
    }
}

/// Settings for the built-in simulated units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitsConfig {
    /// Simulated latency of every task operation.
    #[serde(default = "default_latency_ms")]
    pub latency_ms: u64,
    /// `unit.operation` entries that fail when run.
    #[serde(default)]
    pub fail_operations: Vec<String>,
}

fn default_latency_ms() -> u64 {
    100
}

impl Default for UnitsConfig {
    fn default() -> Self {
        Self {
            latency_ms: default_latency_ms(),
            fail_operations: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct LogConfig {
    #[serde(default)]
    pub debug: bool,
    /// Also write to `~/.director/director.log`.
    #[serde(default)]
    pub to_file: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub project: ProjectConfig,
    #[serde(default)]
    pub units: UnitsConfig,
    #[serde(default)]
    pub log: LogConfig,
}

impl Config {
    pub fn director_dir() -> Result<PathBuf> {
        Ok(dirs::home_dir().ok_or(Error::NoHomeDir)?.join(".director"))
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::director_dir()?.join("director.toml"))
    }

    pub fn log_path() -> Result<PathBuf> {
        Ok(Self::director_dir()?.join("director.log"))
    }

    /// Load from the default location.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load from `path`, falling back to defaults when it does not exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "Config::load");
        if !path.exists() {
            debug!("Config file not found, using defaults");
            return Ok(Self::default());
        }
        let config: Self = toml::from_str(&fs::read_to_string(path)?)?;
        debug!(
            project = %config.project.name,
            latency_ms = config.units.latency_ms,
            fail_operations = ?config.units.fail_operations,
            "Config loaded"
        );
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                debug!(dir = %parent.display(), "Creating config directory");
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, toml::to_string_pretty(self)?)?;
        debug!(path = %path.display(), "Config saved");
        Ok(())
    }

    /// Write a default config to `path`. Refuses to overwrite.
    pub fn write_default(path: &Path) -> Result<Self> {
        if path.exists() {
            return Err(Error::Validation(format!(
                "{} already exists",
                path.display()
            )));
        }
        let config = Self::default();
        config.save_to(path)?;
        Ok(config)
    }

    /// Check the preconditions for bringing the system up.
    pub fn validate(&self) -> Result<()> {
        if self.project.name.trim().is_empty() {
            return Err(Error::Validation("project.name must not be empty".to_string()));
        }
        for entry in &self.units.fail_operations {
            match entry.split_once('.') {
                Some((unit, op)) if !unit.is_empty() && !op.is_empty() => {}
                _ => {
                    return Err(Error::Validation(format!(
                        "units.fail_operations entry {:?} is not unit.operation",
                        entry
                    )))
                }
            }
        }
        Ok(())
    }

    /// Whether the built-in units should fail `unit.operation`.
    pub fn should_fail(&self, unit: &str, operation: &str) -> bool {
        self.units
            .fail_operations
            .iter()
            .any(|e| e.split_once('.') == Some((unit, operation)))
    }

    pub fn ensure_dirs() -> Result<()> {
        let dir = Self::director_dir()?;
        if !dir.exists() {
            debug!(dir = %dir.display(), "Creating director directory");
            fs::create_dir_all(&dir)?;
        }
        Ok(())
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

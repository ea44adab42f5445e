use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub scanner: ScannerConfig,
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    /// Worker pool bound (0 = auto, cpu count based)
    pub jobs: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Number of entries shown per ranking
    pub top: usize,
    /// Color mode: auto, always, never
    pub color: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scanner: ScannerConfig::default(),
            report: ReportConfig::default(),
        }
    }
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self { jobs: 0 }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            top: 10,
            color: "auto".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from an explicit path, or from the default
    /// location if none is given. A missing default file yields defaults;
    /// a missing explicit file is an error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, explicit) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => match Self::default_path() {
                Some(p) => (p, false),
                None => return Ok(Self::default()),
            },
        };

        if !explicit && !path.exists() {
            return Ok(Self::default());
        }

        let data = std::fs::read_to_string(&path).map_err(|source| ConfigError::ReadError {
            path: path.clone(),
            source,
        })?;

        let config: Config =
            toml::from_str(&data).map_err(|source| ConfigError::ParseError { path, source })?;

        config.validate()?;
        Ok(config)
    }

    /// Default config file location: `$XDG_CONFIG_HOME/space-hogs/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("space-hogs").join("config.toml"))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.report.top == 0 {
            return Err(ConfigError::Invalid(
                "report.top must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

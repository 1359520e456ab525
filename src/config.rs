//! Configuration file handling.
//!
//! Settings come from an optional `config.toml`; every field has a default
//! so a missing file or a partial one is fine.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::analytics::TimeRange;
use crate::error::Result;
use crate::utils::{get_db_path, APP_DIR_NAME, DEFAULT_DB_FILE};

pub const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub analytics: AnalyticsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the store file. Defaults to the OS data directory.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    #[serde(default = "default_db_file")]
    pub db_file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            db_file: default_db_file(),
        }
    }
}

fn default_db_file() -> String {
    DEFAULT_DB_FILE.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    /// Window used when `analytics` is run without `--range`.
    #[serde(default)]
    pub default_range: TimeRange,

    /// How many trailing days the daily spending pattern shows.
    #[serde(default = "default_daily_days")]
    pub daily_days: usize,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            default_range: TimeRange::default(),
            daily_days: default_daily_days(),
        }
    }
}

fn default_daily_days() -> usize {
    30
}

impl Config {
    /// Load from `path`, or from the default location when `path` is None.
    /// A missing default file yields the defaults; a missing explicit file
    /// is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load_from_file(p),
            None => match default_config_path() {
                Some(p) if p.exists() => Self::load_from_file(&p),
                _ => Ok(Self::default()),
            },
        }
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Command-line overrides win over the file.
    pub fn with_data_dir(mut self, data_dir: Option<PathBuf>) -> Self {
        if data_dir.is_some() {
            self.storage.data_dir = data_dir;
        }
        self
    }

    pub fn db_path(&self) -> Result<PathBuf> {
        get_db_path(self.storage.data_dir.as_deref(), &self.storage.db_file)
    }
}

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME).join(CONFIG_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.storage.db_file, "budget-tracker.db");
        assert!(config.storage.data_dir.is_none());
        assert_eq!(config.analytics.default_range, TimeRange::Last6Months);
        assert_eq!(config.analytics.daily_days, 30);
    }

    #[test]
    fn test_parse_config() {
        let toml_content = r#"
[storage]
data_dir = "/tmp/budget"

[analytics]
default_range = "30days"
"#;

        let config: Config = toml::from_str(toml_content).unwrap();
        assert_eq!(config.storage.data_dir, Some(PathBuf::from("/tmp/budget")));
        assert_eq!(config.storage.db_file, "budget-tracker.db");
        assert_eq!(config.analytics.default_range, TimeRange::Last30Days);
        assert_eq!(config.analytics.daily_days, 30);
    }

    #[test]
    fn test_cli_data_dir_overrides_file() {
        let config = Config::default().with_data_dir(Some(PathBuf::from("/srv/budget")));
        assert_eq!(config.storage.data_dir, Some(PathBuf::from("/srv/budget")));

        let kept = config.with_data_dir(None);
        assert_eq!(kept.storage.data_dir, Some(PathBuf::from("/srv/budget")));
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        assert!(Config::load(Some(Path::new("/definitely/not/here.toml"))).is_err());
    }
}

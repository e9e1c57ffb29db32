//! Configuration management with layered hierarchy

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Items per registry page, fixed for the process lifetime.
pub const DEFAULT_PAGE_SIZE: usize = 25;

const DB_FILE: &str = "nutriswap.db";

/// Nutriswap configuration with layered hierarchy
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Database file location
    pub db_path: Option<PathBuf>,

    /// Registry page size for the browse views
    pub page_size: Option<usize>,

    /// Default output format for list commands
    pub default_format: Option<String>,

    /// Products requested per category from the API
    pub api_page_size: Option<usize>,
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    pub fn load() -> Self {
        let mut config = Config::default();

        // 1. Built-in defaults (already in Default impl)

        // 2. Global user config (~/.config/nutriswap/config.yaml)
        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                if let Ok(contents) = std::fs::read_to_string(&global_path) {
                    if let Ok(global) = serde_yml::from_str::<Config>(&contents) {
                        config.merge(global);
                    }
                }
            }
        }

        // 3. Environment variables
        if let Ok(db) = std::env::var("NUTRISWAP_DB") {
            config.db_path = Some(PathBuf::from(db));
        }
        if let Ok(size) = std::env::var("NUTRISWAP_PAGE_SIZE") {
            if let Ok(size) = size.parse() {
                config.page_size = Some(size);
            }
        }

        config
    }

    /// Get the path to the global config file
    fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "nutriswap")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        if other.db_path.is_some() {
            self.db_path = other.db_path;
        }
        if other.page_size.is_some() {
            self.page_size = other.page_size;
        }
        if other.default_format.is_some() {
            self.default_format = other.default_format;
        }
        if other.api_page_size.is_some() {
            self.api_page_size = other.api_page_size;
        }
    }

    pub fn page_size(&self) -> usize {
        self.page_size.unwrap_or(DEFAULT_PAGE_SIZE)
    }

    /// Resolve the database path: CLI override, then config, then the
    /// platform data directory, then the working directory as last resort.
    pub fn database_path(&self, cli_override: Option<&Path>) -> PathBuf {
        if let Some(path) = cli_override {
            return path.to_path_buf();
        }
        if let Some(path) = &self.db_path {
            return path.clone();
        }
        directories::ProjectDirs::from("", "", "nutriswap")
            .map(|dirs| dirs.data_dir().join(DB_FILE))
            .unwrap_or_else(|| PathBuf::from(DB_FILE))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_override_wins() {
        let config = Config {
            db_path: Some(PathBuf::from("/tmp/from-config.db")),
            ..Default::default()
        };
        let path = config.database_path(Some(Path::new("/tmp/from-cli.db")));
        assert_eq!(path, PathBuf::from("/tmp/from-cli.db"));
    }

    #[test]
    fn test_config_path_beats_default() {
        let config = Config {
            db_path: Some(PathBuf::from("/tmp/from-config.db")),
            ..Default::default()
        };
        assert_eq!(
            config.database_path(None),
            PathBuf::from("/tmp/from-config.db")
        );
    }

    #[test]
    fn test_merge_prefers_other() {
        let mut base = Config {
            page_size: Some(10),
            ..Default::default()
        };
        base.merge(Config {
            page_size: Some(50),
            default_format: Some("csv".into()),
            ..Default::default()
        });
        assert_eq!(base.page_size(), 50);
        assert_eq!(base.default_format.as_deref(), Some("csv"));
    }
}

//! Configuration discovery and loading
//!
//! This module handles the configuration discovery hierarchy:
//! 1. Current directory: ./atomize.toml or ./.atomize/config.toml
//! 2. User config: ~/.atomize/config.toml
//! 3. System config: /etc/atomize/config.toml
//! 4. Built-in defaults

use crate::{env, task::TaskManagerConfig};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env as std_env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AtomizeConfig {
    /// Where the session and history files live; defaults to ~/.atomize/data
    pub data_dir: Option<PathBuf>,
    pub scoring: TaskManagerConfig,
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Styled output and screen clearing
    pub color: bool,
    /// How many overdue tasks to list before summarizing the rest
    pub overdue_preview_limit: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            color: true,
            overdue_preview_limit: 5,
        }
    }
}

impl Default for AtomizeConfig {
    fn default() -> Self {
        Self {
            data_dir: None, // Resolved against the home directory when used
            scoring: TaskManagerConfig::default(),
            display: DisplayConfig::default(),
        }
    }
}

impl AtomizeConfig {
    /// Data directory to use, honoring an explicit override first
    pub fn resolve_data_dir(&self, data_dir_override: Option<PathBuf>) -> PathBuf {
        data_dir_override
            .or_else(|| self.data_dir.clone())
            .or_else(|| env::home_dir().map(|home| env::default_data_dir_path(&home)))
            .unwrap_or_else(|| PathBuf::from(env::ATOMIZE_DIR_NAME).join(env::data::DATA_DIR_NAME))
    }

    /// Load from TOML file
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: AtomizeConfig = toml::from_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        Ok(config)
    }

    /// Save to TOML file
    pub fn to_toml_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, content)?;
        Ok(())
    }
}

/// Configuration discovery system
pub struct ConfigDiscovery;

impl ConfigDiscovery {
    /// Discover and load configuration using the hierarchy
    pub fn discover_config() -> Result<AtomizeConfig> {
        if let Some(config_path) = Self::find_config_file() {
            info!("Loading configuration from: {:?}", config_path);
            return AtomizeConfig::from_toml_file(config_path);
        }

        info!("No configuration file found, using defaults");
        Ok(AtomizeConfig::default())
    }

    /// Load an explicit config file, or fall back to discovery
    pub fn load(config_override: Option<&Path>) -> Result<AtomizeConfig> {
        match config_override {
            Some(path) => {
                info!("Loading configuration override from: {:?}", path);
                AtomizeConfig::from_toml_file(path)
            }
            None => Self::discover_config(),
        }
    }

    /// Find configuration file using discovery hierarchy
    pub fn find_config_file() -> Option<PathBuf> {
        Self::get_config_candidates()
            .into_iter()
            .inspect(|candidate| debug!("Checking for config file: {:?}", candidate))
            .find(|candidate| candidate.is_file())
    }

    /// Get list of configuration file candidates in priority order
    fn get_config_candidates() -> Vec<PathBuf> {
        let mut candidates = Vec::new();

        // 1. Current directory: ./atomize.toml
        if let Ok(current_dir) = std_env::current_dir() {
            candidates.push(current_dir.join(env::LOCAL_CONFIG_FILE_NAME));
            candidates.push(env::local_config_file_path(&current_dir));
        }

        // 2. User config: ~/.atomize/config.toml
        if let Some(home_dir) = env::home_dir() {
            candidates.push(env::user_config_file_path(&home_dir));
        }

        // 3. System config
        #[cfg(unix)]
        candidates.push(PathBuf::from("/etc/atomize/config.toml"));

        #[cfg(windows)]
        if let Ok(program_data) = std_env::var("PROGRAMDATA") {
            candidates.push(PathBuf::from(program_data).join("atomize").join("config.toml"));
        }

        candidates
    }

    /// Create a default config file in the user's home directory
    pub fn create_default_user_config() -> Result<PathBuf> {
        let home_dir = env::home_dir().context("Could not determine home directory")?;

        let config_dir = env::user_config_dir_path(&home_dir);
        let config_path = env::user_config_file_path(&home_dir);

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)?;
            info!("Created configuration directory: {:?}", config_dir);
        }

        if !config_path.exists() {
            AtomizeConfig::default().to_toml_file(&config_path)?;
            info!("Created default configuration file: {:?}", config_path);
        } else {
            warn!("Configuration file already exists: {:?}", config_path);
        }

        Ok(config_path)
    }

    /// Show configuration discovery information for debugging
    pub fn show_discovery_info() {
        println!("Configuration Discovery Hierarchy:");
        println!();

        for (i, candidate) in Self::get_config_candidates().iter().enumerate() {
            let status = if candidate.is_file() {
                "✓ EXISTS"
            } else if candidate.exists() {
                "✗ NOT A FILE"
            } else {
                "✗ NOT FOUND"
            };
            println!("  {}. {:?} - {}", i + 1, candidate, status);
        }

        println!();
        match Self::find_config_file() {
            Some(found) => println!("Active configuration: {:?}", found),
            None => println!("Active configuration: Built-in defaults"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = AtomizeConfig::default();

        assert_eq!(config.scoring.points_base, 10);
        assert_eq!(config.scoring.postponed_bonus, 5);
        assert!(config.display.color);
        assert_eq!(config.display.overdue_preview_limit, 5);
    }

    #[test]
    fn test_config_file_operations() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("atomize.toml");

        let mut original = AtomizeConfig::default();
        original.data_dir = Some(temp_dir.path().join("data"));
        original.scoring.points_base = 20;

        original.to_toml_file(&config_path).unwrap();
        let loaded = AtomizeConfig::from_toml_file(&config_path).unwrap();

        assert_eq!(loaded, original);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: AtomizeConfig = toml::from_str(
            "[scoring]\npostponed_bonus = 2\n\n[display]\ncolor = false\n",
        )
        .unwrap();

        assert_eq!(config.scoring.points_base, 10);
        assert_eq!(config.scoring.postponed_bonus, 2);
        assert!(!config.display.color);
        assert_eq!(config.display.overdue_preview_limit, 5);
        assert_eq!(config.data_dir, None);
    }

    #[test]
    fn test_invalid_config_is_reported() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("broken.toml");
        fs::write(&config_path, "scoring = \"many\"").unwrap();

        let err = AtomizeConfig::from_toml_file(&config_path).unwrap_err();
        assert!(err.to_string().contains("Invalid config file"));
    }

    #[test]
    fn test_data_dir_resolution_order() {
        let mut config = AtomizeConfig::default();
        config.data_dir = Some(PathBuf::from("/from/config"));

        assert_eq!(
            config.resolve_data_dir(Some(PathBuf::from("/from/flag"))),
            PathBuf::from("/from/flag")
        );
        assert_eq!(config.resolve_data_dir(None), PathBuf::from("/from/config"));
    }

    #[test]
    fn test_config_candidates() {
        let candidates = ConfigDiscovery::get_config_candidates();

        assert!(!candidates.is_empty());
        assert_eq!(candidates[0].file_name().unwrap(), "atomize.toml");
    }
}

//! Environment constants and path utilities for atomize.
//!
//! This module centralizes all hardcoded paths and file names used throughout
//! the application, making them easier to maintain and modify.

use std::path::{Path, PathBuf};

/// Main application directory name (hidden directory like .git, .vscode)
pub const ATOMIZE_DIR_NAME: &str = ".atomize";

/// Configuration file name
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Configuration file name looked up in the current directory
pub const LOCAL_CONFIG_FILE_NAME: &str = "atomize.toml";

/// Data directory and file names
pub mod data {
    /// Data directory name within .atomize
    pub const DATA_DIR_NAME: &str = "data";

    /// Session state file name
    pub const SESSION_FILE_NAME: &str = "session.json";

    /// History log file name (one JSON object per line)
    pub const HISTORY_FILE_NAME: &str = "history.jsonl";

    /// Suffix of the temporary file used for atomic session writes
    pub const TEMP_SUFFIX: &str = "tmp";
}

/// Build the main .atomize directory path from a home directory
pub fn atomize_dir_path(home_dir: &Path) -> PathBuf {
    home_dir.join(ATOMIZE_DIR_NAME)
}

/// Build the default data directory path from a home directory
pub fn default_data_dir_path(home_dir: &Path) -> PathBuf {
    atomize_dir_path(home_dir).join(data::DATA_DIR_NAME)
}

/// Build the session state file path inside a data directory
pub fn session_file_path(data_dir: &Path) -> PathBuf {
    data_dir.join(data::SESSION_FILE_NAME)
}

/// Build the temporary session file path used before the atomic rename
pub fn session_temp_file_path(data_dir: &Path) -> PathBuf {
    data_dir.join(format!("{}.{}", data::SESSION_FILE_NAME, data::TEMP_SUFFIX))
}

/// Build the history log file path inside a data directory
pub fn history_file_path(data_dir: &Path) -> PathBuf {
    data_dir.join(data::HISTORY_FILE_NAME)
}

/// Build config directory path in user's home directory
pub fn user_config_dir_path(home_dir: &Path) -> PathBuf {
    atomize_dir_path(home_dir)
}

/// Build config file path in user's home directory
pub fn user_config_file_path(home_dir: &Path) -> PathBuf {
    user_config_dir_path(home_dir).join(CONFIG_FILE_NAME)
}

/// Build local config file path in current directory
pub fn local_config_file_path(current_dir: &Path) -> PathBuf {
    current_dir.join(ATOMIZE_DIR_NAME).join(CONFIG_FILE_NAME)
}

/// Resolve the user's home directory from the environment
pub fn home_dir() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .or_else(|| std::env::var("USERPROFILE").ok())
        .map(PathBuf::from)
}

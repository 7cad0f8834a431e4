//! Path constants for configuration and local state files.

use std::path::PathBuf;

/// The name of the configuration directory under ~/.config/
pub const CONFIG_DIR_NAME: &str = "mindful";

/// The name of the main configuration file
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// The name of the local likes database file
pub const LIKES_DB_FILE_NAME: &str = "likes.db";

/// The name of the log file written when file logging is enabled
pub const LOG_FILE_NAME: &str = "mindful.log";

/// Get the configuration directory path (~/.config/mindful/)
#[must_use]
pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join(CONFIG_DIR_NAME)
}

/// Get the config file path (~/.config/mindful/config.toml)
#[must_use]
pub fn config_path() -> PathBuf {
    config_dir().join(CONFIG_FILE_NAME)
}

/// Get the likes database path (`~/.config/mindful/likes.db`)
#[must_use]
pub fn likes_db_path() -> PathBuf {
    config_dir().join(LIKES_DB_FILE_NAME)
}

/// Get the log file path (`~/.cache/mindful/mindful.log`)
#[must_use]
pub fn log_file_path() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(config_dir)
        .join(CONFIG_DIR_NAME)
        .join(LOG_FILE_NAME)
}

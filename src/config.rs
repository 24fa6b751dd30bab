use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::utils;

/// Current configuration version
pub const CURRENT_CONFIG_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_database_path")]
    pub database_path: String,
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    #[serde(default = "default_status_message_timeout_secs")]
    pub status_message_timeout_secs: u64,
    #[serde(default = "default_sound_enabled")]
    pub sound_enabled: bool,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_history_length")]
    pub history_length: usize,
    #[serde(default)]
    pub key_bindings: KeyBindings,
    #[serde(default)]
    pub theme: Theme,
    #[serde(default = "default_config_version")]
    pub config_version: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyBindings {
    #[serde(default = "default_quit")]
    pub quit: String,
    #[serde(default = "default_help")]
    pub help: String,
    #[serde(default = "default_new")]
    pub new: String,
    #[serde(default = "default_delete")]
    pub delete: String,
    #[serde(default = "default_reset")]
    pub reset: String,
    #[serde(default = "default_start")]
    pub start: String,
    #[serde(default = "default_end_day")]
    pub end_day: String,
    #[serde(default = "default_edit")]
    pub edit: String,
    #[serde(default = "default_list_up")]
    pub list_up: String,
    #[serde(default = "default_list_down")]
    pub list_down: String,
    #[serde(default = "default_next_field")]
    pub next_field: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    #[serde(default = "default_fg")]
    pub fg: String,
    #[serde(default = "default_bg")]
    pub bg: String,
    #[serde(default = "default_highlight_bg")]
    pub highlight_bg: String,
    /// Empty means "pick a readable colour for highlight_bg"
    #[serde(default)]
    pub highlight_fg: String,
    #[serde(default = "default_accent")]
    pub accent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            tick_interval_ms: default_tick_interval_ms(),
            status_message_timeout_secs: default_status_message_timeout_secs(),
            sound_enabled: default_sound_enabled(),
            log_level: default_log_level(),
            history_length: default_history_length(),
            key_bindings: KeyBindings::default(),
            theme: Theme::default(),
            config_version: Some(CURRENT_CONFIG_VERSION),
        }
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            quit: default_quit(),
            help: default_help(),
            new: default_new(),
            delete: default_delete(),
            reset: default_reset(),
            start: default_start(),
            end_day: default_end_day(),
            edit: default_edit(),
            list_up: default_list_up(),
            list_down: default_list_down(),
            next_field: default_next_field(),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            fg: default_fg(),
            bg: default_bg(),
            highlight_bg: default_highlight_bg(),
            highlight_fg: String::new(),
            accent: default_accent(),
        }
    }
}

// Default value functions
fn default_database_path() -> String {
    // This is a fallback - actual profile will be determined at load time
    if let Some(data_dir) = utils::get_data_dir(utils::Profile::Prod) {
        data_dir.join("dayblock.db").to_string_lossy().to_string()
    } else {
        "~/.local/share/dayblock/dayblock.db".to_string()
    }
}

fn default_tick_interval_ms() -> u64 {
    1000
}

fn default_status_message_timeout_secs() -> u64 {
    3
}

fn default_sound_enabled() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_history_length() -> usize {
    14
}

fn default_quit() -> String {
    "q".to_string()
}

fn default_help() -> String {
    "F1".to_string()
}

fn default_new() -> String {
    "n".to_string()
}

fn default_delete() -> String {
    "d".to_string()
}

fn default_reset() -> String {
    "r".to_string()
}

fn default_start() -> String {
    "s".to_string()
}

fn default_end_day() -> String {
    "x".to_string()
}

fn default_edit() -> String {
    "e".to_string()
}

fn default_list_up() -> String {
    "k".to_string()
}

fn default_list_down() -> String {
    "j".to_string()
}

fn default_next_field() -> String {
    "Tab".to_string()
}

fn default_fg() -> String {
    "white".to_string()
}

fn default_bg() -> String {
    "black".to_string()
}

fn default_highlight_bg() -> String {
    "magenta".to_string()
}

fn default_accent() -> String {
    "yellow".to_string()
}

fn default_config_version() -> Option<u32> {
    Some(CURRENT_CONFIG_VERSION)
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config directory: {0}")]
    ConfigDirError(String),
    #[error("Failed to read config file: {0}")]
    ReadError(String),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Failed to write config file: {0}")]
    WriteError(String),
}

impl Config {
    /// Load configuration from the profile's config file, creating it with
    /// defaults if missing
    pub fn load_with_profile(profile: utils::Profile) -> Result<Self, ConfigError> {
        let config_path = Self::get_config_path(profile)?;
        let mut config = Self::load_from_path(&config_path)?;
        config.apply_profile(profile);
        Ok(config)
    }

    /// Keep the database inside the profile's data dir unless the user pointed elsewhere
    pub fn apply_profile(&mut self, profile: utils::Profile) {
        if self.database_path == default_database_path() {
            self.database_path = Self::default_database_path_for_profile(profile);
        }
    }

    /// Load from an explicit file, writing defaults there if it does not exist
    pub fn load_from_path(config_path: &Path) -> Result<Self, ConfigError> {
        if config_path.exists() {
            let contents = fs::read_to_string(config_path)
                .map_err(|e| ConfigError::ReadError(e.to_string()))?;
            let config: Config = toml::from_str(&contents)?;
            Ok(config)
        } else {
            let mut config = Config::default();
            if let Err(ref e) = config.save_to_path(config_path) {
                tracing::warn!(path = %config_path.display(), error = %e, "failed to write default config");
            }
            Ok(config)
        }
    }

    /// Save configuration to the given file
    pub fn save_to_path(&mut self, config_path: &Path) -> Result<(), ConfigError> {
        // Ensure config version is set before saving
        self.config_version = Some(CURRENT_CONFIG_VERSION);

        // Create parent directory if it doesn't exist
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| ConfigError::WriteError(e.to_string()))?;
        }

        let toml_string = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::WriteError(format!("Failed to serialize config: {}", e)))?;

        fs::write(config_path, toml_string)
            .map_err(|e| ConfigError::WriteError(e.to_string()))?;

        Ok(())
    }

    /// Get the path to the config file
    pub fn get_config_path(profile: utils::Profile) -> Result<PathBuf, ConfigError> {
        let config_dir = utils::get_config_dir(profile)
            .ok_or_else(|| ConfigError::ConfigDirError("Could not determine config directory".to_string()))?;
        Ok(config_dir.join("config.toml"))
    }

    /// Get default database path for a specific profile
    fn default_database_path_for_profile(profile: utils::Profile) -> String {
        if let Some(data_dir) = utils::get_data_dir(profile) {
            data_dir.join("dayblock.db").to_string_lossy().to_string()
        } else {
            match profile {
                utils::Profile::Dev => "~/.local/share/dayblock-dev/dayblock.db".to_string(),
                utils::Profile::Prod => "~/.local/share/dayblock/dayblock.db".to_string(),
            }
        }
    }

    /// Get the expanded database path (with ~ expansion)
    pub fn get_database_path(&self) -> PathBuf {
        utils::expand_path(&self.database_path)
    }

    /// Log file sits next to the database
    pub fn get_log_path(&self) -> PathBuf {
        let db_path = self.get_database_path();
        match db_path.parent() {
            Some(dir) => dir.join("dayblock.log"),
            None => PathBuf::from("dayblock.log"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.tick_interval_ms, 1000);
        assert_eq!(config.status_message_timeout_secs, 3);
        assert!(config.sound_enabled);
        assert_eq!(config.key_bindings.start, "s");
        assert_eq!(config.theme.fg, "white");
    }

    #[test]
    fn partial_sections_fill_in() {
        let config: Config = toml::from_str(
            r#"
            sound_enabled = false

            [key_bindings]
            quit = "Esc"

            [theme]
            accent = "cyan"
            "#,
        )
        .unwrap();
        assert!(!config.sound_enabled);
        assert_eq!(config.key_bindings.quit, "Esc");
        assert_eq!(config.key_bindings.new, "n");
        assert_eq!(config.theme.accent, "cyan");
        assert_eq!(config.theme.bg, "black");
    }

    #[test]
    fn missing_file_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sub").join("config.toml");
        let config = Config::load_from_path(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.config_version, Some(CURRENT_CONFIG_VERSION));

        let reloaded = Config::load_from_path(&path).unwrap();
        assert_eq!(reloaded.tick_interval_ms, config.tick_interval_ms);
    }

    #[test]
    fn log_path_next_to_database() {
        let config = Config {
            database_path: "/tmp/dayblock/state.db".to_string(),
            ..Config::default()
        };
        assert_eq!(config.get_log_path(), PathBuf::from("/tmp/dayblock/dayblock.log"));
    }

    #[test]
    fn dev_profile_moves_default_database_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut config = Config::load_from_path(&path).unwrap();
        config.apply_profile(utils::Profile::Dev);
        assert!(config.database_path.contains("dayblock-dev"));

        let mut custom = Config {
            database_path: "/tmp/elsewhere/state.db".to_string(),
            ..Config::default()
        };
        custom.apply_profile(utils::Profile::Dev);
        assert_eq!(custom.database_path, "/tmp/elsewhere/state.db");
    }
}

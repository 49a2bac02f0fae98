use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::navigation::NavigationTiming;
use crate::utils;

/// Current configuration version
pub const CURRENT_CONFIG_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_database_path")]
    pub database_path: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub key_bindings: KeyBindings,
    #[serde(default)]
    pub timing: Timing,
    #[serde(default = "default_current_theme")]
    pub current_theme: String,
    #[serde(default)]
    pub themes: HashMap<String, Theme>,
    #[serde(default = "default_config_version")]
    pub config_version: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyBindings {
    #[serde(default = "default_quit")]
    pub quit: String,
    #[serde(default = "default_new")]
    pub new: String,
    #[serde(default = "default_edit")]
    pub edit: String,
    #[serde(default = "default_delete")]
    pub delete: String,
    #[serde(default = "default_toggle_complete")]
    pub toggle_complete: String,
    #[serde(default = "default_toggle_pin")]
    pub toggle_pin: String,
    #[serde(default = "default_list_up")]
    pub list_up: String,
    #[serde(default = "default_list_down")]
    pub list_down: String,
    #[serde(default = "default_move_up")]
    pub move_up: String,
    #[serde(default = "default_move_down")]
    pub move_down: String,
    #[serde(default = "default_older")]
    pub older: String,
    #[serde(default = "default_newer")]
    pub newer: String,
    #[serde(default = "default_today")]
    pub today: String,
    #[serde(default = "default_copy_unfinished")]
    pub copy_unfinished: String,
    #[serde(default = "default_next_workspace")]
    pub next_workspace: String,
    #[serde(default = "default_prev_workspace")]
    pub prev_workspace: String,
    #[serde(default = "default_new_workspace")]
    pub new_workspace: String,
    #[serde(default = "default_rename_workspace")]
    pub rename_workspace: String,
    #[serde(default = "default_close_workspace")]
    pub close_workspace: String,
    #[serde(default = "default_history")]
    pub history: String,
    #[serde(default = "default_help")]
    pub help: String,
}

/// Timer policy. None of these affect correctness, only pacing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Timing {
    #[serde(default = "default_tick_interval_secs")]
    pub tick_interval_secs: u64,
    #[serde(default = "default_navigate_settle_ms")]
    pub navigate_settle_ms: u64,
    #[serde(default = "default_scroll_settle_ms")]
    pub scroll_settle_ms: u64,
    #[serde(default = "default_rollover_settle_ms")]
    pub rollover_settle_ms: u64,
    #[serde(default = "default_scroll_threshold")]
    pub scroll_threshold: f64,
    #[serde(default = "default_status_message_secs")]
    pub status_message_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    #[serde(default = "default_fg")]
    pub fg: String,
    #[serde(default = "default_bg")]
    pub bg: String,
    #[serde(default = "default_highlight_bg")]
    pub highlight_bg: String,
    #[serde(default = "default_highlight_fg")]
    pub highlight_fg: String,
    #[serde(default = "default_muted")]
    pub muted: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            log_level: default_log_level(),
            key_bindings: KeyBindings::default(),
            timing: Timing::default(),
            current_theme: default_current_theme(),
            themes: HashMap::new(),
            config_version: Some(CURRENT_CONFIG_VERSION),
        }
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            quit: default_quit(),
            new: default_new(),
            edit: default_edit(),
            delete: default_delete(),
            toggle_complete: default_toggle_complete(),
            toggle_pin: default_toggle_pin(),
            list_up: default_list_up(),
            list_down: default_list_down(),
            move_up: default_move_up(),
            move_down: default_move_down(),
            older: default_older(),
            newer: default_newer(),
            today: default_today(),
            copy_unfinished: default_copy_unfinished(),
            next_workspace: default_next_workspace(),
            prev_workspace: default_prev_workspace(),
            new_workspace: default_new_workspace(),
            rename_workspace: default_rename_workspace(),
            close_workspace: default_close_workspace(),
            history: default_history(),
            help: default_help(),
        }
    }
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            tick_interval_secs: default_tick_interval_secs(),
            navigate_settle_ms: default_navigate_settle_ms(),
            scroll_settle_ms: default_scroll_settle_ms(),
            rollover_settle_ms: default_rollover_settle_ms(),
            scroll_threshold: default_scroll_threshold(),
            status_message_secs: default_status_message_secs(),
        }
    }
}

impl Timing {
    pub fn tick_interval(&self) -> Duration {
        // A zero interval would re-check on every frame
        Duration::from_secs(self.tick_interval_secs.max(1))
    }

    pub fn navigation(&self) -> NavigationTiming {
        NavigationTiming {
            navigate: Duration::from_millis(self.navigate_settle_ms),
            scroll: Duration::from_millis(self.scroll_settle_ms),
            rollover: Duration::from_millis(self.rollover_settle_ms),
            scroll_threshold: self.scroll_threshold,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            fg: default_fg(),
            bg: default_bg(),
            highlight_bg: default_highlight_bg(),
            highlight_fg: default_highlight_fg(),
            muted: default_muted(),
        }
    }
}

impl Theme {
    /// Get preset themes that are always available
    pub fn get_preset_themes() -> HashMap<String, Theme> {
        let mut themes = HashMap::new();

        themes.insert("default".to_string(), Theme::default());

        themes.insert("dusk".to_string(), Theme {
            fg: "#d8dee9".to_string(),
            bg: "#2e3440".to_string(),
            highlight_bg: "#5e81ac".to_string(),
            highlight_fg: "#eceff4".to_string(),
            muted: "#616e88".to_string(),
        });

        themes.insert("paper".to_string(), Theme {
            fg: "#3b3a36".to_string(),
            bg: "#f4f1e8".to_string(),
            highlight_bg: "#3b3a36".to_string(),
            highlight_fg: "#f4f1e8".to_string(),
            muted: "#9a968a".to_string(),
        });

        // Plain ANSI names so it follows the terminal's own palette
        themes.insert("ansi".to_string(), Theme {
            fg: "reset".to_string(),
            bg: "reset".to_string(),
            highlight_bg: "cyan".to_string(),
            highlight_fg: "black".to_string(),
            muted: "darkgray".to_string(),
        });

        themes
    }
}

// Default value functions
fn default_database_path() -> String {
    // Replaced by the profile's path when the config is loaded
    if let Some(data_dir) = utils::get_data_dir(utils::Profile::Prod) {
        data_dir.join("daynotes.db").to_string_lossy().to_string()
    } else {
        "~/.local/share/daynotes/daynotes.db".to_string()
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_quit() -> String {
    "q".to_string()
}

fn default_new() -> String {
    "n".to_string()
}

fn default_edit() -> String {
    "e".to_string()
}

fn default_delete() -> String {
    "d".to_string()
}

fn default_toggle_complete() -> String {
    "Space".to_string()
}

fn default_toggle_pin() -> String {
    "p".to_string()
}

fn default_list_up() -> String {
    "k".to_string()
}

fn default_list_down() -> String {
    "j".to_string()
}

fn default_move_up() -> String {
    "K".to_string()
}

fn default_move_down() -> String {
    "J".to_string()
}

fn default_older() -> String {
    "Left".to_string()
}

fn default_newer() -> String {
    "Right".to_string()
}

fn default_today() -> String {
    "t".to_string()
}

fn default_copy_unfinished() -> String {
    "c".to_string()
}

fn default_next_workspace() -> String {
    "Tab".to_string()
}

fn default_prev_workspace() -> String {
    "BackTab".to_string()
}

fn default_new_workspace() -> String {
    "w".to_string()
}

fn default_rename_workspace() -> String {
    "r".to_string()
}

fn default_close_workspace() -> String {
    "x".to_string()
}

fn default_history() -> String {
    "h".to_string()
}

fn default_help() -> String {
    "F1".to_string()
}

fn default_tick_interval_secs() -> u64 {
    60
}

fn default_navigate_settle_ms() -> u64 {
    600
}

fn default_scroll_settle_ms() -> u64 {
    400
}

fn default_rollover_settle_ms() -> u64 {
    800
}

fn default_scroll_threshold() -> f64 {
    50.0
}

fn default_status_message_secs() -> u64 {
    3
}

fn default_current_theme() -> String {
    "default".to_string()
}

fn default_fg() -> String {
    "white".to_string()
}

fn default_bg() -> String {
    "black".to_string()
}

fn default_highlight_bg() -> String {
    "blue".to_string()
}

fn default_highlight_fg() -> String {
    "white".to_string()
}

fn default_muted() -> String {
    "darkgray".to_string()
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
    #[error("Theme not found: {0}")]
    ThemeNotFound(String),
}

impl Config {
    /// Load configuration from file, or create default if missing
    /// Uses the provided profile to determine config and database paths
    pub fn load_with_profile(profile: utils::Profile) -> Result<Self, ConfigError> {
        let config_path = Self::get_config_path(profile)?;
        let mut config = Self::load_from_path(&config_path)?;
        // Ensure database path matches profile (in case config was manually edited)
        config.database_path = Self::default_database_path_for_profile(profile);
        Ok(config)
    }

    /// Load configuration from an explicit file, creating it with defaults if missing.
    /// The database path in the file is honoured as written.
    pub fn load_from_path(config_path: &Path) -> Result<Self, ConfigError> {
        if config_path.exists() {
            let contents = fs::read_to_string(config_path)
                .map_err(|e| ConfigError::ReadError(e.to_string()))?;
            let config: Config = toml::from_str(&contents)?;
            Ok(config)
        } else {
            let mut config = Config::default();
            config.save_to_path(config_path)?;
            Ok(config)
        }
    }

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
            data_dir.join("daynotes.db").to_string_lossy().to_string()
        } else {
            match profile {
                utils::Profile::Dev => "~/.local/share/daynotes-dev/daynotes.db".to_string(),
                utils::Profile::Prod => "~/.local/share/daynotes/daynotes.db".to_string(),
            }
        }
    }

    /// Get the expanded database path (with ~ expansion)
    pub fn get_database_path(&self) -> PathBuf {
        utils::expand_path(&self.database_path)
    }

    /// Directory for log files: next to the database
    pub fn get_log_dir(&self) -> PathBuf {
        let db_path = self.get_database_path();
        db_path
            .parent()
            .map(|p| p.join("logs"))
            .unwrap_or_else(|| PathBuf::from("logs"))
    }

    /// Get the currently active theme (user-defined first, then presets)
    pub fn get_active_theme(&self) -> Theme {
        if let Some(theme) = self.themes.get(&self.current_theme) {
            theme.clone()
        } else if let Some(theme) = Theme::get_preset_themes().remove(&self.current_theme) {
            theme
        } else {
            Theme::default()
        }
    }

    /// Set the active theme by name
    pub fn set_theme(&mut self, name: &str) -> Result<(), ConfigError> {
        if !self.themes.contains_key(name) && !Theme::get_preset_themes().contains_key(name) {
            return Err(ConfigError::ThemeNotFound(name.to_string()));
        }
        self.current_theme = name.to_string();
        Ok(())
    }

    /// Get all available theme names (presets + user-defined), sorted
    pub fn get_available_themes(&self) -> Vec<String> {
        let mut themes: Vec<String> = Theme::get_preset_themes().into_keys().collect();
        for theme_name in self.themes.keys() {
            if !themes.contains(theme_name) {
                themes.push(theme_name.clone());
            }
        }
        themes.sort();
        themes
    }
}

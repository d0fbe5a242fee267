// SPDX-License-Identifier: MPL-2.0
//! Player configuration, loaded from and saved to a `settings.toml` file.
//!
//! # Configuration Sections
//!
//! - `[stream]` - Adaptive client setup and network retry limit
//! - `[controls]` - Auto-hide countdown, skip step, initial volume
//! - `[timemarks]` - Timemark backend endpoint
//!
//! # Path Resolution
//!
//! 1. Use `load_from_path()`/`save_to_path()` with explicit path
//! 2. Set `LECTURE_PLAYER_CONFIG_DIR` environment variable
//! 3. Falls back to platform-specific config directory
//!
//! # Examples
//!
//! ```no_run
//! use lecture_player::config;
//!
//! let (mut config, _warning) = config::load();
//! config.controls.skip_step_secs = 5.0;
//! config::save(&config).expect("Failed to save config");
//! ```

pub mod defaults;
pub mod paths;

pub use defaults::*;

use crate::domain::video::{AutoHideDelay, SkipStep, Volume};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const CONFIG_FILE: &str = "settings.toml";

// =============================================================================
// Section Structs
// =============================================================================

/// Settings handed to the adaptive streaming client when it is created.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StreamConfig {
    /// Verbose client-side logging.
    pub debug: bool,
    /// Let the client demux/transmux off the main thread.
    pub enable_worker: bool,
    /// Prefer low-latency segment loading.
    pub low_latency_mode: bool,
    /// Seconds of played media kept behind the playhead.
    pub back_buffer_length_secs: u32,
    /// Fatal network errors retried before the session is given up.
    pub max_network_retries: u32,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            debug: false,
            enable_worker: true,
            low_latency_mode: true,
            back_buffer_length_secs: DEFAULT_BACK_BUFFER_LENGTH_SECS,
            max_network_retries: DEFAULT_MAX_NETWORK_RETRIES,
        }
    }
}

impl StreamConfig {
    /// Retry limit clamped to a sane range.
    #[must_use]
    pub fn network_retry_limit(&self) -> u32 {
        self.max_network_retries.min(MAX_NETWORK_RETRIES)
    }
}

/// Transport control settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ControlsConfig {
    /// Inactivity (ms) before controls hide.
    pub auto_hide_ms: u64,
    /// Skip-back/skip-forward distance in seconds.
    pub skip_step_secs: f64,
    /// Initial volume (0.0 to 1.0).
    pub volume: f32,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            auto_hide_ms: DEFAULT_AUTO_HIDE_MS,
            skip_step_secs: DEFAULT_SKIP_STEP_SECS,
            volume: DEFAULT_VOLUME,
        }
    }
}

impl ControlsConfig {
    #[must_use]
    pub fn auto_hide_delay(&self) -> AutoHideDelay {
        AutoHideDelay::from_millis(self.auto_hide_ms)
    }

    #[must_use]
    pub fn skip_step(&self) -> SkipStep {
        SkipStep::new(self.skip_step_secs)
    }

    #[must_use]
    pub fn initial_volume(&self) -> Volume {
        Volume::new(self.volume)
    }
}

/// Timemark backend settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TimemarksConfig {
    /// Base URL of the timemark API; `None` disables the HTTP backend.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base_url: Option<String>,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for TimemarksConfig {
    fn default() -> Self {
        Self {
            api_base_url: None,
            request_timeout_secs: DEFAULT_TIMEMARK_TIMEOUT_SECS,
        }
    }
}

impl TimemarksConfig {
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

// =============================================================================
// Main Config Struct (Sectioned)
// =============================================================================

/// Player configuration with logical sections.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub stream: StreamConfig,

    #[serde(default)]
    pub controls: ControlsConfig,

    #[serde(default)]
    pub timemarks: TimemarksConfig,
}

// =============================================================================
// Load / Save
// =============================================================================

fn get_config_path_with_override(base_dir: Option<PathBuf>) -> Option<PathBuf> {
    paths::get_app_config_dir_with_override(base_dir).map(|mut path| {
        path.push(CONFIG_FILE);
        path
    })
}

/// Loads the configuration from the default path.
///
/// Returns a tuple of (config, optional_warning). If loading fails, returns
/// default config with a warning message key explaining what went wrong.
pub fn load() -> (Config, Option<String>) {
    load_with_override(None)
}

/// Loads the configuration from a custom directory.
pub fn load_with_override(base_dir: Option<PathBuf>) -> (Config, Option<String>) {
    if let Some(path) = get_config_path_with_override(base_dir) {
        if path.exists() {
            match load_from_path(&path) {
                Ok(config) => return (config, None),
                Err(err) => {
                    tracing::warn!(path = %path.display(), error = %err, "falling back to default config");
                    return (
                        Config::default(),
                        Some("notification-config-load-error".to_string()),
                    );
                }
            }
        }
    }
    (Config::default(), None)
}

/// Loads configuration from a specific path.
pub fn load_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Saves the configuration to the default path.
pub fn save(config: &Config) -> Result<()> {
    save_with_override(config, None)
}

/// Saves the configuration under a custom directory.
pub fn save_with_override(config: &Config, base_dir: Option<PathBuf>) -> Result<()> {
    if let Some(path) = get_config_path_with_override(base_dir) {
        return save_to_path(config, &path);
    }
    Ok(())
}

/// Saves configuration to a specific path, creating parent directories.
pub fn save_to_path(config: &Config, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(config)?;
    fs::write(path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn save_and_load_round_trip_preserves_sections() {
        let mut config = Config::default();
        config.stream.max_network_retries = 5;
        config.controls.skip_step_secs = 5.0;
        config.timemarks.api_base_url = Some("https://api.example.com".into());

        let temp_dir = tempdir().expect("failed to create temp dir");
        let config_path = temp_dir.path().join("nested").join("settings.toml");

        save_to_path(&config, &config_path).expect("failed to save config");
        let loaded = load_from_path(&config_path).expect("failed to load config");
        assert_eq!(loaded, config);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let temp_dir = tempdir().expect("failed to create temp dir");
        let config_path = temp_dir.path().join("settings.toml");
        fs::write(&config_path, "[controls]\nauto_hide_ms = 5000\n").unwrap();

        let loaded = load_from_path(&config_path).expect("load should succeed");
        assert_eq!(loaded.controls.auto_hide_ms, 5000);
        assert_eq!(loaded.controls.skip_step_secs, DEFAULT_SKIP_STEP_SECS);
        assert_eq!(loaded.stream, StreamConfig::default());
    }

    #[test]
    fn invalid_toml_falls_back_with_warning() {
        let temp_dir = tempdir().expect("failed to create temp dir");
        fs::write(temp_dir.path().join(CONFIG_FILE), "not = valid = toml").unwrap();

        let (config, warning) = load_with_override(Some(temp_dir.path().to_path_buf()));
        assert_eq!(config, Config::default());
        assert_eq!(warning.as_deref(), Some("notification-config-load-error"));
    }

    #[test]
    fn missing_file_returns_defaults_without_warning() {
        let temp_dir = tempdir().expect("failed to create temp dir");
        let (config, warning) = load_with_override(Some(temp_dir.path().to_path_buf()));
        assert_eq!(config, Config::default());
        assert!(warning.is_none());
    }

    #[test]
    fn stream_defaults_match_client_setup() {
        let stream = StreamConfig::default();
        assert!(!stream.debug);
        assert!(stream.enable_worker);
        assert!(stream.low_latency_mode);
        assert_eq!(stream.back_buffer_length_secs, 90);
    }

    #[test]
    fn typed_accessors_clamp() {
        let controls = ControlsConfig {
            auto_hide_ms: 1,
            skip_step_secs: 1000.0,
            volume: 4.0,
        };
        assert_eq!(controls.auto_hide_delay().as_millis(), 500);
        assert_eq!(controls.skip_step().value(), 60.0);
        assert_eq!(controls.initial_volume().value(), 1.0);

        let stream = StreamConfig {
            max_network_retries: 99,
            ..StreamConfig::default()
        };
        assert_eq!(stream.network_retry_limit(), MAX_NETWORK_RETRIES);
    }
}

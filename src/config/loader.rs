//! Configuration file loading with precedence handling.

use crate::grid::measure::DEFAULT_CACHE_CAPACITY;
use crate::grid::renderer::{RendererConfig, DEFAULT_POOL_CAPACITY};
use crate::grid::scroll::FlingConfig;
use crate::grid::sizing::{SizingConfig, DEFAULT_YIELD_INTERVAL};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "LAZYGRID_CONFIG";

/// Environment override for the renderer's reuse pool capacity.
pub const POOL_CAPACITY_ENV: &str = "LAZYGRID_POOL_CAPACITY";

/// Environment override for the measurement burst length in milliseconds.
pub const YIELD_INTERVAL_ENV: &str = "LAZYGRID_YIELD_INTERVAL_MS";

/// Drag threshold for the terminal host, where one cell is one pixel.
pub const DEFAULT_TERMINAL_DRAG_THRESHOLD: f32 = 2.0;

/// Errors that can occur during config loading.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Failed to read config file (permission issues, not a regular file).
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError {
        /// Path that failed to read.
        path: PathBuf,
        /// Reason for failure.
        reason: String,
    },

    /// Config file contains invalid TOML or unknown keys.
    #[error("Invalid TOML in {path}: {reason}")]
    ParseError {
        /// Path with invalid TOML.
        path: PathBuf,
        /// Parse error details.
        reason: String,
    },
}

/// TOML configuration file structure.
///
/// All fields are optional - if not specified, hardcoded defaults are used.
/// Corresponds to `~/.config/lazygrid/config.toml`.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Off-screen cells retained per grid.
    #[serde(default)]
    pub reuse_pool_capacity: Option<usize>,

    /// Entries per measurement cache (width and height each).
    #[serde(default)]
    pub measure_cache_capacity: Option<usize>,

    /// Measurement burst length before yielding, in milliseconds.
    #[serde(default)]
    pub yield_interval_ms: Option<u64>,

    /// Release velocity per pixel of the last drag delta.
    #[serde(default)]
    pub fling_velocity_multiplier: Option<f32>,

    /// Scales fling friction; larger stops sooner.
    #[serde(default)]
    pub fling_friction_multiplier: Option<f32>,

    /// Maximum age of the last drag delta for a release to fling.
    #[serde(default)]
    pub fling_window_ms: Option<u64>,

    /// Horizontal movement before a press becomes a drag.
    #[serde(default)]
    pub drag_threshold: Option<f32>,

    /// Pin the first column.
    #[serde(default)]
    pub sticky_left: Option<bool>,

    /// Pin the first row.
    #[serde(default)]
    pub sticky_top: Option<bool>,

    /// Path to log file for tracing output.
    #[serde(default)]
    pub log_file_path: Option<PathBuf>,
}

/// Resolved configuration after applying precedence rules.
///
/// Created by merging defaults, config file, env vars, and CLI args.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    /// Off-screen cells retained per grid.
    pub reuse_pool_capacity: usize,
    /// Entries per measurement cache.
    pub measure_cache_capacity: usize,
    /// Measurement burst length before yielding.
    pub yield_interval: Duration,
    /// Release velocity per pixel of the last drag delta.
    pub fling_velocity_multiplier: f32,
    /// Fling friction multiplier.
    pub fling_friction_multiplier: f32,
    /// Maximum age of the last drag delta for a release to fling.
    pub fling_window: Duration,
    /// Horizontal movement (terminal cells) before a press becomes a drag.
    pub drag_threshold: f32,
    /// Pin the first column.
    pub sticky_left: bool,
    /// Pin the first row.
    pub sticky_top: bool,
    /// Path to log file for tracing output.
    pub log_file_path: PathBuf,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        let fling = FlingConfig::default();
        Self {
            reuse_pool_capacity: DEFAULT_POOL_CAPACITY,
            measure_cache_capacity: DEFAULT_CACHE_CAPACITY,
            yield_interval: DEFAULT_YIELD_INTERVAL,
            fling_velocity_multiplier: fling.velocity_multiplier,
            fling_friction_multiplier: fling.friction_multiplier,
            fling_window: fling.window,
            drag_threshold: DEFAULT_TERMINAL_DRAG_THRESHOLD,
            sticky_left: true,
            sticky_top: true,
            log_file_path: default_log_path(),
        }
    }
}

impl ResolvedConfig {
    /// Fling tuning for scroll states.
    pub fn fling(&self) -> FlingConfig {
        FlingConfig {
            velocity_multiplier: self.fling_velocity_multiplier,
            friction_multiplier: self.fling_friction_multiplier,
            window: self.fling_window,
            ..FlingConfig::default()
        }
    }

    /// Scheduling for size computation.
    pub fn sizing(&self) -> SizingConfig {
        SizingConfig {
            yield_interval: self.yield_interval,
        }
    }

    /// Renderer settings.
    pub fn renderer(&self) -> RendererConfig {
        RendererConfig {
            sticky_left: self.sticky_left,
            sticky_top: self.sticky_top,
            pool_capacity: self.reuse_pool_capacity,
        }
    }
}

/// Resolve default log file path.
///
/// Returns `~/.local/state/lazygrid/lazygrid.log` on Unix-like systems,
/// or the platform state directory elsewhere. Falls back to the current
/// directory when no state directory exists.
pub fn default_log_path() -> PathBuf {
    match dirs::state_dir() {
        Some(state_dir) => state_dir.join("lazygrid").join("lazygrid.log"),
        None => PathBuf::from("lazygrid.log"),
    }
}

/// Load configuration file from a specific path.
///
/// Returns `Ok(None)` if file doesn't exist (not an error - use defaults).
///
/// # Errors
///
/// Returns error if file exists but has read or parse errors.
pub fn load_config_file(path: impl Into<PathBuf>) -> Result<Option<ConfigFile>, ConfigError> {
    let path = path.into();

    if !path.exists() {
        return Ok(None);
    }

    let contents = std::fs::read_to_string(&path).map_err(|e| ConfigError::ReadError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    let config: ConfigFile = toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    Ok(Some(config))
}

/// Resolve default config file path.
///
/// Returns `~/.config/lazygrid/config.toml` on Unix, the platform config
/// directory elsewhere, or `None` if it cannot be determined.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("lazygrid").join("config.toml"))
}

/// Load configuration with precedence handling.
///
/// Precedence (highest to lowest):
/// 1. Explicit `config_path` argument (CLI `--config`)
/// 2. `LAZYGRID_CONFIG` environment variable
/// 3. Default path `~/.config/lazygrid/config.toml`
///
/// Missing config files are NOT errors - defaults are used.
///
/// # Errors
///
/// Returns error only if a config file exists but cannot be read or parsed.
pub fn load_config_with_precedence(
    config_path: Option<PathBuf>,
) -> Result<Option<ConfigFile>, ConfigError> {
    if let Some(path) = config_path {
        return load_config_file(path);
    }

    if let Ok(env_path) = std::env::var(CONFIG_ENV) {
        return load_config_file(PathBuf::from(env_path));
    }

    match default_config_path() {
        Some(default_path) => load_config_file(default_path),
        None => Ok(None),
    }
}

/// Merge config file into defaults to create resolved config.
///
/// For each field in `ConfigFile`, if `Some(value)`, use it; otherwise use default.
pub fn merge_config(config_file: Option<ConfigFile>) -> ResolvedConfig {
    let defaults = ResolvedConfig::default();

    let Some(config) = config_file else {
        return defaults;
    };

    ResolvedConfig {
        reuse_pool_capacity: config
            .reuse_pool_capacity
            .unwrap_or(defaults.reuse_pool_capacity),
        measure_cache_capacity: config
            .measure_cache_capacity
            .unwrap_or(defaults.measure_cache_capacity),
        yield_interval: config
            .yield_interval_ms
            .map(Duration::from_millis)
            .unwrap_or(defaults.yield_interval),
        fling_velocity_multiplier: config
            .fling_velocity_multiplier
            .unwrap_or(defaults.fling_velocity_multiplier),
        fling_friction_multiplier: config
            .fling_friction_multiplier
            .unwrap_or(defaults.fling_friction_multiplier),
        fling_window: config
            .fling_window_ms
            .map(Duration::from_millis)
            .unwrap_or(defaults.fling_window),
        drag_threshold: config.drag_threshold.unwrap_or(defaults.drag_threshold),
        sticky_left: config.sticky_left.unwrap_or(defaults.sticky_left),
        sticky_top: config.sticky_top.unwrap_or(defaults.sticky_top),
        log_file_path: config.log_file_path.unwrap_or(defaults.log_file_path),
    }
}

/// Apply environment variable overrides to resolved config.
///
/// Checks for:
/// - `LAZYGRID_POOL_CAPACITY`: reuse pool capacity
/// - `LAZYGRID_YIELD_INTERVAL_MS`: measurement burst length
///
/// Unparsable values are ignored.
pub fn apply_env_overrides(mut config: ResolvedConfig) -> ResolvedConfig {
    if let Some(capacity) = env_parse::<usize>(POOL_CAPACITY_ENV) {
        config.reuse_pool_capacity = capacity;
    }
    if let Some(ms) = env_parse::<u64>(YIELD_INTERVAL_ENV) {
        config.yield_interval = Duration::from_millis(ms);
    }
    config
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok()?.trim().parse().ok()
}

/// Apply CLI argument overrides to resolved config.
///
/// CLI args have the highest precedence and override all other sources.
/// The sticky flags can only switch stickiness off.
///
/// Precedence chain: Defaults → Config File → Env Vars → CLI Args (highest)
pub fn apply_cli_overrides(
    mut config: ResolvedConfig,
    no_sticky_left: bool,
    no_sticky_top: bool,
) -> ResolvedConfig {
    if no_sticky_left {
        config.sticky_left = false;
    }
    if no_sticky_top {
        config.sticky_top = false;
    }
    config
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;

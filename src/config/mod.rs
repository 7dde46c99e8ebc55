//! Configuration module.
//!
//! Settings come from four layers, each overriding the previous:
//! defaults → config file → environment → CLI flags.

pub mod keybindings;
pub mod loader;

pub use keybindings::{KeyAction, KeyBindings};
pub use loader::{
    apply_cli_overrides, apply_env_overrides, default_config_path, default_log_path,
    load_config_file, load_config_with_precedence, merge_config, ConfigError, ConfigFile,
    ResolvedConfig,
};

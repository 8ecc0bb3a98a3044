//! Toolchain configuration merge system
//!
//! Variables come from four layers, later ones winning:
//! 1. Built-in defaults
//! 2. Host/user config (~/.config/ccbridge/toolchain.toml)
//! 3. Repo config (ccbridge.toml)
//! 4. CLI flags (--set / --set-list)

mod defaults;
mod effective;
mod merge;

pub use defaults::BuiltinDefaults;
pub use effective::{
    cli_overrides, ConfigError, ConfigOrigin, ConfigSource, EffectiveConfig, REPO_CONFIG_FILE,
    SCHEMA_ID, SCHEMA_VERSION,
};
pub use merge::{deep_merge, merge_layer, merge_layers, VARIABLE_TABLES};

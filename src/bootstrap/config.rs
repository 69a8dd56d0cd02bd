//! # Configuration Loader
//!
//! Reads the TOML file and maps it onto the `FlowConfig` DTO. No validation
//! happens here: whatever the file says is taken as it is, and missing keys
//! keep their defaults.

use std::path::PathBuf;

use anyhow::Context;
use ma_core::config::FlowConfig;

/// Environment variable naming the TOML config file.
pub const CONFIG_ENV: &str = "MYACCOUNT_CONFIG";
/// Environment variable naming the auth fixture; overrides `[auth].fixture_path`.
pub const FIXTURE_ENV: &str = "MYACCOUNT_FIXTURE";

/// Load configuration from a TOML file.
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not valid TOML, or has a
/// table whose shape does not match (`[password.change]`, `[[designations]]`).
pub fn load_config(config_path: PathBuf) -> anyhow::Result<FlowConfig> {
    let content = std::fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;
    let toml_value: toml::Value =
        toml::from_str(&content).context("Failed to parse config as TOML")?;
    FlowConfig::from_toml(&toml_value)
        .with_context(|| format!("Failed to map config file: {}", config_path.display()))
}

/// Resolve the configuration from the environment.
///
/// Uses `MYACCOUNT_CONFIG` when set, built-in defaults otherwise, then applies
/// the `MYACCOUNT_FIXTURE` override.
pub fn resolve_config() -> anyhow::Result<FlowConfig> {
    let mut config = match std::env::var_os(CONFIG_ENV) {
        Some(path) => load_config(PathBuf::from(path))?,
        None => FlowConfig::default(),
    };
    if let Some(fixture) = std::env::var_os(FIXTURE_ENV) {
        config.fixture_path = Some(PathBuf::from(fixture));
    }
    Ok(config)
}

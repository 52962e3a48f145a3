//! CLI configuration: a thin wrapper around `pductl_config` shared types.
//!
//! Adds resolution that respects `GlobalOpts` flag overrides
//! (--device, --username, --password, --cache-dir).

use std::path::PathBuf;

use secrecy::SecretString;

use pductl_config::{Config, DeviceProfile, DeviceTarget};
use pductl_core::DeviceAddress;

use crate::cli::GlobalOpts;
use crate::error::CliError;

pub use pductl_config::load_config;

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// Pick the profile named by `--device` (or `default_device`).
pub fn active_device(
    global: &GlobalOpts,
    config: &Config,
) -> Result<(String, DeviceProfile), CliError> {
    Ok(pductl_config::select_device(
        config,
        global.device.as_deref(),
    )?)
}

/// Address of the active device, for commands that never log in.
pub fn active_address(global: &GlobalOpts, config: &Config) -> Result<DeviceAddress, CliError> {
    let (_, profile) = active_device(global, config)?;
    Ok(profile.address.parse()?)
}

/// Resolve the active device into everything needed to connect.
///
/// CLI flag overrides take priority over profile and environment values.
pub fn resolve_target(global: &GlobalOpts, config: &Config) -> Result<DeviceTarget, CliError> {
    let (name, profile) = active_device(global, config)?;

    // 1. Username (flag > profile > env)
    let username = match global.username {
        Some(ref username) => username.clone(),
        None => pductl_config::resolve_username(&profile, &name, env_var)?,
    };

    // 2. Password (flag > password_env > PDUCTL_PASSWORD > profile)
    let password = match global.password {
        Some(ref password) => SecretString::from(password.clone()),
        None => pductl_config::resolve_password(&profile, &name, env_var)?,
    };

    Ok(pductl_config::profile_to_target(
        config, &name, &profile, username, password,
    )?)
}

/// Cache directory (flag > config > platform default).
pub fn cache_dir(global: &GlobalOpts, config: &Config) -> PathBuf {
    global
        .cache_dir
        .clone()
        .unwrap_or_else(|| pductl_config::cache_dir(config))
}

//! Shared configuration for pductl.
//!
//! TOML device profiles, credential resolution (env + plaintext), and
//! translation to the `pductl_core` / `pductl_api` types a [`Pdu`] handle
//! is built from. The CLI layers its flag overrides on top of this.
//!
//! [`Pdu`]: pductl_core::Pdu

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use pductl_api::TransportConfig;
use pductl_api::transport::DEFAULT_PORT;
use pductl_core::{CoreError, DEFAULT_REMOTE_FILE, Device, HeaderConfig, TransferSettings};

/// Environment variable consulted for the password when a profile names none.
pub const PASSWORD_ENV: &str = "PDUCTL_PASSWORD";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("unknown device profile '{name}'")]
    UnknownDevice { name: String },

    #[error("no credentials configured for device '{device}'")]
    NoCredentials { device: String },

    #[error(transparent)]
    Device(#[from] CoreError),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when no device is named on the command line.
    pub default_device: Option<String>,

    #[serde(default)]
    pub defaults: Defaults,

    /// Named device profiles.
    #[serde(default)]
    pub devices: HashMap<String, DeviceProfile>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_remote_file")]
    pub remote_file: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Per-step network timeout, in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Where fetched and pending files are kept. Platform cache dir if unset.
    pub cache_dir: Option<PathBuf>,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            remote_file: default_remote_file(),
            port: default_port(),
            timeout: default_timeout(),
            cache_dir: None,
        }
    }
}

fn default_remote_file() -> String {
    DEFAULT_REMOTE_FILE.into()
}
fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_timeout() -> u64 {
    30
}

/// A named PDU.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DeviceProfile {
    /// Dotted-quad IPv4 address of the management card.
    pub address: String,

    pub username: Option<String>,

    /// Environment variable name containing the password.
    pub password_env: Option<String>,

    /// Password (plaintext; prefer `password_env`).
    pub password: Option<String>,

    /// Override the remote file name.
    pub remote_file: Option<String>,

    pub port: Option<u16>,

    pub timeout: Option<u64>,
}

impl DeviceProfile {
    /// An ad-hoc profile for a device addressed directly, without config.
    pub fn for_address(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            ..Self::default()
        }
    }
}

// ── Paths ───────────────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "pductl", "pductl")
}

fn home_fallback(parts: &[&str]) -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.extend(parts);
    p
}

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    project_dirs().map_or_else(
        || home_fallback(&[".config", "pductl", "config.toml"]),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Directory holding cached and pending device files.
pub fn cache_dir(config: &Config) -> PathBuf {
    if let Some(ref dir) = config.defaults.cache_dir {
        return dir.clone();
    }
    project_dirs().map_or_else(
        || home_fallback(&[".cache", "pductl"]),
        |dirs| dirs.cache_dir().to_path_buf(),
    )
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from `path`, merged over defaults and under `PDUCTL_*` variables.
///
/// Nested keys use a double underscore: `PDUCTL_DEFAULTS__TIMEOUT=10`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("PDUCTL_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

// ── Device selection ────────────────────────────────────────────────

/// Look up a profile by name, or treat `selector` as a bare IPv4 address.
///
/// With no selector the config's `default_device` is used.
pub fn select_device(
    config: &Config,
    selector: Option<&str>,
) -> Result<(String, DeviceProfile), ConfigError> {
    let name = selector
        .map(str::to_owned)
        .or_else(|| config.default_device.clone())
        .ok_or_else(|| ConfigError::Validation {
            field: "device".into(),
            reason: "no device given and no default_device configured".into(),
        })?;

    if let Some(profile) = config.devices.get(&name) {
        return Ok((name, profile.clone()));
    }
    if name.parse::<std::net::Ipv4Addr>().is_ok() {
        return Ok((name.clone(), DeviceProfile::for_address(name)));
    }
    Err(ConfigError::UnknownDevice { name })
}

// ── Credential resolution (without CLI flags) ───────────────────────

/// Resolve the password chain: `password_env` → `PDUCTL_PASSWORD` →
/// plaintext profile value.
///
/// `env` looks up environment variables; pass `|k| std::env::var(k).ok()`
/// outside tests.
pub fn resolve_password(
    profile: &DeviceProfile,
    device_name: &str,
    env: impl Fn(&str) -> Option<String>,
) -> Result<SecretString, ConfigError> {
    // 1. Profile's password_env → env var lookup
    if let Some(val) = profile.password_env.as_deref().and_then(&env) {
        return Ok(SecretString::from(val));
    }

    // 2. Global env var
    if let Some(val) = env(PASSWORD_ENV) {
        return Ok(SecretString::from(val));
    }

    // 3. Plaintext in config
    if let Some(ref pw) = profile.password {
        return Ok(SecretString::from(pw.clone()));
    }

    Err(ConfigError::NoCredentials {
        device: device_name.into(),
    })
}

/// Resolve the login name: profile value, then `PDUCTL_USERNAME`.
pub fn resolve_username(
    profile: &DeviceProfile,
    device_name: &str,
    env: impl Fn(&str) -> Option<String>,
) -> Result<String, ConfigError> {
    profile
        .username
        .clone()
        .or_else(|| env("PDUCTL_USERNAME"))
        .ok_or_else(|| ConfigError::NoCredentials {
            device: device_name.into(),
        })
}

// ── Translation ─────────────────────────────────────────────────────

/// Everything needed to open a [`pductl_core::Pdu`] for one device.
#[derive(Debug)]
pub struct DeviceTarget {
    pub name: String,
    pub device: Device,
    pub transport: TransportConfig,
    pub settings: TransferSettings,
}

/// Build a [`DeviceTarget`] from a profile and already-resolved credentials.
pub fn profile_to_target(
    config: &Config,
    name: &str,
    profile: &DeviceProfile,
    username: String,
    password: SecretString,
) -> Result<DeviceTarget, ConfigError> {
    let device = Device::new(&profile.address, username, password)?;

    let timeout = profile.timeout.unwrap_or(config.defaults.timeout);
    if timeout == 0 {
        return Err(ConfigError::Validation {
            field: "timeout".into(),
            reason: "must be at least one second".into(),
        });
    }

    let transport = TransportConfig::default()
        .with_port(profile.port.unwrap_or(config.defaults.port))
        .with_timeout(Duration::from_secs(timeout));

    let settings = TransferSettings {
        remote_file: profile
            .remote_file
            .clone()
            .unwrap_or_else(|| config.defaults.remote_file.clone()),
        header: HeaderConfig::default(),
    };

    Ok(DeviceTarget {
        name: name.into(),
        device,
        transport,
        settings,
    })
}

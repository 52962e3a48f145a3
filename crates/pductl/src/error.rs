//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors
//! with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use pductl_config::ConfigError;
use pductl_core::{CoreError, FormatError};

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach PDU at {address}")]
    #[diagnostic(
        code(pductl::connection_failed),
        help(
            "Check that the device is powered, reachable, and has FTP enabled\n\
             (Network > FTP Server on the management card)."
        )
    )]
    ConnectionFailed {
        address: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed for {address}")]
    #[diagnostic(
        code(pductl::auth_failed),
        help("The device said: {message}\nVerify the username and password for this device.")
    )]
    AuthFailed { address: String, message: String },

    #[error("No credentials configured for device '{device}'")]
    #[diagnostic(
        code(pductl::no_credentials),
        help(
            "Pass --username / --password, set PDUCTL_PASSWORD,\n\
             or add password_env to the device profile in {path}"
        )
    )]
    NoCredentials { device: String, path: String },

    // ── Transfers ────────────────────────────────────────────────────
    #[error("{operation} failed")]
    #[diagnostic(code(pductl::transfer_failed))]
    TransferFailed {
        operation: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Timed out after {seconds}s")]
    #[diagnostic(
        code(pductl::timeout),
        help("Raise `timeout` in the device profile or check device responsiveness.")
    )]
    Timeout { seconds: u64 },

    #[error("The device returned an empty {remote}")]
    #[diagnostic(
        code(pductl::empty_transfer),
        help("The management card may still be generating the file; try again shortly.")
    )]
    EmptyTransfer { remote: String },

    #[error("A push to {address} is already in progress")]
    #[diagnostic(code(pductl::conflict))]
    Conflict { address: String },

    // ── Local state ──────────────────────────────────────────────────
    #[error("No {artifact} configuration for {address}")]
    #[diagnostic(code(pductl::not_found), help("Run: pductl fetch -d {address}"))]
    NothingCached { address: String, artifact: String },

    #[error("{setting} is not set")]
    #[diagnostic(code(pductl::not_found))]
    SettingNotFound { setting: String },

    #[error("Configuration file is malformed")]
    #[diagnostic(
        code(pductl::format),
        help("The raw file is kept in the cache directory for inspection.")
    )]
    Format {
        #[source]
        source: FormatError,
    },

    // ── Validation / configuration ───────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(pductl::validation))]
    Validation { field: String, reason: String },

    #[error("Device profile '{name}' not found in configuration")]
    #[diagnostic(
        code(pductl::profile_not_found),
        help("Add a [devices.{name}] table to {path}, or pass an IPv4 address with -d.")
    )]
    ProfileNotFound { name: String, path: String },

    #[error("Could not load configuration from {path}")]
    #[diagnostic(
        code(pductl::config),
        help("Fix the file or move it aside to run with defaults.")
    )]
    Config {
        path: String,
        #[source]
        source: Box<figment::Error>,
    },

    #[error("Session error: {0}")]
    #[diagnostic(code(pductl::session))]
    Session(String),

    // ── IO / Serialization ────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Could not render JSON: {0}")]
    #[diagnostic(code(pductl::json))]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NothingCached { .. } | Self::SettingNotFound { .. } => exit_code::NOT_FOUND,
            Self::Conflict { .. } => exit_code::CONFLICT,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Validation { .. } | Self::ProfileNotFound { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidAddress { address } => CliError::Validation {
                field: "device".into(),
                reason: format!("{address:?} is not a valid IPv4 address"),
            },

            CoreError::AuthenticationFailed { address, message } => {
                CliError::AuthFailed { address, message }
            }

            CoreError::Unreachable {
                source: pductl_api::Error::Timeout { timeout_secs },
                ..
            }
            | CoreError::TransferFailed {
                source: pductl_api::Error::Timeout { timeout_secs },
                ..
            } => CliError::Timeout {
                seconds: timeout_secs,
            },

            CoreError::Unreachable { address, source } => CliError::ConnectionFailed {
                address,
                source: source.into(),
            },

            CoreError::TransferFailed { operation, source } => CliError::TransferFailed {
                operation,
                source: source.into(),
            },

            CoreError::EmptyTransfer { remote } => CliError::EmptyTransfer { remote },

            CoreError::TransferInProgress { address } => CliError::Conflict { address },

            other @ (CoreError::AlreadyConnected { .. } | CoreError::NotConnected) => {
                CliError::Session(other.to_string())
            }

            CoreError::NotFound { address, artifact } => CliError::NothingCached {
                address,
                artifact: artifact.into(),
            },

            CoreError::Format(err @ FormatError::Unrepresentable { .. }) => {
                CliError::Validation {
                    field: "setting".into(),
                    reason: err.to_string(),
                }
            }

            CoreError::Format(source) => CliError::Format { source },

            CoreError::Storage(source) => CliError::Io(source),
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        let path = pductl_config::config_path().display().to_string();
        match err {
            ConfigError::Validation { field, reason } => CliError::Validation { field, reason },
            ConfigError::UnknownDevice { name } => CliError::ProfileNotFound { name, path },
            ConfigError::NoCredentials { device } => CliError::NoCredentials { device, path },
            ConfigError::Device(core) => core.into(),
            ConfigError::Figment(source) => CliError::Config { path, source },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn timeouts_map_to_timeout_exit_code() {
        let err: CliError = CoreError::Unreachable {
            address: "10.0.0.5".into(),
            source: pductl_api::Error::Timeout { timeout_secs: 30 },
        }
        .into();
        assert!(matches!(err, CliError::Timeout { seconds: 30 }));
        assert_eq!(err.exit_code(), exit_code::TIMEOUT);
    }

    #[test]
    fn refused_connection_maps_to_connection_exit_code() {
        let err: CliError = CoreError::Unreachable {
            address: "10.0.0.5".into(),
            source: pductl_api::Error::ConnectionClosed,
        }
        .into();
        assert_eq!(err.exit_code(), exit_code::CONNECTION);
    }

    #[test]
    fn core_state_errors_are_general() {
        let err: CliError = CoreError::TransferInProgress {
            address: "10.0.0.5".into(),
        }
        .into();
        assert_eq!(err.exit_code(), exit_code::CONFLICT);

        let err: CliError = CoreError::NotConnected.into();
        assert_eq!(err.exit_code(), exit_code::GENERAL);
    }

    #[test]
    fn unwritable_setting_is_a_usage_error() {
        let err: CliError = CoreError::Format(FormatError::Unrepresentable {
            section: "SystemID".into(),
            key: Some(";x".into()),
            reason: "key starts with ';' or '['",
        })
        .into();
        assert!(matches!(err, CliError::Validation { .. }));
        assert_eq!(err.exit_code(), exit_code::USAGE);
    }

    #[test]
    fn malformed_config_file_keeps_its_diagnostic() {
        use figment::providers::{Format, Toml};

        let figment_err = figment::Figment::from(Toml::string("x = ["))
            .extract::<pductl_config::Config>()
            .unwrap_err();
        let err: CliError = ConfigError::Figment(Box::new(figment_err)).into();
        assert!(matches!(err, CliError::Config { .. }));
        assert_eq!(err.exit_code(), exit_code::GENERAL);
    }

    #[test]
    fn invalid_address_is_a_usage_error() {
        let err: CliError = CoreError::InvalidAddress {
            address: "192.168.1.256".into(),
        }
        .into();
        assert_eq!(err.exit_code(), exit_code::USAGE);
    }
}

// ── Core error types ──
//
// User-facing errors from pductl-core. Transport failures are translated
// at the boundary where their meaning is known: a failure while logging
// in is an authentication or reachability problem, a failure mid-transfer
// is a transfer problem. Nothing here is retried automatically.

use thiserror::Error;

use crate::codec::FormatError;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Identity ─────────────────────────────────────────────────────
    #[error("{address:?} is not a valid IPv4 address")]
    InvalidAddress { address: String },

    // ── Connection state ─────────────────────────────────────────────
    #[error("Already connected to {address}")]
    AlreadyConnected { address: String },

    #[error("Not connected")]
    NotConnected,

    #[error("Authentication failed for {address}: {message}")]
    AuthenticationFailed { address: String, message: String },

    #[error("Cannot reach {address}")]
    Unreachable {
        address: String,
        #[source]
        source: pductl_api::Error,
    },

    // ── Transfers ────────────────────────────────────────────────────
    #[error("{operation} failed")]
    TransferFailed {
        operation: String,
        #[source]
        source: pductl_api::Error,
    },

    #[error("Transfer of {remote} returned no data")]
    EmptyTransfer { remote: String },

    #[error("A push to {address} is still in progress")]
    TransferInProgress { address: String },

    // ── Format ───────────────────────────────────────────────────────
    #[error(transparent)]
    Format(#[from] FormatError),

    // ── Storage ──────────────────────────────────────────────────────
    #[error("No {artifact} configuration stored for {address}")]
    NotFound {
        address: String,
        artifact: &'static str,
    },

    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),
}

impl CoreError {
    /// Returns `true` for errors caused by calling operations in the wrong
    /// connection state (a caller logic mistake rather than a device fault).
    pub fn is_state_error(&self) -> bool {
        matches!(
            self,
            Self::AlreadyConnected { .. } | Self::NotConnected | Self::TransferInProgress { .. }
        )
    }

    /// Returns `true` if the device or network may recover on its own.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Unreachable { source, .. } | Self::TransferFailed { source, .. } => {
                source.is_transient()
            }
            Self::TransferInProgress { .. } => true,
            _ => false,
        }
    }
}

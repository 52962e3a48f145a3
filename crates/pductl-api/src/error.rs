use std::net::SocketAddr;

use thiserror::Error;

/// Top-level error type for the `pductl-api` crate.
///
/// Covers every failure mode of a file-transfer session:
/// authentication, connection setup, timeouts, and protocol replies.
/// `pductl-core` maps these into its own domain taxonomy.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Login rejected (wrong credentials, account disabled, etc.)
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// TCP connection could not be established.
    #[error("Cannot connect to {address}: {source}")]
    Connect {
        address: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// I/O failure on an established control or data connection.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Operation timed out.
    #[error("Operation timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// The server closed the control connection mid-exchange.
    #[error("Connection closed by server")]
    ConnectionClosed,

    // ── Protocol ────────────────────────────────────────────────────
    /// The server answered a command with a code we did not expect.
    #[error("Unexpected reply to {command}: {code} {message}")]
    UnexpectedReply {
        command: String,
        code: u16,
        message: String,
    },

    /// A reply line could not be parsed at all.
    #[error("Malformed reply: {0}")]
    MalformedReply(String),
}

impl Error {
    /// Returns `true` if the server rejected our credentials.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Authentication { .. })
    }

    /// Returns `true` if this is a transient error worth retrying.
    ///
    /// The core never retries on its own; this is a hint for callers.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Connect { .. } | Self::Timeout { .. } | Self::ConnectionClosed
        )
    }

    /// The FTP reply code, if the failure came from a server reply.
    pub fn reply_code(&self) -> Option<u16> {
        match self {
            Self::UnexpectedReply { code, .. } => Some(*code),
            _ => None,
        }
    }
}

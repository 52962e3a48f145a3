// Transport contract and shared connection settings.
//
// The core crate only ever talks to a device through these two traits,
// so tests can swap the FTP client for a scripted in-memory double.

use std::future::Future;
use std::net::Ipv4Addr;
use std::time::Duration;

use bytes::Bytes;
use secrecy::SecretString;

use crate::error::Error;

/// Default FTP control port.
pub const DEFAULT_PORT: u16 = 21;

/// Shared transport configuration for opening sessions.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Control connection port on the device.
    pub port: u16,
    /// Upper bound for every individual network step (connect, reply, transfer).
    pub timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            timeout: Duration::from_secs(30),
        }
    }
}

impl TransportConfig {
    /// Override the control port.
    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Override the per-step timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Opens authenticated file-transfer sessions against a device.
pub trait Transport: Send + Sync {
    type Session: TransferSession;

    /// Connect to `address` and log in.
    ///
    /// Credential rejection must surface as [`Error::Authentication`];
    /// anything else is treated by callers as the device being unreachable.
    fn authenticate(
        &self,
        address: Ipv4Addr,
        username: &str,
        password: &SecretString,
    ) -> impl Future<Output = Result<Self::Session, Error>> + Send;
}

/// An authenticated session. Every call blocks until the transfer
/// completes or fails; there is no cancellation.
pub trait TransferSession: Send {
    /// Download the named remote file.
    fn download(&mut self, remote: &str) -> impl Future<Output = Result<Bytes, Error>> + Send;

    /// Upload `data` as the named remote file. Returns once the server
    /// has acknowledged the transfer.
    fn upload(
        &mut self,
        remote: &str,
        data: &[u8],
    ) -> impl Future<Output = Result<(), Error>> + Send;

    /// End the session.
    fn terminate(self) -> impl Future<Output = Result<(), Error>> + Send
    where
        Self: Sized;
}

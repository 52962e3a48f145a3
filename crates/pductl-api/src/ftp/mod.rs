// FTP implementation of the transport contract.
//
// PDUs expose their configuration as `config.ini` on a plain FTP server.
// Only the handful of commands needed for a passive-mode binary
// RETR/STOR are implemented.

mod auth;
mod client;
mod reply;

pub use client::FtpSession;

use std::net::Ipv4Addr;

use bytes::Bytes;
use secrecy::SecretString;

use crate::error::Error;
use crate::transport::{TransferSession, Transport, TransportConfig};

/// Opens [`FtpSession`]s using a shared [`TransportConfig`].
#[derive(Debug, Clone, Default)]
pub struct FtpTransport {
    config: TransportConfig,
}

impl FtpTransport {
    pub fn new(config: TransportConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TransportConfig {
        &self.config
    }
}

impl Transport for FtpTransport {
    type Session = FtpSession;

    async fn authenticate(
        &self,
        address: Ipv4Addr,
        username: &str,
        password: &SecretString,
    ) -> Result<FtpSession, Error> {
        FtpSession::login(address, username, password, &self.config).await
    }
}

impl TransferSession for FtpSession {
    async fn download(&mut self, remote: &str) -> Result<Bytes, Error> {
        self.retrieve(remote).await
    }

    async fn upload(&mut self, remote: &str, data: &[u8]) -> Result<(), Error> {
        self.store(remote, data).await
    }

    async fn terminate(self) -> Result<(), Error> {
        self.quit().await
    }
}

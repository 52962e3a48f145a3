// FTP login
//
// Opens the control connection, consumes the greeting, and walks the
// USER/PASS exchange. A rejected login is reported as
// `Error::Authentication`; every other failure keeps its transport shape
// so callers can tell "wrong password" from "device down".

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use secrecy::{ExposeSecret, SecretString};
use tokio::net::TcpStream;
use tracing::debug;

use crate::error::Error;
use crate::ftp::client::{FtpSession, with_timeout};
use crate::transport::TransportConfig;

impl FtpSession {
    /// Connect to `address` and authenticate with username/password.
    ///
    /// Servers may accept the user without a password (`230` straight
    /// after `USER`); otherwise `331`/`332` asks for `PASS`.
    pub async fn login(
        address: Ipv4Addr,
        username: &str,
        password: &SecretString,
        config: &TransportConfig,
    ) -> Result<Self, Error> {
        let socket = SocketAddr::from((address, config.port));
        debug!("connecting to {}", socket);

        let stream = with_timeout(config.timeout, async {
            TcpStream::connect(socket)
                .await
                .map_err(|source| Error::Connect {
                    address: socket,
                    source,
                })
        })
        .await?;

        let mut session = Self::new(stream, IpAddr::V4(address), config.timeout);

        let greeting = session.read_reply().await?;
        if !greeting.is_completion() {
            return Err(greeting.into_error("connect"));
        }

        let reply = session.command(&format!("USER {username}")).await?;
        if reply.is_completion() {
            debug!("login successful (no password required)");
            return Ok(session);
        }
        if !reply.is_intermediate() {
            return Err(Error::Authentication {
                message: format!("user rejected ({}): {}", reply.code, reply.text),
            });
        }

        let reply = session
            .command_redacted("PASS", password.expose_secret())
            .await?;
        if !reply.is_completion() {
            return Err(Error::Authentication {
                message: format!("login failed ({}): {}", reply.code, reply.text),
            });
        }

        debug!("login successful");
        Ok(session)
    }
}

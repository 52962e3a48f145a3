// FTP session
//
// Wraps the control connection with reply parsing, per-step timeouts,
// and passive-mode data connections. Login lives in `auth.rs` to keep
// this module focused on transfer mechanics.

use std::future::Future;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use bytes::Bytes;
use tokio::io::{AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tracing::{debug, trace};

use crate::error::Error;
use crate::ftp::reply::{self, Reply};

/// An authenticated FTP control connection to one device.
///
/// Transfers use binary mode and passive data connections. The data
/// connection always targets the control connection's host; the address
/// announced in the `227` reply is ignored because devices behind NAT
/// routinely report their internal address.
///
/// A failure mid-exchange leaves the control channel out of step with the
/// server (a `226` or `426` may still be in flight). The session is then
/// marked broken and every later command fails with
/// [`Error::ConnectionClosed`].
#[derive(Debug)]
pub struct FtpSession {
    control: BufReader<TcpStream>,
    host: IpAddr,
    timeout: Duration,
    broken: bool,
}

impl FtpSession {
    pub(crate) fn new(stream: TcpStream, host: IpAddr, timeout: Duration) -> Self {
        Self {
            control: BufReader::new(stream),
            host,
            timeout,
            broken: false,
        }
    }

    /// The device this session is connected to.
    pub fn host(&self) -> IpAddr {
        self.host
    }

    // ── Transfers ────────────────────────────────────────────────────

    /// Download `remote` into memory (`RETR`).
    pub async fn retrieve(&mut self, remote: &str) -> Result<Bytes, Error> {
        let command = format!("RETR {remote}");
        let mut data = self.open_data_connection().await?;

        let reply = self.command(&command).await?;
        if !reply.is_preliminary() {
            return Err(reply.into_error(&command));
        }

        let mut buf = Vec::new();
        let transfer = with_timeout(self.timeout, async {
            data.read_to_end(&mut buf).await.map_err(Error::from)
        })
        .await;
        drop(data);
        self.check_data_phase(transfer)?;

        let done = self.read_reply().await?;
        if !done.is_completion() {
            return Err(done.into_error(&command));
        }

        debug!(remote, bytes = buf.len(), "download complete");
        Ok(Bytes::from(buf))
    }

    /// Upload `payload` as `remote` (`STOR`). Returns after the server's
    /// transfer-complete reply.
    pub async fn store(&mut self, remote: &str, payload: &[u8]) -> Result<(), Error> {
        let command = format!("STOR {remote}");
        let mut data = self.open_data_connection().await?;

        let reply = self.command(&command).await?;
        if !reply.is_preliminary() {
            return Err(reply.into_error(&command));
        }

        let transfer = with_timeout(self.timeout, async {
            data.write_all(payload).await?;
            data.shutdown().await.map_err(Error::from)
        })
        .await;
        drop(data);
        self.check_data_phase(transfer)?;

        let done = self.read_reply().await?;
        if !done.is_completion() {
            return Err(done.into_error(&command));
        }

        debug!(remote, bytes = payload.len(), "upload acknowledged");
        Ok(())
    }

    /// End the session politely (`QUIT`).
    pub async fn quit(mut self) -> Result<(), Error> {
        let reply = self.command("QUIT").await?;
        if !reply.is_completion() {
            return Err(reply.into_error("QUIT"));
        }
        debug!(host = %self.host, "session closed");
        Ok(())
    }

    // ── Control channel helpers ──────────────────────────────────────

    /// Mark the session broken if the data phase failed: the server still
    /// owes a completion reply that will never be read in step.
    fn check_data_phase<T>(&mut self, transfer: Result<T, Error>) -> Result<T, Error> {
        if transfer.is_err() {
            debug!(host = %self.host, "data transfer failed; session unusable");
            self.broken = true;
        }
        transfer
    }

    /// Switch to binary mode and open a passive data connection.
    async fn open_data_connection(&mut self) -> Result<TcpStream, Error> {
        let reply = self.command("TYPE I").await?;
        if !reply.is_completion() {
            return Err(reply.into_error("TYPE I"));
        }

        let reply = self.command("PASV").await?;
        if reply.code != 227 {
            return Err(reply.into_error("PASV"));
        }
        let (announced, port) = reply::parse_pasv(&reply.text)?;
        let address = SocketAddr::new(self.host, port);
        trace!(%announced, %address, "opening passive data connection");

        with_timeout(self.timeout, async {
            TcpStream::connect(address)
                .await
                .map_err(|source| Error::Connect { address, source })
        })
        .await
    }

    /// Send a command line and wait for its reply.
    pub(crate) async fn command(&mut self, line: &str) -> Result<Reply, Error> {
        trace!("> {line}");
        self.send_line(line).await?;
        self.read_reply().await
    }

    /// Like [`command`](Self::command), but never logs the argument.
    pub(crate) async fn command_redacted(
        &mut self,
        verb: &str,
        argument: &str,
    ) -> Result<Reply, Error> {
        trace!("> {verb} ****");
        self.send_line(&format!("{verb} {argument}")).await?;
        self.read_reply().await
    }

    pub(crate) async fn read_reply(&mut self) -> Result<Reply, Error> {
        if self.broken {
            return Err(Error::ConnectionClosed);
        }
        let reply = with_timeout(self.timeout, reply::read_reply(&mut self.control))
            .await
            .inspect_err(|_| self.broken = true)?;
        trace!("< {} {}", reply.code, reply.text);
        Ok(reply)
    }

    async fn send_line(&mut self, line: &str) -> Result<(), Error> {
        if self.broken {
            return Err(Error::ConnectionClosed);
        }
        let stream = self.control.get_mut();
        let sent = with_timeout(self.timeout, async {
            stream.write_all(line.as_bytes()).await?;
            stream.write_all(b"\r\n").await?;
            stream.flush().await.map_err(Error::from)
        })
        .await;
        if sent.is_err() {
            self.broken = true;
        }
        sent
    }
}

/// Bound a network step by the session timeout.
pub(crate) async fn with_timeout<T, F>(timeout: Duration, fut: F) -> Result<T, Error>
where
    F: Future<Output = Result<T, Error>>,
{
    tokio::time::timeout(timeout, fut)
        .await
        .map_err(|_| Error::Timeout {
            timeout_secs: timeout.as_secs(),
        })?
}

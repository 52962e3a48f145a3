// pductl-api: Async file-transfer client for PDU configuration files

pub mod error;
pub mod ftp;
pub mod transport;

pub use error::Error;
pub use ftp::{FtpSession, FtpTransport};
pub use transport::{TransferSession, Transport, TransportConfig};

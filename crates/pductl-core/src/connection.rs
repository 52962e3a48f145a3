// ── Connection manager ──
//
// Two-state session machine for one device handle. The session object
// exists exactly while the state is `Connected`; closing consumes it.

use std::sync::Arc;

use tracing::{debug, info, warn};

use pductl_api::{TransferSession, Transport};

use crate::device::{Device, DeviceAddress};
use crate::error::CoreError;

/// Connection state observable by consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Connected,
}

/// Owns the transport session for a single device.
pub struct ConnectionManager<T: Transport> {
    transport: Arc<T>,
    connected_to: Option<DeviceAddress>,
    session: Option<T::Session>,
}

impl<T: Transport> ConnectionManager<T> {
    pub fn new(transport: Arc<T>) -> Self {
        Self {
            transport,
            connected_to: None,
            session: None,
        }
    }

    pub fn state(&self) -> SessionState {
        if self.session.is_some() {
            SessionState::Connected
        } else {
            SessionState::Disconnected
        }
    }

    /// Authenticate against `device` and move to `Connected`.
    ///
    /// Fails with [`CoreError::AlreadyConnected`] if a session is open.
    /// On failure the state stays `Disconnected`.
    pub async fn connect(&mut self, device: &Device) -> Result<(), CoreError> {
        if let Some(address) = self.connected_to {
            return Err(CoreError::AlreadyConnected {
                address: address.to_string(),
            });
        }

        let address = device.address();
        debug!(%address, username = device.username(), "connecting");

        let session = self
            .transport
            .authenticate(address.ip(), device.username(), device.password())
            .await
            .map_err(|err| login_error(address, err))?;

        self.session = Some(session);
        self.connected_to = Some(address);
        info!(%address, "connected");
        Ok(())
    }

    /// Terminate the session and move to `Disconnected`.
    ///
    /// A second call reports [`CoreError::NotConnected`]. If the transport
    /// fails to terminate cleanly the state still becomes `Disconnected`
    /// and the failure is returned.
    pub async fn close(&mut self) -> Result<(), CoreError> {
        let session = self.session.take().ok_or(CoreError::NotConnected)?;
        let address = self.connected_to.take();

        match session.terminate().await {
            Ok(()) => {
                if let Some(address) = address {
                    info!(%address, "disconnected");
                }
                Ok(())
            }
            Err(source) => {
                warn!(error = %source, "session did not terminate cleanly");
                Err(CoreError::TransferFailed {
                    operation: "session close".into(),
                    source,
                })
            }
        }
    }

    /// The live session, or [`CoreError::NotConnected`].
    pub fn require_connected(&mut self) -> Result<&mut T::Session, CoreError> {
        self.session.as_mut().ok_or(CoreError::NotConnected)
    }
}

/// Translate a login failure: credential rejection versus everything else.
fn login_error(address: DeviceAddress, err: pductl_api::Error) -> CoreError {
    match err {
        pductl_api::Error::Authentication { message } => CoreError::AuthenticationFailed {
            address: address.to_string(),
            message,
        },
        source => CoreError::Unreachable {
            address: address.to_string(),
            source,
        },
    }
}

// ── Transfer coordinator ──
//
// One `Pdu` per physical device. Sequences fetch (download → cache →
// decode) and push (encode → pending → upload) over the device's single
// session, and guards against overlapping pushes.
//
// PDUs re-scan their uploaded `config.ini` on their own schedule and
// apply it some minutes later. The coordinator does not try to time that
// window; it records when each push was acknowledged and refuses to start
// new transfers while a push is still on the wire.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError};

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::{debug, info};

use pductl_api::{TransferSession, Transport};

use crate::codec::{self, HeaderConfig};
use crate::connection::{ConnectionManager, SessionState};
use crate::device::Device;
use crate::document::ConfigDocument;
use crate::error::CoreError;
use crate::store::ConfigStore;

/// Well-known configuration file name on APC network management cards.
pub const DEFAULT_REMOTE_FILE: &str = "config.ini";

/// Per-device transfer tuning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferSettings {
    /// Remote file to download from and upload to.
    pub remote_file: String,
    /// Header stamped on every pushed file.
    pub header: HeaderConfig,
}

impl Default for TransferSettings {
    fn default() -> Self {
        Self {
            remote_file: DEFAULT_REMOTE_FILE.into(),
            header: HeaderConfig::default(),
        }
    }
}

/// Handle for one PDU: identity, session, cache, and push bookkeeping.
///
/// Handles for different devices share nothing but the transport and the
/// store, both of which are keyed by address. Operations on one handle
/// are serialized through a per-handle mutex around the session.
pub struct Pdu<T: Transport, S: ConfigStore> {
    device: Device,
    settings: TransferSettings,
    store: Arc<S>,
    connection: Mutex<ConnectionManager<T>>,
    push_in_flight: AtomicBool,
    last_pushed: std::sync::Mutex<Option<DateTime<Utc>>>,
}

impl<T: Transport, S: ConfigStore> Pdu<T, S> {
    pub fn new(device: Device, transport: Arc<T>, store: Arc<S>) -> Self {
        Self {
            device,
            settings: TransferSettings::default(),
            store,
            connection: Mutex::new(ConnectionManager::new(transport)),
            push_in_flight: AtomicBool::new(false),
            last_pushed: std::sync::Mutex::new(None),
        }
    }

    pub fn with_settings(mut self, settings: TransferSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn device(&self) -> &Device {
        &self.device
    }

    pub fn settings(&self) -> &TransferSettings {
        &self.settings
    }

    /// Current session state. Waits for any running transfer to finish.
    pub async fn state(&self) -> SessionState {
        self.connection.lock().await.state()
    }

    /// When the device last acknowledged a pushed configuration.
    ///
    /// The device applies uploads asynchronously; callers should leave it
    /// alone for a few minutes after this instant before pushing again.
    pub fn last_pushed(&self) -> Option<DateTime<Utc>> {
        *self
            .last_pushed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether a push is currently waiting for the device's acknowledgement.
    pub fn push_in_flight(&self) -> bool {
        self.push_in_flight.load(Ordering::Acquire)
    }

    // ── Session lifecycle ────────────────────────────────────────────

    pub async fn connect(&self) -> Result<(), CoreError> {
        self.connection.lock().await.connect(&self.device).await
    }

    pub async fn close(&self) -> Result<(), CoreError> {
        self.connection.lock().await.close().await
    }

    // ── Transfers ────────────────────────────────────────────────────

    /// Download the device configuration, cache it, and decode it.
    ///
    /// A zero-length download is rejected with [`CoreError::EmptyTransfer`]
    /// before anything is cached. Decode errors surface after the raw bytes
    /// were cached, so the offending file can be inspected.
    pub async fn fetch(&self) -> Result<ConfigDocument, CoreError> {
        let address = self.device.address();
        if self.push_in_flight() {
            return Err(self.in_progress());
        }

        let remote = &self.settings.remote_file;
        let mut connection = self.connection.lock().await;
        let session = connection.require_connected()?;

        debug!(%address, remote = %remote, "downloading configuration");
        let bytes = session
            .download(remote)
            .await
            .map_err(|source| CoreError::TransferFailed {
                operation: format!("download of {remote}"),
                source,
            })?;
        drop(connection);

        if bytes.is_empty() {
            return Err(CoreError::EmptyTransfer {
                remote: remote.clone(),
            });
        }

        self.store.write_cached(address, &bytes)?;
        debug!(%address, bytes = bytes.len(), "configuration cached");

        Ok(codec::decode_bytes(&bytes)?)
    }

    /// Encode `doc`, record it as pending, and upload it.
    ///
    /// Returns the acknowledgement time, which is also exposed through
    /// [`last_pushed`](Self::last_pushed). Fails with
    /// [`CoreError::TransferInProgress`] if another push to this device has
    /// not been acknowledged yet, and with [`CoreError::Format`] before
    /// anything is written if `doc` holds an entry the device file cannot
    /// express. The fetched cache is never touched.
    pub async fn push(&self, doc: &ConfigDocument) -> Result<DateTime<Utc>, CoreError> {
        let address = self.device.address();
        let _flight = self.begin_push()?;

        let remote = &self.settings.remote_file;
        let mut connection = self.connection.lock().await;
        let session = connection.require_connected()?;

        let text = codec::encode(doc, &self.settings.header)?;
        self.store.write_pending(address, text.as_bytes())?;

        debug!(%address, remote = %remote, bytes = text.len(), "uploading configuration");
        session
            .upload(remote, text.as_bytes())
            .await
            .map_err(|source| CoreError::TransferFailed {
                operation: format!("upload of {remote}"),
                source,
            })?;

        let pushed_at = Utc::now();
        *self
            .last_pushed
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(pushed_at);

        info!(
            %address,
            "configuration pushed; the device applies it on its own schedule, \
             avoid pushing again for a few minutes"
        );
        Ok(pushed_at)
    }

    /// Decode the last fetched configuration without touching the network.
    pub fn load_cached(&self) -> Result<ConfigDocument, CoreError> {
        let bytes = self.store.read_cached(self.device.address())?;
        Ok(codec::decode_bytes(&bytes)?)
    }

    // ── Single-flight guard ──────────────────────────────────────────

    fn begin_push(&self) -> Result<FlightGuard<'_>, CoreError> {
        self.push_in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| self.in_progress())?;
        Ok(FlightGuard(&self.push_in_flight))
    }

    fn in_progress(&self) -> CoreError {
        CoreError::TransferInProgress {
            address: self.device.address().to_string(),
        }
    }
}

/// Clears the in-flight flag when a push finishes, whatever the outcome.
struct FlightGuard<'a>(&'a AtomicBool);

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

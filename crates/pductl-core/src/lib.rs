//! Configuration transfer-and-format engine for power-distribution units.
//!
//! APC-style PDUs expose their settings as an INI-like `config.ini` over
//! FTP, and re-scan and apply an uploaded file on their own, unpredictable
//! schedule. This crate provides:
//!
//! - **[`codec`]**: lossless [`decode`] / [`encode`] between the device's
//!   text format and an ordered [`ConfigDocument`].
//!
//! - **[`ConfigStore`]**: per-device byte artifacts: the last fetched file
//!   and, separately, the last file sent for upload. [`FileStore`] keeps
//!   them on disk, [`MemoryStore`] in memory.
//!
//! - **[`ConnectionManager`]**: the `Disconnected` / `Connected` session
//!   machine over any [`pductl_api::Transport`].
//!
//! - **[`Pdu`]**: the per-device coordinator. [`fetch()`](Pdu::fetch)
//!   downloads, caches, and decodes; [`push()`](Pdu::push) encodes, records
//!   the pending artifact, and uploads. Overlapping pushes to one device are
//!   refused and the last acknowledged push time is exposed so operators can
//!   wait out the device's re-scan window.

pub mod codec;
pub mod connection;
pub mod device;
pub mod document;
pub mod error;
pub mod pdu;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use codec::{FormatError, HeaderConfig, decode, decode_bytes, encode, encode_at};
pub use connection::{ConnectionManager, SessionState};
pub use device::{Device, DeviceAddress};
pub use document::{ConfigDocument, Section};
pub use error::CoreError;
pub use pdu::{DEFAULT_REMOTE_FILE, Pdu, TransferSettings};
pub use store::{Artifact, ConfigStore, FileStore, MemoryStore};

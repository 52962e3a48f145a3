// ── Config store ──
//
// Per-device byte artifacts: the last fetched file ("cached") and the
// last file handed to the transport for upload ("pending"). The two never
// share storage, so a failed push cannot clobber the last good fetch.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use bytes::Bytes;

use crate::device::DeviceAddress;
use crate::error::CoreError;

/// Which per-device artifact to address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Artifact {
    /// Last successfully downloaded configuration.
    Cached,
    /// Last configuration encoded for upload.
    Pending,
}

impl Artifact {
    /// File extension used by [`FileStore`].
    pub fn extension(self) -> &'static str {
        match self {
            Self::Cached => "ini",
            Self::Pending => "ini_updated",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Cached => "cached",
            Self::Pending => "pending",
        }
    }
}

/// Byte store keyed by device address.
///
/// Writes replace the previous artifact wholesale and are visible to the
/// next read of the same artifact. Durable implementations keep them
/// across restarts.
pub trait ConfigStore: Send + Sync {
    /// Read an artifact, failing with [`CoreError::NotFound`] if none exists.
    fn read(&self, address: DeviceAddress, artifact: Artifact) -> Result<Bytes, CoreError>;

    /// Replace an artifact.
    fn write(
        &self,
        address: DeviceAddress,
        artifact: Artifact,
        bytes: &[u8],
    ) -> Result<(), CoreError>;

    fn read_cached(&self, address: DeviceAddress) -> Result<Bytes, CoreError> {
        self.read(address, Artifact::Cached)
    }

    fn write_cached(&self, address: DeviceAddress, bytes: &[u8]) -> Result<(), CoreError> {
        self.write(address, Artifact::Cached, bytes)
    }

    fn read_pending(&self, address: DeviceAddress) -> Result<Bytes, CoreError> {
        self.read(address, Artifact::Pending)
    }

    fn write_pending(&self, address: DeviceAddress, bytes: &[u8]) -> Result<(), CoreError> {
        self.write(address, Artifact::Pending, bytes)
    }
}

pub(crate) fn not_found(address: DeviceAddress, artifact: Artifact) -> CoreError {
    CoreError::NotFound {
        address: address.to_string(),
        artifact: artifact.label(),
    }
}

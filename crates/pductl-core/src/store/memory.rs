// ── In-memory config store ──
//
// Lock-free map of artifacts, for tests and dry runs. Nothing survives
// the process.

use bytes::Bytes;
use dashmap::DashMap;

use crate::device::DeviceAddress;
use crate::error::CoreError;
use crate::store::{Artifact, ConfigStore, not_found};

/// A [`ConfigStore`] backed by a `DashMap`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    artifacts: DashMap<(DeviceAddress, Artifact), Bytes>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored artifacts across all devices.
    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }
}

impl ConfigStore for MemoryStore {
    fn read(&self, address: DeviceAddress, artifact: Artifact) -> Result<Bytes, CoreError> {
        self.artifacts
            .get(&(address, artifact))
            .map(|r| r.value().clone())
            .ok_or_else(|| not_found(address, artifact))
    }

    fn write(
        &self,
        address: DeviceAddress,
        artifact: Artifact,
        bytes: &[u8],
    ) -> Result<(), CoreError> {
        self.artifacts
            .insert((address, artifact), Bytes::copy_from_slice(bytes));
        Ok(())
    }
}

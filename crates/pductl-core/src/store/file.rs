// ── File-backed config store ──
//
// One directory, two files per device:
//
//   <dir>/<address>.ini          last fetched configuration
//   <dir>/<address>.ini_updated  last configuration sent for upload
//
// Writes land in a temporary file in the same directory and are renamed
// over the target, so readers only ever see a complete artifact.

use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use bytes::Bytes;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::device::DeviceAddress;
use crate::error::CoreError;
use crate::store::{Artifact, ConfigStore, not_found};

/// A durable [`ConfigStore`] rooted at a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open a store at `dir`, creating the directory if it does not exist.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, CoreError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of one artifact for one device.
    pub fn path_for(&self, address: DeviceAddress, artifact: Artifact) -> PathBuf {
        self.dir.join(format!("{address}.{}", artifact.extension()))
    }
}

impl ConfigStore for FileStore {
    fn read(&self, address: DeviceAddress, artifact: Artifact) -> Result<Bytes, CoreError> {
        let path = self.path_for(address, artifact);
        match std::fs::read(&path) {
            Ok(bytes) => Ok(Bytes::from(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(not_found(address, artifact)),
            Err(e) => Err(e.into()),
        }
    }

    fn write(
        &self,
        address: DeviceAddress,
        artifact: Artifact,
        bytes: &[u8],
    ) -> Result<(), CoreError> {
        let path = self.path_for(address, artifact);

        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(bytes)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|e| e.error)?;

        debug!(path = %path.display(), bytes = bytes.len(), "stored {}", artifact.label());
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::net::Ipv4Addr;

    use super::*;

    fn addr() -> DeviceAddress {
        Ipv4Addr::new(192, 168, 1, 1).into()
    }

    #[test]
    fn open_creates_missing_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("configs");
        let store = FileStore::open(&dir).unwrap();
        assert!(dir.is_dir());
        assert_eq!(store.dir(), dir);
    }

    #[test]
    fn uses_address_named_files() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FileStore::open(tmp.path()).unwrap();

        store.write_cached(addr(), b"[A]\n").unwrap();
        store.write_pending(addr(), b"[B]\n").unwrap();

        assert_eq!(
            std::fs::read(tmp.path().join("192.168.1.1.ini")).unwrap(),
            b"[A]\n"
        );
        assert_eq!(
            std::fs::read(tmp.path().join("192.168.1.1.ini_updated")).unwrap(),
            b"[B]\n"
        );
    }

    #[test]
    fn missing_artifact_is_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FileStore::open(tmp.path()).unwrap();
        assert!(matches!(
            store.read_pending(addr()),
            Err(CoreError::NotFound {
                artifact: "pending",
                ..
            })
        ));
    }

    #[test]
    fn survives_reopen() {
        let tmp = tempfile::tempdir().unwrap();
        FileStore::open(tmp.path())
            .unwrap()
            .write_cached(addr(), b"persisted")
            .unwrap();

        let reopened = FileStore::open(tmp.path()).unwrap();
        assert_eq!(&reopened.read_cached(addr()).unwrap()[..], b"persisted");
    }

    #[test]
    fn overwrite_leaves_no_temp_files_behind() {
        let tmp = tempfile::tempdir().unwrap();
        let store = FileStore::open(tmp.path()).unwrap();
        store.write_cached(addr(), b"one").unwrap();
        store.write_cached(addr(), b"two").unwrap();

        let entries = std::fs::read_dir(tmp.path()).unwrap().count();
        assert_eq!(entries, 1);
        assert_eq!(&store.read_cached(addr()).unwrap()[..], b"two");
    }
}

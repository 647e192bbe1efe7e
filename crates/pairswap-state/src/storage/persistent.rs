use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use pairswap_core::serialize;
use tracing::debug;

use super::{Storage, WriteBuffer};
use crate::error::StateError;

/// File-backed storage holding the whole key space in one snapshot file.
///
/// Commits write a temporary file and rename it over the snapshot.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
    buffer: WriteBuffer,
}

impl FileStorage {
    pub fn new<P: Into<PathBuf>>(path: P) -> Result<Self, StateError> {
        let path = path.into();
        let committed = if path.exists() {
            let bytes = fs::read(&path).map_err(|e| StateError::Storage(e.to_string()))?;
            if bytes.is_empty() {
                BTreeMap::new()
            } else {
                serialize::from_bytes(&bytes)
                    .map_err(|e| StateError::Serialization(e.to_string()))?
            }
        } else {
            BTreeMap::new()
        };

        Ok(FileStorage {
            path,
            buffer: WriteBuffer::from_committed(committed),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush_to_disk(&self) -> Result<(), StateError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| StateError::Storage(e.to_string()))?;
        }

        let bytes = serialize::to_bytes(self.buffer.committed())
            .map_err(|e| StateError::Serialization(e.to_string()))?;
        let tmp_path = self.path.with_extension("tmp");
        fs::write(&tmp_path, &bytes).map_err(|e| StateError::Storage(e.to_string()))?;
        fs::rename(&tmp_path, &self.path).map_err(|e| StateError::Storage(e.to_string()))?;
        debug!(path = %self.path.display(), bytes = bytes.len(), "Flushed state snapshot");
        Ok(())
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        self.buffer.get(key)
    }

    fn put(&mut self, key: &[u8], value: &[u8]) {
        self.buffer.put(key, value);
    }

    fn delete(&mut self, key: &[u8]) {
        self.buffer.delete(key);
    }

    fn commit(&mut self) -> Result<(), StateError> {
        self.buffer.apply();
        self.flush_to_disk()
    }

    fn rollback(&mut self) {
        self.buffer.discard();
    }

    fn keys_with_prefix(&self, prefix: &[u8]) -> Vec<Vec<u8>> {
        self.buffer.keys_with_prefix(prefix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("pairswap-{}-{}.bin", name, std::process::id()))
    }

    #[test]
    fn test_commit_survives_reopen() {
        let path = temp_path("reopen");
        let _ = fs::remove_file(&path);

        let mut storage = FileStorage::new(&path).unwrap();
        storage.put(b"registry", b"state");
        storage.commit().unwrap();
        storage.put(b"acc:1", b"uncommitted");

        let reopened = FileStorage::new(&path).unwrap();
        assert_eq!(reopened.get(b"registry"), Some(b"state".to_vec()));
        assert_eq!(reopened.get(b"acc:1"), None);

        let _ = fs::remove_file(&path);
    }
}

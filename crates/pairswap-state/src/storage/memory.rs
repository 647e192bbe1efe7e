use super::{Storage, WriteBuffer};
use crate::error::StateError;

/// In-memory storage, used by tests and dry runs
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    buffer: WriteBuffer,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of committed keys
    pub fn len(&self) -> usize {
        self.buffer.committed().len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.committed().is_empty()
    }
}

impl Storage for MemoryStorage {
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
        Ok(())
    }

    fn rollback(&mut self) {
        self.buffer.discard();
    }

    fn keys_with_prefix(&self, prefix: &[u8]) -> Vec<Vec<u8>> {
        self.buffer.keys_with_prefix(prefix)
    }
}

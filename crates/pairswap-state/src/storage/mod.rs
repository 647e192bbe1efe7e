mod buffer;
pub mod memory;
pub mod persistent;

use crate::error::StateError;

pub use buffer::WriteBuffer;
pub use memory::MemoryStorage;
pub use persistent::FileStorage;

/// Key-value backend the exchange state is persisted to.
///
/// Writes are staged until `commit`; reads observe staged writes.
pub trait Storage: Send + Sync {
    fn get(&self, key: &[u8]) -> Option<Vec<u8>>;

    fn put(&mut self, key: &[u8], value: &[u8]);

    fn delete(&mut self, key: &[u8]);

    /// Make staged writes durable
    fn commit(&mut self) -> Result<(), StateError>;

    /// Drop staged writes
    fn rollback(&mut self);

    fn exists(&self, key: &[u8]) -> bool {
        self.get(key).is_some()
    }

    /// All live keys starting with `prefix`, in ascending order
    fn keys_with_prefix(&self, prefix: &[u8]) -> Vec<Vec<u8>>;
}

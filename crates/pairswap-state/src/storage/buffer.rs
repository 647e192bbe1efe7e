use std::collections::BTreeMap;

/// Committed entries plus staged writes (`None` marks a delete)
#[derive(Debug, Clone, Default)]
pub struct WriteBuffer {
    committed: BTreeMap<Vec<u8>, Vec<u8>>,
    staged: BTreeMap<Vec<u8>, Option<Vec<u8>>>,
}

impl WriteBuffer {
    pub fn from_committed(committed: BTreeMap<Vec<u8>, Vec<u8>>) -> Self {
        WriteBuffer {
            committed,
            staged: BTreeMap::new(),
        }
    }

    pub fn committed(&self) -> &BTreeMap<Vec<u8>, Vec<u8>> {
        &self.committed
    }

    pub fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        match self.staged.get(key) {
            Some(staged) => staged.clone(),
            None => self.committed.get(key).cloned(),
        }
    }

    pub fn put(&mut self, key: &[u8], value: &[u8]) {
        self.staged.insert(key.to_vec(), Some(value.to_vec()));
    }

    pub fn delete(&mut self, key: &[u8]) {
        self.staged.insert(key.to_vec(), None);
    }

    /// Fold staged writes into the committed map
    pub fn apply(&mut self) {
        for (key, value) in std::mem::take(&mut self.staged) {
            match value {
                Some(v) => {
                    self.committed.insert(key, v);
                }
                None => {
                    self.committed.remove(&key);
                }
            }
        }
    }

    pub fn discard(&mut self) {
        self.staged.clear();
    }

    pub fn keys_with_prefix(&self, prefix: &[u8]) -> Vec<Vec<u8>> {
        let mut keys: Vec<Vec<u8>> = self
            .committed
            .keys()
            .filter(|key| key.starts_with(prefix))
            .filter(|key| !matches!(self.staged.get(*key), Some(None)))
            .cloned()
            .collect();

        keys.extend(
            self.staged
                .iter()
                .filter(|(key, value)| {
                    key.starts_with(prefix) && value.is_some() && !self.committed.contains_key(*key)
                })
                .map(|(key, _)| key.clone()),
        );
        keys.sort();
        keys
    }
}

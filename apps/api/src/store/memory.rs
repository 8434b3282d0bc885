use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{Record, RecordStore, StoreError};

/// Process-local collection. Each `load` hands out a fresh copy, so callers
/// get the same read-modify-write behavior as with the file store.
pub struct MemoryStore<R> {
    records: Mutex<HashMap<String, R>>,
}

impl<R: Record> MemoryStore<R> {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
        }
    }
}

impl<R: Record> Default for MemoryStore<R> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<R: Record> RecordStore<R> for MemoryStore<R> {
    async fn load(&self) -> HashMap<String, R> {
        match self.records.lock() {
            Ok(records) => records.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    async fn save(&self, records: &HashMap<String, R>) -> Result<(), StoreError> {
        let mut guard = match self.records.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = records.clone();
        Ok(())
    }
}

use std::collections::HashMap;
use std::io::{ErrorKind, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};
use tempfile::NamedTempFile;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use super::{Record, RecordStore, StoreError};

/// One pretty-printed JSON object per collection, keyed by record id.
/// Writes go to a temp file in the same directory and are renamed into place.
///
/// Entries that do not match the record schema are skipped on load but kept
/// aside and written back verbatim, so one bad entry never costs its siblings.
pub struct JsonFileStore<R> {
    path: PathBuf,
    unreadable: Mutex<Map<String, Value>>,
    _record: PhantomData<fn() -> R>,
}

impl<R: Record> JsonFileStore<R> {
    /// Opens `dir/file_name`, creating the directory and an empty `{}`
    /// collection if needed. Safe to race: every creator writes the same content.
    pub async fn open(dir: impl AsRef<Path>, file_name: &str) -> Result<Self, StoreError> {
        let dir = dir.as_ref();
        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|source| StoreError::Init {
                path: dir.to_path_buf(),
                source,
            })?;

        let path = dir.join(file_name);
        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(mut file) => {
                let init_err = |source| StoreError::Init {
                    path: path.clone(),
                    source,
                };
                file.write_all(b"{}").await.map_err(init_err)?;
                // tokio hands writes to the blocking pool; wait for them to land.
                file.flush().await.map_err(init_err)?;
                file.sync_all().await.map_err(init_err)?;
                info!("Created empty collection at {}", path.display());
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {}
            Err(source) => return Err(StoreError::Init { path, source }),
        }

        Ok(Self {
            path,
            unreadable: Mutex::new(Map::new()),
            _record: PhantomData,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn set_unreadable(&self, entries: Map<String, Value>) {
        match self.unreadable.lock() {
            Ok(mut guard) => *guard = entries,
            Err(poisoned) => *poisoned.into_inner() = entries,
        }
    }

    fn unreadable(&self) -> Map<String, Value> {
        match self.unreadable.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

#[async_trait]
impl<R: Record> RecordStore<R> for JsonFileStore<R> {
    async fn load(&self) -> HashMap<String, R> {
        let raw = match tokio::fs::read(&self.path).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(
                    "Collection {} unreadable, treating as empty: {e}",
                    self.path.display()
                );
                self.set_unreadable(Map::new());
                return HashMap::new();
            }
        };

        let entries: Map<String, Value> = match serde_json::from_slice(&raw) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(
                    "Collection {} is malformed, treating as empty: {e}",
                    self.path.display()
                );
                self.set_unreadable(Map::new());
                return HashMap::new();
            }
        };

        let mut records = HashMap::with_capacity(entries.len());
        let mut unreadable = Map::new();
        for (id, value) in entries {
            match R::deserialize(&value) {
                Ok(record) => {
                    records.insert(id, record);
                }
                Err(e) => {
                    warn!(
                        "Skipping record {id} in {}, kept as-is: {e}",
                        self.path.display()
                    );
                    unreadable.insert(id, value);
                }
            }
        }
        self.set_unreadable(unreadable);
        records
    }

    async fn save(&self, records: &HashMap<String, R>) -> Result<(), StoreError> {
        let mut entries = self.unreadable();
        for (id, record) in records {
            entries.insert(id.clone(), serde_json::to_value(record)?);
        }
        let bytes = serde_json::to_vec_pretty(&entries)?;
        let path = self.path.clone();
        let count = records.len();

        tokio::task::spawn_blocking(move || replace_file(&path, &bytes)).await??;

        debug!("Saved {count} records to {}", self.path.display());
        Ok(())
    }
}

fn replace_file(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    let write_err = |source| StoreError::Write {
        path: path.to_path_buf(),
        source,
    };
    let dir = path.parent().unwrap_or_else(|| Path::new("."));

    let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
    tmp.write_all(bytes).map_err(write_err)?;
    tmp.as_file().sync_all().map_err(write_err)?;
    tmp.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}

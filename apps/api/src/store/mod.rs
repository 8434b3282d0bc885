//! Whole-collection persistence.
//!
//! A collection is a map from record id to record, loaded and saved as one
//! unit. There is no partial-record I/O: every mutation reads the full map,
//! changes it in memory, and writes the full map back.

pub mod file;
pub mod memory;

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

use crate::ownership::Owner;

pub use file::JsonFileStore;
pub use memory::MemoryStore;

/// A stored document kind (uploaded resume, generated resume).
///
/// `Draft` is what callers supply on creation; `Patch` is a partial update
/// whose unset fields leave the stored values alone. Neither can change the
/// id, the owner, or the creation timestamp.
pub trait Record: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    type Draft: Send;
    type Patch: Send;

    fn from_draft(id: String, created_at: DateTime<Utc>, draft: Self::Draft) -> Self;

    fn id(&self) -> &str;

    fn owner(&self) -> &Owner;

    /// Only the claim path rewrites the owner.
    fn set_owner(&mut self, owner: Owner);

    fn created_at(&self) -> DateTime<Utc>;

    /// Shallow merge: fields set in `patch` replace the stored ones.
    fn apply(&mut self, patch: Self::Patch);
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to initialise collection at {path}: {source}")]
    Init {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write collection to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize collection: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("storage task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Durable backing for one collection.
///
/// `load` never fails: missing or corrupt storage reads as an empty
/// collection. `save` replaces everything and reports write failures.
#[async_trait]
pub trait RecordStore<R: Record>: Send + Sync {
    async fn load(&self) -> HashMap<String, R>;

    async fn save(&self, records: &HashMap<String, R>) -> Result<(), StoreError>;
}

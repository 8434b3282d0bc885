//! Typed CRUD over one record store.
//!
//! Every operation is a whole-collection read-modify-write against the store.
//! Mutating cycles in this process are serialized by `write_lock` so two
//! concurrent updates cannot silently drop each other's change. Writers in
//! other processes are not coordinated.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use crate::ownership::{decide, Access, Decision, Owner};
use crate::store::{Record, RecordStore, StoreError};

pub struct Collection<R: Record> {
    name: &'static str,
    store: Arc<dyn RecordStore<R>>,
    write_lock: Mutex<()>,
}

impl<R: Record> Collection<R> {
    pub fn new(name: &'static str, store: Arc<dyn RecordStore<R>>) -> Self {
        Self {
            name,
            store,
            write_lock: Mutex::new(()),
        }
    }

    /// Stores a new record and returns its freshly generated id.
    pub async fn add(&self, draft: R::Draft) -> Result<String, StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut records = self.store.load().await;

        // v4 ids: collisions are treated as impossible and not checked.
        let id = Uuid::new_v4().to_string();
        let record = R::from_draft(id.clone(), Utc::now(), draft);
        let owner = record.owner().clone();
        records.insert(record.id().to_string(), record);
        self.store.save(&records).await?;

        info!("[{}] added {id} for {owner}", self.name);
        Ok(id)
    }

    /// Raw lookup. No ownership check.
    pub async fn get(&self, id: &str) -> Option<R> {
        self.store.load().await.remove(id)
    }

    /// Looks up `id` on behalf of `caller`, claiming it when allowed.
    pub async fn resolve(
        &self,
        id: &str,
        caller: &Owner,
        allow_claim: bool,
    ) -> Result<Access<R>, StoreError> {
        let Some(record) = self.get(id).await else {
            return Ok(Access::NotFound);
        };

        match decide(record.owner(), caller, allow_claim) {
            Decision::Grant => Ok(Access::Granted(record)),
            Decision::Deny => Ok(Access::Denied),
            Decision::Claim => self.claim(id, caller).await,
        }
    }

    /// Same as [`Collection::resolve`] but without distinguishing denial from absence.
    pub async fn get_for_caller(
        &self,
        id: &str,
        caller: &Owner,
        allow_claim: bool,
    ) -> Result<Option<R>, StoreError> {
        Ok(self.resolve(id, caller, allow_claim).await?.into_record())
    }

    /// Re-checks under the write lock: another request may have claimed the
    /// record between the unlocked read and now.
    async fn claim(&self, id: &str, caller: &Owner) -> Result<Access<R>, StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut records = self.store.load().await;

        let Some(record) = records.get_mut(id) else {
            return Ok(Access::NotFound);
        };

        match decide(record.owner(), caller, true) {
            Decision::Grant => Ok(Access::Granted(record.clone())),
            Decision::Deny => Ok(Access::Denied),
            Decision::Claim => {
                record.set_owner(caller.clone());
                let claimed = record.clone();
                self.store.save(&records).await?;
                info!("[{}] {id} claimed by {caller}", self.name);
                Ok(Access::Claimed(claimed))
            }
        }
    }

    /// Merges `patch` into the stored record. Unknown ids are ignored.
    pub async fn update(&self, id: &str, patch: R::Patch) -> Result<(), StoreError> {
        self.apply_patch(id, None, patch).await.map(|_| ())
    }

    /// Owner-only update. The ownership check runs in the same locked cycle
    /// as the write, so a claim landing in between is seen. Never claims.
    pub async fn update_owned(
        &self,
        id: &str,
        caller: &Owner,
        patch: R::Patch,
    ) -> Result<Access<()>, StoreError> {
        self.apply_patch(id, Some(caller), patch).await
    }

    async fn apply_patch(
        &self,
        id: &str,
        caller: Option<&Owner>,
        patch: R::Patch,
    ) -> Result<Access<()>, StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut records = self.store.load().await;

        let Some(record) = records.get_mut(id) else {
            debug!("[{}] update skipped, {id} not found", self.name);
            return Ok(Access::NotFound);
        };
        if let Some(caller) = caller {
            if decide(record.owner(), caller, false) != Decision::Grant {
                return Ok(Access::Denied);
            }
        }
        record.apply(patch);
        self.store.save(&records).await?;

        debug!("[{}] updated {id}", self.name);
        Ok(Access::Granted(()))
    }

    /// All records owned by exactly `owner`, newest first.
    pub async fn list_by_owner(&self, owner: &Owner) -> Vec<R> {
        let mut owned: Vec<R> = self
            .store
            .load()
            .await
            .into_values()
            .filter(|r| r.owner() == owner)
            .collect();
        owned.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
        owned
    }

    /// Removes `id` if present.
    pub async fn delete(&self, id: &str) -> Result<(), StoreError> {
        self.remove(id, None).await.map(|_| ())
    }

    /// Owner-only delete, checked and applied under the write lock. Never claims.
    pub async fn delete_owned(&self, id: &str, caller: &Owner) -> Result<Access<()>, StoreError> {
        self.remove(id, Some(caller)).await
    }

    async fn remove(&self, id: &str, caller: Option<&Owner>) -> Result<Access<()>, StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut records = self.store.load().await;

        let Some(record) = records.get(id) else {
            debug!("[{}] delete skipped, {id} not found", self.name);
            return Ok(Access::NotFound);
        };
        if let Some(caller) = caller {
            if decide(record.owner(), caller, false) != Decision::Grant {
                return Ok(Access::Denied);
            }
        }
        records.remove(id);
        self.store.save(&records).await?;

        info!("[{}] deleted {id}", self.name);
        Ok(Access::Granted(()))
    }
}

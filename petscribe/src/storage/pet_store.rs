//! Pet collection storage
//!
//! The whole pet list is one JSON array under a single key. Every mutation
//! loads the full collection, changes it and writes it back.
//!
//! Mutations through one `PetStore` (and its clones) hold a shared writer
//! lock for the entire read-modify-write, so overlapping edits in the same
//! process cannot clobber each other. Separate processes sharing a data
//! directory are not coordinated; the last write wins.

use crate::config::PETS_STORAGE_KEY;
use crate::error::{AppError, Result};
use crate::models::PetRecord;
use crate::storage::KeyValueStore;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Store for the persisted pet collection
#[derive(Clone)]
pub struct PetStore {
    kv: Arc<dyn KeyValueStore>,
    key: String,
    write_lock: Arc<Mutex<()>>,
}

impl PetStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self {
            kv,
            key: PETS_STORAGE_KEY.to_string(),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Load every pet. An absent collection is empty.
    pub async fn load_all(&self) -> Result<Vec<PetRecord>> {
        let Some(raw) = self.kv.get(&self.key).await? else {
            return Ok(Vec::new());
        };

        serde_json::from_str(&raw)
            .map_err(|e| AppError::StorageRead(format!("Failed to decode pet collection: {}", e)))
    }

    /// Get one pet by id
    pub async fn get(&self, id: &str) -> Result<PetRecord> {
        self.load_all()
            .await?
            .into_iter()
            .find(|pet| pet.id == id)
            .ok_or_else(|| AppError::PetNotFound(id.to_string()))
    }

    /// Overwrite the whole collection
    pub async fn save_all(&self, records: &[PetRecord]) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.write(records).await
    }

    /// Replace the pet with the same id, or append it
    pub async fn upsert(&self, record: PetRecord) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut records = self.load_all().await?;

        match records.iter_mut().find(|pet| pet.id == record.id) {
            Some(existing) => {
                tracing::debug!("Replacing pet {}", record.id);
                *existing = record;
            }
            None => {
                tracing::debug!("Appending pet {}", record.id);
                records.push(record);
            }
        }

        self.write(&records).await
    }

    /// Remove the pet with `id` and return the record as it was removed
    pub async fn remove(&self, id: &str) -> Result<Option<PetRecord>> {
        let _guard = self.write_lock.lock().await;
        let mut records = self.load_all().await?;

        let Some(position) = records.iter().position(|pet| pet.id == id) else {
            return Ok(None);
        };
        let removed = records.remove(position);

        self.write(&records).await?;

        Ok(Some(removed))
    }

    /// Apply `mutate` to the pet with `id` and persist the result
    pub async fn update<F>(&self, id: &str, mutate: F) -> Result<PetRecord>
    where
        F: FnOnce(&mut PetRecord) -> Result<()>,
    {
        let _guard = self.write_lock.lock().await;
        let mut records = self.load_all().await?;

        let pet = records
            .iter_mut()
            .find(|pet| pet.id == id)
            .ok_or_else(|| AppError::PetNotFound(id.to_string()))?;

        mutate(pet)?;
        let updated = pet.clone();

        self.write(&records).await?;

        Ok(updated)
    }

    async fn write(&self, records: &[PetRecord]) -> Result<()> {
        let payload = serde_json::to_string(records).map_err(|e| {
            AppError::StorageWrite(format!("Failed to encode pet collection: {}", e))
        })?;

        self.kv.set(&self.key, &payload).await.map_err(|e| match e {
            AppError::StorageWrite(_) => e,
            other => AppError::StorageWrite(other.to_string()),
        })
    }
}

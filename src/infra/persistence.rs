//! Durable storage boundary for lists and items.
//!
//! The store treats the backend as the system of record: a mutation only
//! counts once the backend acknowledges it, and `fetch_all` supports the
//! refetch-after-mutate pattern. Two implementations ship with the crate: a
//! session-local in-memory map and a whole-state JSON document on disk.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use directories::ProjectDirs;
use serde_json::Error as SerdeError;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::domain::entities::{GroceryItem, GroceryList, ItemId, ListId};

const APP_QUALIFIER: &str = "com";
const APP_ORG: &str = "BazarLedger";
const APP_NAME: &str = "BazarLedger";
const DATA_FILENAME: &str = "lists.json";

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("storage directory unavailable")]
    StorageUnavailable,
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serde(#[from] SerdeError),
    #[error("backend rejected the write: {0}")]
    Rejected(String),
}

/// Record-level CRUD surface the aggregate store writes through.
#[async_trait]
pub trait PersistenceBackend: Send + Sync {
    /// Bulk read of all lists (items included) for the current user.
    async fn fetch_all(&self) -> Result<Vec<GroceryList>, PersistenceError>;
    async fn insert_list(&self, list: &GroceryList) -> Result<(), PersistenceError>;
    /// Full-record write: fields, item set, and order.
    async fn update_list(&self, list: &GroceryList) -> Result<(), PersistenceError>;
    /// Cascades to the list's items.
    async fn delete_list(&self, id: ListId) -> Result<(), PersistenceError>;
    async fn insert_item(
        &self,
        list_id: ListId,
        item: &GroceryItem,
    ) -> Result<(), PersistenceError>;
    async fn update_item(
        &self,
        list_id: ListId,
        item: &GroceryItem,
    ) -> Result<(), PersistenceError>;
    async fn delete_item(&self, list_id: ListId, item_id: ItemId) -> Result<(), PersistenceError>;
    async fn update_list_total(&self, list_id: ListId, total: f64)
        -> Result<(), PersistenceError>;
}

/// In-memory backend. The reference implementation for tests and a usable
/// default for a session that does not need durability.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    records: Arc<Mutex<HashMap<ListId, GroceryList>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the backend directly, bypassing the store. Test helper.
    pub async fn seed(&self, lists: Vec<GroceryList>) {
        let mut records = self.records.lock().await;
        for list in lists {
            records.insert(list.id, list);
        }
    }
}

#[async_trait]
impl PersistenceBackend for MemoryBackend {
    async fn fetch_all(&self) -> Result<Vec<GroceryList>, PersistenceError> {
        Ok(self.records.lock().await.values().cloned().collect())
    }

    async fn insert_list(&self, list: &GroceryList) -> Result<(), PersistenceError> {
        self.records.lock().await.insert(list.id, list.clone());
        Ok(())
    }

    async fn update_list(&self, list: &GroceryList) -> Result<(), PersistenceError> {
        let mut records = self.records.lock().await;
        if !records.contains_key(&list.id) {
            return Err(PersistenceError::Rejected(format!(
                "unknown list {}",
                list.id
            )));
        }
        records.insert(list.id, list.clone());
        Ok(())
    }

    async fn delete_list(&self, id: ListId) -> Result<(), PersistenceError> {
        self.records.lock().await.remove(&id);
        Ok(())
    }

    async fn insert_item(
        &self,
        list_id: ListId,
        item: &GroceryItem,
    ) -> Result<(), PersistenceError> {
        let mut records = self.records.lock().await;
        let list = records
            .get_mut(&list_id)
            .ok_or_else(|| PersistenceError::Rejected(format!("unknown list {list_id}")))?;
        list.items.push(item.clone());
        Ok(())
    }

    async fn update_item(
        &self,
        list_id: ListId,
        item: &GroceryItem,
    ) -> Result<(), PersistenceError> {
        let mut records = self.records.lock().await;
        let list = records
            .get_mut(&list_id)
            .ok_or_else(|| PersistenceError::Rejected(format!("unknown list {list_id}")))?;
        let slot = list
            .item_mut(item.id)
            .ok_or_else(|| PersistenceError::Rejected(format!("unknown item {}", item.id)))?;
        *slot = item.clone();
        Ok(())
    }

    async fn delete_item(&self, list_id: ListId, item_id: ItemId) -> Result<(), PersistenceError> {
        let mut records = self.records.lock().await;
        let list = records
            .get_mut(&list_id)
            .ok_or_else(|| PersistenceError::Rejected(format!("unknown list {list_id}")))?;
        list.items.retain(|item| item.id != item_id);
        Ok(())
    }

    async fn update_list_total(
        &self,
        list_id: ListId,
        total: f64,
    ) -> Result<(), PersistenceError> {
        let mut records = self.records.lock().await;
        let list = records
            .get_mut(&list_id)
            .ok_or_else(|| PersistenceError::Rejected(format!("unknown list {list_id}")))?;
        list.total_estimated_price = total;
        Ok(())
    }
}

/// JSON-document backend: the whole list collection as one pretty-printed
/// file, read-modify-written per operation. Small data, simple recovery.
#[derive(Clone)]
pub struct JsonFileBackend {
    path: PathBuf,
    // Serializes the read-modify-write cycles.
    write_lock: Arc<Mutex<()>>,
}

impl JsonFileBackend {
    /// Backend at the platform config directory.
    pub fn new() -> Result<Self, PersistenceError> {
        let path = ProjectDirs::from(APP_QUALIFIER, APP_ORG, APP_NAME)
            .map(|dirs| dirs.config_dir().join(DATA_FILENAME))
            .ok_or(PersistenceError::StorageUnavailable)?;
        Ok(Self::at_path(path))
    }

    pub fn at_path(path: PathBuf) -> Self {
        Self {
            path,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    fn load(&self) -> Result<Vec<GroceryList>, PersistenceError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let data = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&data)?)
    }

    fn save(&self, lists: &[GroceryList]) -> Result<(), PersistenceError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(lists)?;
        fs::write(&self.path, json)?;
        Ok(())
    }

    async fn modify<F>(&self, apply: F) -> Result<(), PersistenceError>
    where
        F: FnOnce(&mut Vec<GroceryList>) -> Result<(), PersistenceError>,
    {
        let _guard = self.write_lock.lock().await;
        let mut lists = self.load()?;
        apply(&mut lists)?;
        self.save(&lists)
    }
}

#[async_trait]
impl PersistenceBackend for JsonFileBackend {
    async fn fetch_all(&self) -> Result<Vec<GroceryList>, PersistenceError> {
        let _guard = self.write_lock.lock().await;
        self.load()
    }

    async fn insert_list(&self, list: &GroceryList) -> Result<(), PersistenceError> {
        let list = list.clone();
        self.modify(move |lists| {
            lists.retain(|existing| existing.id != list.id);
            lists.push(list);
            Ok(())
        })
        .await
    }

    async fn update_list(&self, list: &GroceryList) -> Result<(), PersistenceError> {
        let list = list.clone();
        self.modify(move |lists| {
            let slot = lists
                .iter_mut()
                .find(|existing| existing.id == list.id)
                .ok_or_else(|| PersistenceError::Rejected(format!("unknown list {}", list.id)))?;
            *slot = list;
            Ok(())
        })
        .await
    }

    async fn delete_list(&self, id: ListId) -> Result<(), PersistenceError> {
        self.modify(move |lists| {
            lists.retain(|existing| existing.id != id);
            Ok(())
        })
        .await
    }

    async fn insert_item(
        &self,
        list_id: ListId,
        item: &GroceryItem,
    ) -> Result<(), PersistenceError> {
        let item = item.clone();
        self.modify(move |lists| {
            let list = find_list(lists, list_id)?;
            list.items.push(item);
            Ok(())
        })
        .await
    }

    async fn update_item(
        &self,
        list_id: ListId,
        item: &GroceryItem,
    ) -> Result<(), PersistenceError> {
        let item = item.clone();
        self.modify(move |lists| {
            let list = find_list(lists, list_id)?;
            let slot = list
                .item_mut(item.id)
                .ok_or_else(|| PersistenceError::Rejected(format!("unknown item {}", item.id)))?;
            *slot = item;
            Ok(())
        })
        .await
    }

    async fn delete_item(&self, list_id: ListId, item_id: ItemId) -> Result<(), PersistenceError> {
        self.modify(move |lists| {
            let list = find_list(lists, list_id)?;
            list.items.retain(|item| item.id != item_id);
            Ok(())
        })
        .await
    }

    async fn update_list_total(
        &self,
        list_id: ListId,
        total: f64,
    ) -> Result<(), PersistenceError> {
        self.modify(move |lists| {
            let list = find_list(lists, list_id)?;
            list.total_estimated_price = total;
            Ok(())
        })
        .await
    }
}

fn find_list(
    lists: &mut [GroceryList],
    list_id: ListId,
) -> Result<&mut GroceryList, PersistenceError> {
    lists
        .iter_mut()
        .find(|list| list.id == list_id)
        .ok_or_else(|| PersistenceError::Rejected(format!("unknown list {list_id}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{Month, Unit};
    use time::OffsetDateTime;

    fn sample_list() -> GroceryList {
        let items = vec![GroceryItem {
            id: ItemId::new(),
            name: "rice".into(),
            quantity: 2.0,
            unit: Unit::Kilogram,
            estimated_price: Some(160.0),
        }];
        GroceryList {
            id: ListId::new(),
            title: "Monthly bazar".into(),
            month: Month::August,
            year: 2026,
            created_at: OffsetDateTime::now_utc(),
            total_estimated_price: GroceryList::compute_total(&items),
            items,
        }
    }

    #[tokio::test]
    async fn memory_backend_round_trips_a_list() {
        let backend = MemoryBackend::new();
        let list = sample_list();
        backend.insert_list(&list).await.unwrap();

        let fetched = backend.fetch_all().await.unwrap();
        assert_eq!(fetched, vec![list]);
    }

    #[tokio::test]
    async fn memory_backend_rejects_item_writes_to_unknown_lists() {
        let backend = MemoryBackend::new();
        let list = sample_list();
        let result = backend.insert_item(list.id, &list.items[0]).await;
        assert!(matches!(result, Err(PersistenceError::Rejected(_))));
    }

    #[tokio::test]
    async fn delete_list_cascades_to_items() {
        let backend = MemoryBackend::new();
        let list = sample_list();
        backend.insert_list(&list).await.unwrap();
        backend.delete_list(list.id).await.unwrap();
        assert!(backend.fetch_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn json_backend_round_trips_through_disk() {
        let path = std::env::temp_dir().join(format!("bazar-ledger-test-{}.json", uuid::Uuid::new_v4()));
        let backend = JsonFileBackend::at_path(path.clone());

        let list = sample_list();
        backend.insert_list(&list).await.unwrap();
        backend
            .update_list_total(list.id, 205.0)
            .await
            .unwrap();

        let fetched = backend.fetch_all().await.unwrap();
        assert_eq!(fetched.len(), 1);
        assert_eq!(fetched[0].total_estimated_price, 205.0);
        assert_eq!(fetched[0].items, list.items);

        let _ = fs::remove_file(path);
    }

    #[tokio::test]
    async fn json_backend_reads_empty_when_file_is_absent() {
        let path = std::env::temp_dir().join(format!("bazar-ledger-missing-{}.json", uuid::Uuid::new_v4()));
        let backend = JsonFileBackend::at_path(path);
        assert!(backend.fetch_all().await.unwrap().is_empty());
    }
}

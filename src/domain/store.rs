//! Canonical in-memory view of the user's grocery lists.
//!
//! The store is the sole mutator of list/item state. Every mutation follows
//! the same discipline: serialize on the list's gate, build the updated list
//! on a clone, await the persistence acknowledgment, then commit the clone.
//! A failed write surfaces an error and leaves the prior state observable,
//! and the derived total matches the item prices at every commit point.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use thiserror::Error;
use time::OffsetDateTime;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::entities::{
    GroceryItem, GroceryList, ItemDraft, ItemId, ItemPatch, ListId, ListPatch, Month, Unit,
};
use super::estimation::estimate_price;
use super::price_table::PriceTable;
use crate::infra::oracle::{PriceOracle, QuoteRequest};
use crate::infra::persistence::{PersistenceBackend, PersistenceError};

/// Suffix appended to a duplicated list's title.
const COPY_SUFFIX: &str = " (Copy)";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("validation error: {0}")]
    Validation(String),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

impl StoreError {
    fn validation(message: impl Into<String>) -> Self {
        StoreError::Validation(message.into())
    }
}

/// Aggregate store over a persistence backend and a remote price oracle.
///
/// Pricing failures never surface: `add_item` falls back to the
/// deterministic estimator, so an item is always created with a price.
#[derive(Clone)]
pub struct GroceryStore<P, O> {
    backend: P,
    oracle: O,
    table: PriceTable,
    lists: Arc<Mutex<HashMap<ListId, GroceryList>>>,
    // One gate per list id; concurrent mutations on the same list queue up
    // here instead of racing on a stale snapshot.
    gates: Arc<Mutex<HashMap<ListId, Arc<Mutex<()>>>>>,
}

impl<P, O> GroceryStore<P, O>
where
    P: PersistenceBackend,
    O: PriceOracle,
{
    pub fn new(backend: P, oracle: O) -> Self {
        Self {
            backend,
            oracle,
            table: PriceTable::bd_staples(),
            lists: Arc::new(Mutex::new(HashMap::new())),
            gates: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn with_price_table(mut self, table: PriceTable) -> Self {
        self.table = table;
        self
    }

    /// Replace the in-memory view with whatever the backend holds.
    pub async fn reload(&self) -> Result<(), StoreError> {
        let fetched = self.backend.fetch_all().await?;
        let mut lists = self.lists.lock().await;
        lists.clear();
        for list in fetched {
            lists.insert(list.id, list);
        }
        Ok(())
    }

    /// Snapshot of all lists, newest first.
    pub async fn lists(&self) -> Vec<GroceryList> {
        let mut lists: Vec<GroceryList> = self.lists.lock().await.values().cloned().collect();
        lists.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        lists
    }

    pub async fn get_list(&self, id: ListId) -> Option<GroceryList> {
        self.lists.lock().await.get(&id).cloned()
    }

    /// Create a list from item drafts, pricing any unpriced draft before the
    /// create is considered complete.
    pub async fn create_list(
        &self,
        title: &str,
        month: Month,
        year: i32,
        drafts: Vec<ItemDraft>,
    ) -> Result<ListId, StoreError> {
        if title.trim().is_empty() {
            return Err(StoreError::validation("list title must not be empty"));
        }
        if drafts.is_empty() {
            return Err(StoreError::validation(
                "a list needs at least one item",
            ));
        }

        let mut items = Vec::with_capacity(drafts.len());
        for draft in drafts {
            items.push(self.materialize(draft).await?);
        }

        let list = GroceryList {
            id: ListId::new(),
            title: title.trim().to_string(),
            month,
            year,
            created_at: OffsetDateTime::now_utc(),
            total_estimated_price: GroceryList::compute_total(&items),
            items,
        };

        self.backend.insert_list(&list).await?;
        let id = list.id;
        self.commit(list).await;
        debug!(%id, "created list");
        Ok(id)
    }

    /// Apply a partial update. Supplying `items` replaces the item set and
    /// recomputes the total from it.
    pub async fn update_list(&self, id: ListId, patch: ListPatch) -> Result<(), StoreError> {
        let gate = self.gate(id).await;
        let _guard = gate.lock().await;

        let mut updated = self.snapshot(id).await?;
        if let Some(title) = patch.title {
            if title.trim().is_empty() {
                return Err(StoreError::validation("list title must not be empty"));
            }
            updated.title = title.trim().to_string();
        }
        if let Some(month) = patch.month {
            updated.month = month;
        }
        if let Some(year) = patch.year {
            updated.year = year;
        }
        if let Some(items) = patch.items {
            updated.items = items;
            updated.recompute_total();
        }

        self.backend.update_list(&updated).await?;
        self.commit(updated).await;
        Ok(())
    }

    /// Delete a list and, by cascade, all of its items. Deleting an unknown
    /// id is a no-op success.
    pub async fn delete_list(&self, id: ListId) -> Result<(), StoreError> {
        let gate = self.gate(id).await;
        let _guard = gate.lock().await;

        if self.lists.lock().await.get(&id).is_none() {
            debug!(%id, "delete of unknown list ignored");
            return Ok(());
        }

        self.backend.delete_list(id).await?;
        self.lists.lock().await.remove(&id);
        drop(_guard);
        self.gates.lock().await.remove(&id);
        Ok(())
    }

    /// Add an item, obtaining a price first when the draft carries none.
    pub async fn add_item(&self, list_id: ListId, draft: ItemDraft) -> Result<ItemId, StoreError> {
        let gate = self.gate(list_id).await;
        let _guard = gate.lock().await;

        let mut updated = self.snapshot(list_id).await?;
        let item = self.materialize(draft).await?;
        let item_id = item.id;

        self.backend.insert_item(list_id, &item).await?;
        updated.items.push(item);
        updated.recompute_total();
        self.backend
            .update_list_total(list_id, updated.total_estimated_price)
            .await?;
        self.commit(updated).await;
        Ok(item_id)
    }

    pub async fn update_item(
        &self,
        list_id: ListId,
        item_id: ItemId,
        patch: ItemPatch,
    ) -> Result<(), StoreError> {
        let gate = self.gate(list_id).await;
        let _guard = gate.lock().await;

        let mut updated = self.snapshot(list_id).await?;
        let item = updated
            .item_mut(item_id)
            .ok_or_else(|| StoreError::validation(format!("unknown item {item_id}")))?;

        if let Some(name) = patch.name {
            if name.trim().is_empty() {
                return Err(StoreError::validation("item name must not be empty"));
            }
            item.name = name.trim().to_string();
        }
        if let Some(quantity) = patch.quantity {
            validate_quantity(quantity)?;
            item.quantity = quantity;
        }
        if let Some(unit) = patch.unit {
            item.unit = unit;
        }
        if let Some(price) = patch.estimated_price {
            if let Some(value) = price {
                validate_price(value)?;
            }
            item.estimated_price = price;
        }

        let snapshot = item.clone();
        updated.recompute_total();
        self.backend.update_item(list_id, &snapshot).await?;
        self.backend
            .update_list_total(list_id, updated.total_estimated_price)
            .await?;
        self.commit(updated).await;
        Ok(())
    }

    pub async fn remove_item(&self, list_id: ListId, item_id: ItemId) -> Result<(), StoreError> {
        let gate = self.gate(list_id).await;
        let _guard = gate.lock().await;

        let mut updated = self.snapshot(list_id).await?;
        let before = updated.items.len();
        updated.items.retain(|item| item.id != item_id);
        if updated.items.len() == before {
            return Err(StoreError::validation(format!("unknown item {item_id}")));
        }
        updated.recompute_total();

        self.backend.delete_item(list_id, item_id).await?;
        self.backend
            .update_list_total(list_id, updated.total_estimated_price)
            .await?;
        self.commit(updated).await;
        Ok(())
    }

    /// Reorder items to `new_order`, which must be a permutation of the
    /// list's current item ids. Prices and total are untouched.
    pub async fn reorder_items(
        &self,
        list_id: ListId,
        new_order: &[ItemId],
    ) -> Result<(), StoreError> {
        let gate = self.gate(list_id).await;
        let _guard = gate.lock().await;

        let mut updated = self.snapshot(list_id).await?;

        let current: HashSet<ItemId> = updated.items.iter().map(|item| item.id).collect();
        let requested: HashSet<ItemId> = new_order.iter().copied().collect();
        if new_order.len() != updated.items.len()
            || requested.len() != new_order.len()
            || requested != current
        {
            warn!(%list_id, "reorder rejected: id set mismatch");
            return Err(StoreError::validation(
                "reorder ids must be a permutation of the list's item ids",
            ));
        }

        let mut by_id: HashMap<ItemId, GroceryItem> = updated
            .items
            .drain(..)
            .map(|item| (item.id, item))
            .collect();
        updated.items = new_order
            .iter()
            .map(|id| by_id.remove(id).expect("id checked against current set"))
            .collect();

        self.backend.update_list(&updated).await?;
        self.commit(updated).await;
        Ok(())
    }

    /// Deep-copy a list under a fresh id and timestamp, marking the title.
    pub async fn duplicate_list(&self, id: ListId) -> Result<ListId, StoreError> {
        let source = self
            .get_list(id)
            .await
            .ok_or_else(|| StoreError::validation(format!("unknown list {id}")))?;

        let items: Vec<GroceryItem> = source
            .items
            .iter()
            .map(|item| GroceryItem {
                id: ItemId::new(),
                ..item.clone()
            })
            .collect();

        let copy = GroceryList {
            id: ListId::new(),
            title: format!("{}{COPY_SUFFIX}", source.title),
            month: source.month,
            year: source.year,
            created_at: OffsetDateTime::now_utc(),
            total_estimated_price: source.total_estimated_price,
            items,
        };

        self.backend.insert_list(&copy).await?;
        let copy_id = copy.id;
        self.commit(copy).await;
        Ok(copy_id)
    }

    /// Turn a draft into a stored item, pricing it if needed. Never fails on
    /// pricing: oracle errors fall back to the deterministic estimator.
    async fn materialize(&self, draft: ItemDraft) -> Result<GroceryItem, StoreError> {
        if draft.name.trim().is_empty() {
            return Err(StoreError::validation("item name must not be empty"));
        }
        validate_quantity(draft.quantity)?;
        if let Some(price) = draft.estimated_price {
            validate_price(price)?;
        }

        let price = match draft.estimated_price {
            Some(price) => price,
            None => {
                self.resolve_price(&draft.name, draft.quantity, draft.unit)
                    .await
            }
        };

        Ok(GroceryItem {
            id: ItemId::new(),
            name: draft.name.trim().to_string(),
            quantity: draft.quantity,
            unit: draft.unit,
            estimated_price: Some(price),
        })
    }

    async fn resolve_price(&self, name: &str, quantity: f64, unit: Unit) -> f64 {
        let request = QuoteRequest {
            name: name.to_string(),
            quantity,
            unit: unit.label().to_string(),
        };
        match self.oracle.quote(&request).await {
            Ok(price) if price.is_finite() && price >= 0.0 => price,
            Ok(price) => {
                warn!(item = name, price, "oracle returned an implausible price");
                estimate_price(name, quantity, unit.label(), &self.table)
            }
            Err(error) => {
                warn!(item = name, %error, "price oracle unavailable; using estimate");
                estimate_price(name, quantity, unit.label(), &self.table)
            }
        }
    }

    async fn gate(&self, id: ListId) -> Arc<Mutex<()>> {
        self.gates.lock().await.entry(id).or_default().clone()
    }

    async fn snapshot(&self, id: ListId) -> Result<GroceryList, StoreError> {
        self.lists
            .lock()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::validation(format!("unknown list {id}")))
    }

    async fn commit(&self, list: GroceryList) {
        self.lists.lock().await.insert(list.id, list);
    }
}

fn validate_quantity(quantity: f64) -> Result<(), StoreError> {
    if quantity.is_finite() && quantity > 0.0 {
        Ok(())
    } else {
        Err(StoreError::validation(format!(
            "quantity must be positive, got {quantity}"
        )))
    }
}

fn validate_price(price: f64) -> Result<(), StoreError> {
    if price.is_finite() && price >= 0.0 {
        Ok(())
    } else {
        Err(StoreError::validation(format!(
            "price must be non-negative, got {price}"
        )))
    }
}

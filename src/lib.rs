//! Core engine for monthly grocery lists.
//!
//! Everything presentation-shaped (forms, routing, PDF rendering) lives in
//! collaborating layers; this crate owns the list/item state, the derived
//! per-list total, and the deterministic price fallback used when the remote
//! pricing oracle is unavailable.

pub mod domain;
pub mod infra;

pub use domain::{
    estimate_price, GroceryItem, GroceryList, GroceryStore, ItemDraft, ItemId, ItemPatch, ListId,
    ListPatch, Month, PriceTable, StoreError, Unit,
};
pub use infra::{
    JsonFileBackend, MemoryBackend, OracleError, PersistenceBackend, PersistenceError, PriceOracle,
    QuoteRequest, RemotePriceOracle,
};

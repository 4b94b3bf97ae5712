//! Domain logic for grocery lists and price estimation lives here.

pub mod entities;
pub mod estimation;
pub mod price_table;
pub mod store;

pub use entities::{
    GroceryItem, GroceryList, ItemDraft, ItemId, ItemPatch, ListId, ListPatch, Month, Unit,
};
pub use estimation::estimate_price;
pub use price_table::{PriceEntry, PriceTable, PricingMode};
pub use store::{GroceryStore, StoreError};

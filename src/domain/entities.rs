use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Identifier for a grocery list. Opaque; unique per user session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ListId(pub Uuid);

impl ListId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ListId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ListId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Identifier for an item. Unique within its parent list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemId(pub Uuid);

impl ItemId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Measurement unit attached to an item quantity.
/// Labels match what the entry forms send ("kg", "pcs", ...).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Unit {
    #[serde(rename = "kg")]
    Kilogram,
    #[serde(rename = "g")]
    Gram,
    #[serde(rename = "lb")]
    Pound,
    #[serde(rename = "pcs")]
    Piece,
    #[serde(rename = "l")]
    Liter,
    #[serde(rename = "ml")]
    Milliliter,
    #[serde(rename = "dozen")]
    Dozen,
}

impl Unit {
    pub fn label(&self) -> &'static str {
        match self {
            Unit::Kilogram => "kg",
            Unit::Gram => "g",
            Unit::Pound => "lb",
            Unit::Piece => "pcs",
            Unit::Liter => "l",
            Unit::Milliliter => "ml",
            Unit::Dozen => "dozen",
        }
    }

    /// Lenient label parsing: accepts the short forms the entry forms send
    /// plus the spelled-out words. Returns `None` for anything else.
    pub fn parse(label: &str) -> Option<Unit> {
        match label.trim().to_lowercase().as_str() {
            "kg" | "kilo" | "kilogram" | "kilograms" => Some(Unit::Kilogram),
            "g" | "gm" | "gram" | "grams" => Some(Unit::Gram),
            "lb" | "lbs" | "pound" | "pounds" => Some(Unit::Pound),
            "pcs" | "pc" | "piece" | "pieces" | "pack" | "packet" => Some(Unit::Piece),
            "l" | "ltr" | "liter" | "litre" | "liters" | "litres" => Some(Unit::Liter),
            "ml" | "milliliter" | "millilitre" => Some(Unit::Milliliter),
            "dz" | "dozen" => Some(Unit::Dozen),
            _ => None,
        }
    }

    /// Multiplier that converts `quantity × unit` into the price table's
    /// reference measure (kg for weight, liter for volume, one for counts).
    pub fn conversion_factor(&self) -> f64 {
        match self {
            Unit::Kilogram | Unit::Liter => 1.0,
            Unit::Gram | Unit::Milliliter => 0.001,
            Unit::Pound => 0.45,
            Unit::Piece => 1.0,
            Unit::Dozen => 12.0,
        }
    }
}

/// Calendar month a list is planned for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Month {
    January,
    February,
    March,
    April,
    May,
    June,
    July,
    August,
    September,
    October,
    November,
    December,
}

impl Month {
    pub const ALL: [Month; 12] = [
        Month::January,
        Month::February,
        Month::March,
        Month::April,
        Month::May,
        Month::June,
        Month::July,
        Month::August,
        Month::September,
        Month::October,
        Month::November,
        Month::December,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Month::January => "January",
            Month::February => "February",
            Month::March => "March",
            Month::April => "April",
            Month::May => "May",
            Month::June => "June",
            Month::July => "July",
            Month::August => "August",
            Month::September => "September",
            Month::October => "October",
            Month::November => "November",
            Month::December => "December",
        }
    }

    pub fn parse(label: &str) -> Option<Month> {
        let wanted = label.trim();
        Month::ALL
            .into_iter()
            .find(|month| month.label().eq_ignore_ascii_case(wanted))
    }
}

/// A single product entry within a list.
///
/// `estimated_price` is `None` while the item has not been priced yet; the
/// store's always-price policy means persisted items carry `Some(price)`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroceryItem {
    pub id: ItemId,
    pub name: String,
    pub quantity: f64,
    pub unit: Unit,
    pub estimated_price: Option<f64>,
}

/// A named, dated collection of grocery items with a derived total cost.
///
/// Invariant: `total_estimated_price` equals the sum of the items' prices
/// (absent treated as 0) at every observable point.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroceryList {
    pub id: ListId,
    pub title: String,
    pub month: Month,
    pub year: i32,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub items: Vec<GroceryItem>,
    pub total_estimated_price: f64,
}

impl GroceryList {
    /// Sum of item prices, treating unpriced items as 0.
    pub fn compute_total(items: &[GroceryItem]) -> f64 {
        items
            .iter()
            .map(|item| item.estimated_price.unwrap_or(0.0))
            .sum()
    }

    pub fn recompute_total(&mut self) {
        self.total_estimated_price = Self::compute_total(&self.items);
    }

    pub fn item(&self, item_id: ItemId) -> Option<&GroceryItem> {
        self.items.iter().find(|item| item.id == item_id)
    }

    pub fn item_mut(&mut self, item_id: ItemId) -> Option<&mut GroceryItem> {
        self.items.iter_mut().find(|item| item.id == item_id)
    }
}

/// Payload for adding an item. Without an explicit price the store obtains
/// one (remote oracle first, deterministic estimator as the fallback).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemDraft {
    pub name: String,
    pub quantity: f64,
    pub unit: Unit,
    #[serde(default)]
    pub estimated_price: Option<f64>,
}

/// Partial item update. `None` fields are left untouched; the outer `Option`
/// on `estimated_price` distinguishes "keep" from "set or clear".
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ItemPatch {
    pub name: Option<String>,
    pub quantity: Option<f64>,
    pub unit: Option<Unit>,
    pub estimated_price: Option<Option<f64>>,
}

/// Partial list update. Supplying `items` replaces the item set wholesale
/// and triggers a total recompute.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ListPatch {
    pub title: Option<String>,
    pub month: Option<Month>,
    pub year: Option<i32>,
    pub items: Option<Vec<GroceryItem>>,
}

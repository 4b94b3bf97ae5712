//! Static bilingual price reference data.
//!
//! - Entries are an *ordered* slice: the estimator takes the first match, so
//!   tie-breaking between overlapping keys is explicit.
//! - Base prices are BDT per reference measure (kg or liter) for
//!   measure-priced goods and BDT per piece for piece-priced ones.

use serde::{Deserialize, Serialize};

/// How an entry's base price scales with the requested amount.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PricingMode {
    /// Scales with weight/volume via the unit conversion factor.
    PerMeasure,
    /// Scales with count only; the unit field is ignored.
    PerPiece,
}

/// One reference entry: a set of name keys in either script, a base price,
/// and the pricing mode.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PriceEntry {
    pub keys: &'static [&'static str],
    pub base_price: f64,
    pub mode: PricingMode,
}

/// Read-only lookup data for the fallback estimator. Loaded once, shared
/// freely; concurrent reads need no synchronization.
#[derive(Clone, Copy, Debug)]
pub struct PriceTable {
    entries: &'static [PriceEntry],
    piece_keywords: &'static [&'static str],
    default_base_price: f64,
}

impl PriceTable {
    pub const fn new(
        entries: &'static [PriceEntry],
        piece_keywords: &'static [&'static str],
        default_base_price: f64,
    ) -> Self {
        Self {
            entries,
            piece_keywords,
            default_base_price,
        }
    }

    pub fn entries(&self) -> &'static [PriceEntry] {
        self.entries
    }

    pub fn piece_keywords(&self) -> &'static [&'static str] {
        self.piece_keywords
    }

    /// Base price used when no entry matches at all.
    pub fn default_base_price(&self) -> f64 {
        self.default_base_price
    }

    /// Bangladeshi staple goods, English and Bengali keys. English keys are
    /// stored lowercase; Bengali keys match script-exact.
    pub const fn bd_staples() -> Self {
        Self::new(BD_ENTRIES, BD_PIECE_KEYWORDS, DEFAULT_BASE_PRICE)
    }
}

/// Fallback base price (BDT) for items the table knows nothing about.
const DEFAULT_BASE_PRICE: f64 = 100.0;

/// Names that mark an item piece-priced regardless of its unit field.
const BD_PIECE_KEYWORDS: &[&str] = &[
    "egg",
    "bread",
    "biscuit",
    "sauce",
    "ketchup",
    "soap",
    "shampoo",
    "toothpaste",
    "bottle",
    "pack",
    "packet",
    "ডিম",
    "পাউরুটি",
    "বিস্কুট",
    "সস",
    "সাবান",
    "শ্যাম্পু",
    "টুথপেস্ট",
    "বোতল",
    "প্যাকেট",
];

const BD_ENTRIES: &[PriceEntry] = &[
    PriceEntry {
        keys: &["rice", "চাল"],
        base_price: 80.0,
        mode: PricingMode::PerMeasure,
    },
    PriceEntry {
        keys: &["flour", "atta", "আটা"],
        base_price: 55.0,
        mode: PricingMode::PerMeasure,
    },
    PriceEntry {
        keys: &["lentil", "dal", "ডাল"],
        base_price: 140.0,
        mode: PricingMode::PerMeasure,
    },
    PriceEntry {
        keys: &["oil", "তেল"],
        base_price: 170.0,
        mode: PricingMode::PerMeasure,
    },
    PriceEntry {
        keys: &["salt", "লবণ"],
        base_price: 40.0,
        mode: PricingMode::PerMeasure,
    },
    PriceEntry {
        keys: &["sugar", "চিনি"],
        base_price: 130.0,
        mode: PricingMode::PerMeasure,
    },
    PriceEntry {
        keys: &["onion", "পেঁয়াজ"],
        base_price: 60.0,
        mode: PricingMode::PerMeasure,
    },
    PriceEntry {
        keys: &["potato", "আলু"],
        base_price: 40.0,
        mode: PricingMode::PerMeasure,
    },
    PriceEntry {
        keys: &["tomato", "টমেটো"],
        base_price: 80.0,
        mode: PricingMode::PerMeasure,
    },
    PriceEntry {
        keys: &["garlic", "রসুন"],
        base_price: 220.0,
        mode: PricingMode::PerMeasure,
    },
    PriceEntry {
        keys: &["ginger", "আদা"],
        base_price: 280.0,
        mode: PricingMode::PerMeasure,
    },
    PriceEntry {
        keys: &["egg", "ডিম"],
        base_price: 14.0,
        mode: PricingMode::PerPiece,
    },
    PriceEntry {
        keys: &["milk", "দুধ"],
        base_price: 90.0,
        mode: PricingMode::PerMeasure,
    },
    // "গরুর মাংস" and "খাসির মাংস" contain the generic "মাংস" key below;
    // specific entries must come first.
    PriceEntry {
        keys: &["beef", "গরুর মাংস"],
        base_price: 780.0,
        mode: PricingMode::PerMeasure,
    },
    PriceEntry {
        keys: &["mutton", "খাসির মাংস"],
        base_price: 1100.0,
        mode: PricingMode::PerMeasure,
    },
    PriceEntry {
        keys: &["chicken", "মুরগি", "মাংস"],
        base_price: 220.0,
        mode: PricingMode::PerMeasure,
    },
    PriceEntry {
        keys: &["fish", "মাছ"],
        base_price: 350.0,
        mode: PricingMode::PerMeasure,
    },
    PriceEntry {
        keys: &["tea", "চা"],
        base_price: 350.0,
        mode: PricingMode::PerMeasure,
    },
    PriceEntry {
        keys: &["bread", "পাউরুটি"],
        base_price: 45.0,
        mode: PricingMode::PerPiece,
    },
    PriceEntry {
        keys: &["biscuit", "বিস্কুট"],
        base_price: 40.0,
        mode: PricingMode::PerPiece,
    },
    PriceEntry {
        keys: &["sauce", "ketchup", "সস"],
        base_price: 150.0,
        mode: PricingMode::PerPiece,
    },
    PriceEntry {
        keys: &["soap", "সাবান"],
        base_price: 55.0,
        mode: PricingMode::PerPiece,
    },
    PriceEntry {
        keys: &["shampoo", "শ্যাম্পু"],
        base_price: 260.0,
        mode: PricingMode::PerPiece,
    },
    PriceEntry {
        keys: &["toothpaste", "টুথপেস্ট"],
        base_price: 120.0,
        mode: PricingMode::PerPiece,
    },
];

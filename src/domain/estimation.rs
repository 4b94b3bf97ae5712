//! Deterministic fallback price estimation.
//!
//! Used when the remote price oracle is unreachable or errors. Pure and
//! total: no I/O, no randomness, always returns a finite non-negative BDT
//! amount, so callers can invoke it unconditionally.

use super::entities::Unit;
use super::price_table::{PriceEntry, PriceTable, PricingMode};

/// Granularity of estimated prices. Everything is rounded to the nearest
/// multiple of this in BDT.
const PRICE_STEP: f64 = 5.0;

/// Smallest price the estimator will ever produce. Avoids degenerate
/// near-zero outputs for tiny quantities.
const PRICE_FLOOR: f64 = 10.0;

/// Estimate a plausible price for `quantity` `unit` of `name`.
///
/// Lookup runs in three tiers against the table (exact key, substring in
/// either direction, then word-level), falling back to the table's default
/// base price. Piece-priced items multiply base by count; measure-priced
/// items scale through the unit conversion factor. An unrecognized unit
/// label passes the quantity through unscaled.
pub fn estimate_price(name: &str, quantity: f64, unit: &str, table: &PriceTable) -> f64 {
    let original = name.trim();
    let lowered = original.to_lowercase();

    let quantity = if quantity.is_finite() && quantity > 0.0 {
        quantity
    } else {
        0.0
    };

    let entry = lookup_entry(table, original, &lowered);
    let base_price = entry
        .map(|entry| entry.base_price)
        .unwrap_or_else(|| table.default_base_price());

    let piece_priced = entry.map(|entry| entry.mode) == Some(PricingMode::PerPiece)
        || has_piece_keyword(table, original, &lowered);

    let raw = if piece_priced {
        base_price * quantity
    } else {
        base_price * conversion_factor(unit) * quantity
    };

    round_to_clean_price(raw)
}

/// True when the name carries one of the fixed piece-priced keywords, in
/// lowercased Latin or original-script form.
fn has_piece_keyword(table: &PriceTable, original: &str, lowered: &str) -> bool {
    table
        .piece_keywords()
        .iter()
        .any(|keyword| lowered.contains(keyword) || original.contains(keyword))
}

/// Tiered table lookup; first hit wins within each tier, and entries are
/// scanned in table order so overlapping keys tie-break deterministically.
fn lookup_entry<'t>(
    table: &'t PriceTable,
    original: &str,
    lowered: &str,
) -> Option<&'t PriceEntry> {
    if lowered.is_empty() {
        return None;
    }

    // Tier a: exact key match (lowercased Latin, or script-exact).
    if let Some(entry) = table.entries().iter().find(|entry| {
        entry
            .keys
            .iter()
            .any(|key| *key == lowered || *key == original)
    }) {
        return Some(entry);
    }

    // Tier b: substring containment in either direction.
    if let Some(entry) = table.entries().iter().find(|entry| {
        entry
            .keys
            .iter()
            .any(|key| contains_either(lowered, key) || contains_either(original, key))
    }) {
        return Some(entry);
    }

    // Tier c: word-level, discarding tokens shorter than 3 characters.
    table.entries().iter().find(|entry| {
        entry.keys.iter().any(|key| {
            lowered
                .split_whitespace()
                .chain(original.split_whitespace())
                .filter(|token| token.chars().count() >= 3)
                .any(|token| contains_either(token, key))
        })
    })
}

fn contains_either(name: &str, key: &str) -> bool {
    name.contains(key) || key.contains(name)
}

fn conversion_factor(unit: &str) -> f64 {
    Unit::parse(unit)
        .map(|unit| unit.conversion_factor())
        .unwrap_or(1.0)
}

/// Round to the nearest PRICE_STEP multiple, then clamp to PRICE_FLOOR.
fn round_to_clean_price(raw: f64) -> f64 {
    let rounded = (raw / PRICE_STEP).round() * PRICE_STEP;
    rounded.max(PRICE_FLOOR)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> PriceTable {
        PriceTable::bd_staples()
    }

    #[test]
    fn exact_match_scales_by_weight() {
        // 80 BDT/kg × 1 × 2 kg
        assert_eq!(estimate_price("rice", 2.0, "kg", &table()), 160.0);
    }

    #[test]
    fn piece_priced_item_rounds_to_clean_price() {
        // 14 BDT/piece × 6 = 84, rounded to the nearest 5
        assert_eq!(estimate_price("eggs", 6.0, "pcs", &table()), 85.0);
    }

    #[test]
    fn unknown_item_uses_the_default_base_price() {
        assert_eq!(
            estimate_price("totally-unknown-item-xyz", 1.0, "kg", &table()),
            100.0
        );
    }

    #[test]
    fn bengali_names_match_script_exact() {
        assert_eq!(estimate_price("চাল", 2.0, "kg", &table()), 160.0);
        assert_eq!(estimate_price("ডিম", 6.0, "pcs", &table()), 85.0);
    }

    #[test]
    fn overlapping_keys_take_the_first_table_entry() {
        // "গরুর মাংস" also contains the generic "মাংস" key; the beef entry
        // is listed first and must win.
        assert_eq!(estimate_price("গরুর মাংস", 1.0, "kg", &table()), 780.0);
    }

    #[test]
    fn substring_matches_run_in_both_directions() {
        // Name contains key.
        assert_eq!(estimate_price("basmati rice", 1.0, "kg", &table()), 80.0);
        // Key contains name.
        assert_eq!(estimate_price("ric", 1.0, "kg", &table()), 80.0);
    }

    #[test]
    fn word_level_match_ignores_short_tokens() {
        // No whole-name containment; the token "chick" is a substring of
        // the "chicken" key. "of" is shorter than 3 chars and is ignored.
        assert_eq!(estimate_price("chick of peas", 1.0, "kg", &table()), 220.0);
    }

    #[test]
    fn piece_keyword_suppresses_measure_scaling() {
        // Even with a gram unit, an egg item is never scaled by 0.001.
        let grams = estimate_price("eggs", 6.0, "g", &table());
        let pieces = estimate_price("eggs", 6.0, "pcs", &table());
        assert_eq!(grams, pieces);
    }

    #[test]
    fn unrecognized_unit_label_passes_quantity_through() {
        assert_eq!(estimate_price("rice", 2.0, "bunch", &table()), 160.0);
    }

    #[test]
    fn output_is_a_clean_multiple_of_five_with_a_floor() {
        let cases = [
            ("rice", 0.01, "kg"),
            ("rice", 1.37, "kg"),
            ("eggs", 1.0, "pcs"),
            ("ginger", 0.25, "kg"),
            ("?", -3.0, "kg"),
            ("", 2.0, "kg"),
        ];
        for (name, quantity, unit) in cases {
            let price = estimate_price(name, quantity, unit, &table());
            assert!(price >= 10.0, "{name}: {price} below floor");
            assert_eq!(price % 5.0, 0.0, "{name}: {price} not a 5-multiple");
        }
    }

    #[test]
    fn estimation_is_deterministic() {
        let first = estimate_price("দেশি মুরগি", 1.5, "kg", &table());
        let second = estimate_price("দেশি মুরগি", 1.5, "kg", &table());
        assert_eq!(first, second);
    }

    #[test]
    fn empty_name_skips_lookup_entirely() {
        // An empty name must not substring-match every key.
        assert_eq!(estimate_price("   ", 1.0, "kg", &table()), 100.0);
    }
}

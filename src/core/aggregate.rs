//! Pure aggregation over box and distribution lists
//!
//! Every total shown anywhere in the workflow comes from these functions,
//! recomputed from the current list on each call. Nothing is cached.

use indexmap::IndexMap;

use crate::core::distribution::DistributionEntry;
use crate::core::order::BoxEntry;

/// Plants per lot label, in order of first occurrence
pub type LotTotals = IndexMap<String, u64>;

/// Sum of plant quantities over all boxes
pub fn total_box_plants(boxes: &[BoxEntry]) -> u64 {
    boxes.iter().map(|b| u64::from(b.plant_quantity)).sum()
}

/// Sum of plant quantities over all distribution entries
pub fn total_distributed(entries: &[DistributionEntry]) -> u64 {
    entries.iter().map(|e| u64::from(e.plant_quantity)).sum()
}

/// Group distribution quantities by lot label
///
/// Labels are grouped exactly as entered, so every key matches the label on
/// its rows. Entries with no lot yet are not attributed to any lot.
pub fn lot_totals(entries: &[DistributionEntry]) -> LotTotals {
    let mut totals = LotTotals::new();
    for entry in entries.iter().filter(|e| !e.lot.is_empty()) {
        *totals.entry(entry.lot.clone()).or_insert(0) += u64::from(entry.plant_quantity);
    }
    totals
}

/// `total - distributed`, negative when over-allocated
pub fn remaining(total: u64, distributed: u64) -> i64 {
    if total >= distributed {
        i64::try_from(total - distributed).unwrap_or(i64::MAX)
    } else {
        i64::try_from(distributed - total).map_or(i64::MIN, |over| -over)
    }
}

//! Distribution allocation: the second stage of the workflow
//!
//! A [`DistributionDraft`] spreads the plants of a submitted order across
//! zones, arches, rows and lots. Totals are recomputed from the entry list on
//! every read.

use serde::{Deserialize, Serialize};

use crate::core::aggregate::{self, LotTotals};
use crate::core::error::{QuantityViolation, SessionError, ValidationError};
use crate::core::order::is_blank;

/// Default ceiling on the number of distribution entries
pub const DEFAULT_MAX_DISTRIBUTION_ENTRIES: usize = 500;

/// One allocation of plants to a physical location and lot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DistributionEntry {
    pub zone: String,
    pub arch: String,
    pub row: String,
    pub lot: String,
    /// May be zero while the entry is being filled in, never at submit
    pub plant_quantity: u32,
}

impl DistributionEntry {
    pub fn blank() -> Self {
        Self::default()
    }

    fn first_missing_field(&self) -> Option<&'static str> {
        [
            ("zone", &self.zone),
            ("arch", &self.arch),
            ("row", &self.row),
            ("lot", &self.lot),
        ]
        .into_iter()
        .find(|(_, value)| is_blank(value))
        .map(|(field, _)| field)
        .or((self.plant_quantity == 0).then_some("plant_quantity"))
    }
}

/// Live figures for the allocation form
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AllocationStatus {
    pub order_total: u64,
    pub distributed: u64,
    /// Negative when more than the order total has been entered
    pub remaining: i64,
    pub lot_totals: LotTotals,
}

/// The editable distribution form
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DistributionDraft {
    total_plants: u64,
    entries: Vec<DistributionEntry>,
    #[serde(skip)]
    max_entries: usize,
}

impl DistributionDraft {
    /// Start allocating `total_plants` with a single blank entry
    pub fn new(total_plants: u64) -> Self {
        Self {
            total_plants,
            entries: vec![DistributionEntry::blank()],
            max_entries: DEFAULT_MAX_DISTRIBUTION_ENTRIES,
        }
    }

    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries.max(1);
        self
    }

    /// Plant total carried over from the order
    pub fn total_plants(&self) -> u64 {
        self.total_plants
    }

    pub fn entries(&self) -> &[DistributionEntry] {
        &self.entries
    }

    /// Append a blank entry
    pub fn add_entry(&mut self) -> Result<(), ValidationError> {
        if self.entries.len() >= self.max_entries {
            return Err(QuantityViolation::TooManyEntries {
                limit: self.max_entries,
            }
            .into());
        }
        self.entries.push(DistributionEntry::blank());
        Ok(())
    }

    /// Remove the entry at `index`
    ///
    /// The list never goes empty: removing the only entry is a no-op.
    pub fn remove_entry(&mut self, index: usize) -> Result<(), SessionError> {
        let len = self.entries.len();
        if index >= len {
            return Err(SessionError::IndexOutOfRange {
                collection: "distribution entry",
                index,
                len,
            });
        }
        if len > 1 {
            self.entries.remove(index);
        }
        Ok(())
    }

    /// Replace the entry at `index` with `entry`
    pub fn update_entry(
        &mut self,
        index: usize,
        entry: DistributionEntry,
    ) -> Result<(), SessionError> {
        let len = self.entries.len();
        let slot = self
            .entries
            .get_mut(index)
            .ok_or(SessionError::IndexOutOfRange {
                collection: "distribution entry",
                index,
                len,
            })?;
        *slot = entry;
        Ok(())
    }

    pub fn total_distributed(&self) -> u64 {
        aggregate::total_distributed(&self.entries)
    }

    /// Shown to the user, only enforced on submit
    pub fn remaining(&self) -> i64 {
        aggregate::remaining(self.total_plants, self.total_distributed())
    }

    pub fn lot_totals(&self) -> LotTotals {
        aggregate::lot_totals(&self.entries)
    }

    pub fn status(&self) -> AllocationStatus {
        let distributed = self.total_distributed();
        AllocationStatus {
            order_total: self.total_plants,
            distributed,
            remaining: aggregate::remaining(self.total_plants, distributed),
            lot_totals: self.lot_totals(),
        }
    }

    /// Validate the allocation and hand back the entry list
    ///
    /// Checks run in a fixed order: incomplete entries, then an empty
    /// allocation, then over-allocation. Allocating fewer plants than ordered
    /// is accepted; the difference shows up as remaining plants in the summary.
    pub fn submit(&self) -> Result<Vec<DistributionEntry>, ValidationError> {
        for (index, entry) in self.entries.iter().enumerate() {
            if let Some(field) = entry.first_missing_field() {
                return Err(ValidationError::missing_at(field, index));
            }
        }

        let distributed = self.total_distributed();
        if distributed == 0 {
            return Err(QuantityViolation::NothingDistributed.into());
        }
        if distributed > self.total_plants {
            return Err(QuantityViolation::OverAllocated {
                distributed,
                total: self.total_plants,
            }
            .into());
        }

        Ok(self.entries.clone())
    }
}

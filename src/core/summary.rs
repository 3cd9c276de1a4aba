//! Read-only summary of a completed order
//!
//! [`OrderSummary::build`] is a pure function of an order and its
//! distribution entries. It recomputes every aggregate itself and performs no
//! validation, so it renders inconsistent input as given.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::core::aggregate::{self, LotTotals};
use crate::core::distribution::DistributionEntry;
use crate::core::order::{BoxEntry, Order};

/// Footer row of the box table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoxFooter {
    pub declared_boxes: u32,
    pub total_plants: u64,
}

/// Figures shown in the undistributed-plants warning
///
/// `order_total == distributed + remaining` always holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reconciliation {
    pub order_total: u64,
    pub distributed: u64,
    pub remaining: u64,
}

/// View model handed to the print collaborator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSummary {
    pub order_number: String,
    pub date: NaiveDate,
    pub description: String,
    pub boxes: Vec<BoxEntry>,
    pub box_footer: BoxFooter,
    pub distributions: Vec<DistributionEntry>,
    pub lot_totals: LotTotals,
    pub total_distributed: u64,
    pub remaining: i64,
    /// Present iff plants are left undistributed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reconciliation: Option<Reconciliation>,
}

impl OrderSummary {
    pub fn build(order: &Order, distributions: &[DistributionEntry]) -> Self {
        let total_distributed = aggregate::total_distributed(distributions);
        let remaining = aggregate::remaining(order.total_plants, total_distributed);

        let reconciliation = (remaining > 0).then(|| Reconciliation {
            order_total: order.total_plants,
            distributed: total_distributed,
            remaining: order.total_plants - total_distributed,
        });

        Self {
            order_number: order.order_number.clone(),
            date: order.date,
            description: order.description.clone(),
            boxes: order.boxes.clone(),
            box_footer: BoxFooter {
                declared_boxes: order.total_boxes,
                total_plants: order.total_plants,
            },
            distributions: distributions.to_vec(),
            lot_totals: aggregate::lot_totals(distributions),
            total_distributed,
            remaining,
            reconciliation,
        }
    }

    pub fn has_undistributed_plants(&self) -> bool {
        self.reconciliation.is_some()
    }
}

/// Page format of the paper form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PageSize {
    A4,
    Letter,
}

/// Finalized, owned copy of a summary for printing or export
///
/// Once taken, a snapshot has no link back to the session it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrintSnapshot {
    pub title: String,
    pub page_size: PageSize,
    pub generated_at: DateTime<Utc>,
    pub summary: OrderSummary,
}

impl PrintSnapshot {
    pub fn new(summary: OrderSummary, page_size: PageSize, generated_at: DateTime<Utc>) -> Self {
        Self {
            title: format!("Pedido - {}", summary.order_number),
            page_size,
            generated_at,
            summary,
        }
    }
}

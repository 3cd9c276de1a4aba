//! The order workflow session
//!
//! A [`Session`] drives one order from intake through distribution to the
//! summary. Control only moves forward, except for the explicit
//! [`Session::back_to_order`] step and [`Session::reset`], which discards
//! everything and starts again at the first stage.

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use std::fmt;

use crate::core::distribution::{
    AllocationStatus, DEFAULT_MAX_DISTRIBUTION_ENTRIES, DistributionDraft, DistributionEntry,
};
use crate::core::error::{NurseryError, NurseryResult, SessionError};
use crate::core::order::{DEFAULT_MAX_BOXES, Order, OrderDraft};
use crate::core::summary::OrderSummary;

/// Workflow stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Order,
    Distribution,
    Summary,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Order => write!(f, "order"),
            Stage::Distribution => write!(f, "distribution"),
            Stage::Summary => write!(f, "summary"),
        }
    }
}

/// Size limits applied to the editable lists
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionLimits {
    pub max_boxes: u32,
    pub max_distribution_entries: usize,
}

impl Default for SessionLimits {
    fn default() -> Self {
        Self {
            max_boxes: DEFAULT_MAX_BOXES,
            max_distribution_entries: DEFAULT_MAX_DISTRIBUTION_ENTRIES,
        }
    }
}

/// Distribution form plus its live figures
#[derive(Debug, Clone, Serialize)]
pub struct DistributionView {
    pub entries: Vec<DistributionEntry>,
    pub status: AllocationStatus,
}

/// Everything a client needs to redraw the current stage
#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub stage: Stage,
    pub order_draft: OrderDraft,
    /// Running total over the boxes entered so far
    pub order_draft_total_plants: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<Order>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distribution: Option<DistributionView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<OrderSummary>,
}

/// In-memory state for one order's lifecycle
#[derive(Debug, Clone)]
pub struct Session {
    stage: Stage,
    order_draft: OrderDraft,
    order: Option<Order>,
    distribution: Option<DistributionDraft>,
    distributions: Option<Vec<DistributionEntry>>,
    limits: SessionLimits,
}

impl Session {
    /// Fresh session at the order stage, dated `today`
    pub fn new(today: NaiveDate, limits: SessionLimits) -> Self {
        Self {
            stage: Stage::Order,
            order_draft: OrderDraft::new(today).with_max_boxes(limits.max_boxes),
            order: None,
            distribution: None,
            distributions: None,
            limits,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn order_draft(&self) -> &OrderDraft {
        &self.order_draft
    }

    pub fn order(&self) -> Option<&Order> {
        self.order.as_ref()
    }

    pub fn distribution(&self) -> Option<&DistributionDraft> {
        self.distribution.as_ref()
    }

    /// Entries accepted by the distribution stage
    pub fn distributions(&self) -> Option<&[DistributionEntry]> {
        self.distributions.as_deref()
    }

    fn require(&self, expected: Stage, operation: &'static str) -> Result<(), SessionError> {
        if self.stage == expected {
            Ok(())
        } else {
            Err(SessionError::WrongStage {
                operation,
                expected,
                actual: self.stage,
            })
        }
    }

    /// Mutable access to the order form, only while at the order stage
    pub fn edit_order(&mut self) -> Result<&mut OrderDraft, SessionError> {
        self.require(Stage::Order, "edit the order")?;
        Ok(&mut self.order_draft)
    }

    /// Mutable access to the distribution form, only while distributing
    pub fn edit_distribution(&mut self) -> NurseryResult<&mut DistributionDraft> {
        self.require(Stage::Distribution, "edit the distribution")?;
        self.distribution
            .as_mut()
            .ok_or_else(|| NurseryError::Internal("distribution stage without a draft".into()))
    }

    /// Distribution form and live figures, only while distributing
    pub fn distribution_view(&self) -> NurseryResult<DistributionView> {
        self.require(Stage::Distribution, "view the distribution")?;
        let draft = self
            .distribution
            .as_ref()
            .ok_or_else(|| NurseryError::Internal("distribution stage without a draft".into()))?;
        Ok(DistributionView {
            entries: draft.entries().to_vec(),
            status: draft.status(),
        })
    }

    /// Submit the order form and move on to distribution
    ///
    /// Each successful submit opens a fresh distribution form for the new
    /// plant total. On failure nothing changes.
    pub fn submit_order(&mut self) -> NurseryResult<&Order> {
        self.require(Stage::Order, "submit the order")?;
        let order = self.order_draft.submit().inspect_err(|e| {
            tracing::warn!(error = %e, "order submission rejected");
        })?;

        tracing::info!(
            order_number = %order.order_number,
            boxes = order.total_boxes,
            plants = order.total_plants,
            "order submitted"
        );

        self.distribution = Some(
            DistributionDraft::new(order.total_plants)
                .with_max_entries(self.limits.max_distribution_entries),
        );
        self.distributions = None;
        self.stage = Stage::Distribution;
        Ok(&*self.order.insert(order))
    }

    /// Return to the order stage keeping the order form as entered
    pub fn back_to_order(&mut self) -> Result<(), SessionError> {
        self.require(Stage::Distribution, "go back to the order")?;
        self.stage = Stage::Order;
        tracing::debug!("returned to order stage");
        Ok(())
    }

    /// Submit the distribution form and move on to the summary
    pub fn submit_distribution(&mut self) -> NurseryResult<&[DistributionEntry]> {
        let draft = self.edit_distribution()?;
        let entries = draft.submit().inspect_err(|e| {
            tracing::warn!(error = %e, "distribution submission rejected");
        })?;
        let remaining = draft.remaining();

        tracing::info!(entries = entries.len(), remaining, "distribution submitted");

        self.stage = Stage::Summary;
        Ok(self.distributions.insert(entries).as_slice())
    }

    /// Build the summary view; only available once distribution is done
    pub fn summary(&self) -> NurseryResult<OrderSummary> {
        self.require(Stage::Summary, "view the summary")?;
        match (&self.order, &self.distributions) {
            (Some(order), Some(entries)) => Ok(OrderSummary::build(order, entries)),
            _ => Err(NurseryError::Internal(
                "summary stage without order or distribution".into(),
            )),
        }
    }

    /// Discard all state and return to the order stage
    pub fn reset(&mut self) {
        *self = Session::new(Utc::now().date_naive(), self.limits);
        tracing::info!("session reset");
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            stage: self.stage,
            order_draft: self.order_draft.clone(),
            order_draft_total_plants: self.order_draft.total_plants(),
            order: self.order.clone(),
            distribution: self.distribution_view().ok(),
            summary: self.summary().ok(),
        }
    }
}

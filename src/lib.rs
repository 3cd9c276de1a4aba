//! # Nursery Orders
//!
//! Order intake and field distribution for a plant nursery.
//!
//! An order is captured as a list of boxes of plants, then its plants are
//! allocated to physical locations (zone, arch, row) and lots, and finally a
//! read-only summary reconciles what was ordered with what was placed.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use nursery::prelude::*;
//!
//! let mut session = Session::new(Utc::now().date_naive(), SessionLimits::default());
//! let draft = session.edit_order()?;
//! draft.set_details(OrderDetails {
//!     order_number: "ORD-1".into(),
//!     date: Some(Utc::now().date_naive()),
//!     description: "Rootstock".into(),
//! });
//! draft.set_box_count(1)?;
//! draft.update_box(0, BoxEntry {
//!     box_number: "B1".into(),
//!     variety: "Kerman".into(),
//!     plant_quantity: 40,
//! })?;
//! session.submit_order()?;
//! ```

pub mod config;
pub mod core;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Domain ===
    pub use crate::core::{
        aggregate::{LotTotals, lot_totals, remaining, total_box_plants, total_distributed},
        auth::{Authenticator, CredentialVerifier, DenyAllVerifier},
        distribution::{AllocationStatus, DistributionDraft, DistributionEntry},
        error::{NurseryError, NurseryResult},
        order::{BoxEntry, Order, OrderDetails, OrderDraft},
        service::{SessionRecord, SessionStore},
        session::{Session, SessionLimits, SessionView, Stage},
        summary::{OrderSummary, PageSize, PrintSnapshot, Reconciliation},
    };

    // === Storage ===
    pub use crate::storage::{InMemorySessionStore, StaticCredentialStore, UserRecord};

    // === Config ===
    pub use crate::config::AppConfig;

    // === Server ===
    pub use crate::server::{ServerBuilder, ServerHost};

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use chrono::{DateTime, NaiveDate, Utc};
    pub use uuid::Uuid;
}

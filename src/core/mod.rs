//! Core domain: order intake, distribution, summary and the session workflow

pub mod aggregate;
pub mod auth;
pub mod distribution;
pub mod error;
pub mod extractors;
pub mod order;
pub mod service;
pub mod session;
pub mod summary;

pub use auth::{Authenticator, CredentialVerifier, DenyAllVerifier};
pub use distribution::{AllocationStatus, DistributionDraft, DistributionEntry};
pub use error::{NurseryError, NurseryResult};
pub use order::{BoxEntry, Order, OrderDetails, OrderDraft};
pub use service::{SessionRecord, SessionStore};
pub use session::{Session, SessionLimits, SessionView, Stage};
pub use summary::{OrderSummary, PageSize, PrintSnapshot};

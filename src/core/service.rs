//! Service trait for session storage

use crate::core::session::{Session, SessionLimits};
use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;
use uuid::Uuid;

/// A logged-in user's workflow session
#[derive(Debug, Clone)]
pub struct SessionRecord {
    /// Bearer token identifying this session
    pub token: Uuid,

    /// Identifier the user logged in with
    pub user: String,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    /// The workflow state itself
    pub session: Session,
}

impl SessionRecord {
    /// Open a fresh session for `user`
    pub fn open(user: impl Into<String>, limits: SessionLimits) -> Self {
        let now = Utc::now();
        Self {
            token: Uuid::new_v4(),
            user: user.into(),
            created_at: now,
            updated_at: now,
            session: Session::new(now.date_naive(), limits),
        }
    }

    /// Update the modification timestamp
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Whether the record has gone untouched for longer than `max_idle`
    pub fn is_idle(&self, max_idle: Duration) -> bool {
        (Utc::now() - self.updated_at)
            .to_std()
            .is_ok_and(|idle| idle > max_idle)
    }
}

/// Storage for live sessions
///
/// Records are handed out as owned copies. A handler edits its copy and
/// writes the whole record back with [`SessionStore::update`]; a failed edit
/// is simply never written.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Store a new session
    async fn create(&self, record: SessionRecord) -> Result<SessionRecord>;

    /// Get a session by token
    async fn get(&self, token: &Uuid) -> Result<Option<SessionRecord>>;

    /// Replace a stored session
    ///
    /// Returns `None` when the token is no longer stored, e.g. after a
    /// concurrent logout or eviction.
    async fn update(&self, token: &Uuid, record: SessionRecord) -> Result<Option<SessionRecord>>;

    /// Forget a session
    async fn delete(&self, token: &Uuid) -> Result<()>;

    /// Number of live sessions
    async fn count(&self) -> Result<usize>;

    /// Drop every session idle for longer than `max_idle`, returning how
    /// many were removed
    async fn purge_idle(&self, max_idle: Duration) -> Result<usize>;
}

//! In-memory implementation of SessionStore

use crate::core::service::{SessionRecord, SessionStore};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use uuid::Uuid;

/// In-memory session store
///
/// Sessions live only as long as the process. Uses RwLock for thread-safe access.
#[derive(Clone)]
pub struct InMemorySessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, SessionRecord>>>,
}

impl InMemorySessionStore {
    /// Create a new in-memory session store
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn create(&self, record: SessionRecord) -> Result<SessionRecord> {
        let mut sessions = self
            .sessions
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        sessions.insert(record.token, record.clone());

        Ok(record)
    }

    async fn get(&self, token: &Uuid) -> Result<Option<SessionRecord>> {
        let sessions = self
            .sessions
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(sessions.get(token).cloned())
    }

    async fn update(&self, token: &Uuid, record: SessionRecord) -> Result<Option<SessionRecord>> {
        let mut sessions = self
            .sessions
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        let Some(slot) = sessions.get_mut(token) else {
            return Ok(None);
        };
        *slot = record.clone();

        Ok(Some(record))
    }

    async fn delete(&self, token: &Uuid) -> Result<()> {
        let mut sessions = self
            .sessions
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        sessions.remove(token);

        Ok(())
    }

    async fn count(&self) -> Result<usize> {
        let sessions = self
            .sessions
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(sessions.len())
    }

    async fn purge_idle(&self, max_idle: Duration) -> Result<usize> {
        let mut sessions = self
            .sessions
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        let before = sessions.len();
        sessions.retain(|_, record| !record.is_idle(max_idle));

        Ok(before - sessions.len())
    }
}

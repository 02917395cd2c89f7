//! In-Memory Session Store Adapter
//!
//! Keeps live support sessions until they are ended or go idle. Nothing is
//! persisted; a restart starts every chat from scratch.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;

use crate::domain::foundation::SessionId;
use crate::domain::support::SupportSession;
use crate::ports::{SessionHandle, SessionStore, SessionStoreError};

#[derive(Debug)]
struct Entry {
    handle: SessionHandle,
    last_active: Instant,
}

/// In-memory storage for live sessions
#[derive(Debug, Clone, Default)]
pub struct InMemorySessionStore {
    sessions: Arc<RwLock<HashMap<SessionId, Entry>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every session (useful for tests)
    pub async fn clear(&self) {
        self.sessions.write().await.clear();
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn insert(&self, session: SupportSession) -> Result<SessionHandle, SessionStoreError> {
        let id = *session.id();
        let mut sessions = self.sessions.write().await;
        if sessions.contains_key(&id) {
            return Err(SessionStoreError::AlreadyExists(id));
        }

        let handle = Arc::new(Mutex::new(session));
        sessions.insert(
            id,
            Entry {
                handle: Arc::clone(&handle),
                last_active: Instant::now(),
            },
        );
        Ok(handle)
    }

    async fn get(&self, id: &SessionId) -> Option<SessionHandle> {
        let mut sessions = self.sessions.write().await;
        let entry = sessions.get_mut(id)?;
        entry.last_active = Instant::now();
        Some(Arc::clone(&entry.handle))
    }

    async fn remove(&self, id: &SessionId) -> bool {
        self.sessions.write().await.remove(id).is_some()
    }

    async fn idle_sessions(&self, max_idle: Duration) -> Vec<SessionId> {
        let now = Instant::now();
        self.sessions
            .read()
            .await
            .iter()
            .filter(|(_, entry)| now.duration_since(entry.last_active) >= max_idle)
            .map(|(id, _)| *id)
            .collect()
    }

    async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

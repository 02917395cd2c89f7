//! Session Store Port - live support sessions.
//!
//! Each session sits behind its own async mutex so one chat's turn never
//! blocks another's. Removing a session only drops the store's handle; a
//! task still holding a handle notices via [`SessionStore::get`] returning
//! `None` on its next step.
//!
//! Every successful lookup counts as activity, so a session being read or
//! driven by a running turn is never idle.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use crate::domain::foundation::SessionId;
use crate::domain::support::SupportSession;

/// Shared handle to one live session.
pub type SessionHandle = Arc<Mutex<SupportSession>>;

#[derive(Debug, thiserror::Error)]
pub enum SessionStoreError {
    #[error("Session already exists: {0}")]
    AlreadyExists(SessionId),
}

#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Register a new session and return its handle.
    ///
    /// # Errors
    /// Returns `AlreadyExists` if the id is taken
    async fn insert(&self, session: SupportSession) -> Result<SessionHandle, SessionStoreError>;

    /// Look up a live session and mark it active.
    async fn get(&self, id: &SessionId) -> Option<SessionHandle>;

    /// Drop a session. Returns false if it was not live.
    async fn remove(&self, id: &SessionId) -> bool;

    /// Sessions with no lookup for at least `max_idle`.
    async fn idle_sessions(&self, max_idle: Duration) -> Vec<SessionId>;

    /// Number of live sessions.
    async fn len(&self) -> usize;
}

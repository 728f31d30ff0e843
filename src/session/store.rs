//! Session store
//!
//! The top-level maps have their own lock; each session and each reading
//! history has its own mutex. Map locks are never held across an await on
//! a per-session lock. A session lock may be held while a map lock is taken.

use super::Session;
use crate::trend::{ReadingHistory, ReadingStats};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// Shared handle to one session, locked for the duration of a mutation
pub type SessionHandle = Arc<Mutex<Session>>;

/// Owner of every session and every reading history
#[derive(Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<String, SessionHandle>>,
    /// Kept separately so readings survive a reset
    readings: RwLock<HashMap<String, Arc<Mutex<ReadingHistory>>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a session, creating it when the id is absent, blank or unknown.
    ///
    /// A supplied but unknown id is adopted as the new session's id, so a
    /// client that reset its conversation re-attaches to its readings.
    /// Returns the handle and whether a session was created.
    pub async fn get_or_create(&self, id: Option<&str>) -> (SessionHandle, bool) {
        let id = match id.map(str::trim).filter(|s| !s.is_empty()) {
            Some(id) => {
                if let Some(handle) = self.get(id).await {
                    return (handle, false);
                }
                id.to_string()
            }
            None => uuid::Uuid::new_v4().to_string(),
        };

        let readings = self.readings_for(&id).await;

        let mut sessions = self.sessions.write().await;
        // Another request may have created it while we waited for the lock
        if let Some(handle) = sessions.get(&id) {
            return (handle.clone(), false);
        }
        let handle = Arc::new(Mutex::new(Session::new(id.clone(), readings)));
        sessions.insert(id.clone(), handle.clone());
        drop(sessions);

        tracing::info!(session_id = %id, "Session created");
        (handle, true)
    }

    pub async fn get(&self, id: &str) -> Option<SessionHandle> {
        self.sessions.read().await.get(id).cloned()
    }

    /// Drop the session's messages and dialogue state, keeping its readings.
    ///
    /// Unknown ids are a no-op. Returns whether a session was removed.
    pub async fn reset(&self, id: &str) -> bool {
        let removed = self.sessions.write().await.remove(id).is_some();
        if removed {
            tracing::info!(session_id = %id, "Session reset");
        }
        removed
    }

    /// Whether `handle` is still the live session for `id`
    pub async fn is_current(&self, id: &str, handle: &SessionHandle) -> bool {
        self.sessions
            .read()
            .await
            .get(id)
            .is_some_and(|live| Arc::ptr_eq(live, handle))
    }

    /// Append to a session's history. Returns false for unknown ids.
    #[cfg(test)]
    pub async fn append_message(&self, id: &str, role: super::Role, text: impl Into<String>) -> bool {
        let Some(handle) = self.get(id).await else {
            return false;
        };
        handle.lock().await.append(role, text);
        true
    }

    /// Reading statistics, `None` when the id has no readings
    pub async fn stats(&self, id: &str) -> Option<ReadingStats> {
        let history = self.readings.read().await.get(id).cloned()?;
        let history = history.lock().await;
        history.stats()
    }

    /// Number of live sessions
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    async fn readings_for(&self, id: &str) -> Arc<Mutex<ReadingHistory>> {
        if let Some(history) = self.readings.read().await.get(id) {
            return history.clone();
        }
        self.readings
            .write()
            .await
            .entry(id.to_string())
            .or_default()
            .clone()
    }
}

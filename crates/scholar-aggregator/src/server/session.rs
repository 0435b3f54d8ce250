//! Per-client session registry for the HTTP transport.
//!
//! Each `Mcp-Session-Id` owns one [`SearchSession`]; sessions idle for longer than
//! the timeout are dropped by a background task.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{Mutex, RwLock};

use crate::search::SearchSession;

/// Idle time after which a session is dropped.
const SESSION_TIMEOUT: Duration = Duration::from_secs(3600);

/// Interval between stale-session sweeps.
const CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

/// One connected client.
pub struct ClientSession {
    /// Unique session identifier (uuid v4).
    pub id: String,
    /// Search state of this client.
    pub search: Arc<Mutex<SearchSession>>,
    /// When the session was created.
    pub created_at: Instant,
    last_active: RwLock<Instant>,
}

impl ClientSession {
    /// Create an empty session.
    #[must_use]
    pub fn new(id: String) -> Self {
        Self {
            id,
            search: Arc::new(Mutex::new(SearchSession::new())),
            created_at: Instant::now(),
            last_active: RwLock::new(Instant::now()),
        }
    }

    /// Header value carrying the session id.
    #[must_use]
    pub fn header_value(&self) -> Option<axum::http::HeaderValue> {
        axum::http::HeaderValue::from_str(&self.id).ok()
    }

    /// Check if the session has been idle past `timeout`.
    pub async fn is_stale(&self, timeout: Duration) -> bool {
        self.last_active.read().await.elapsed() > timeout
    }

    /// Update last activity timestamp.
    pub async fn touch(&self) {
        *self.last_active.write().await = Instant::now();
    }
}

impl std::fmt::Debug for ClientSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientSession").field("id", &self.id).field("created_at", &self.created_at).finish()
    }
}

/// Session registry.
#[derive(Clone)]
pub struct SessionManager {
    sessions: Arc<RwLock<HashMap<String, Arc<ClientSession>>>>,
    timeout: Duration,
}

impl SessionManager {
    /// Create a registry with the default idle timeout.
    #[must_use]
    pub fn new() -> Self {
        Self::with_timeout(SESSION_TIMEOUT)
    }

    /// Create a registry with a custom idle timeout.
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        Self { sessions: Arc::new(RwLock::new(HashMap::new())), timeout }
    }

    /// Create a new session.
    pub async fn create_session(&self) -> Arc<ClientSession> {
        let id = uuid::Uuid::new_v4().to_string();
        let session = Arc::new(ClientSession::new(id.clone()));

        self.sessions.write().await.insert(id, Arc::clone(&session));

        tracing::info!(session_id = %session.id, "Created new session");
        session
    }

    /// Get an existing session by ID.
    pub async fn get_session(&self, id: &str) -> Option<Arc<ClientSession>> {
        self.sessions.read().await.get(id).cloned()
    }

    /// Existing session for `id`, or a new one when unknown or absent.
    pub async fn get_or_create_session(&self, id: Option<&str>) -> Arc<ClientSession> {
        if let Some(id) = id {
            if let Some(session) = self.get_session(id).await {
                session.touch().await;
                return session;
            }
        }
        self.create_session().await
    }

    /// Remove a session.
    pub async fn remove_session(&self, id: &str) -> bool {
        let removed = self.sessions.write().await.remove(id).is_some();
        if removed {
            tracing::info!(session_id = %id, "Removed session");
        }
        removed
    }

    /// Drop sessions idle past the timeout.
    pub async fn cleanup_stale_sessions(&self) -> usize {
        let mut to_remove = Vec::new();

        {
            let sessions = self.sessions.read().await;
            for (id, session) in sessions.iter() {
                if session.is_stale(self.timeout).await {
                    to_remove.push(id.clone());
                }
            }
        }

        let count = to_remove.len();
        if count > 0 {
            let mut sessions = self.sessions.write().await;
            for id in to_remove {
                sessions.remove(&id);
                tracing::info!(session_id = %id, "Cleaned up stale session");
            }
        }

        count
    }

    /// Get session count.
    pub async fn session_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Start background cleanup task.
    pub fn start_cleanup_task(self: Arc<Self>) {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(CLEANUP_INTERVAL);
            loop {
                interval.tick().await;
                let cleaned = self.cleanup_stale_sessions().await;
                if cleaned > 0 {
                    tracing::debug!(count = cleaned, "Session cleanup completed");
                }
            }
        });
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager").field("timeout", &self.timeout).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_session_creation() {
        let manager = SessionManager::new();
        let session = manager.create_session().await;

        assert!(uuid::Uuid::parse_str(&session.id).is_ok());
        assert_eq!(manager.session_count().await, 1);
    }

    #[tokio::test]
    async fn test_get_or_create_reuses_known_id() {
        let manager = SessionManager::new();
        let first = manager.get_or_create_session(None).await;
        let again = manager.get_or_create_session(Some(&first.id)).await;
        assert!(Arc::ptr_eq(&first, &again));

        let other = manager.get_or_create_session(Some("unknown")).await;
        assert_ne!(other.id, first.id);
        assert_eq!(manager.session_count().await, 2);
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let manager = SessionManager::new();
        let a = manager.create_session().await;
        let b = manager.create_session().await;

        a.search.lock().await.set_sort(crate::models::SortOption::Date);
        assert_eq!(b.search.lock().await.sort_option(), crate::models::SortOption::Relevance);
    }

    #[tokio::test]
    async fn test_stale_cleanup() {
        let manager = SessionManager::with_timeout(Duration::ZERO);
        let session = manager.create_session().await;
        tokio::time::sleep(Duration::from_millis(5)).await;

        assert_eq!(manager.cleanup_stale_sessions().await, 1);
        assert!(manager.get_session(&session.id).await.is_none());
        assert!(!manager.remove_session(&session.id).await);
    }
}

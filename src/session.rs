//! Per-browser session context.
//!
//! Each browser carries a random session id in a cookie. Its [`SessionState`] sits behind its own
//! mutex, so interactions from one browser run one at a time while different browsers proceed
//! independently.

use crate::notice::Notice;
use axum::http::{HeaderMap, HeaderValue, header};
use std::collections::HashMap;
use std::sync::Arc;
use time::{Duration, OffsetDateTime};
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

/// Name of the cookie carrying the session id.
pub const SESSION_COOKIE: &str = "pdf_desk_session";

/// State remembered between interactions of one browser.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    /// Completion time of the last archive ingestion.
    pub upload_time: Option<OffsetDateTime>,
    /// Identifiers issued by the backend for the last archive's documents.
    pub file_ids: Vec<String>,
    /// Outcome of the last create action.
    pub create_status: Option<Notice>,
    /// Banners from the last upload action.
    pub upload_status: Vec<Notice>,
    /// Per-document lines from the last upload action.
    pub upload_lines: Vec<String>,
    /// Banners from the last question.
    pub ask_outcome: Vec<Notice>,
    /// Answer to the last question, if one arrived.
    pub answer: Option<String>,
    /// Last question as typed.
    pub last_question: String,
    /// Outcome of the last delete action.
    pub delete_status: Option<Notice>,
}

impl SessionState {
    /// Remember a completed ingestion.
    pub fn record_upload(&mut self, at: OffsetDateTime, file_ids: Vec<String>) {
        self.upload_time = Some(at);
        self.file_ids = file_ids;
    }

    /// Forget uploads after the remote resource has gone away.
    pub fn clear_uploads(&mut self) {
        self.upload_time = None;
        self.file_ids.clear();
    }
}

/// Shared handle to one session's state.
pub type SessionHandle = Arc<Mutex<SessionState>>;

/// Session resolved for an incoming request.
pub struct ResolvedSession {
    /// Session identifier.
    pub id: Uuid,
    /// State handle; lock it for the duration of the interaction.
    pub state: SessionHandle,
    /// `Set-Cookie` value to send when the session was created by this request.
    pub set_cookie: Option<HeaderValue>,
}

/// Sessions untouched for this long are pruned.
pub const SESSION_IDLE_TIMEOUT: Duration = Duration::hours(1);

/// Upper bound on concurrently tracked sessions.
pub const MAX_SESSIONS: usize = 10_000;

struct SessionEntry {
    state: SessionHandle,
    last_seen: OffsetDateTime,
}

/// In-memory registry of sessions keyed by id.
///
/// Idle sessions are dropped whenever a new one is created, and the registry never holds more
/// than its cap; the least recently seen session goes first.
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, SessionEntry>>,
    idle_timeout: Duration,
    max_sessions: usize,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_limits(SESSION_IDLE_TIMEOUT, MAX_SESSIONS)
    }
}

impl SessionStore {
    /// Create an empty store with the default limits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store with a custom idle timeout and capacity.
    pub fn with_limits(idle_timeout: Duration, max_sessions: usize) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            idle_timeout,
            max_sessions: max_sessions.max(1),
        }
    }

    /// Find the session named by the request cookie, creating a fresh one when absent or unknown.
    pub async fn resolve(&self, headers: &HeaderMap) -> ResolvedSession {
        self.resolve_at(headers, OffsetDateTime::now_utc()).await
    }

    async fn resolve_at(&self, headers: &HeaderMap, now: OffsetDateTime) -> ResolvedSession {
        let mut sessions = self.sessions.write().await;

        if let Some(id) = session_id_from_headers(headers) {
            if let Some(entry) = sessions.get_mut(&id) {
                if now - entry.last_seen < self.idle_timeout {
                    entry.last_seen = now;
                    return ResolvedSession {
                        id,
                        state: Arc::clone(&entry.state),
                        set_cookie: None,
                    };
                }
            }
        }

        let before = sessions.len();
        sessions.retain(|_, entry| now - entry.last_seen < self.idle_timeout);
        while sessions.len() >= self.max_sessions {
            let Some(oldest) = sessions
                .iter()
                .min_by_key(|(_, entry)| entry.last_seen)
                .map(|(id, _)| *id)
            else {
                break;
            };
            sessions.remove(&oldest);
        }
        let pruned = before - sessions.len();
        if pruned > 0 {
            tracing::debug!(pruned, remaining = sessions.len(), "Pruned sessions");
        }

        let id = Uuid::new_v4();
        let state = SessionHandle::default();
        sessions.insert(
            id,
            SessionEntry {
                state: Arc::clone(&state),
                last_seen: now,
            },
        );
        tracing::debug!(session = %id, "Created session");

        ResolvedSession {
            id,
            state,
            set_cookie: session_cookie(id),
        }
    }

    #[cfg(test)]
    pub(crate) async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

fn session_id_from_headers(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| Uuid::parse_str(value.trim()).ok())
}

fn session_cookie(id: Uuid) -> Option<HeaderValue> {
    HeaderValue::from_str(&format!(
        "{SESSION_COOKIE}={id}; Path=/; HttpOnly; SameSite=Lax"
    ))
    .ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn new_requests_get_a_cookie_and_returning_ones_reuse_state() {
        let store = SessionStore::new();
        let first = store.resolve(&HeaderMap::new()).await;
        let cookie = first.set_cookie.clone().expect("cookie issued");
        first
            .state
            .lock()
            .await
            .record_upload(OffsetDateTime::UNIX_EPOCH, vec!["file-1".into()]);

        let mut headers = HeaderMap::new();
        let pair = cookie.to_str().expect("ascii").split(';').next().expect("pair");
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&format!("theme=dark; {pair}")).expect("header"),
        );

        let second = store.resolve(&headers).await;
        assert_eq!(second.id, first.id);
        assert!(second.set_cookie.is_none());
        assert_eq!(second.state.lock().await.file_ids, vec!["file-1".to_string()]);
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn unknown_or_malformed_ids_start_fresh_sessions() {
        let store = SessionStore::new();
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("pdf_desk_session=not-a-uuid"),
        );
        let resolved = store.resolve(&headers).await;
        assert!(resolved.set_cookie.is_some());

        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&format!("{SESSION_COOKIE}={}", Uuid::new_v4()))
                .expect("header"),
        );
        let resolved = store.resolve(&headers).await;
        assert!(resolved.set_cookie.is_some());
        assert_eq!(store.len().await, 2);
    }

    #[test]
    fn clearing_uploads_resets_gate_inputs() {
        let mut state = SessionState::default();
        state.record_upload(OffsetDateTime::UNIX_EPOCH, vec!["a".into(), "b".into()]);
        state.clear_uploads();
        assert!(state.upload_time.is_none());
        assert!(state.file_ids.is_empty());
    }

    fn cookie_headers(id: Uuid) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&format!("{SESSION_COOKIE}={id}")).expect("header"),
        );
        headers
    }

    #[tokio::test]
    async fn idle_sessions_are_pruned_when_new_ones_arrive() {
        let store = SessionStore::with_limits(Duration::minutes(10), 100);
        let t0 = OffsetDateTime::UNIX_EPOCH;

        let stale = store.resolve_at(&HeaderMap::new(), t0).await;
        let active = store.resolve_at(&HeaderMap::new(), t0).await;
        store
            .resolve_at(&cookie_headers(active.id), t0 + Duration::minutes(8))
            .await;

        store
            .resolve_at(&HeaderMap::new(), t0 + Duration::minutes(12))
            .await;
        assert_eq!(store.len().await, 2);

        let revisit = store
            .resolve_at(&cookie_headers(stale.id), t0 + Duration::minutes(12))
            .await;
        assert_ne!(revisit.id, stale.id);
        assert!(revisit.set_cookie.is_some());

        let kept = store
            .resolve_at(&cookie_headers(active.id), t0 + Duration::minutes(13))
            .await;
        assert_eq!(kept.id, active.id);
    }

    #[tokio::test]
    async fn cookieless_traffic_stays_within_capacity() {
        let store = SessionStore::with_limits(Duration::hours(1), 50);
        let t0 = OffsetDateTime::UNIX_EPOCH;

        let first = store.resolve_at(&HeaderMap::new(), t0).await;
        for i in 1..1_000 {
            store
                .resolve_at(&HeaderMap::new(), t0 + Duration::milliseconds(i))
                .await;
        }

        assert_eq!(store.len().await, 50);
        let revisit = store
            .resolve_at(&cookie_headers(first.id), t0 + Duration::seconds(2))
            .await;
        assert_ne!(revisit.id, first.id);
    }
}

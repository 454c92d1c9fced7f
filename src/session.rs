use axum::http::{header, HeaderMap, HeaderValue};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::constants::{MAX_SESSIONS, SESSION_COOKIE, SESSION_TTL};
use crate::types::{PlatformProfile, SubmissionContext};

struct SessionEntry {
    profile: PlatformProfile,
    created: Instant,
    seq: u64,
}

/// Server-side session state, keyed by the `fan_session` cookie.
///
/// Holds only what the platform-linking step produced; nothing here is persisted.
/// Ids are always minted here, never taken from the client.
pub struct SessionStore {
    entries: RwLock<HashMap<Uuid, SessionEntry>>,
    next_seq: AtomicU64,
    ttl: Duration,
    capacity: usize,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_limits(SESSION_TTL, MAX_SESSIONS)
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_limits(ttl: Duration, capacity: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            next_seq: AtomicU64::new(0),
            ttl,
            capacity: capacity.max(1),
        }
    }

    pub async fn profile(&self, id: Uuid) -> Option<PlatformProfile> {
        self.entries
            .read()
            .await
            .get(&id)
            .filter(|e| e.created.elapsed() < self.ttl)
            .map(|e| e.profile.clone())
    }

    /// Stores a profile under a fresh id and returns it.
    ///
    /// Expired entries are dropped first; if the store is still full the oldest goes.
    pub async fn start_session(&self, profile: PlatformProfile) -> Uuid {
        let mut entries = self.entries.write().await;
        entries.retain(|_, e| e.created.elapsed() < self.ttl);
        while entries.len() >= self.capacity {
            let oldest = entries
                .iter()
                .min_by_key(|(_, e)| e.seq)
                .map(|(id, _)| *id);
            match oldest {
                Some(id) => {
                    entries.remove(&id);
                    debug!("Evicted oldest session");
                }
                None => break,
            }
        }

        let id = Uuid::new_v4();
        entries.insert(
            id,
            SessionEntry {
                profile,
                created: Instant::now(),
                seq: self.next_seq.fetch_add(1, Ordering::Relaxed),
            },
        );
        id
    }

    pub async fn end_session(&self, id: Uuid) {
        self.entries.write().await.remove(&id);
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Context for the submission pipeline of this session.
    pub async fn context(&self, id: Option<Uuid>) -> SubmissionContext {
        let profile = match id {
            Some(id) => self.profile(id).await,
            None => None,
        };
        SubmissionContext { profile }
    }
}

/// Session id from the request cookies, if present and well-formed.
pub fn session_id(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| Uuid::parse_str(value.trim()).ok())
}

pub fn session_cookie(id: Uuid) -> HeaderValue {
    let cookie = format!("{SESSION_COOKIE}={id}; Path=/; HttpOnly; SameSite=Lax");
    HeaderValue::from_str(&cookie).unwrap_or_else(|_| HeaderValue::from_static(""))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(login: &str) -> PlatformProfile {
        PlatformProfile {
            login: login.into(),
            followed_channels: vec!["gaules".into()],
            detected_themes: vec!["FPS".into()],
        }
    }

    #[test]
    fn cookie_round_trips_through_headers() {
        let id = Uuid::new_v4();
        let cookie = session_cookie(id);
        let value = cookie.to_str().unwrap();
        let pair = value.split(';').next().unwrap();

        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_str(&format!("theme=dark; {pair}")).unwrap(),
        );
        assert_eq!(session_id(&headers), Some(id));
    }

    #[test]
    fn garbage_cookie_is_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("fan_session=not-a-uuid"));
        assert_eq!(session_id(&headers), None);
        assert_eq!(session_id(&HeaderMap::new()), None);
    }

    #[tokio::test]
    async fn context_carries_stored_profile() {
        let store = SessionStore::new();
        assert_eq!(store.context(Some(Uuid::new_v4())).await.profile, None);

        let id = store.start_session(profile("maria")).await;
        assert_eq!(store.context(Some(id)).await.profile, Some(profile("maria")));
        assert_eq!(store.context(None).await.profile, None);
    }

    #[tokio::test]
    async fn every_session_gets_a_new_id() {
        let store = SessionStore::new();
        let first = store.start_session(profile("maria")).await;
        let second = store.start_session(profile("maria")).await;
        assert_ne!(first, second);

        store.end_session(first).await;
        assert_eq!(store.profile(first).await, None);
        assert!(store.profile(second).await.is_some());
    }

    #[tokio::test]
    async fn oldest_session_is_evicted_at_capacity() {
        let store = SessionStore::with_limits(SESSION_TTL, 2);
        let a = store.start_session(profile("a")).await;
        let b = store.start_session(profile("b")).await;
        let c = store.start_session(profile("c")).await;

        assert_eq!(store.len().await, 2);
        assert_eq!(store.profile(a).await, None);
        assert!(store.profile(b).await.is_some());
        assert!(store.profile(c).await.is_some());
    }

    #[tokio::test]
    async fn expired_sessions_are_invisible_and_dropped() {
        let store = SessionStore::with_limits(Duration::ZERO, 10);
        let a = store.start_session(profile("a")).await;
        assert_eq!(store.profile(a).await, None);

        store.start_session(profile("b")).await;
        assert_eq!(store.len().await, 1);
    }
}

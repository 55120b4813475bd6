//! Explicit auth session context with change subscriptions.
//!
//! A [`SessionStore`] is created once by the application and handed to
//! whatever needs it (the API client, the CLI). Listeners registered with
//! [`SessionStore::subscribe`] are called with the new state after every
//! [`set`](SessionStore::set) or [`clear`](SessionStore::clear). Listeners
//! run without any store lock held, so they may subscribe or unsubscribe.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            email: None,
            expires_at: None,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

type Listener = Arc<dyn Fn(Option<&Session>) + Send + Sync>;

pub struct SessionStore {
    session: RwLock<Option<Session>>,
    listeners: RwLock<BTreeMap<SubscriptionId, Listener>>,
    next_id: AtomicU64,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            session: RwLock::new(None),
            listeners: RwLock::new(BTreeMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn with_session(session: Session) -> Self {
        let store = Self::new();
        store.set(session);
        store
    }

    pub fn current(&self) -> Option<Session> {
        self.session
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Token for an `Authorization: Bearer` header, if the session is live.
    pub fn bearer(&self) -> Option<String> {
        self.current()
            .filter(|s| !s.is_expired(Utc::now()))
            .map(|s| s.access_token)
    }

    pub fn set(&self, session: Session) {
        *self
            .session
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = Some(session);
        self.notify();
    }

    pub fn clear(&self) {
        *self
            .session
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = None;
        self.notify();
    }

    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(Option<&Session>) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(id, Arc::new(listener));
        id
    }

    /// Returns `false` if the id was not subscribed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.listeners
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .remove(&id)
            .is_some()
    }

    fn notify(&self) {
        let session = self.current();
        let listeners: Vec<Listener> = self
            .listeners
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .values()
            .cloned()
            .collect();
        for listener in listeners {
            listener(session.as_ref());
        }
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let listeners = self
            .listeners
            .read()
            .map(|l| l.len())
            .unwrap_or_default();
        f.debug_struct("SessionStore")
            .field("signed_in", &self.current().is_some())
            .field("listeners", &listeners)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use std::sync::{Mutex, OnceLock};

    #[test]
    fn test_subscribe_receives_changes() {
        let store = SessionStore::new();
        let seen: Arc<Mutex<Vec<Option<String>>>> = Arc::default();
        let sink = seen.clone();
        store.subscribe(move |s| {
            sink.lock()
                .unwrap()
                .push(s.map(|s| s.access_token.clone()));
        });

        store.set(Session::new("tok"));
        store.clear();

        assert_eq!(*seen.lock().unwrap(), vec![Some("tok".to_string()), None]);
    }

    #[test]
    fn test_unsubscribe_stops_notifications() {
        let store = SessionStore::new();
        let count = Arc::new(AtomicU64::new(0));
        let c = count.clone();
        let id = store.subscribe(move |_| {
            c.fetch_add(1, Ordering::SeqCst);
        });

        store.set(Session::new("a"));
        assert!(store.unsubscribe(id));
        assert!(!store.unsubscribe(id));
        store.set(Session::new("b"));

        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(store.current().unwrap().access_token, "b");
    }

    #[test]
    fn test_listener_can_unsubscribe_and_subscribe() {
        let store = Arc::new(SessionStore::new());
        let own_id: Arc<OnceLock<SubscriptionId>> = Arc::default();
        let late_calls = Arc::new(AtomicU64::new(0));

        let (s, id_cell, late) = (store.clone(), own_id.clone(), late_calls.clone());
        let id = store.subscribe(move |_| {
            if let Some(id) = id_cell.get() {
                s.unsubscribe(*id);
            }
            let late = late.clone();
            s.subscribe(move |_| {
                late.fetch_add(1, Ordering::SeqCst);
            });
        });
        own_id.set(id).unwrap();

        store.set(Session::new("a"));
        assert!(!store.unsubscribe(id));
        assert_eq!(late_calls.load(Ordering::SeqCst), 0);

        store.set(Session::new("b"));
        assert_eq!(late_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_bearer_skips_expired_session() {
        let store = SessionStore::new();
        assert!(store.bearer().is_none());

        store.set(Session {
            access_token: "old".to_string(),
            email: None,
            expires_at: Some(Utc::now() - Duration::minutes(5)),
        });
        assert!(store.bearer().is_none());

        store.set(Session {
            access_token: "fresh".to_string(),
            email: Some("ed@example.org".to_string()),
            expires_at: Some(Utc::now() + Duration::hours(1)),
        });
        assert_eq!(store.bearer().as_deref(), Some("fresh"));
    }

    #[test]
    fn test_session_without_expiry_never_expires() {
        assert!(!Session::new("t").is_expired(Utc::now()));
    }
}

//! Process-wide session store with change notifications

use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};

use crate::Session;

const EVENT_CAPACITY: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthChangeKind {
    SignedIn,
    SignedOut,
    TokenRefreshed,
}

/// Emitted every time the stored session changes
#[derive(Debug, Clone)]
pub struct AuthChangeEvent {
    pub kind: AuthChangeKind,
    /// The session after the change; `None` once signed out
    pub session: Option<Session>,
}

impl AuthChangeEvent {
    /// True when the event leaves no usable session behind
    pub fn ends_session(&self) -> bool {
        self.kind == AuthChangeKind::SignedOut || self.session.is_none()
    }
}

/// Holds the current session and fans out changes to subscribers.
///
/// Cloning the store shares the same session slot and the same channel.
#[derive(Debug, Clone)]
pub struct SessionStore {
    current: Arc<RwLock<Option<Session>>>,
    events: broadcast::Sender<AuthChangeEvent>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            current: Arc::new(RwLock::new(None)),
            events,
        }
    }

    /// The current session. An expired session is dropped on read and
    /// reported to subscribers as a sign-out.
    pub fn get(&self) -> Option<Session> {
        let session = self
            .current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()?;

        if session.is_expired() {
            log::info!("session for user {} expired", session.user.id);
            self.clear();
            return None;
        }

        Some(session)
    }

    pub fn set(&self, session: Session, kind: AuthChangeKind) {
        {
            let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
            *guard = Some(session.clone());
        }
        self.emit(AuthChangeEvent {
            kind,
            session: Some(session),
        });
    }

    /// Drop the session; subscribers hear about it only if one was present
    pub fn clear(&self) -> Option<Session> {
        let previous = {
            let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
            guard.take()
        };

        if previous.is_some() {
            self.emit(AuthChangeEvent {
                kind: AuthChangeKind::SignedOut,
                session: None,
            });
        }
        previous
    }

    pub fn subscribe(&self) -> AuthSubscription {
        AuthSubscription {
            receiver: self.events.subscribe(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.events.receiver_count()
    }

    fn emit(&self, event: AuthChangeEvent) {
        // No receivers is fine: nobody is watching right now.
        let _ = self.events.send(event);
    }
}

/// A live subscription to session changes. Dropping it (or calling
/// [`AuthSubscription::unsubscribe`]) detaches from the store.
#[derive(Debug)]
pub struct AuthSubscription {
    receiver: broadcast::Receiver<AuthChangeEvent>,
}

impl AuthSubscription {
    /// Wait for the next change. Returns `None` once the store is gone.
    pub async fn recv(&mut self) -> Option<AuthChangeEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(RecvError::Lagged(skipped)) => {
                    log::warn!("auth subscriber lagged, skipped {} events", skipped);
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Next change if one is already queued
    pub fn try_recv(&mut self) -> Option<AuthChangeEvent> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => return Some(event),
                Err(TryRecvError::Lagged(_)) => continue,
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return None,
            }
        }
    }

    pub fn unsubscribe(self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::User;

    fn session(expires_at: Option<i64>) -> Session {
        Session {
            access_token: "token".to_string(),
            refresh_token: "refresh".to_string(),
            expires_in: 3600,
            expires_at,
            token_type: "bearer".to_string(),
            user: User {
                id: "user-1".to_string(),
                email: Some("owner@example.com".to_string()),
                phone: None,
                app_metadata: serde_json::Value::Null,
                user_metadata: serde_json::Value::Null,
                created_at: None,
                updated_at: None,
            },
        }
    }

    #[tokio::test]
    async fn test_subscribers_see_sign_in_and_sign_out() {
        let store = SessionStore::new();
        let mut subscription = store.subscribe();

        store.set(session(None), AuthChangeKind::SignedIn);
        store.clear();

        let first = subscription.recv().await.unwrap();
        assert_eq!(first.kind, AuthChangeKind::SignedIn);
        assert!(!first.ends_session());

        let second = subscription.recv().await.unwrap();
        assert_eq!(second.kind, AuthChangeKind::SignedOut);
        assert!(second.ends_session());
    }

    #[test]
    fn test_clear_without_session_is_silent() {
        let store = SessionStore::new();
        let mut subscription = store.subscribe();

        assert!(store.clear().is_none());
        assert!(subscription.try_recv().is_none());
    }

    #[test]
    fn test_expired_session_is_purged_on_read() {
        let store = SessionStore::new();
        store.set(session(Some(1)), AuthChangeKind::SignedIn);
        let mut subscription = store.subscribe();

        assert!(store.get().is_none());
        let event = subscription.try_recv().unwrap();
        assert_eq!(event.kind, AuthChangeKind::SignedOut);
    }

    #[test]
    fn test_unsubscribe_detaches() {
        let store = SessionStore::new();
        let subscription = store.subscribe();
        assert_eq!(store.subscriber_count(), 1);

        subscription.unsubscribe();
        assert_eq!(store.subscriber_count(), 0);
    }
}

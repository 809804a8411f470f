use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::error::AuthError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
    pub user: AuthUser,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    SignedIn(Session),
    SignedOut,
}

/// Authentication collaborator. Only the resolved session's user id matters downstream.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn current_session(&self) -> Option<Session>;

    async fn sign_in_with_password(&self, email: &str, password: &str)
        -> Result<Session, AuthError>;

    /// Register a new user. Returns `None` when the service requires email confirmation
    /// before a session is issued.
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
    ) -> Result<Option<Session>, AuthError>;

    async fn sign_out(&self) -> Result<(), AuthError>;

    /// Session changes from now on.
    fn subscribe(&self) -> broadcast::Receiver<SessionEvent>;
}

/// Current session plus the change feed, shared by the provider implementations.
pub(crate) struct SessionSlot {
    current: tokio::sync::RwLock<Option<Session>>,
    events: broadcast::Sender<SessionEvent>,
}

impl SessionSlot {
    pub(crate) fn new() -> Self {
        let (events, _) = broadcast::channel(16);
        Self {
            current: tokio::sync::RwLock::new(None),
            events,
        }
    }

    pub(crate) async fn get(&self) -> Option<Session> {
        self.current.read().await.clone()
    }

    pub(crate) async fn set(&self, session: Session) {
        *self.current.write().await = Some(session.clone());
        self.publish(SessionEvent::SignedIn(session));
    }

    pub(crate) async fn clear(&self) -> Option<Session> {
        let previous = self.current.write().await.take();
        if previous.is_some() {
            self.publish(SessionEvent::SignedOut);
        }
        previous
    }

    pub(crate) fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    fn publish(&self, event: SessionEvent) {
        if self.events.send(event).is_err() {
            tracing::debug!("No session listeners");
        }
    }
}

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::{broadcast, RwLock};
use uuid::Uuid;

use crate::error::AuthError;
use crate::provider::{AuthProvider, AuthUser, Session, SessionEvent, SessionSlot};

struct Account {
    id: Uuid,
    password: String,
}

/// Auth provider that keeps accounts in memory. Used by tests and offline runs.
pub struct InMemoryAuthProvider {
    accounts: RwLock<HashMap<String, Account>>,
    slot: SessionSlot,
}

impl Default for InMemoryAuthProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryAuthProvider {
    pub fn new() -> Self {
        Self {
            accounts: RwLock::new(HashMap::new()),
            slot: SessionSlot::new(),
        }
    }

    /// Register an account with a fixed user id.
    pub async fn add_user(&self, email: &str, password: &str, id: Uuid) {
        self.accounts.write().await.insert(
            email.to_lowercase(),
            Account {
                id,
                password: password.to_string(),
            },
        );
    }

    fn session_for(id: Uuid, email: &str) -> Session {
        Session {
            access_token: Uuid::new_v4().to_string(),
            refresh_token: None,
            expires_at: None,
            user: AuthUser {
                id,
                email: Some(email.to_string()),
            },
        }
    }
}

#[async_trait]
impl AuthProvider for InMemoryAuthProvider {
    async fn current_session(&self) -> Option<Session> {
        self.slot.get().await
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, AuthError> {
        let id = {
            let accounts = self.accounts.read().await;
            match accounts.get(&email.to_lowercase()) {
                Some(account) if account.password == password => account.id,
                _ => return Err(AuthError::InvalidCredentials),
            }
        };
        let session = Self::session_for(id, email);
        self.slot.set(session.clone()).await;
        Ok(session)
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        _full_name: &str,
    ) -> Result<Option<Session>, AuthError> {
        let id = Uuid::new_v4();
        {
            let mut accounts = self.accounts.write().await;
            let key = email.to_lowercase();
            if accounts.contains_key(&key) {
                return Err(AuthError::SignUpRejected("User already registered".into()));
            }
            accounts.insert(
                key,
                Account {
                    id,
                    password: password.to_string(),
                },
            );
        }
        let session = Self::session_for(id, email);
        self.slot.set(session.clone()).await;
        Ok(Some(session))
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.slot
            .clear()
            .await
            .map(|_| ())
            .ok_or(AuthError::NotSignedIn)
    }

    fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.slot.subscribe()
    }
}

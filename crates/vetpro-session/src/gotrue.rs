//! HTTP client for a GoTrue-compatible authentication service.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use vetpro_core::Config;

use crate::error::AuthError;
use crate::provider::{AuthProvider, AuthUser, Session, SessionEvent, SessionSlot};

#[derive(Debug, Serialize)]
struct PasswordCredentials<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct SignUpRequest<'a> {
    email: &'a str,
    password: &'a str,
    data: SignUpMetadata<'a>,
}

#[derive(Debug, Serialize)]
struct SignUpMetadata<'a> {
    full_name: &'a str,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    user: AuthUser,
}

impl TokenResponse {
    fn into_session(self, now: DateTime<Utc>) -> Session {
        Session {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at: self
                .expires_in
                .map(|secs| now + chrono::Duration::seconds(secs)),
            user: self.user,
        }
    }
}

/// Sign-up answers with a session, or with the bare user when confirmation is pending.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SignUpResponse {
    Session(TokenResponse),
    User(AuthUser),
}

#[derive(Debug, Default, Deserialize)]
struct ServiceError {
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl ServiceError {
    fn into_message(self) -> Option<String> {
        self.error_description.or(self.msg).or(self.message)
    }
}

pub struct GoTrueClient {
    client: Client,
    base_url: String,
    anon_key: String,
    slot: SessionSlot,
}

impl GoTrueClient {
    pub fn new(base_url: &str, anon_key: impl Into<String>) -> Result<Self, AuthError> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
            slot: SessionSlot::new(),
        })
    }

    /// Client for the configured service, or `None` when `AUTH_URL` is not set.
    pub fn from_config(config: &Config) -> Result<Option<Self>, AuthError> {
        let Some(url) = config.auth_url.as_deref() else {
            return Ok(None);
        };
        let key = config
            .auth_anon_key
            .clone()
            .ok_or_else(|| AuthError::Config("AUTH_ANON_KEY is required with AUTH_URL".into()))?;
        Self::new(url, key).map(Some)
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/auth/v1/{}", self.base_url, path)
    }

    fn with_key(&self, request: RequestBuilder) -> RequestBuilder {
        request.header("apikey", &self.anon_key)
    }

    async fn service_error(response: Response) -> AuthError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ServiceError>(&body)
            .ok()
            .and_then(ServiceError::into_message)
            .unwrap_or(body);
        AuthError::Service {
            status: status.as_u16(),
            message,
        }
    }
}

#[async_trait]
impl AuthProvider for GoTrueClient {
    async fn current_session(&self) -> Option<Session> {
        self.slot.get().await
    }

    #[tracing::instrument(skip(self, password))]
    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, AuthError> {
        let response = self
            .with_key(self.client.post(self.endpoint("token")))
            .query(&[("grant_type", "password")])
            .json(&PasswordCredentials { email, password })
            .send()
            .await?;

        match response.status() {
            status if status.is_success() => {}
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED => {
                tracing::warn!("Sign in rejected");
                return Err(AuthError::InvalidCredentials);
            }
            _ => {
                let err = Self::service_error(response).await;
                tracing::error!(error = %err, "Sign in failed");
                return Err(err);
            }
        }

        let token: TokenResponse = response.json().await?;
        let session = token.into_session(Utc::now());
        tracing::info!(user_id = %session.user.id, "Signed in");
        self.slot.set(session.clone()).await;
        Ok(session)
    }

    #[tracing::instrument(skip(self, password, full_name))]
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
    ) -> Result<Option<Session>, AuthError> {
        let response = self
            .with_key(self.client.post(self.endpoint("signup")))
            .json(&SignUpRequest {
                email,
                password,
                data: SignUpMetadata { full_name },
            })
            .send()
            .await?;

        if !response.status().is_success() {
            let err = match Self::service_error(response).await {
                AuthError::Service { message, .. } => AuthError::SignUpRejected(message),
                other => other,
            };
            tracing::error!(error = %err, "Sign up failed");
            return Err(err);
        }

        match response.json::<SignUpResponse>().await? {
            SignUpResponse::Session(token) => {
                let session = token.into_session(Utc::now());
                tracing::info!(user_id = %session.user.id, "Signed up and signed in");
                self.slot.set(session.clone()).await;
                Ok(Some(session))
            }
            SignUpResponse::User(user) => {
                tracing::info!(user_id = %user.id, "Signed up, confirmation pending");
                Ok(None)
            }
        }
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        let session = self.slot.get().await.ok_or(AuthError::NotSignedIn)?;

        let response = self
            .with_key(self.client.post(self.endpoint("logout")))
            .bearer_auth(&session.access_token)
            .send()
            .await?;

        // The local session is dropped even if the service refuses the logout.
        self.slot.clear().await;

        if !response.status().is_success() {
            let err = Self::service_error(response).await;
            tracing::error!(error = %err, "Sign out failed");
            return Err(err);
        }
        tracing::info!(user_id = %session.user.id, "Signed out");
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.slot.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let client = GoTrueClient::new("https://auth.example.com/", "anon").unwrap();
        assert_eq!(
            client.endpoint("signup"),
            "https://auth.example.com/auth/v1/signup"
        );
    }

    #[test]
    fn test_sign_up_response_variants() {
        let with_session = r#"{
            "access_token": "tok",
            "token_type": "bearer",
            "expires_in": 3600,
            "refresh_token": "ref",
            "user": {"id": "6a1f9c36-3c0b-4d8e-9d43-0e4c1a9c8b11", "email": "a@b.com"}
        }"#;
        assert!(matches!(
            serde_json::from_str::<SignUpResponse>(with_session).unwrap(),
            SignUpResponse::Session(_)
        ));

        let pending = r#"{"id": "6a1f9c36-3c0b-4d8e-9d43-0e4c1a9c8b11", "email": "a@b.com"}"#;
        assert!(matches!(
            serde_json::from_str::<SignUpResponse>(pending).unwrap(),
            SignUpResponse::User(_)
        ));
    }

    #[test]
    fn test_service_error_message() {
        let err: ServiceError =
            serde_json::from_str(r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#)
                .unwrap();
        assert_eq!(err.into_message().as_deref(), Some("Invalid login credentials"));
    }

    #[test]
    fn test_expiry_from_expires_in() {
        let now = Utc::now();
        let token = TokenResponse {
            access_token: "tok".into(),
            refresh_token: None,
            expires_in: Some(60),
            user: AuthUser {
                id: uuid::Uuid::new_v4(),
                email: None,
            },
        };
        let session = token.into_session(now);
        assert_eq!(session.expires_at, Some(now + chrono::Duration::seconds(60)));
    }
}

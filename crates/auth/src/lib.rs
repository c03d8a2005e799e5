//! Auth client for the Reelhouse dashboard
//!
//! Email/password sign-in against the hosted auth service, sign-out, token
//! refresh and a process-wide [`SessionStore`] that views subscribe to.

mod store;

use chrono::Utc;
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use store::{AuthChangeEvent, AuthChangeKind, AuthSubscription, SessionStore};

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("API error: {0}")]
    ApiError(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Missing session")]
    MissingSession,
}

impl AuthError {
    /// Text suitable for showing back to the person signing in
    pub fn message(&self) -> String {
        match self {
            AuthError::ApiError(message) => message.clone(),
            other => other.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub app_metadata: serde_json::Value,
    #[serde(default)]
    pub user_metadata: serde_json::Value,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    /// Unix seconds; filled in locally when the server leaves it out
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub token_type: String,
    pub user: User,
}

impl Session {
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires_at) => Utc::now().timestamp() >= expires_at,
            None => false,
        }
    }

    fn stamped(mut self) -> Self {
        if self.expires_at.is_none() {
            self.expires_at = Some(Utc::now().timestamp() + self.expires_in);
        }
        self
    }
}

/// Auth error bodies come in a few shapes depending on the endpoint
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error_description: Option<String>,
    msg: Option<String>,
    message: Option<String>,
    error: Option<String>,
}

async fn check_status(response: Response) -> Result<Response, AuthError> {
    if response.status().is_success() {
        return Ok(response);
    }

    let error_text = response.text().await?;
    let message = serde_json::from_str::<ErrorBody>(&error_text)
        .ok()
        .and_then(|body| {
            body.error_description
                .or(body.msg)
                .or(body.message)
                .or(body.error)
        })
        .unwrap_or(error_text);

    Err(AuthError::ApiError(message))
}

/// Auth client
pub struct Auth {
    url: String,
    key: String,
    http_client: Client,
    store: SessionStore,
}

impl Auth {
    pub fn new(url: &str, key: &str, http_client: Client) -> Self {
        Self {
            url: url.trim_end_matches('/').to_string(),
            key: key.to_string(),
            http_client,
            store: SessionStore::new(),
        }
    }

    /// Exchange email and password for a session
    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, AuthError> {
        let url = format!("{}/auth/v1/token?grant_type=password", self.url);

        let payload = serde_json::json!({
            "email": email,
            "password": password,
        });

        let response = self
            .http_client
            .post(&url)
            .header("apikey", &self.key)
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await?;

        let session = check_status(response).await?.json::<Session>().await?.stamped();
        log::info!("signed in user {}", session.user.id);

        self.store.set(session.clone(), AuthChangeKind::SignedIn);
        Ok(session)
    }

    /// End the current session. The local session is dropped even when the
    /// server rejects the logout call.
    pub async fn sign_out(&self) -> Result<(), AuthError> {
        let session = self.store.get().ok_or(AuthError::MissingSession)?;

        let result = self.revoke_session(&session).await;

        self.store.clear();
        log::info!("signed out user {}", session.user.id);
        result
    }

    /// Log `session` out on the server. The local store is left alone.
    pub async fn revoke_session(&self, session: &Session) -> Result<(), AuthError> {
        let url = format!("{}/auth/v1/logout", self.url);

        let response = self
            .http_client
            .post(&url)
            .header("apikey", &self.key)
            .header("Authorization", format!("Bearer {}", session.access_token))
            .send()
            .await
            .map_err(AuthError::NetworkError)?;

        check_status(response).await.map(|_| ())
    }

    /// Rotate the access token using the stored refresh token
    pub async fn refresh_session(&self) -> Result<Session, AuthError> {
        let session = self.store.get().ok_or(AuthError::MissingSession)?;

        let url = format!("{}/auth/v1/token?grant_type=refresh_token", self.url);

        let payload = serde_json::json!({
            "refresh_token": session.refresh_token,
        });

        let response = self
            .http_client
            .post(&url)
            .header("apikey", &self.key)
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await?;

        let new_session = check_status(response).await?.json::<Session>().await?.stamped();

        self.store.set(new_session.clone(), AuthChangeKind::TokenRefreshed);
        Ok(new_session)
    }

    /// Fetch the signed-in user from the server
    pub async fn get_user(&self) -> Result<User, AuthError> {
        let session = self.store.get().ok_or(AuthError::MissingSession)?;

        let url = format!("{}/auth/v1/user", self.url);

        let response = self
            .http_client
            .get(&url)
            .header("apikey", &self.key)
            .header("Authorization", format!("Bearer {}", session.access_token))
            .send()
            .await?;

        Ok(check_status(response).await?.json::<User>().await?)
    }

    pub fn get_session(&self) -> Option<Session> {
        self.store.get()
    }

    /// Adopt a session obtained elsewhere, e.g. restored from disk
    pub fn set_session(&self, session: Session) {
        self.store.set(session.stamped(), AuthChangeKind::SignedIn);
    }

    pub fn on_auth_state_change(&self) -> AuthSubscription {
        self.store.subscribe()
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn session_body(access_token: &str) -> serde_json::Value {
        json!({
            "access_token": access_token,
            "refresh_token": "test_refresh_token",
            "expires_in": 3600,
            "token_type": "bearer",
            "user": {
                "id": "test_user_id",
                "email": "owner@example.com",
                "phone": null,
                "app_metadata": {},
                "user_metadata": {},
                "created_at": "2024-01-01T00:00:00Z",
                "updated_at": "2024-01-01T00:00:00Z"
            }
        })
    }

    #[tokio::test]
    async fn test_sign_in_stores_session_and_notifies() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .and(query_param("grant_type", "password"))
            .and(header("apikey", "test_key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(session_body("test_access_token")))
            .mount(&mock_server)
            .await;

        let auth = Auth::new(&mock_server.uri(), "test_key", Client::new());
        let mut changes = auth.on_auth_state_change();

        let session = auth
            .sign_in_with_password("owner@example.com", "password123")
            .await
            .unwrap();

        assert_eq!(session.access_token, "test_access_token");
        assert!(session.expires_at.is_some());
        assert_eq!(auth.get_session().unwrap().user.id, "test_user_id");

        let event = changes.recv().await.unwrap();
        assert_eq!(event.kind, AuthChangeKind::SignedIn);
    }

    #[tokio::test]
    async fn test_sign_in_failure_passes_through_message() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": "invalid_grant",
                "error_description": "Invalid login credentials"
            })))
            .mount(&mock_server)
            .await;

        let auth = Auth::new(&mock_server.uri(), "test_key", Client::new());
        let err = auth
            .sign_in_with_password("owner@example.com", "wrong")
            .await
            .unwrap_err();

        assert_eq!(err.message(), "Invalid login credentials");
        assert!(auth.get_session().is_none());
    }

    #[tokio::test]
    async fn test_sign_out_clears_session_even_when_server_rejects() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/v1/logout"))
            .and(header("Authorization", "Bearer stale_token"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .expect(1)
            .mount(&mock_server)
            .await;

        let auth = Auth::new(&mock_server.uri(), "test_key", Client::new());
        let session: Session = serde_json::from_value(session_body("stale_token")).unwrap();
        auth.set_session(session);

        let result = auth.sign_out().await;

        assert!(result.is_err());
        assert!(auth.get_session().is_none());
    }

    #[tokio::test]
    async fn test_sign_out_without_session() {
        let auth = Auth::new("http://localhost:54321", "test_key", Client::new());
        assert!(matches!(auth.sign_out().await, Err(AuthError::MissingSession)));
    }

    #[tokio::test]
    async fn test_refresh_session_rotates_tokens() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/v1/token"))
            .and(query_param("grant_type", "refresh_token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(session_body("new_access_token")))
            .mount(&mock_server)
            .await;

        let auth = Auth::new(&mock_server.uri(), "test_key", Client::new());
        auth.set_session(serde_json::from_value(session_body("old_access_token")).unwrap());
        let mut changes = auth.on_auth_state_change();

        let refreshed = auth.refresh_session().await.unwrap();

        assert_eq!(refreshed.access_token, "new_access_token");
        assert_eq!(changes.recv().await.unwrap().kind, AuthChangeKind::TokenRefreshed);
    }
}

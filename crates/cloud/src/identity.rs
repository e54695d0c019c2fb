//! Hosted identity service client (GoTrue-style REST API).
//!
//! [`IdentityClient`] is a thin, stateless wrapper over the REST endpoints
//! and is what the API server proxies through. [`HostedIdentity`] adds a
//! cached session and change notifications on top of it for long-lived
//! clients, implementing [`IdentityProvider`].

use async_trait::async_trait;
use eventboard_core::session::{AuthChange, Credentials, IdentityError, IdentityProvider, Session, SignUp, User};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tokio::sync::{broadcast, RwLock};

/// Capacity of the change notification channel.
const CHANGE_CHANNEL_CAPACITY: usize = 16;

/// HTTP client for the identity service.
#[derive(Clone)]
pub struct IdentityClient {
    client: reqwest::Client,
    base_url: String,
    anon_key: String,
}

impl IdentityClient {
    pub fn new(base_url: String, anon_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key,
        }
    }

    /// Register a new account. Without auto-confirmation the service returns
    /// only the user and no session.
    pub async fn sign_up(&self, credentials: &Credentials) -> Result<SignUp, IdentityError> {
        let response = self
            .request(Method::POST, "signup")
            .json(credentials)
            .send()
            .await
            .map_err(transport)?;
        let body: Value = Self::parse_response(response).await?;

        if body.get("access_token").is_some() {
            let session: Session = decode(body)?;
            Ok(SignUp {
                user: session.user.clone(),
                session: Some(session),
            })
        } else {
            Ok(SignUp {
                user: decode(body)?,
                session: None,
            })
        }
    }

    /// Password sign-in.
    pub async fn sign_in(&self, credentials: &Credentials) -> Result<Session, IdentityError> {
        let response = self
            .request(Method::POST, "token")
            .query(&[("grant_type", "password")])
            .json(credentials)
            .send()
            .await
            .map_err(transport)?;
        Self::parse_response(response).await
    }

    /// Exchange a refresh token for a new session.
    pub async fn refresh(&self, refresh_token: &str) -> Result<Session, IdentityError> {
        let response = self
            .request(Method::POST, "token")
            .query(&[("grant_type", "refresh_token")])
            .json(&json!({ "refresh_token": refresh_token }))
            .send()
            .await
            .map_err(transport)?;
        Self::parse_response(response).await
    }

    /// The user an access token belongs to.
    pub async fn get_user(&self, access_token: &str) -> Result<User, IdentityError> {
        let response = self
            .request(Method::GET, "user")
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(transport)?;
        Self::parse_response(response).await
    }

    /// Revoke the session behind `access_token`.
    pub async fn sign_out(&self, access_token: &str) -> Result<(), IdentityError> {
        let response = self
            .request(Method::POST, "logout")
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(transport)?;
        Self::ensure_success(response).await?;
        Ok(())
    }

    /// Email a password reset link that lands on `redirect_to`.
    pub async fn send_password_reset(
        &self,
        email: &str,
        redirect_to: &str,
    ) -> Result<(), IdentityError> {
        let response = self
            .request(Method::POST, "recover")
            .query(&[("redirect_to", redirect_to)])
            .json(&json!({ "email": email }))
            .send()
            .await
            .map_err(transport)?;
        Self::ensure_success(response).await?;
        Ok(())
    }

    // ---- private helpers ----

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, format!("{}/auth/v1/{}", self.base_url, path))
            .header("apikey", &self.anon_key)
    }

    /// Map non-2xx responses to [`IdentityError::Rejected`] with the
    /// service's own message.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, IdentityError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            return Err(IdentityError::Rejected {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }
        Ok(response)
    }

    async fn parse_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, IdentityError> {
        let response = Self::ensure_success(response).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| IdentityError::Decode(e.to_string()))
    }
}

fn transport(e: reqwest::Error) -> IdentityError {
    IdentityError::Transport(e.to_string())
}

fn decode<T: DeserializeOwned>(body: Value) -> Result<T, IdentityError> {
    serde_json::from_value(body).map_err(|e| IdentityError::Decode(e.to_string()))
}

/// Pull the human-readable message out of an error body. The service has
/// used several shapes over time.
fn error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            ["error_description", "msg", "message", "error"]
                .iter()
                .find_map(|key| v.get(key).and_then(Value::as_str).map(str::to_string))
        })
        .unwrap_or_else(|| body.to_string())
}

// ---------------------------------------------------------------------------
// Client-side provider
// ---------------------------------------------------------------------------

/// [`IdentityProvider`] over [`IdentityClient`] with a cached session.
pub struct HostedIdentity {
    client: IdentityClient,
    session: RwLock<Option<Session>>,
    changes: broadcast::Sender<AuthChange>,
}

impl HostedIdentity {
    pub fn new(client: IdentityClient) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            client,
            session: RwLock::new(None),
            changes,
        }
    }

    /// Refresh the cached session. A rejected refresh signs the user out.
    pub async fn refresh(&self) -> Result<Session, IdentityError> {
        let refresh_token = match self.session.read().await.as_ref() {
            Some(session) => session.refresh_token.clone(),
            None => return Err(IdentityError::NoSession),
        };

        match self.client.refresh(&refresh_token).await {
            Ok(session) => {
                *self.session.write().await = Some(session.clone());
                self.publish(AuthChange::TokenRefreshed(session.user.clone()));
                Ok(session)
            }
            Err(e @ IdentityError::Rejected { .. }) => {
                *self.session.write().await = None;
                self.publish(AuthChange::SignedOut);
                Err(e)
            }
            Err(e) => Err(e),
        }
    }

    fn publish(&self, change: AuthChange) {
        // No subscribers is fine.
        let _ = self.changes.send(change);
    }
}

fn is_expired(session: &Session) -> bool {
    session
        .expires_at
        .is_some_and(|at| at <= chrono::Utc::now().timestamp())
}

#[async_trait]
impl IdentityProvider for HostedIdentity {
    async fn sign_up(&self, credentials: &Credentials) -> Result<SignUp, IdentityError> {
        let outcome = self.client.sign_up(credentials).await?;
        if let Some(session) = &outcome.session {
            *self.session.write().await = Some(session.clone());
            self.publish(AuthChange::SignedIn(session.user.clone()));
        }
        Ok(outcome)
    }

    async fn sign_in(&self, credentials: &Credentials) -> Result<Session, IdentityError> {
        let session = self.client.sign_in(credentials).await?;
        *self.session.write().await = Some(session.clone());
        tracing::info!(user_id = %session.user.id, "Signed in");
        self.publish(AuthChange::SignedIn(session.user.clone()));
        Ok(session)
    }

    async fn current_session(&self) -> Result<Option<Session>, IdentityError> {
        let cached = self.session.read().await.clone();
        match cached {
            Some(session) if is_expired(&session) => self.refresh().await.map(Some),
            other => Ok(other),
        }
    }

    async fn sign_out(&self) -> Result<(), IdentityError> {
        let session = self.session.write().await.take();
        if let Some(session) = session {
            if let Err(e) = self.client.sign_out(&session.access_token).await {
                tracing::warn!(error = %e, "Remote sign-out failed; local session cleared");
            }
        }
        self.publish(AuthChange::SignedOut);
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthChange> {
        self.changes.subscribe()
    }
}

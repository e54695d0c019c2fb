//! Identity types, the identity provider seam, and the session gate.
//!
//! [`SessionGate`] keeps a cached view of "who is signed in" for one client.
//! It subscribes to the provider's change notifications before asking for
//! the initial session, so a sign-in or sign-out that lands while that first
//! request is in flight is never lost. Consumers read the state through a
//! `watch` channel and gate protected pages with [`SessionGate::require_user`].

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::types::UserId;

/// Path of the sign-in page protected pages redirect to.
pub const SIGN_IN_PATH: &str = "/signin";

/// Role name (in `app_metadata.role`) that grants moderation rights.
pub const ROLE_MODERATOR: &str = "moderator";

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: serde_json::Value,
    #[serde(default)]
    pub app_metadata: serde_json::Value,
}

impl User {
    pub fn role(&self) -> Option<&str> {
        self.app_metadata.get("role").and_then(|r| r.as_str())
    }

    pub fn is_moderator(&self) -> bool {
        self.role() == Some(ROLE_MODERATOR)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    /// Lifetime of `access_token` in seconds.
    #[serde(default)]
    pub expires_in: Option<i64>,
    /// Unix seconds at which `access_token` expires.
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub user: User,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Result of a sign-up. `session` is absent while the address awaits
/// email confirmation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignUp {
    pub user: User,
    pub session: Option<Session>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AuthChange {
    SignedIn(User),
    SignedOut,
    TokenRefreshed(User),
    UserUpdated(User),
}

impl AuthChange {
    /// The signed-in user after this change, if any.
    pub fn into_user(self) -> Option<User> {
        match self {
            Self::SignedIn(user) | Self::TokenRefreshed(user) | Self::UserUpdated(user) => {
                Some(user)
            }
            Self::SignedOut => None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("{message}")]
    Rejected { status: u16, message: String },

    #[error("Not signed in")]
    NoSession,

    #[error("Identity service request failed: {0}")]
    Transport(String),

    #[error("Unexpected identity service response: {0}")]
    Decode(String),
}

/// Hosted identity service as seen by one client.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_up(&self, credentials: &Credentials) -> Result<SignUp, IdentityError>;
    async fn sign_in(&self, credentials: &Credentials) -> Result<Session, IdentityError>;
    async fn current_session(&self) -> Result<Option<Session>, IdentityError>;
    async fn sign_out(&self) -> Result<(), IdentityError>;

    /// Change notifications from this point on.
    fn subscribe(&self) -> broadcast::Receiver<AuthChange>;
}

// ---------------------------------------------------------------------------
// Gate
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct AuthState {
    pub user: Option<User>,
    /// True until the initial session is known.
    pub loading: bool,
}

impl AuthState {
    fn initial() -> Self {
        Self {
            user: None,
            loading: true,
        }
    }
}

/// Why a protected page cannot render yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// The initial session is still being fetched; render nothing.
    Loading,
    /// Nobody is signed in; navigate here.
    Redirect(String),
}

/// `/signin?redirect=<return_path>`.
pub fn sign_in_redirect(return_path: &str) -> String {
    format!("{SIGN_IN_PATH}?redirect={}", urlencoding::encode(return_path))
}

pub struct SessionGate {
    state: watch::Receiver<AuthState>,
    cancel: CancellationToken,
    listener: Option<JoinHandle<()>>,
}

impl SessionGate {
    /// Subscribe to `provider`, then start fetching the initial session.
    ///
    /// Must be called from within a tokio runtime.
    pub fn init(provider: Arc<dyn IdentityProvider>) -> Self {
        let changes = provider.subscribe();
        let (tx, rx) = watch::channel(AuthState::initial());
        let cancel = CancellationToken::new();

        let listener = tokio::spawn(listen(provider, changes, tx, cancel.clone()));

        Self {
            state: rx,
            cancel,
            listener: Some(listener),
        }
    }

    pub fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.clone()
    }

    /// Wait until the initial session is known.
    pub async fn ready(&self) -> AuthState {
        let mut rx = self.state.clone();
        if rx.wait_for(|s| !s.loading).await.is_err() {
            tracing::debug!("Session listener stopped before the initial session loaded");
        }
        let state = rx.borrow().clone();
        state
    }

    /// Gate a protected page at `return_path`.
    pub fn require_user(&self, return_path: &str) -> Result<User, GateDecision> {
        let state = self.state.borrow();
        if state.loading {
            return Err(GateDecision::Loading);
        }
        state
            .user
            .clone()
            .ok_or_else(|| GateDecision::Redirect(sign_in_redirect(return_path)))
    }

    /// Stop listening for changes. The last known state stays readable.
    pub fn teardown(&mut self) {
        self.cancel.cancel();
        self.listener.take();
    }

    pub fn is_active(&self) -> bool {
        !self.cancel.is_cancelled()
    }
}

impl Drop for SessionGate {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn listen(
    provider: Arc<dyn IdentityProvider>,
    mut changes: broadcast::Receiver<AuthChange>,
    tx: watch::Sender<AuthState>,
    cancel: CancellationToken,
) {
    let mut initial = provider.current_session();
    let mut initial_done = false;
    let mut closed = false;

    while !(initial_done && closed) {
        tokio::select! {
            _ = cancel.cancelled() => break,

            result = &mut initial, if !initial_done => {
                initial_done = true;
                let user = match result {
                    Ok(session) => session.map(|s| s.user),
                    Err(e) => {
                        tracing::error!(error = %e, "Failed to load initial session");
                        None
                    }
                };
                // A change notification that already arrived is newer.
                tx.send_if_modified(|state| {
                    if !state.loading {
                        return false;
                    }
                    *state = AuthState { user: user.clone(), loading: false };
                    true
                });
            }

            change = changes.recv(), if !closed => match change {
                Ok(change) => {
                    tracing::debug!(?change, "Auth state changed");
                    tx.send_replace(AuthState {
                        user: change.into_user(),
                        loading: false,
                    });
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Auth change listener lagged");
                }
                Err(broadcast::error::RecvError::Closed) => closed = true,
            },
        }
    }
}

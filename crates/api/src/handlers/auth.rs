//! Handlers for the `/auth` resource.
//!
//! Accounts and sessions live in the hosted identity service; these handlers
//! forward to it and hand its sessions back to the client unchanged.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use eventboard_core::session::{Credentials, Session, SignUp, User};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

const RESET_SENT_MESSAGE: &str = "Password reset instructions sent to your email.";

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/refresh`.
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Request body for `POST /auth/reset-password`.
#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

fn check_credentials(credentials: &Credentials) -> AppResult<()> {
    if credentials.email.trim().is_empty() {
        return Err(AppError::BadRequest("Email is required".into()));
    }
    if credentials.password.is_empty() {
        return Err(AppError::BadRequest("Password is required".into()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/sign-up
///
/// Register with email + password. `session` is null until the address is
/// confirmed.
pub async fn sign_up(
    State(state): State<AppState>,
    Json(input): Json<Credentials>,
) -> AppResult<(StatusCode, Json<DataResponse<SignUp>>)> {
    check_credentials(&input)?;
    let signed_up = state.identity.sign_up(&input).await?;

    tracing::info!(
        user_id = %signed_up.user.id,
        confirmed = signed_up.session.is_some(),
        "User signed up",
    );
    Ok((StatusCode::CREATED, Json(DataResponse { data: signed_up })))
}

/// POST /api/v1/auth/sign-in
pub async fn sign_in(
    State(state): State<AppState>,
    Json(input): Json<Credentials>,
) -> AppResult<Json<DataResponse<Session>>> {
    check_credentials(&input)?;
    let session = state.identity.sign_in(&input).await?;

    tracing::info!(user_id = %session.user.id, "User signed in");
    Ok(Json(DataResponse { data: session }))
}

/// POST /api/v1/auth/refresh
pub async fn refresh(
    State(state): State<AppState>,
    Json(input): Json<RefreshRequest>,
) -> AppResult<Json<DataResponse<Session>>> {
    let session = state.identity.refresh(&input.refresh_token).await?;
    Ok(Json(DataResponse { data: session }))
}

/// POST /api/v1/auth/sign-out
///
/// Revokes the caller's session at the identity service.
pub async fn sign_out(State(state): State<AppState>, user: AuthUser) -> AppResult<StatusCode> {
    state.identity.sign_out(&user.access_token).await?;

    tracing::info!(user_id = %user.user_id, "User signed out");
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/auth/session
///
/// The signed-in user as the identity service currently knows them.
pub async fn session(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<DataResponse<User>>> {
    let current = state.identity.get_user(&user.access_token).await?;
    Ok(Json(DataResponse { data: current }))
}

/// POST /api/v1/auth/reset-password
///
/// Email a reset link pointing at the client's update-password page.
pub async fn reset_password(
    State(state): State<AppState>,
    Json(input): Json<ResetPasswordRequest>,
) -> AppResult<Json<DataResponse<MessageResponse>>> {
    let email = input.email.trim();
    if email.is_empty() {
        return Err(AppError::BadRequest("Email is required".into()));
    }

    let redirect_to = state.config.password_reset_redirect();
    state
        .identity
        .send_password_reset(email, &redirect_to)
        .await?;

    Ok(Json(DataResponse {
        data: MessageResponse {
            message: RESET_SENT_MESSAGE,
        },
    }))
}

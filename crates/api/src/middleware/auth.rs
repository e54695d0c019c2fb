//! Bearer-token authentication extractors for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use eventboard_core::error::CoreError;
use eventboard_core::types::UserId;

use crate::auth::jwt::validate_token;
use crate::error::AppError;
use crate::state::AppState;

/// Signed-in user extracted from an identity access token in the
/// `Authorization` header.
///
/// ```ignore
/// async fn my_handler(user: AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(user_id = %user.user_id, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The identity service's user id (from `claims.sub`).
    pub user_id: UserId,
    pub email: Option<String>,
    /// Application role from `app_metadata.role`, if any.
    pub role: Option<String>,
    /// The raw token, forwarded when proxying to the identity service.
    pub access_token: String,
}

impl AuthUser {
    pub fn is_moderator(&self) -> bool {
        self.role.as_deref() == Some(eventboard_core::session::ROLE_MODERATOR)
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(
                    "Missing Authorization header".into(),
                ))
            })?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid Authorization format. Expected: Bearer <token>".into(),
            ))
        })?;

        let claims = validate_token(token, &state.config.jwt).map_err(|_| {
            AppError::Core(CoreError::Unauthorized("Invalid or expired token".into()))
        })?;

        Ok(AuthUser {
            role: claims.app_role().map(str::to_string),
            user_id: claims.sub,
            email: claims.email,
            access_token: token.to_string(),
        })
    }
}

/// Like [`AuthUser`] but never rejects: a missing or invalid token yields
/// `None`, leaving the handler to decide what an anonymous caller gets.
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<AuthUser>);

impl FromRequestParts<AppState> for MaybeAuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match AuthUser::from_request_parts(parts, state).await {
            Ok(user) => Ok(MaybeAuthUser(Some(user))),
            Err(e) => {
                if parts.headers.contains_key("authorization") {
                    tracing::debug!(error = %e, "Ignoring unusable bearer token");
                }
                Ok(MaybeAuthUser(None))
            }
        }
    }
}

//! Role-based access control extractors.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use eventboard_core::error::CoreError;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Requires the `moderator` application role. Rejects with 403 Forbidden otherwise.
///
/// ```ignore
/// async fn review(RequireModerator(user): RequireModerator) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
pub struct RequireModerator(pub AuthUser);

impl FromRequestParts<AppState> for RequireModerator {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !user.is_moderator() {
            return Err(AppError::Core(CoreError::Forbidden(
                "Moderator role required".into(),
            )));
        }
        Ok(RequireModerator(user))
    }
}

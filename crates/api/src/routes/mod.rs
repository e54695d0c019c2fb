pub mod auth;
pub mod categories;
pub mod coffee_shops;
pub mod events;
pub mod geocode;
pub mod health;
pub mod moderation;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /events                              listing (GET), submit (POST, multipart)
/// /events/map                          approved events as GeoJSON
/// /events/by-slug/{slug}               public detail
///
/// /categories                          category options
/// /geocode?q=                          address suggestions
///
/// /coffee-shops                        legacy collection (bare array)
/// /coffee-shops/map                    legacy collection as GeoJSON
///
/// /auth/sign-up                        register (public)
/// /auth/sign-in                        password sign-in (public)
/// /auth/refresh                        refresh session (public)
/// /auth/sign-out                       sign out (requires auth)
/// /auth/session                        current user (requires auth)
/// /auth/reset-password                 send reset email (public)
///
/// /moderation/events?status=           review queue (moderator)
/// /moderation/events/{id}/status       approve / reject (PUT, moderator)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/events", events::router())
        .nest("/categories", categories::router())
        .nest("/geocode", geocode::router())
        .nest("/coffee-shops", coffee_shops::router())
        .nest("/auth", auth::router())
        .nest("/moderation", moderation::router())
}

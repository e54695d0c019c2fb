//! Route definitions for the `/moderation` resource.

use axum::routing::{get, put};
use axum::Router;

use crate::handlers::moderation;
use crate::state::AppState;

/// Routes mounted at `/moderation`. Every route requires the moderator role.
///
/// ```text
/// GET /events?status=         -> list_events
/// PUT /events/{id}/status     -> update_status
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/events", get(moderation::list_events))
        .route("/events/{id}/status", put(moderation::update_status))
}

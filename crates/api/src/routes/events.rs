//! Route definitions for the `/events` resource.

use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use axum::Router;
use eventboard_core::upload::MAX_IMAGE_BYTES;

use crate::handlers::events;
use crate::state::AppState;

/// Multipart bodies carry one image plus a handful of text fields.
const SUBMISSION_BODY_LIMIT: usize = 2 * MAX_IMAGE_BYTES;

/// Routes mounted at `/events`.
///
/// ```text
/// GET  /                  -> list (public, filtered)
/// POST /                  -> submit (multipart)
/// GET  /map               -> map
/// GET  /by-slug/{slug}    -> get_by_slug
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(events::list).post(events::submit))
        .route("/map", get(events::map))
        .route("/by-slug/{slug}", get(events::get_by_slug))
        .layer(DefaultBodyLimit::max(SUBMISSION_BODY_LIMIT))
}

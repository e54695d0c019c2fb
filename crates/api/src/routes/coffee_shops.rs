//! Route definitions for the legacy `/coffee-shops` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::coffee_shops;
use crate::state::AppState;

/// Routes mounted at `/coffee-shops`.
///
/// ```text
/// GET /      -> list (bare JSON array)
/// GET /map   -> map
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(coffee_shops::list))
        .route("/map", get(coffee_shops::map))
}

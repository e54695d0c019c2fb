use axum::routing::get;
use axum::Router;

use crate::handlers::geocode;
use crate::state::AppState;

/// Routes mounted at `/geocode`.
///
/// ```text
/// GET /?q=   -> suggest
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/", get(geocode::suggest))
}

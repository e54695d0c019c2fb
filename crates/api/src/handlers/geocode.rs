use axum::extract::{Query, State};
use axum::Json;
use eventboard_core::geo::{lookup_addresses, AddressSuggestion};

use crate::query::GeocodeParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/geocode?q=
///
/// Up to five address suggestions. Short queries and geocoder failures
/// both answer with an empty list.
pub async fn suggest(
    State(state): State<AppState>,
    Query(params): Query<GeocodeParams>,
) -> Json<DataResponse<Vec<AddressSuggestion>>> {
    let suggestions = lookup_addresses(state.geocoder.as_ref(), &params.q).await;
    Json(DataResponse { data: suggestions })
}

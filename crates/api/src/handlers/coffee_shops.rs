//! Handlers for the legacy `/coffee-shops` resource.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use eventboard_core::map::{render_geojson, MapPoint};
use eventboard_db::models::coffee_shop::CoffeeShop;
use eventboard_db::repositories::CoffeeShopRepo;

use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

const FETCH_FAILED: &str = "Failed to fetch coffee shops";

/// GET /api/v1/coffee-shops
///
/// The whole collection as a bare JSON array.
pub async fn list(State(state): State<AppState>) -> AppResult<Json<Vec<CoffeeShop>>> {
    let shops = CoffeeShopRepo::list(&state.pool).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to fetch coffee shops");
        AppError::Unavailable(FETCH_FAILED.into())
    })?;
    Ok(Json(shops))
}

/// GET /api/v1/coffee-shops/map
pub async fn map(State(state): State<AppState>) -> AppResult<Json<DataResponse<serde_json::Value>>> {
    let shops = CoffeeShopRepo::list_with_coordinates(&state.pool)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to fetch coffee shops");
            AppError::Unavailable(FETCH_FAILED.into())
        })?;

    let points: Vec<MapPoint> = shops.iter().filter_map(CoffeeShop::to_map_point).collect();
    Ok(Json(DataResponse {
        data: render_geojson(Arc::from(points)),
    }))
}

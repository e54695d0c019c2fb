//! Legacy coffee-shop row model.

use eventboard_core::map::MapPoint;
use eventboard_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `coffee_shops` table.
#[derive(Debug, Clone, FromRow, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoffeeShop {
    pub id: DbId,
    pub name: String,
    pub image: String,
    pub cuisine: String,
    pub rating: Option<f64>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
    pub description: Option<String>,
    pub created_at: Timestamp,
}

impl CoffeeShop {
    /// Shops without coordinates are not mappable.
    pub fn to_map_point(&self) -> Option<MapPoint> {
        Some(MapPoint {
            id: self.id,
            name: self.name.clone(),
            longitude: self.lng?,
            latitude: self.lat?,
            rating: self.rating,
            category: Some(self.cuisine.clone()),
        })
    }
}

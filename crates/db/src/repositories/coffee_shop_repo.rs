//! Repository for the legacy `coffee_shops` table.

use sqlx::PgPool;

use crate::models::coffee_shop::CoffeeShop;

const COLUMNS: &str = "id, name, image, cuisine, rating, lat, lng, description, created_at";

/// Read-only access to coffee shops.
pub struct CoffeeShopRepo;

impl CoffeeShopRepo {
    /// The whole collection in insertion order.
    pub async fn list(pool: &PgPool) -> Result<Vec<CoffeeShop>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM coffee_shops ORDER BY id");
        sqlx::query_as::<_, CoffeeShop>(&query).fetch_all(pool).await
    }

    /// Shops that can be placed on a map.
    pub async fn list_with_coordinates(pool: &PgPool) -> Result<Vec<CoffeeShop>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM coffee_shops \
             WHERE lat IS NOT NULL AND lng IS NOT NULL \
             ORDER BY id"
        );
        sqlx::query_as::<_, CoffeeShop>(&query).fetch_all(pool).await
    }
}

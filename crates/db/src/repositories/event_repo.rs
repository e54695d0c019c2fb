//! Repository for the `events` table.

use eventboard_core::category::Category;
use eventboard_core::status::{EventStatus, STATUS_APPROVED};
use eventboard_core::submission::NewEvent;
use eventboard_core::types::DbId;
use sqlx::PgPool;

use crate::models::event::Event;

/// Column list for `events` queries.
const COLUMNS: &str = "id, title, description, starts_at, location, longitude, latitude, \
    price, category, image_url, slug, owner_id, status, created_at, updated_at";

/// Provides read/write operations for events.
pub struct EventRepo;

impl EventRepo {
    /// Insert a new event, returning the created row.
    pub async fn create(pool: &PgPool, input: &NewEvent) -> Result<Event, sqlx::Error> {
        let query = format!(
            "INSERT INTO events \
                (title, description, starts_at, location, longitude, latitude, \
                 price, category, image_url, slug, owner_id, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Event>(&query)
            .bind(&input.title)
            .bind(&input.description)
            .bind(input.starts_at)
            .bind(&input.location)
            .bind(input.coordinates.map(|c| c.longitude))
            .bind(input.coordinates.map(|c| c.latitude))
            .bind(&input.price)
            .bind(input.category.value())
            .bind(&input.image_url)
            .bind(&input.slug)
            .bind(input.owner_id)
            .bind(input.status.as_str())
            .fetch_one(pool)
            .await
    }

    /// Find an event by ID regardless of status.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Event>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM events WHERE id = $1");
        sqlx::query_as::<_, Event>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List approved events ordered by start time, optionally restricted to
    /// one category.
    pub async fn list_approved(
        pool: &PgPool,
        category: Option<Category>,
    ) -> Result<Vec<Event>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM events \
             WHERE status = $1 AND ($2::TEXT IS NULL OR category = $2) \
             ORDER BY starts_at ASC, id ASC"
        );
        sqlx::query_as::<_, Event>(&query)
            .bind(STATUS_APPROVED)
            .bind(category.map(Category::value))
            .fetch_all(pool)
            .await
    }

    /// Approved events that carry coordinates, for the map.
    pub async fn list_approved_with_coordinates(pool: &PgPool) -> Result<Vec<Event>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM events \
             WHERE status = $1 AND longitude IS NOT NULL AND latitude IS NOT NULL \
             ORDER BY starts_at ASC, id ASC"
        );
        sqlx::query_as::<_, Event>(&query)
            .bind(STATUS_APPROVED)
            .fetch_all(pool)
            .await
    }

    /// The earliest approved event with this slug. Slugs are not unique.
    pub async fn find_approved_by_slug(
        pool: &PgPool,
        slug: &str,
    ) -> Result<Option<Event>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM events \
             WHERE slug = $1 AND status = $2 \
             ORDER BY starts_at ASC, id ASC \
             LIMIT 1"
        );
        sqlx::query_as::<_, Event>(&query)
            .bind(slug)
            .bind(STATUS_APPROVED)
            .fetch_optional(pool)
            .await
    }

    /// List events with the given status, oldest submission first.
    pub async fn list_by_status(
        pool: &PgPool,
        status: EventStatus,
    ) -> Result<Vec<Event>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM events WHERE status = $1 ORDER BY created_at ASC, id ASC"
        );
        sqlx::query_as::<_, Event>(&query)
            .bind(status.as_str())
            .fetch_all(pool)
            .await
    }

    /// Move an event from `from` to `to`.
    ///
    /// Returns `None` when the event does not exist or is no longer in
    /// `from`, so two moderators cannot both decide the same event.
    pub async fn update_status(
        pool: &PgPool,
        id: DbId,
        from: EventStatus,
        to: EventStatus,
    ) -> Result<Option<Event>, sqlx::Error> {
        let query = format!(
            "UPDATE events SET status = $3 \
             WHERE id = $1 AND status = $2 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Event>(&query)
            .bind(id)
            .bind(from.as_str())
            .bind(to.as_str())
            .fetch_optional(pool)
            .await
    }
}

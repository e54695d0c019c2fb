//! Event row model.

use eventboard_core::error::CoreError;
use eventboard_core::geo::Coordinates;
use eventboard_core::listing::EventRecord;
use eventboard_core::status::EventStatus;
use eventboard_core::types::{DbId, LocalTimestamp, Timestamp, UserId};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `events` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Event {
    pub id: DbId,
    pub title: String,
    pub description: String,
    pub starts_at: LocalTimestamp,
    pub location: String,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    pub price: Option<String>,
    pub category: String,
    pub image_url: Option<String>,
    pub slug: String,
    pub owner_id: UserId,
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Event {
    /// Convert into the domain record used by listing and moderation.
    pub fn into_record(self) -> Result<EventRecord, CoreError> {
        Ok(EventRecord {
            coordinates: Coordinates::from_parts(self.longitude, self.latitude),
            status: EventStatus::from_name(&self.status)?,
            id: self.id,
            title: self.title,
            description: self.description,
            starts_at: self.starts_at,
            location: self.location,
            price: self.price,
            category: self.category,
            image_url: self.image_url,
            slug: self.slug,
            owner_id: self.owner_id,
        })
    }
}

/// Body of a moderation status change.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateEventStatus {
    pub status: EventStatus,
}

//! Postgres-backed implementations of the core event seams.

use async_trait::async_trait;
use eventboard_core::category::Category;
use eventboard_core::listing::{EventFeed, EventRecord};
use eventboard_core::submission::{EventWriter, NewEvent};
use eventboard_db::models::event::Event;
use eventboard_db::repositories::EventRepo;
use eventboard_db::DbPool;

/// Reads and writes events through [`EventRepo`].
#[derive(Clone)]
pub struct PgEventStore {
    pool: DbPool,
}

impl PgEventStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Message shown to the submitter when the insert fails. Database errors
/// keep the server's own message; anything else keeps sqlx's description.
fn persistence_message(err: sqlx::Error) -> String {
    match err {
        sqlx::Error::Database(db_err) => db_err.message().to_string(),
        other => other.to_string(),
    }
}

fn into_records(rows: Vec<Event>) -> Result<Vec<EventRecord>, String> {
    rows.into_iter()
        .map(|row| row.into_record().map_err(|e| e.to_string()))
        .collect()
}

#[async_trait]
impl EventFeed for PgEventStore {
    async fn fetch_approved(&self, category: Option<Category>) -> Result<Vec<EventRecord>, String> {
        let rows = EventRepo::list_approved(&self.pool, category)
            .await
            .map_err(|e| e.to_string())?;
        into_records(rows)
    }
}

#[async_trait]
impl EventWriter for PgEventStore {
    async fn insert(&self, event: NewEvent) -> Result<EventRecord, String> {
        let row = EventRepo::create(&self.pool, &event)
            .await
            .map_err(persistence_message)?;
        row.into_record().map_err(|e| e.to_string())
    }
}

//! Public event listing: fetch, filter, enrich, and lay out.
//!
//! The pipeline is:
//!
//! 1. [`EventFeed::fetch_approved`] returns approved events ordered by start
//!    time, with the category filter already applied by the data source.
//! 2. The remaining filters (free text, date bucket) run in memory.
//! 3. Each surviving [`EventRecord`] becomes a display-ready [`EventCard`].
//! 4. The cards are dealt round-robin into 1-3 columns.
//!
//! [`load_listing`] never fails: fetch errors become an empty page with a
//! user-facing message.

use async_trait::async_trait;
use chrono::{Datelike, NaiveDateTime};
use serde::Serialize;

use crate::category::{Category, CategoryFilter};
use crate::geo::Coordinates;
use crate::schedule::DateBucket;
use crate::search::{SearchTerm, Searchable};
use crate::status::EventStatus;
use crate::types::{DbId, LocalTimestamp, UserId};

/// Price shown when the submitter left the field blank.
pub const DEFAULT_PRICE: &str = "Free";

/// Message shown when the listing cannot be loaded.
pub const FETCH_ERROR_MESSAGE: &str = "Failed to load events. Please try again later.";

/// Base of the maps deep-link built from an event's location.
pub const MAPS_SEARCH_URL: &str = "https://www.google.com/maps/search/?api=1&query=";

/// Viewport widths (px) at which the layout gains a column.
pub const TWO_COLUMN_MIN_WIDTH: u32 = 768;
pub const THREE_COLUMN_MIN_WIDTH: u32 = 1024;

pub const MAX_COLUMNS: usize = 3;

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// An event as fetched from storage, before any display shaping.
#[derive(Debug, Clone, PartialEq)]
pub struct EventRecord {
    pub id: DbId,
    pub title: String,
    pub description: String,
    pub starts_at: LocalTimestamp,
    pub location: String,
    pub coordinates: Option<Coordinates>,
    pub price: Option<String>,
    pub category: String,
    pub image_url: Option<String>,
    pub slug: String,
    pub owner_id: UserId,
    pub status: EventStatus,
}

impl Searchable for EventRecord {
    fn search_fields(&self) -> [&str; 3] {
        [&self.title, &self.description, &self.location]
    }
}

/// A display-ready event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventCard {
    pub id: DbId,
    pub title: String,
    pub description: String,
    pub starts_at: LocalTimestamp,
    /// e.g. `"Monday, June 10, 2024"`.
    pub date_label: String,
    /// e.g. `"7:30 PM"`.
    pub time_label: String,
    /// e.g. `"Mon"`.
    pub day_of_week: String,
    pub day_of_month: u32,
    pub location: String,
    pub maps_url: String,
    pub coordinates: Option<Coordinates>,
    pub price: String,
    pub category: String,
    pub category_label: String,
    pub category_emoji: String,
    pub image_url: Option<String>,
    pub slug: String,
}

impl EventCard {
    pub fn from_record(record: &EventRecord) -> Self {
        let (category_label, category_emoji) = match Category::from_value(&record.category) {
            Some(category) => (category.label().to_string(), category.emoji().to_string()),
            None => (record.category.clone(), String::new()),
        };

        let price = record
            .price
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .unwrap_or(DEFAULT_PRICE)
            .to_string();

        Self {
            id: record.id,
            title: record.title.clone(),
            description: record.description.clone(),
            starts_at: record.starts_at,
            date_label: record.starts_at.format("%A, %B %-d, %Y").to_string(),
            time_label: record.starts_at.format("%-I:%M %p").to_string(),
            day_of_week: record.starts_at.format("%a").to_string(),
            day_of_month: record.starts_at.day(),
            location: record.location.clone(),
            maps_url: maps_url(&record.location),
            coordinates: record.coordinates,
            price,
            category: record.category.clone(),
            category_label,
            category_emoji,
            image_url: record.image_url.clone().filter(|url| !url.is_empty()),
            slug: record.slug.clone(),
        }
    }
}

/// Deep-link that opens a maps search for a free-text location.
pub fn maps_url(location: &str) -> String {
    format!("{MAPS_SEARCH_URL}{}", urlencoding::encode(location))
}

// ---------------------------------------------------------------------------
// Filtering
// ---------------------------------------------------------------------------

/// All listing filters. Every present filter must match.
#[derive(Debug, Clone, Default)]
pub struct ListingFilter {
    pub search: SearchTerm,
    pub category: CategoryFilter,
    pub bucket: Option<DateBucket>,
}

impl ListingFilter {
    /// Whether a record passes every filter relative to `now`.
    pub fn matches(&self, record: &EventRecord, now: NaiveDateTime) -> bool {
        self.category.matches(&record.category)
            && crate::search::matches(&self.search, record)
            && self
                .bucket
                .map_or(true, |bucket| bucket.contains(now, record.starts_at))
    }

    /// The same filter with the category restriction removed, used once the
    /// category has been pushed into the fetch.
    pub fn residual(&self) -> Self {
        Self {
            search: self.search.clone(),
            category: CategoryFilter::All,
            bucket: self.bucket,
        }
    }

    /// Keep the records that pass, preserving their order.
    pub fn apply(&self, records: Vec<EventRecord>, now: NaiveDateTime) -> Vec<EventRecord> {
        records
            .into_iter()
            .filter(|record| self.matches(record, now))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

/// Number of columns for a viewport width in pixels.
pub fn column_count_for_width(width_px: u32) -> usize {
    if width_px >= THREE_COLUMN_MIN_WIDTH {
        3
    } else if width_px >= TWO_COLUMN_MIN_WIDTH {
        2
    } else {
        1
    }
}

/// Deal `items` into `columns` columns: item `i` goes to column `i % columns`.
///
/// Relative order is preserved inside each column. A column count of zero
/// is treated as one.
pub fn round_robin<T: Clone>(items: &[T], columns: usize) -> Vec<Vec<T>> {
    let columns = columns.max(1);
    let mut out: Vec<Vec<T>> = (0..columns).map(|_| Vec::new()).collect();
    for (i, item) in items.iter().enumerate() {
        out[i % columns].push(item.clone());
    }
    out
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Source of approved events.
#[async_trait]
pub trait EventFeed: Send + Sync {
    /// Approved events ordered by start time ascending, optionally limited
    /// to one category.
    async fn fetch_approved(&self, category: Option<Category>) -> Result<Vec<EventRecord>, String>;
}

/// Everything the listing view needs.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ListingPage {
    pub events: Vec<EventCard>,
    /// Event ids per column, in display order.
    pub columns: Vec<Vec<DbId>>,
    pub error: Option<String>,
}

impl ListingPage {
    fn failed() -> Self {
        Self {
            events: Vec::new(),
            columns: Vec::new(),
            error: Some(FETCH_ERROR_MESSAGE.to_string()),
        }
    }
}

/// Run the listing pipeline against `feed`.
pub async fn load_listing<F>(
    feed: &F,
    filter: &ListingFilter,
    columns: usize,
    now: NaiveDateTime,
) -> ListingPage
where
    F: EventFeed + ?Sized,
{
    let records = match feed.fetch_approved(filter.category.pushdown()).await {
        Ok(records) => records,
        Err(e) => {
            tracing::error!(error = %e, "Failed to fetch events");
            return ListingPage::failed();
        }
    };

    let fetched = records.len();
    let events: Vec<EventCard> = filter
        .residual()
        .apply(records, now)
        .iter()
        .filter(|record| record.status.is_public())
        .map(EventCard::from_record)
        .collect();

    tracing::debug!(fetched, shown = events.len(), "Built event listing");

    let ids: Vec<DbId> = events.iter().map(|e| e.id).collect();
    ListingPage {
        columns: round_robin(&ids, columns.clamp(1, MAX_COLUMNS)),
        events,
        error: None,
    }
}

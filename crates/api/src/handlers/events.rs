//! Handlers for the `/events` resource.

use std::sync::Arc;

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use eventboard_core::category::CategoryFilter;
use eventboard_core::listing::{
    column_count_for_width, load_listing, EventCard, ListingFilter, ListingPage, MAX_COLUMNS,
};
use eventboard_core::map::{render_geojson, MapPoint};
use eventboard_core::schedule::DateBucket;
use eventboard_core::search::SearchTerm;
use eventboard_core::status::EventStatus;
use eventboard_core::submission::{
    pair_coordinates, EventForm, SubmissionController, SubmissionError, SubmissionReceipt,
};
use eventboard_core::upload::ImageUpload;
use eventboard_db::repositories::EventRepo;
use serde::Serialize;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::MaybeAuthUser;
use crate::query::ListingParams;
use crate::response::DataResponse;
use crate::state::AppState;
use crate::store::PgEventStore;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Body of a successful `POST /events`.
#[derive(Debug, Serialize)]
pub struct SubmissionResponse {
    pub event: EventCard,
    pub status: EventStatus,
    pub message: &'static str,
    /// Where the client should navigate after `redirect_after_ms`.
    pub redirect_to: &'static str,
    pub redirect_after_ms: u64,
    pub image_upload_failed: bool,
}

impl From<SubmissionReceipt> for SubmissionResponse {
    fn from(receipt: SubmissionReceipt) -> Self {
        Self {
            event: EventCard::from_record(&receipt.event),
            status: receipt.event.status,
            message: receipt.message,
            redirect_to: receipt.redirect_to,
            redirect_after_ms: receipt.redirect_after.as_millis() as u64,
            image_upload_failed: receipt.image_upload_failed,
        }
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/events
///
/// Approved events as display cards, filtered and laid out in columns. A
/// failed fetch still answers 200 with the page's `error` set.
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<ListingParams>,
) -> AppResult<Json<DataResponse<ListingPage>>> {
    let filter = ListingFilter {
        search: SearchTerm::new(params.q.as_deref().unwrap_or_default()),
        category: CategoryFilter::parse(params.category.as_deref())?,
        bucket: DateBucket::parse(params.when.as_deref())?,
    };
    let columns = params.columns.unwrap_or_else(|| {
        params
            .width
            .map(column_count_for_width)
            .unwrap_or(MAX_COLUMNS)
    });

    let feed = PgEventStore::new(state.pool.clone());
    let now = chrono::Local::now().naive_local();
    let page = load_listing(&feed, &filter, columns, now).await;

    Ok(Json(DataResponse { data: page }))
}

/// POST /api/v1/events
///
/// Submit an event for review. Multipart fields: `title`, `description`,
/// `date`, `time`, `location`, `longitude`, `latitude`, `price`, `category`
/// (or `event_type`) and an optional `image` file.
pub async fn submit(
    State(state): State<AppState>,
    MaybeAuthUser(user): MaybeAuthUser,
    multipart: Multipart,
) -> AppResult<(StatusCode, Json<DataResponse<SubmissionResponse>>)> {
    let (form, image) = read_submission(multipart).await?;

    let writer = Arc::new(PgEventStore::new(state.pool.clone()));
    let mut controller = SubmissionController::new(writer, Arc::clone(&state.images));
    let receipt = controller
        .submit(user.map(|u| u.user_id), form, image)
        .await?;

    tracing::info!(
        event_id = receipt.event.id,
        slug = %receipt.event.slug,
        owner_id = %receipt.event.owner_id,
        "Event submitted for review",
    );

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: receipt.into(),
        }),
    ))
}

/// GET /api/v1/events/map
///
/// Approved events with coordinates as a GeoJSON `FeatureCollection`.
pub async fn map(State(state): State<AppState>) -> AppResult<Json<DataResponse<serde_json::Value>>> {
    let rows = EventRepo::list_approved_with_coordinates(&state.pool).await?;

    let mut points = Vec::with_capacity(rows.len());
    for row in rows {
        let record = row.into_record()?;
        points.extend(MapPoint::from_event(&record));
    }

    Ok(Json(DataResponse {
        data: render_geojson(Arc::from(points)),
    }))
}

/// GET /api/v1/events/by-slug/{slug}
pub async fn get_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<DataResponse<EventCard>>> {
    let row = EventRepo::find_approved_by_slug(&state.pool, &slug)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Event '{slug}' not found")))?;
    let record = row.into_record()?;

    Ok(Json(DataResponse {
        data: EventCard::from_record(&record),
    }))
}

// ---------------------------------------------------------------------------
// Multipart
// ---------------------------------------------------------------------------

/// Collect the form fields and the optional image from a multipart body.
///
/// A file part with neither a filename nor content is what browsers send
/// for an untouched file input, so it counts as no image.
async fn read_submission(
    mut multipart: Multipart,
) -> AppResult<(EventForm, Option<ImageUpload>)> {
    let mut form = EventForm::default();
    let mut longitude = None;
    let mut latitude = None;
    let mut image = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();

        if name == "image" {
            let filename = field.file_name().unwrap_or_default().to_string();
            let content_type = field.content_type().map(str::to_string);
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(e.to_string()))?;
            if filename.is_empty() && bytes.is_empty() {
                continue;
            }
            image = Some(ImageUpload {
                filename,
                content_type,
                bytes: bytes.to_vec(),
            });
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;

        match name.as_str() {
            "title" => form.title = value,
            "description" => form.description = value,
            "date" => form.date = value,
            "time" => form.time = value,
            "location" => form.location = value,
            "price" => form.price = value,
            "category" | "event_type" => form.category = value,
            "longitude" => longitude = parse_coordinate("longitude", &value)?,
            "latitude" => latitude = parse_coordinate("latitude", &value)?,
            other => tracing::debug!(field = other, "Ignoring unknown submission field"),
        }
    }

    form.coordinates = pair_coordinates(longitude, latitude)
        .map_err(|field| SubmissionError::Validation { fields: vec![field] })?;
    Ok((form, image))
}

fn parse_coordinate(name: &str, value: &str) -> AppResult<Option<f64>> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    value
        .parse::<f64>()
        .map(Some)
        .map_err(|_| AppError::BadRequest(format!("{name} must be a number")))
}

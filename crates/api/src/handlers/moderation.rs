//! Handlers for the `/moderation` resource.

use axum::extract::{Path, Query, State};
use axum::Json;
use eventboard_core::error::CoreError;
use eventboard_core::status::EventStatus;
use eventboard_core::types::DbId;
use eventboard_db::models::event::{Event, UpdateEventStatus};
use eventboard_db::repositories::EventRepo;

use crate::error::AppResult;
use crate::middleware::rbac::RequireModerator;
use crate::query::StatusParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/moderation/events?status=pending
///
/// Events in one status, oldest submission first.
pub async fn list_events(
    RequireModerator(_moderator): RequireModerator,
    State(state): State<AppState>,
    Query(params): Query<StatusParams>,
) -> AppResult<Json<DataResponse<Vec<Event>>>> {
    let status = match params.status.as_deref() {
        Some(name) => EventStatus::from_name(name)?,
        None => EventStatus::Pending,
    };

    let events = EventRepo::list_by_status(&state.pool, status).await?;
    Ok(Json(DataResponse { data: events }))
}

/// PUT /api/v1/moderation/events/{id}/status
///
/// Approve or reject a pending event.
pub async fn update_status(
    RequireModerator(moderator): RequireModerator,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateEventStatus>,
) -> AppResult<Json<DataResponse<Event>>> {
    let current = EventRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(CoreError::NotFound { entity: "Event", id })?;
    let from = EventStatus::from_name(&current.status)?;
    from.validate_transition(input.status)?;

    // Another moderator may have decided the event since it was read.
    let updated = EventRepo::update_status(&state.pool, id, from, input.status)
        .await?
        .ok_or_else(|| {
            CoreError::Conflict(format!("Event {id} is no longer {}", from.as_str()))
        })?;

    tracing::info!(
        event_id = id,
        from = from.as_str(),
        to = input.status.as_str(),
        moderator_id = %moderator.user_id,
        "Event status changed",
    );

    Ok(Json(DataResponse { data: updated }))
}

/// Events
///
/// # Endpoints
///
/// - `GET /api/events` - Published events, `?upcoming=true` for future ones
/// - `GET /api/events/:id` - One event
/// - `POST /api/events` (admin)
/// - `PATCH|DELETE /api/events/:id` (admin)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::{Path, Query, ValidJson},
    routes::{sees_unpublished, MessageResponse},
};
use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use serde::Deserialize;
use suryoday_shared::{
    auth::{authorization::Access, middleware::AuthContext},
    models::event::{CreateEvent, Event, EventFilter, EventStatus, UpdateEvent},
};
use uuid::Uuid;

#[derive(Debug, Default, Deserialize)]
pub struct ListEventsQuery {
    #[serde(default)]
    pub upcoming: bool,
}

fn event_not_found() -> ApiError {
    ApiError::NotFound("Event not found".to_string())
}

pub async fn list_events(
    State(state): State<AppState>,
    Query(query): Query<ListEventsQuery>,
) -> ApiResult<Json<Vec<Event>>> {
    let filter = EventFilter {
        published_only: true,
        starting_after: query.upcoming.then(Utc::now),
    };

    Ok(Json(state.store.list_events(filter).await?))
}

/// Drafts and cancelled events are only visible to staff
pub async fn get_event(
    State(state): State<AppState>,
    auth: Option<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Event>> {
    let event = state
        .store
        .event_by_id(id)
        .await?
        .filter(|e| e.status == EventStatus::Published || sees_unpublished(auth.as_ref()))
        .ok_or_else(event_not_found)?;

    Ok(Json(event))
}

pub async fn create_event(
    State(state): State<AppState>,
    auth: AuthContext,
    ValidJson(data): ValidJson<CreateEvent>,
) -> ApiResult<(StatusCode, Json<Event>)> {
    auth.require(Access::Admin)?;

    let event = state.store.insert_event(data, auth.user_id).await?;
    tracing::info!(event_id = %event.id, "Event created");

    Ok((StatusCode::CREATED, Json(event)))
}

pub async fn update_event(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
    ValidJson(data): ValidJson<UpdateEvent>,
) -> ApiResult<Json<Event>> {
    auth.require(Access::Admin)?;

    let event = state.store.update_event(id, data).await?.ok_or_else(event_not_found)?;
    Ok(Json(event))
}

pub async fn delete_event(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    auth.require(Access::Admin)?;

    if !state.store.delete_event(id).await? {
        return Err(event_not_found());
    }

    Ok(Json(MessageResponse::new("Event deleted successfully")))
}

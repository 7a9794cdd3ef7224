/// Volunteer time logs
///
/// # Endpoints
///
/// - `POST /api/volunteer-hours` - Log hours for the caller
/// - `GET /api/volunteer-hours` - List, `?volunteer_id=&status=` (volunteers see their own)
/// - `GET /api/volunteer-hours/total/:volunteer_id` - Totals (owner or staff)
/// - `PATCH /api/volunteer-hours/:id` - Edit a log (owner while pending, or staff)
/// - `PATCH /api/volunteer-hours/:id/status` - Approve or reject (admin)
/// - `DELETE /api/volunteer-hours/:id` (admin)
///
/// Volunteers' logs start `pending`; logs made by staff are recorded as
/// already approved.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::{Path, Query, ValidJson},
    routes::MessageResponse,
};
use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use suryoday_shared::{
    auth::{
        authorization::{owner_scope, require_owner, Access, AuthzError},
        middleware::AuthContext,
    },
    models::{
        user::Role,
        volunteer_hours::{
            HoursFilter, HoursStatus, HoursTotals, LogHours, NewHours, ReviewHours, UpdateHours,
            VolunteerHours,
        },
    },
};
use uuid::Uuid;

#[derive(Debug, Default, Deserialize)]
pub struct ListHoursQuery {
    pub volunteer_id: Option<Uuid>,
    pub status: Option<HoursStatus>,
}

const REVIEWED_LOG_LOCKED: &str = "Cannot edit approved/rejected hours";

fn log_not_found() -> ApiError {
    ApiError::NotFound("Hours log not found".to_string())
}

pub async fn log_hours(
    State(state): State<AppState>,
    auth: AuthContext,
    ValidJson(entry): ValidJson<LogHours>,
) -> ApiResult<(StatusCode, Json<VolunteerHours>)> {
    let status = match auth.role {
        Role::Volunteer => HoursStatus::Pending,
        Role::SuperAdmin | Role::Admin => HoursStatus::Approved,
    };

    let log = state
        .store
        .insert_hours(NewHours {
            volunteer_id: auth.user_id,
            status,
            entry,
        })
        .await?;

    tracing::info!(log_id = %log.id, volunteer_id = %log.volunteer_id, hours = log.hours, "Hours logged");
    Ok((StatusCode::CREATED, Json(log)))
}

pub async fn list_hours(
    State(state): State<AppState>,
    auth: AuthContext,
    Query(query): Query<ListHoursQuery>,
) -> ApiResult<Json<Vec<VolunteerHours>>> {
    let filter = HoursFilter {
        volunteer_id: owner_scope(&auth).or(query.volunteer_id),
        status: query.status,
    };

    Ok(Json(state.store.list_hours(filter).await?))
}

pub async fn hours_total(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(volunteer_id): Path<Uuid>,
) -> ApiResult<Json<HoursTotals>> {
    require_owner(&auth, volunteer_id)?;
    Ok(Json(state.store.hours_totals(volunteer_id).await?))
}

/// Edits a log
///
/// A volunteer may only edit its own logs, and only while they are pending.
/// The pending check is repeated inside the store update so a review that
/// lands in between still wins.
pub async fn update_hours(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
    ValidJson(data): ValidJson<UpdateHours>,
) -> ApiResult<Json<VolunteerHours>> {
    let log = state.store.hours_by_id(id).await?.ok_or_else(log_not_found)?;
    require_owner(&auth, log.volunteer_id)?;

    let pending_only = owner_scope(&auth).is_some();
    if pending_only && !log.is_pending() {
        return Err(AuthzError::Locked(REVIEWED_LOG_LOCKED).into());
    }

    match state.store.update_hours(id, data, pending_only).await? {
        Some(updated) => Ok(Json(updated)),
        None if pending_only => Err(AuthzError::Locked(REVIEWED_LOG_LOCKED).into()),
        None => Err(log_not_found()),
    }
}

pub async fn review_hours(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
    ValidJson(review): ValidJson<ReviewHours>,
) -> ApiResult<Json<VolunteerHours>> {
    auth.require(Access::Admin)?;

    let log = state
        .store
        .review_hours(id, review, auth.user_id)
        .await?
        .ok_or_else(log_not_found)?;

    tracing::info!(log_id = %log.id, status = ?log.status, reviewed_by = %auth.user_id, "Hours reviewed");
    Ok(Json(log))
}

pub async fn delete_hours(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    auth.require(Access::Admin)?;

    if !state.store.delete_hours(id).await? {
        return Err(log_not_found());
    }

    Ok(Json(MessageResponse::new("Hours log deleted successfully")))
}

/// Volunteer applications
///
/// # Endpoints
///
/// - `POST /api/volunteers/apply` - Submit an application (public)
/// - `GET /api/volunteers` - List applications, `?status=` (admin)
/// - `GET /api/volunteers/stats/overview` - Counts by status (admin)
/// - `GET|PATCH|DELETE /api/volunteers/:id` (admin)
/// - `PATCH /api/volunteers/:id/approve` - Approve and provision a login (admin)
/// - `PATCH /api/volunteers/:id/reject` - Reject with an optional reason (admin)
///
/// State changes go through [`VolunteerLifecycle`], which owns the
/// transition rules and the follow-up e-mails.
///
/// [`VolunteerLifecycle`]: suryoday_shared::lifecycle::VolunteerLifecycle

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::{OptionalJson, Path, Query, ValidJson},
};
use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use suryoday_shared::{
    auth::{authorization::Access, middleware::AuthContext},
    effects::EffectOutcome,
    lifecycle::{ApprovalOutcome, ProfileUpdate, RejectionOutcome},
    models::volunteer::{
        UpdateVolunteer, Volunteer, VolunteerApplication, VolunteerStats, VolunteerStatus,
    },
};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Default, Deserialize)]
pub struct ListVolunteersQuery {
    pub status: Option<VolunteerStatus>,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct RejectRequest {
    #[validate(length(max = 2000, message = "reason is too long"))]
    pub reason: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ApplicationResponse {
    pub message: &'static str,
    pub volunteer: Volunteer,
}

#[derive(Debug, Serialize)]
pub struct ReviewResponse<T> {
    pub message: &'static str,

    #[serde(flatten)]
    pub outcome: T,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub message: &'static str,
    pub account_removal: EffectOutcome,
}

/// Public application form
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed or e-mail already applied
pub async fn apply(
    State(state): State<AppState>,
    ValidJson(application): ValidJson<VolunteerApplication>,
) -> ApiResult<(StatusCode, Json<ApplicationResponse>)> {
    let volunteer = state.lifecycle.submit(application).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApplicationResponse {
            message: "Application submitted successfully",
            volunteer,
        }),
    ))
}

pub async fn list_volunteers(
    State(state): State<AppState>,
    auth: AuthContext,
    Query(query): Query<ListVolunteersQuery>,
) -> ApiResult<Json<Vec<Volunteer>>> {
    auth.require(Access::Admin)?;
    Ok(Json(state.store.list_volunteers(query.status).await?))
}

pub async fn volunteer_stats(
    State(state): State<AppState>,
    auth: AuthContext,
) -> ApiResult<Json<VolunteerStats>> {
    auth.require(Access::Admin)?;
    Ok(Json(state.lifecycle.stats().await?))
}

pub async fn get_volunteer(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Volunteer>> {
    auth.require(Access::Admin)?;

    let volunteer = state
        .store
        .volunteer_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Volunteer not found".to_string()))?;

    Ok(Json(volunteer))
}

/// Profile edit; `pending`, `approved` and `rejected` are only reachable
/// through review, and e-mail or status changes follow to the linked login
pub async fn update_volunteer(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
    ValidJson(update): ValidJson<UpdateVolunteer>,
) -> ApiResult<Json<ReviewResponse<ProfileUpdate>>> {
    auth.require(Access::Admin)?;

    let outcome = state.lifecycle.update_profile(id, update).await?;

    Ok(Json(ReviewResponse {
        message: "Volunteer updated successfully",
        outcome,
    }))
}

/// Approves a pending application
///
/// Approving twice is harmless: the second call reports the existing login
/// as already provisioned.
pub async fn approve(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ReviewResponse<ApprovalOutcome>>> {
    auth.require(Access::Admin)?;

    let outcome = state.lifecycle.approve(id, auth.user_id).await?;

    Ok(Json(ReviewResponse {
        message: "Volunteer approved successfully",
        outcome,
    }))
}

pub async fn reject(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
    OptionalJson(body): OptionalJson<RejectRequest>,
) -> ApiResult<Json<ReviewResponse<RejectionOutcome>>> {
    auth.require(Access::Admin)?;

    let outcome = state.lifecycle.reject(id, auth.user_id, body.reason).await?;

    Ok(Json(ReviewResponse {
        message: "Volunteer application rejected",
        outcome,
    }))
}

/// Deletes the application; a linked volunteer login goes with it
pub async fn delete_volunteer(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<DeleteResponse>> {
    auth.require(Access::Admin)?;

    let account_removal = state.lifecycle.delete(id).await?;

    Ok(Json(DeleteResponse {
        message: "Volunteer deleted successfully",
        account_removal,
    }))
}

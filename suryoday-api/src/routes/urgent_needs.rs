/// Urgent needs and donations against them
///
/// # Endpoints
///
/// - `GET /api/urgent-needs` - All needs, `?active=true` for open ones
/// - `GET /api/urgent-needs/:id`
/// - `POST /api/urgent-needs` (admin)
/// - `PATCH|DELETE /api/urgent-needs/:id` (admin)
/// - `PATCH /api/urgent-needs/:id/donation` - Add to the raised amount (admin)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::{Path, Query, ValidJson},
    routes::MessageResponse,
};
use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use suryoday_shared::{
    auth::{authorization::Access, middleware::AuthContext},
    models::urgent_need::{CreateUrgentNeed, Donation, UpdateUrgentNeed, UrgentNeed},
};
use uuid::Uuid;

#[derive(Debug, Default, Deserialize)]
pub struct ListNeedsQuery {
    #[serde(default)]
    pub active: bool,
}

fn need_not_found() -> ApiError {
    ApiError::NotFound("Urgent need not found".to_string())
}

pub async fn list_needs(
    State(state): State<AppState>,
    Query(query): Query<ListNeedsQuery>,
) -> ApiResult<Json<Vec<UrgentNeed>>> {
    Ok(Json(state.store.list_needs(query.active).await?))
}

pub async fn get_need(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<UrgentNeed>> {
    let need = state.store.need_by_id(id).await?.ok_or_else(need_not_found)?;
    Ok(Json(need))
}

pub async fn create_need(
    State(state): State<AppState>,
    auth: AuthContext,
    ValidJson(data): ValidJson<CreateUrgentNeed>,
) -> ApiResult<(StatusCode, Json<UrgentNeed>)> {
    auth.require(Access::Admin)?;

    let need = state.store.insert_need(data, auth.user_id).await?;
    tracing::info!(need_id = %need.id, target = need.target_amount, "Urgent need created");

    Ok((StatusCode::CREATED, Json(need)))
}

pub async fn update_need(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
    ValidJson(data): ValidJson<UpdateUrgentNeed>,
) -> ApiResult<Json<UrgentNeed>> {
    auth.require(Access::Admin)?;

    let need = state.store.update_need(id, data).await?.ok_or_else(need_not_found)?;
    Ok(Json(need))
}

/// Adds `amount` to the raised total in one atomic store update
pub async fn record_donation(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
    ValidJson(donation): ValidJson<Donation>,
) -> ApiResult<Json<UrgentNeed>> {
    auth.require(Access::Admin)?;

    let need = state
        .store
        .add_donation(id, donation.amount)
        .await?
        .ok_or_else(need_not_found)?;

    tracing::info!(
        need_id = %need.id,
        amount = donation.amount,
        raised = need.raised_amount,
        recorded_by = %auth.user_id,
        "Donation recorded"
    );
    Ok(Json(need))
}

pub async fn delete_need(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    auth.require(Access::Admin)?;

    if !state.store.delete_need(id).await? {
        return Err(need_not_found());
    }

    Ok(Json(MessageResponse::new("Urgent need deleted successfully")))
}

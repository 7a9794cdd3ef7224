/// Site content blocks, grouped by a free-form type such as `story` or
/// `announcement`
///
/// # Endpoints
///
/// - `GET /api/content/:type` - Published items of a type
/// - `GET /api/content/:type/:id` - One item of that type
/// - `POST /api/content` (admin)
/// - `PATCH|DELETE /api/content/:id` (admin)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::{Path, ValidJson},
    routes::{sees_unpublished, MessageResponse},
};
use axum::{extract::State, http::StatusCode, Json};
use suryoday_shared::{
    auth::{authorization::Access, middleware::AuthContext},
    models::content::{Content, CreateContent, PublicationStatus, UpdateContent},
};
use uuid::Uuid;

fn content_not_found() -> ApiError {
    ApiError::NotFound("Content not found".to_string())
}

pub async fn list_content(
    State(state): State<AppState>,
    Path(content_type): Path<String>,
) -> ApiResult<Json<Vec<Content>>> {
    Ok(Json(state.store.list_published_content(&content_type).await?))
}

/// An id filed under another type is reported as missing
pub async fn get_content(
    State(state): State<AppState>,
    auth: Option<AuthContext>,
    Path((content_type, id)): Path<(String, Uuid)>,
) -> ApiResult<Json<Content>> {
    let item = state
        .store
        .content_by_id(id)
        .await?
        .filter(|c| c.content_type == content_type)
        .filter(|c| c.status == PublicationStatus::Published || sees_unpublished(auth.as_ref()))
        .ok_or_else(content_not_found)?;

    Ok(Json(item))
}

pub async fn create_content(
    State(state): State<AppState>,
    auth: AuthContext,
    ValidJson(data): ValidJson<CreateContent>,
) -> ApiResult<(StatusCode, Json<Content>)> {
    auth.require(Access::Admin)?;

    let item = state.store.insert_content(data, auth.user_id).await?;
    tracing::info!(content_id = %item.id, content_type = %item.content_type, "Content created");

    Ok((StatusCode::CREATED, Json(item)))
}

pub async fn update_content(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
    ValidJson(data): ValidJson<UpdateContent>,
) -> ApiResult<Json<Content>> {
    auth.require(Access::Admin)?;

    let item = state.store.update_content(id, data).await?.ok_or_else(content_not_found)?;
    Ok(Json(item))
}

pub async fn delete_content(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    auth.require(Access::Admin)?;

    if !state.store.delete_content(id).await? {
        return Err(content_not_found());
    }

    Ok(Json(MessageResponse::new("Content deleted successfully")))
}

/// Photo gallery
///
/// # Endpoints
///
/// - `GET /api/gallery` - Published items
/// - `GET /api/gallery/:id`
/// - `POST /api/gallery` (admin)
/// - `PATCH|DELETE /api/gallery/:id` (admin)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::{Path, ValidJson},
    routes::{sees_unpublished, MessageResponse},
};
use axum::{extract::State, http::StatusCode, Json};
use suryoday_shared::{
    auth::{authorization::Access, middleware::AuthContext},
    models::{
        content::PublicationStatus,
        gallery::{CreateGalleryItem, GalleryItem, UpdateGalleryItem},
    },
};
use uuid::Uuid;

fn item_not_found() -> ApiError {
    ApiError::NotFound("Gallery item not found".to_string())
}

pub async fn list_gallery(State(state): State<AppState>) -> ApiResult<Json<Vec<GalleryItem>>> {
    Ok(Json(state.store.list_published_gallery().await?))
}

pub async fn get_item(
    State(state): State<AppState>,
    auth: Option<AuthContext>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<GalleryItem>> {
    let item = state
        .store
        .gallery_item_by_id(id)
        .await?
        .filter(|g| g.status == PublicationStatus::Published || sees_unpublished(auth.as_ref()))
        .ok_or_else(item_not_found)?;

    Ok(Json(item))
}

pub async fn create_item(
    State(state): State<AppState>,
    auth: AuthContext,
    ValidJson(data): ValidJson<CreateGalleryItem>,
) -> ApiResult<(StatusCode, Json<GalleryItem>)> {
    auth.require(Access::Admin)?;

    let item = state.store.insert_gallery_item(data, auth.user_id).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

pub async fn update_item(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
    ValidJson(data): ValidJson<UpdateGalleryItem>,
) -> ApiResult<Json<GalleryItem>> {
    auth.require(Access::Admin)?;

    let item = state
        .store
        .update_gallery_item(id, data)
        .await?
        .ok_or_else(item_not_found)?;

    Ok(Json(item))
}

pub async fn delete_item(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    auth.require(Access::Admin)?;

    if !state.store.delete_gallery_item(id).await? {
        return Err(item_not_found());
    }

    Ok(Json(MessageResponse::new("Gallery item deleted successfully")))
}

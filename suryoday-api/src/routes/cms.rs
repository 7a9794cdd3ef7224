/// Read-only CMS collections
///
/// `GET /api/cms/:collection` runs the collection's fixed query against the
/// headless CMS and returns its documents untouched. Volunteer intake
/// collections need an admin; the rest are public.

use crate::{app::AppState, error::ApiResult, extract::Path};
use axum::{extract::State, Json};
use serde_json::Value as JsonValue;
use suryoday_shared::{
    auth::{
        authorization::Access,
        middleware::{AuthContext, AuthError},
    },
    cms::CmsCollection,
};

pub async fn fetch_collection(
    State(state): State<AppState>,
    auth: Result<AuthContext, AuthError>,
    Path(slug): Path<String>,
) -> ApiResult<Json<JsonValue>> {
    let collection: CmsCollection = slug.parse()?;

    if !collection.is_public() {
        auth?.require(Access::Admin)?;
    }

    let documents = state.cms.fetch(collection).await?;
    Ok(Json(documents))
}

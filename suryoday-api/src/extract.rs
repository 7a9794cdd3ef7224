/// Request extractors with JSON error bodies
///
/// Axum's stock extractors reject with plain-text bodies. These wrappers
/// route every rejection through [`ApiError`] so clients always get the
/// same `{error, message}` shape.

use axum::{
    async_trait,
    body::Body,
    extract::{FromRequest, FromRequestParts, Request},
    Json,
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::error::ApiError;

/// JSON body that is deserialized and then validated
///
/// Unknown fields, type mismatches and missing fields are 400s, and so is a
/// body that fails its `validator` rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        value.validate()?;
        Ok(ValidJson(value))
    }
}

/// Upper bound on bodies buffered by [`OptionalJson`]
const OPTIONAL_BODY_LIMIT: usize = 64 * 1024;

/// Like [`ValidJson`], but an empty body stands for `T::default()`
///
/// Any non-empty body goes through [`ValidJson`] unchanged, so unknown
/// fields, bad JSON and failed rules are still 400s.
#[derive(Debug, Clone, Copy, Default)]
pub struct OptionalJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for OptionalJson<T>
where
    T: DeserializeOwned + Validate + Default,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let (parts, body) = req.into_parts();
        let bytes = axum::body::to_bytes(body, OPTIONAL_BODY_LIMIT)
            .await
            .map_err(|e| ApiError::BadRequest(format!("Failed to read request body: {e}")))?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(OptionalJson(T::default()));
        }

        let req = Request::from_parts(parts, Body::from(bytes));
        let ValidJson(value) = ValidJson::<T>::from_request(req, state).await?;
        Ok(OptionalJson(value))
    }
}

/// Path parameters; a malformed id is a 400
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct Path<T>(pub T);

/// Query string parameters
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct Query<T>(pub T);

/// Request identity for Axum
///
/// [`identify`] runs on every request. It reads an `Authorization: Bearer`
/// header if present, verifies it, and stores the outcome in request
/// extensions. It never rejects on its own: public routes simply ignore the
/// outcome, while protected handlers take an [`AuthContext`] argument whose
/// extractor turns a missing or bad token into a 401.
///
/// # Example
///
/// ```no_run
/// use axum::{middleware, routing::get, Router};
/// use suryoday_shared::auth::jwt::TokenIssuer;
/// use suryoday_shared::auth::middleware::{identify, AuthContext};
///
/// async fn me(auth: AuthContext) -> String {
///     format!("Hello, {}!", auth.user_id)
/// }
///
/// let issuer = TokenIssuer::new("a-secret-key-that-is-at-least-32-bytes", 24);
/// let app: Router = Router::new()
///     .route("/me", get(me))
///     .layer(middleware::from_fn_with_state(issuer, identify));
/// ```

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::authorization::{authorize, Access, AuthzError};
use super::jwt::TokenIssuer;
use crate::models::user::Role;

/// Verified caller identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    pub user_id: Uuid,
    pub role: Role,
}

impl AuthContext {
    pub fn new(user_id: Uuid, role: Role) -> Self {
        Self { user_id, role }
    }

    /// Runs the role gate for this identity
    pub fn require(&self, access: Access) -> Result<&Self, AuthzError> {
        authorize(access, Some(self))
    }
}

/// Why a request carries no usable identity
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// No `Authorization` header
    #[error("No token provided")]
    MissingCredentials,

    /// Header present but malformed, badly signed or expired
    #[error("Invalid or expired token")]
    InvalidToken,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "error": "unauthorized",
            "message": self.to_string(),
        });
        (StatusCode::UNAUTHORIZED, Json(body)).into_response()
    }
}

/// Marker left in extensions when a bearer token failed verification
#[derive(Debug, Clone, Copy)]
struct RejectedToken;

/// Verifies the bearer token, if any, and records the outcome
pub async fn identify(State(issuer): State<TokenIssuer>, mut req: Request, next: Next) -> Response {
    let header_value = req
        .headers()
        .get(header::AUTHORIZATION)
        .map(|v| v.to_str().unwrap_or_default().to_string());

    if let Some(value) = header_value {
        let verified = value
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(|token| issuer.verify(token));

        match verified {
            Some(Ok(claims)) => {
                req.extensions_mut()
                    .insert(AuthContext::new(claims.sub, claims.role));
            }
            Some(Err(e)) => {
                tracing::debug!(error = %e, "Rejected bearer token");
                req.extensions_mut().insert(RejectedToken);
            }
            None => {
                tracing::debug!("Malformed authorization header");
                req.extensions_mut().insert(RejectedToken);
            }
        }
    }

    next.run(req).await
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(auth) = parts.extensions.get::<AuthContext>() {
            return Ok(*auth);
        }
        if parts.extensions.get::<RejectedToken>().is_some() {
            return Err(AuthError::InvalidToken);
        }
        Err(AuthError::MissingCredentials)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, middleware, routing::get, Router};
    use tower::ServiceExt;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    async fn whoami(auth: AuthContext) -> String {
        format!("{}:{}", auth.user_id, auth.role)
    }

    fn app() -> Router {
        Router::new()
            .route("/whoami", get(whoami))
            .route("/public", get(|| async { "ok" }))
            .layer(middleware::from_fn_with_state(TokenIssuer::new(SECRET, 1), identify))
    }

    async fn call(uri: &str, authorization: Option<&str>) -> (StatusCode, String) {
        let mut builder = axum::http::Request::builder().uri(uri);
        if let Some(value) = authorization {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        let response = app().oneshot(builder.body(Body::empty()).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_valid_token_yields_context() {
        let user_id = Uuid::new_v4();
        let token = TokenIssuer::new(SECRET, 1).issue(user_id, Role::Volunteer).unwrap();

        let (status, body) = call("/whoami", Some(&format!("Bearer {token}"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, format!("{user_id}:volunteer"));
    }

    #[tokio::test]
    async fn test_missing_token() {
        let (status, body) = call("/whoami", None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.contains("No token provided"));
    }

    #[tokio::test]
    async fn test_invalid_token() {
        let (status, body) = call("/whoami", Some("Bearer garbage")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body.contains("Invalid or expired token"));

        let (status, _) = call("/whoami", Some("Basic abc")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_public_route_ignores_bad_token() {
        let (status, body) = call("/public", Some("Bearer garbage")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "ok");
    }

    #[test]
    fn test_require_runs_gate() {
        let ctx = AuthContext::new(Uuid::new_v4(), Role::Volunteer);
        assert!(ctx.require(Access::Authenticated).is_ok());
        assert!(ctx.require(Access::Admin).is_err());
    }
}

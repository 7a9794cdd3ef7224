/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /api/auth/login` - Exchange credentials for a session token
/// - `GET /api/auth/me` - Current account
/// - `POST /api/auth/change-password` - Replace own password
/// - `POST /api/auth/logout` - Acknowledge logout (tokens are stateless)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::ValidJson,
    routes::MessageResponse,
};
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use suryoday_shared::{
    auth::{middleware::AuthContext, password},
    models::user::{UpdateUser, User},
};
use validator::Validate;

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,

    /// Seconds until the token expires
    pub expires_in: i64,

    pub user: User,
}

/// Password change request
#[derive(Debug, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    #[serde(alias = "currentPassword")]
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,

    #[serde(alias = "newPassword")]
    pub new_password: String,
}

const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// Login endpoint
///
/// Only `active` accounts may log in. Unknown e-mail, wrong password and
/// inactive account all answer the same way.
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed
/// - `401 Unauthorized`: Invalid credentials
pub async fn login(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let user = state
        .store
        .user_by_email(&req.email)
        .await?
        .filter(User::is_active)
        .ok_or_else(|| ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;

    if !password::verify_password(&req.password, &user.password_hash)? {
        tracing::info!(user_id = %user.id, "Login rejected: wrong password");
        return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    }

    let token = state.issuer.issue(user.id, user.role)?;

    if let Err(e) = state.store.record_login(user.id).await {
        tracing::warn!(user_id = %user.id, error = %e, "Failed to stamp last login");
    }

    tracing::info!(user_id = %user.id, role = %user.role, "User logged in");

    Ok(Json(LoginResponse {
        token,
        expires_in: state.issuer.expires_in_seconds(),
        user,
    }))
}

/// Returns the caller's account
pub async fn me(State(state): State<AppState>, auth: AuthContext) -> ApiResult<Json<User>> {
    let user = state
        .store
        .user_by_id(auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    Ok(Json(user))
}

/// Replaces the caller's password after checking the current one
///
/// # Errors
///
/// - `400 Bad Request`: New password too short
/// - `401 Unauthorized`: Current password is wrong
pub async fn change_password(
    State(state): State<AppState>,
    auth: AuthContext,
    ValidJson(req): ValidJson<ChangePasswordRequest>,
) -> ApiResult<Json<MessageResponse>> {
    password::validate_password_strength(&req.new_password)
        .map_err(|e| ApiError::invalid_field("new_password", e))?;

    let user = state
        .store
        .user_by_id(auth.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    if !password::verify_password(&req.current_password, &user.password_hash)? {
        return Err(ApiError::Unauthorized("Current password is incorrect".to_string()));
    }

    let password_hash = password::hash_password(&req.new_password)?;
    state
        .store
        .update_user(
            user.id,
            UpdateUser {
                password_hash: Some(password_hash),
                ..UpdateUser::default()
            },
        )
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    tracing::info!(user_id = %user.id, "Password changed");
    Ok(Json(MessageResponse::new("Password updated successfully")))
}

/// Tokens are not tracked server side, so this only confirms the caller
pub async fn logout(auth: AuthContext) -> Json<MessageResponse> {
    tracing::debug!(user_id = %auth.user_id, "User logged out");
    Json(MessageResponse::new("Logged out successfully"))
}

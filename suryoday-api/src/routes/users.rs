/// Account administration
///
/// # Endpoints
///
/// - `GET /api/users` - List accounts (admin)
/// - `POST /api/users` - Create an account with a temporary password (admin;
///   staff accounts need a super admin)
/// - `PATCH /api/users/:id` - Edit name or e-mail (admin)
/// - `PATCH /api/users/:id/role` - Change role (super admin)
/// - `PATCH /api/users/:id/status` - Activate or deactivate (super admin)
/// - `DELETE /api/users/:id` - Remove an account (super admin)
///
/// Nobody may target their own account through these routes, and super
/// admin accounts are only touched by other super admins.

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::{Path, ValidJson},
    routes::MessageResponse,
};
use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use suryoday_shared::{
    auth::{
        authorization::{authorize_account_change, authorize_account_creation, AccountChange, Access},
        middleware::AuthContext,
        password,
    },
    effects::{notify, EffectOutcome},
    mail::templates::{self, Credentials},
    models::user::{AccountStatus, CreateUser, Role, UpdateUser, User},
};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 255, message = "name is required"))]
    pub name: String,

    #[validate(email(message = "email must be a valid email address"))]
    pub email: String,

    #[serde(default = "default_role")]
    pub role: Role,
}

fn default_role() -> Role {
    Role::Volunteer
}

#[derive(Debug, Serialize)]
pub struct CreateUserResponse {
    pub user: User,

    /// Shown once; the account holder should change it at first login
    pub temporary_password: String,

    pub notification: EffectOutcome,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdateUserRequest {
    #[validate(length(min = 1, max = 255, message = "name must not be empty"))]
    pub name: Option<String>,

    #[validate(email(message = "email must be a valid email address"))]
    pub email: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdateRoleRequest {
    pub role: Role,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdateStatusRequest {
    pub status: AccountStatus,
}

const DUPLICATE_EMAIL: &str = "User with this email already exists";

pub async fn list_users(State(state): State<AppState>, auth: AuthContext) -> ApiResult<Json<Vec<User>>> {
    auth.require(Access::Admin)?;
    Ok(Json(state.store.list_users().await?))
}

/// Creates an active account and mails the temporary password
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed or e-mail already registered
/// - `403 Forbidden`: Not staff, or a non super admin creating staff
pub async fn create_user(
    State(state): State<AppState>,
    auth: AuthContext,
    ValidJson(req): ValidJson<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<CreateUserResponse>)> {
    authorize_account_creation(&auth, req.role)?;

    if state.store.user_by_email(&req.email).await?.is_some() {
        return Err(ApiError::BadRequest(DUPLICATE_EMAIL.to_string()));
    }

    let temporary_password = password::generate_temporary_password();
    let password_hash = password::hash_password(&temporary_password)?;

    let user = state
        .store
        .insert_user(CreateUser {
            name: req.name,
            email: req.email,
            password_hash,
            role: req.role,
            status: AccountStatus::Active,
            volunteer_id: None,
            created_by: Some(auth.user_id),
        })
        .await
        .map_err(|e| {
            if e.is_conflict() {
                ApiError::BadRequest(DUPLICATE_EMAIL.to_string())
            } else {
                e.into()
            }
        })?;

    tracing::info!(
        user_id = %user.id,
        role = %user.role,
        created_by = %auth.user_id,
        "Account created"
    );

    let message = templates::welcome(
        &user.name,
        user.role.as_str(),
        Credentials {
            email: &user.email,
            temporary_password: &temporary_password,
        },
        state.portal_url(),
    );
    let notification = notify(state.mailer.as_ref(), &user.email, &message).await;

    Ok((
        StatusCode::CREATED,
        Json(CreateUserResponse {
            user,
            temporary_password,
            notification,
        }),
    ))
}

/// Loads the target and applies the account-change rules
///
/// The role gate runs even when the id is unknown, so a volunteer cannot
/// probe which accounts exist.
async fn load_target(
    state: &AppState,
    auth: &AuthContext,
    id: Uuid,
    change: AccountChange,
) -> ApiResult<User> {
    match state.store.user_by_id(id).await? {
        Some(target) => {
            authorize_account_change(auth, &target, change)?;
            Ok(target)
        }
        None => {
            auth.require(change.required_access())?;
            Err(ApiError::NotFound("User not found".to_string()))
        }
    }
}

async fn apply_change(state: &AppState, id: Uuid, update: UpdateUser) -> ApiResult<User> {
    state
        .store
        .update_user(id, update)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))
}

pub async fn update_user(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
    ValidJson(req): ValidJson<UpdateUserRequest>,
) -> ApiResult<Json<User>> {
    let target = load_target(&state, &auth, id, AccountChange::Profile).await?;

    if let Some(email) = &req.email {
        if let Some(existing) = state.store.user_by_email(email).await? {
            if existing.id != target.id {
                return Err(ApiError::BadRequest(DUPLICATE_EMAIL.to_string()));
            }
        }
    }

    let user = apply_change(
        &state,
        target.id,
        UpdateUser {
            name: req.name,
            email: req.email,
            ..UpdateUser::default()
        },
    )
    .await?;

    Ok(Json(user))
}

pub async fn update_role(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
    ValidJson(req): ValidJson<UpdateRoleRequest>,
) -> ApiResult<Json<User>> {
    let target = load_target(&state, &auth, id, AccountChange::Role).await?;

    let user = apply_change(
        &state,
        target.id,
        UpdateUser {
            role: Some(req.role),
            ..UpdateUser::default()
        },
    )
    .await?;

    tracing::info!(user_id = %user.id, from = %target.role, to = %user.role, "Role changed");
    Ok(Json(user))
}

pub async fn update_status(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
    ValidJson(req): ValidJson<UpdateStatusRequest>,
) -> ApiResult<Json<User>> {
    let target = load_target(&state, &auth, id, AccountChange::Status).await?;

    let user = apply_change(
        &state,
        target.id,
        UpdateUser {
            status: Some(req.status),
            ..UpdateUser::default()
        },
    )
    .await?;

    tracing::info!(user_id = %user.id, status = ?user.status, "Account status changed");
    Ok(Json(user))
}

pub async fn delete_user(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    let target = load_target(&state, &auth, id, AccountChange::Delete).await?;

    if !state.store.delete_user(target.id).await? {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    tracing::info!(user_id = %target.id, deleted_by = %auth.user_id, "Account deleted");
    Ok(Json(MessageResponse::new("User deleted successfully")))
}

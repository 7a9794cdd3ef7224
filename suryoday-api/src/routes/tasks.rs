/// Task assignments
///
/// # Endpoints
///
/// - `POST /api/tasks` - Assign a task and notify the assignee (admin)
/// - `GET /api/tasks` - List, `?status=&assigned_to=` (volunteers see their own)
/// - `GET /api/tasks/stats/overview` - Counts (volunteers see their own)
/// - `GET /api/tasks/:id` - One task (owner or staff)
/// - `PATCH /api/tasks/:id` - Edit any field (admin)
/// - `PATCH /api/tasks/:id/status` - Progress update (owner or staff)
/// - `DELETE /api/tasks/:id` (admin)

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    extract::{Path, Query, ValidJson},
    routes::MessageResponse,
};
use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use suryoday_shared::{
    auth::{
        authorization::{owner_scope, require_owner, Access},
        middleware::AuthContext,
    },
    effects::{notify, EffectOutcome},
    mail::templates,
    models::{
        task::{CreateTask, Task, TaskFilter, TaskStats, TaskStatus, UpdateTask},
        user::User,
    },
};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Default, Deserialize)]
pub struct ListTasksQuery {
    pub status: Option<TaskStatus>,
    pub assigned_to: Option<Uuid>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct TaskStatusRequest {
    pub status: TaskStatus,

    #[validate(length(max = 5000, message = "notes are too long"))]
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TaskCreated {
    #[serde(flatten)]
    pub task: Task,

    pub notification: EffectOutcome,
}

fn task_not_found() -> ApiError {
    ApiError::NotFound("Task not found".to_string())
}

async fn find_task(state: &AppState, id: Uuid) -> ApiResult<Task> {
    state.store.task_by_id(id).await?.ok_or_else(task_not_found)
}

async fn find_assignee(state: &AppState, user_id: Uuid) -> ApiResult<User> {
    state
        .store
        .user_by_id(user_id)
        .await?
        .ok_or_else(|| ApiError::invalid_field("assigned_to", "Assigned user not found"))
}

/// Creates a task and e-mails the assignee
///
/// The e-mail is best effort; its outcome is returned next to the task.
pub async fn create_task(
    State(state): State<AppState>,
    auth: AuthContext,
    ValidJson(data): ValidJson<CreateTask>,
) -> ApiResult<(StatusCode, Json<TaskCreated>)> {
    auth.require(Access::Admin)?;

    let assignee = find_assignee(&state, data.assigned_to).await?;

    let task = state.store.insert_task(data, auth.user_id).await?;
    tracing::info!(task_id = %task.id, assigned_to = %task.assigned_to, "Task created");

    let message = templates::task_assigned(
        &assignee.name,
        &task.title,
        &task.description,
        &task.due_date.format("%Y-%m-%d").to_string(),
        state.portal_url(),
    );
    let notification = notify(state.mailer.as_ref(), &assignee.email, &message).await;

    Ok((StatusCode::CREATED, Json(TaskCreated { task, notification })))
}

pub async fn list_tasks(
    State(state): State<AppState>,
    auth: AuthContext,
    Query(query): Query<ListTasksQuery>,
) -> ApiResult<Json<Vec<Task>>> {
    let filter = TaskFilter {
        status: query.status,
        assigned_to: owner_scope(&auth).or(query.assigned_to),
    };

    Ok(Json(state.store.list_tasks(filter).await?))
}

pub async fn task_stats(State(state): State<AppState>, auth: AuthContext) -> ApiResult<Json<TaskStats>> {
    Ok(Json(state.store.task_stats(owner_scope(&auth)).await?))
}

pub async fn get_task(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Task>> {
    let task = find_task(&state, id).await?;
    require_owner(&auth, task.assigned_to)?;
    Ok(Json(task))
}

pub async fn update_task(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
    ValidJson(data): ValidJson<UpdateTask>,
) -> ApiResult<Json<Task>> {
    auth.require(Access::Admin)?;

    if let Some(assignee) = data.assigned_to {
        find_assignee(&state, assignee).await?;
    }

    let task = state.store.update_task(id, data).await?.ok_or_else(task_not_found)?;
    Ok(Json(task))
}

/// Progress update by the assignee; `completed` stamps `completed_at`
pub async fn update_task_status(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
    ValidJson(req): ValidJson<TaskStatusRequest>,
) -> ApiResult<Json<Task>> {
    let task = find_task(&state, id).await?;
    require_owner(&auth, task.assigned_to)?;

    let update = UpdateTask {
        status: Some(req.status),
        notes: req.notes,
        ..UpdateTask::default()
    };

    let task = state.store.update_task(id, update).await?.ok_or_else(task_not_found)?;
    tracing::info!(task_id = %task.id, status = ?task.status, by = %auth.user_id, "Task status updated");
    Ok(Json(task))
}

pub async fn delete_task(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<MessageResponse>> {
    auth.require(Access::Admin)?;

    if !state.store.delete_task(id).await? {
        return Err(task_not_found());
    }

    Ok(Json(MessageResponse::new("Task deleted successfully")))
}

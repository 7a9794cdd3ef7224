/// Volunteer task model and database operations
///
/// Tasks are assigned by staff to a volunteer account (`assigned_to`). A
/// volunteer may only see and update tasks assigned to them.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE task_status AS ENUM ('pending', 'in_progress', 'completed', 'cancelled');
/// CREATE TYPE task_priority AS ENUM ('low', 'medium', 'high', 'urgent');
///
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     title VARCHAR(255) NOT NULL,
///     description TEXT NOT NULL DEFAULT '',
///     assigned_to UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     assigned_by UUID REFERENCES users(id) ON DELETE SET NULL,
///     due_date DATE NOT NULL,
///     priority task_priority NOT NULL DEFAULT 'medium',
///     category VARCHAR(100) NOT NULL DEFAULT 'general',
///     status task_status NOT NULL DEFAULT 'pending',
///     notes TEXT,
///     completed_at TIMESTAMPTZ,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;
use validator::Validate;

const TASK_COLUMNS: &str = "id, title, description, assigned_to, assigned_by, due_date, priority, \
                            category, status, notes, completed_at, created_at, updated_at";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_priority", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl TaskPriority {
    /// `high` and `urgent`
    pub fn is_high(&self) -> bool {
        matches!(self, TaskPriority::High | TaskPriority::Urgent)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    pub id: Uuid,
    pub title: String,
    pub description: String,

    /// Owning volunteer account
    pub assigned_to: Uuid,

    pub assigned_by: Option<Uuid>,
    pub due_date: NaiveDate,
    pub priority: TaskPriority,
    pub category: String,
    pub status: TaskStatus,
    pub notes: Option<String>,

    /// Set when the task moves to `completed`
    pub completed_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Staff input for assigning a new task
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CreateTask {
    #[validate(length(min = 1, max = 255, message = "title is required"))]
    pub title: String,

    #[serde(default)]
    pub description: String,

    pub assigned_to: Uuid,
    pub due_date: NaiveDate,

    #[serde(default)]
    pub priority: TaskPriority,

    #[serde(default = "default_category")]
    #[validate(length(min = 1, max = 100, message = "category must not be empty"))]
    pub category: String,
}

pub(crate) fn default_category() -> String {
    "general".to_string()
}

/// Partial task update
///
/// Staff may set any field; a volunteer goes through the status endpoint,
/// which only fills `status` and `notes`.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdateTask {
    #[validate(length(min = 1, max = 255, message = "title must not be empty"))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub assigned_to: Option<Uuid>,
    pub due_date: Option<NaiveDate>,
    pub priority: Option<TaskPriority>,
    pub category: Option<String>,
    pub status: Option<TaskStatus>,
    pub notes: Option<String>,
}

impl UpdateTask {
    /// Applies the update to an in-memory row with the same rules as the SQL
    /// path
    pub fn apply(self, task: &mut Task, now: DateTime<Utc>) {
        if let Some(title) = self.title {
            task.title = title;
        }
        if let Some(description) = self.description {
            task.description = description;
        }
        if let Some(assigned_to) = self.assigned_to {
            task.assigned_to = assigned_to;
        }
        if let Some(due_date) = self.due_date {
            task.due_date = due_date;
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(category) = self.category {
            task.category = category;
        }
        if let Some(status) = self.status {
            task.status = status;
            if status == TaskStatus::Completed {
                task.completed_at = Some(now);
            }
        }
        if let Some(notes) = self.notes {
            task.notes = Some(notes);
        }
        task.updated_at = now;
    }
}

/// Filter for task listings
#[derive(Debug, Clone, Copy, Default)]
pub struct TaskFilter {
    pub status: Option<TaskStatus>,
    pub assigned_to: Option<Uuid>,
}

impl TaskFilter {
    pub fn matches(&self, task: &Task) -> bool {
        self.status.map_or(true, |s| task.status == s)
            && self.assigned_to.map_or(true, |id| task.assigned_to == id)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct TaskStats {
    pub total: i64,
    pub pending: i64,
    pub in_progress: i64,
    pub completed: i64,
    pub high_priority: i64,
}

impl TaskStats {
    pub fn tally<'a, I: IntoIterator<Item = &'a Task>>(tasks: I) -> Self {
        let mut stats = TaskStats::default();
        for task in tasks {
            stats.total += 1;
            match task.status {
                TaskStatus::Pending => stats.pending += 1,
                TaskStatus::InProgress => stats.in_progress += 1,
                TaskStatus::Completed => stats.completed += 1,
                TaskStatus::Cancelled => {}
            }
            if task.priority.is_high() {
                stats.high_priority += 1;
            }
        }
        stats
    }
}

impl Task {
    pub async fn create(
        pool: &PgPool,
        data: CreateTask,
        assigned_by: Uuid,
    ) -> Result<Self, sqlx::Error> {
        let sql = format!(
            "INSERT INTO tasks (title, description, assigned_to, assigned_by, due_date, priority, category) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {TASK_COLUMNS}"
        );

        sqlx::query_as::<_, Task>(&sql)
            .bind(data.title)
            .bind(data.description)
            .bind(data.assigned_to)
            .bind(assigned_by)
            .bind(data.due_date)
            .bind(data.priority)
            .bind(data.category)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let sql = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1");
        sqlx::query_as::<_, Task>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Lists tasks, newest first
    pub async fn list(pool: &PgPool, filter: TaskFilter) -> Result<Vec<Self>, sqlx::Error> {
        let mut query: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {TASK_COLUMNS} FROM tasks WHERE TRUE"));
        if let Some(status) = filter.status {
            query.push(" AND status = ").push_bind(status);
        }
        if let Some(assigned_to) = filter.assigned_to {
            query.push(" AND assigned_to = ").push_bind(assigned_to);
        }
        query.push(" ORDER BY created_at DESC");

        query.build_query_as::<Task>().fetch_all(pool).await
    }

    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateTask,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query: QueryBuilder<Postgres> =
            QueryBuilder::new("UPDATE tasks SET updated_at = NOW()");

        if let Some(title) = data.title {
            query.push(", title = ").push_bind(title);
        }
        if let Some(description) = data.description {
            query.push(", description = ").push_bind(description);
        }
        if let Some(assigned_to) = data.assigned_to {
            query.push(", assigned_to = ").push_bind(assigned_to);
        }
        if let Some(due_date) = data.due_date {
            query.push(", due_date = ").push_bind(due_date);
        }
        if let Some(priority) = data.priority {
            query.push(", priority = ").push_bind(priority);
        }
        if let Some(category) = data.category {
            query.push(", category = ").push_bind(category);
        }
        if let Some(status) = data.status {
            query.push(", status = ").push_bind(status);
            if status == TaskStatus::Completed {
                query.push(", completed_at = NOW()");
            }
        }
        if let Some(notes) = data.notes {
            query.push(", notes = ").push_bind(notes);
        }

        query
            .push(" WHERE id = ")
            .push_bind(id)
            .push(format!(" RETURNING {TASK_COLUMNS}"));

        query.build_query_as::<Task>().fetch_optional(pool).await
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Counts for the dashboard, optionally scoped to one assignee
    pub async fn stats(pool: &PgPool, assigned_to: Option<Uuid>) -> Result<TaskStats, sqlx::Error> {
        sqlx::query_as::<_, TaskStats>(
            r#"
            SELECT COUNT(*) AS total,
                   COUNT(*) FILTER (WHERE status = 'pending') AS pending,
                   COUNT(*) FILTER (WHERE status = 'in_progress') AS in_progress,
                   COUNT(*) FILTER (WHERE status = 'completed') AS completed,
                   COUNT(*) FILTER (WHERE priority IN ('high', 'urgent')) AS high_priority
            FROM tasks
            WHERE ($1::uuid IS NULL OR assigned_to = $1)
            "#,
        )
        .bind(assigned_to)
        .fetch_one(pool)
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_task(status: TaskStatus, priority: TaskPriority) -> Task {
        let now = Utc::now();
        Task {
            id: Uuid::new_v4(),
            title: "Serve lunch".into(),
            description: String::new(),
            assigned_to: Uuid::new_v4(),
            assigned_by: None,
            due_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            priority,
            category: default_category(),
            status,
            notes: None,
            completed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_create_task_defaults() {
        let input: CreateTask = serde_json::from_value(serde_json::json!({
            "title": "Visit",
            "assigned_to": Uuid::new_v4(),
            "due_date": "2024-02-01"
        }))
        .unwrap();

        assert_eq!(input.priority, TaskPriority::Medium);
        assert_eq!(input.category, "general");
        assert_eq!(input.description, "");
    }

    #[test]
    fn test_create_task_requires_due_date() {
        let result = serde_json::from_value::<CreateTask>(serde_json::json!({
            "title": "Visit",
            "assigned_to": Uuid::new_v4()
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_completing_stamps_completed_at() {
        let mut task = sample_task(TaskStatus::InProgress, TaskPriority::Low);
        let now = Utc::now();
        UpdateTask {
            status: Some(TaskStatus::Completed),
            notes: Some("done".into()),
            ..Default::default()
        }
        .apply(&mut task, now);

        assert_eq!(task.status, TaskStatus::Completed);
        assert_eq!(task.completed_at, Some(now));
        assert_eq!(task.notes.as_deref(), Some("done"));
    }

    #[test]
    fn test_status_serde() {
        assert_eq!(
            serde_json::to_string(&TaskStatus::InProgress).unwrap(),
            "\"in_progress\""
        );
        assert!(serde_json::from_str::<TaskStatus>("\"done\"").is_err());
    }

    #[test]
    fn test_stats_tally() {
        let tasks = vec![
            sample_task(TaskStatus::Pending, TaskPriority::High),
            sample_task(TaskStatus::InProgress, TaskPriority::Urgent),
            sample_task(TaskStatus::Completed, TaskPriority::Low),
            sample_task(TaskStatus::Cancelled, TaskPriority::Medium),
        ];

        let stats = TaskStats::tally(&tasks);
        assert_eq!(
            stats,
            TaskStats { total: 4, pending: 1, in_progress: 1, completed: 1, high_priority: 2 }
        );
    }

    #[test]
    fn test_filter_matches() {
        let task = sample_task(TaskStatus::Pending, TaskPriority::Low);
        assert!(TaskFilter::default().matches(&task));
        assert!(TaskFilter { assigned_to: Some(task.assigned_to), ..Default::default() }.matches(&task));
        assert!(!TaskFilter { assigned_to: Some(Uuid::new_v4()), ..Default::default() }.matches(&task));
        assert!(!TaskFilter { status: Some(TaskStatus::Completed), ..Default::default() }.matches(&task));
    }
}

/// Persistence collaborators
///
/// Handlers and the volunteer lifecycle depend on these traits, never on a
/// concrete database. [`PgStore`] is the production implementation backed by
/// the model SQL; [`MemoryStore`] keeps everything in process and is what the
/// test suites run against. Both enforce unique (case-insensitive) emails on
/// accounts and applications.
///
/// Conventions: lookups return `Option`, updates return the new row or `None`
/// when the id is unknown, deletes return whether a row went away.

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{
    content::{Content, CreateContent, UpdateContent},
    event::{CreateEvent, Event, EventFilter, UpdateEvent},
    gallery::{CreateGalleryItem, GalleryItem, UpdateGalleryItem},
    task::{CreateTask, Task, TaskFilter, TaskStats, UpdateTask},
    urgent_need::{CreateUrgentNeed, UpdateUrgentNeed, UrgentNeed},
    user::{CreateUser, UpdateUser, User},
    volunteer::{UpdateVolunteer, Volunteer, VolunteerApplication, VolunteerStats, VolunteerStatus},
    volunteer_hours::{HoursFilter, HoursTotals, NewHours, ReviewHours, UpdateHours, VolunteerHours},
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Postgres SQLSTATE for unique constraint violations
pub const UNIQUE_VIOLATION: &str = "23505";

/// Error type for store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A unique constraint rejected the write
    #[error("Duplicate value: {0}")]
    Conflict(String),

    /// Anything else the backend reported
    #[error("Database error: {0}")]
    Database(String),
}

impl StoreError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Conflict(_))
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
                let constraint = db_err.constraint().unwrap_or("unique constraint");
                return StoreError::Conflict(constraint.to_string());
            }
        }
        StoreError::Database(err.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn insert_user(&self, data: CreateUser) -> StoreResult<User>;
    async fn user_by_id(&self, id: Uuid) -> StoreResult<Option<User>>;
    async fn user_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    async fn user_by_volunteer(&self, volunteer_id: Uuid) -> StoreResult<Option<User>>;
    async fn list_users(&self) -> StoreResult<Vec<User>>;
    async fn update_user(&self, id: Uuid, data: UpdateUser) -> StoreResult<Option<User>>;
    async fn record_login(&self, id: Uuid) -> StoreResult<()>;
    async fn delete_user(&self, id: Uuid) -> StoreResult<bool>;
}

#[async_trait]
pub trait VolunteerStore: Send + Sync {
    async fn insert_volunteer(&self, data: VolunteerApplication) -> StoreResult<Volunteer>;
    async fn volunteer_by_id(&self, id: Uuid) -> StoreResult<Option<Volunteer>>;
    async fn volunteer_by_email(&self, email: &str) -> StoreResult<Option<Volunteer>>;
    async fn list_volunteers(&self, status: Option<VolunteerStatus>) -> StoreResult<Vec<Volunteer>>;
    async fn update_volunteer(&self, id: Uuid, data: UpdateVolunteer) -> StoreResult<Option<Volunteer>>;

    /// Moves `pending|approved` to `approved`; `None` from any other state
    async fn mark_volunteer_approved(&self, id: Uuid, by: Uuid) -> StoreResult<Option<Volunteer>>;

    /// Moves `pending` to `rejected`; `None` from any other state
    async fn mark_volunteer_rejected(
        &self,
        id: Uuid,
        by: Uuid,
        reason: &str,
    ) -> StoreResult<Option<Volunteer>>;

    async fn delete_volunteer(&self, id: Uuid) -> StoreResult<bool>;
    async fn volunteer_stats(&self) -> StoreResult<VolunteerStats>;
}

#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn insert_task(&self, data: CreateTask, assigned_by: Uuid) -> StoreResult<Task>;
    async fn task_by_id(&self, id: Uuid) -> StoreResult<Option<Task>>;
    async fn list_tasks(&self, filter: TaskFilter) -> StoreResult<Vec<Task>>;
    async fn update_task(&self, id: Uuid, data: UpdateTask) -> StoreResult<Option<Task>>;
    async fn delete_task(&self, id: Uuid) -> StoreResult<bool>;
    async fn task_stats(&self, assigned_to: Option<Uuid>) -> StoreResult<TaskStats>;
}

#[async_trait]
pub trait EventStore: Send + Sync {
    async fn insert_event(&self, data: CreateEvent, created_by: Uuid) -> StoreResult<Event>;
    async fn event_by_id(&self, id: Uuid) -> StoreResult<Option<Event>>;
    async fn list_events(&self, filter: EventFilter) -> StoreResult<Vec<Event>>;
    async fn update_event(&self, id: Uuid, data: UpdateEvent) -> StoreResult<Option<Event>>;
    async fn delete_event(&self, id: Uuid) -> StoreResult<bool>;
}

#[async_trait]
pub trait ContentStore: Send + Sync {
    async fn insert_content(&self, data: CreateContent, created_by: Uuid) -> StoreResult<Content>;
    async fn content_by_id(&self, id: Uuid) -> StoreResult<Option<Content>>;
    async fn list_published_content(&self, content_type: &str) -> StoreResult<Vec<Content>>;
    async fn update_content(&self, id: Uuid, data: UpdateContent) -> StoreResult<Option<Content>>;
    async fn delete_content(&self, id: Uuid) -> StoreResult<bool>;
}

#[async_trait]
pub trait UrgentNeedStore: Send + Sync {
    async fn insert_need(&self, data: CreateUrgentNeed, created_by: Uuid) -> StoreResult<UrgentNeed>;
    async fn need_by_id(&self, id: Uuid) -> StoreResult<Option<UrgentNeed>>;
    async fn list_needs(&self, active_only: bool) -> StoreResult<Vec<UrgentNeed>>;
    async fn update_need(&self, id: Uuid, data: UpdateUrgentNeed) -> StoreResult<Option<UrgentNeed>>;

    /// Atomic `raised_amount += amount`
    async fn add_donation(&self, id: Uuid, amount: f64) -> StoreResult<Option<UrgentNeed>>;

    async fn delete_need(&self, id: Uuid) -> StoreResult<bool>;
}

#[async_trait]
pub trait GalleryStore: Send + Sync {
    async fn insert_gallery_item(
        &self,
        data: CreateGalleryItem,
        created_by: Uuid,
    ) -> StoreResult<GalleryItem>;
    async fn gallery_item_by_id(&self, id: Uuid) -> StoreResult<Option<GalleryItem>>;
    async fn list_published_gallery(&self) -> StoreResult<Vec<GalleryItem>>;
    async fn update_gallery_item(
        &self,
        id: Uuid,
        data: UpdateGalleryItem,
    ) -> StoreResult<Option<GalleryItem>>;
    async fn delete_gallery_item(&self, id: Uuid) -> StoreResult<bool>;
}

#[async_trait]
pub trait HoursStore: Send + Sync {
    async fn insert_hours(&self, data: NewHours) -> StoreResult<VolunteerHours>;
    async fn hours_by_id(&self, id: Uuid) -> StoreResult<Option<VolunteerHours>>;
    async fn list_hours(&self, filter: HoursFilter) -> StoreResult<Vec<VolunteerHours>>;

    /// With `pending_only`, leaves reviewed rows untouched and returns `None`
    async fn update_hours(
        &self,
        id: Uuid,
        data: UpdateHours,
        pending_only: bool,
    ) -> StoreResult<Option<VolunteerHours>>;

    async fn review_hours(
        &self,
        id: Uuid,
        review: ReviewHours,
        reviewed_by: Uuid,
    ) -> StoreResult<Option<VolunteerHours>>;
    async fn hours_totals(&self, volunteer_id: Uuid) -> StoreResult<HoursTotals>;
    async fn delete_hours(&self, id: Uuid) -> StoreResult<bool>;
}

/// Everything the API needs from persistence
#[async_trait]
pub trait Store:
    UserStore
    + VolunteerStore
    + TaskStore
    + EventStore
    + ContentStore
    + UrgentNeedStore
    + GalleryStore
    + HoursStore
{
    /// Connectivity probe for the health endpoint
    async fn ping(&self) -> StoreResult<()>;
}

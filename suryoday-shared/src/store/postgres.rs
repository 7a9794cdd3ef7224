/// PostgreSQL-backed store
///
/// A thin adapter from the store traits onto the model SQL. Unique
/// violations surface as [`StoreError::Conflict`].

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{
    ContentStore, EventStore, GalleryStore, HoursStore, Store, StoreResult, TaskStore,
    UrgentNeedStore, UserStore, VolunteerStore,
};
use crate::db::pool::health_check;
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

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl UserStore for PgStore {
    async fn insert_user(&self, data: CreateUser) -> StoreResult<User> {
        Ok(User::create(&self.pool, data).await?)
    }

    async fn user_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        Ok(User::find_by_id(&self.pool, id).await?)
    }

    async fn user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(User::find_by_email(&self.pool, email).await?)
    }

    async fn user_by_volunteer(&self, volunteer_id: Uuid) -> StoreResult<Option<User>> {
        Ok(User::find_by_volunteer_id(&self.pool, volunteer_id).await?)
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        Ok(User::list(&self.pool).await?)
    }

    async fn update_user(&self, id: Uuid, data: UpdateUser) -> StoreResult<Option<User>> {
        Ok(User::update(&self.pool, id, data).await?)
    }

    async fn record_login(&self, id: Uuid) -> StoreResult<()> {
        Ok(User::touch_last_login(&self.pool, id).await?)
    }

    async fn delete_user(&self, id: Uuid) -> StoreResult<bool> {
        Ok(User::delete(&self.pool, id).await?)
    }
}

#[async_trait]
impl VolunteerStore for PgStore {
    async fn insert_volunteer(&self, data: VolunteerApplication) -> StoreResult<Volunteer> {
        Ok(Volunteer::create(&self.pool, data).await?)
    }

    async fn volunteer_by_id(&self, id: Uuid) -> StoreResult<Option<Volunteer>> {
        Ok(Volunteer::find_by_id(&self.pool, id).await?)
    }

    async fn volunteer_by_email(&self, email: &str) -> StoreResult<Option<Volunteer>> {
        Ok(Volunteer::find_by_email(&self.pool, email).await?)
    }

    async fn list_volunteers(&self, status: Option<VolunteerStatus>) -> StoreResult<Vec<Volunteer>> {
        Ok(Volunteer::list(&self.pool, status).await?)
    }

    async fn update_volunteer(&self, id: Uuid, data: UpdateVolunteer) -> StoreResult<Option<Volunteer>> {
        Ok(Volunteer::update(&self.pool, id, data).await?)
    }

    async fn mark_volunteer_approved(&self, id: Uuid, by: Uuid) -> StoreResult<Option<Volunteer>> {
        Ok(Volunteer::mark_approved(&self.pool, id, by).await?)
    }

    async fn mark_volunteer_rejected(
        &self,
        id: Uuid,
        by: Uuid,
        reason: &str,
    ) -> StoreResult<Option<Volunteer>> {
        Ok(Volunteer::mark_rejected(&self.pool, id, by, reason).await?)
    }

    async fn delete_volunteer(&self, id: Uuid) -> StoreResult<bool> {
        Ok(Volunteer::delete(&self.pool, id).await?)
    }

    async fn volunteer_stats(&self) -> StoreResult<VolunteerStats> {
        Ok(Volunteer::stats(&self.pool).await?)
    }
}

#[async_trait]
impl TaskStore for PgStore {
    async fn insert_task(&self, data: CreateTask, assigned_by: Uuid) -> StoreResult<Task> {
        Ok(Task::create(&self.pool, data, assigned_by).await?)
    }

    async fn task_by_id(&self, id: Uuid) -> StoreResult<Option<Task>> {
        Ok(Task::find_by_id(&self.pool, id).await?)
    }

    async fn list_tasks(&self, filter: TaskFilter) -> StoreResult<Vec<Task>> {
        Ok(Task::list(&self.pool, filter).await?)
    }

    async fn update_task(&self, id: Uuid, data: UpdateTask) -> StoreResult<Option<Task>> {
        Ok(Task::update(&self.pool, id, data).await?)
    }

    async fn delete_task(&self, id: Uuid) -> StoreResult<bool> {
        Ok(Task::delete(&self.pool, id).await?)
    }

    async fn task_stats(&self, assigned_to: Option<Uuid>) -> StoreResult<TaskStats> {
        Ok(Task::stats(&self.pool, assigned_to).await?)
    }
}

#[async_trait]
impl EventStore for PgStore {
    async fn insert_event(&self, data: CreateEvent, created_by: Uuid) -> StoreResult<Event> {
        Ok(Event::create(&self.pool, data, created_by).await?)
    }

    async fn event_by_id(&self, id: Uuid) -> StoreResult<Option<Event>> {
        Ok(Event::find_by_id(&self.pool, id).await?)
    }

    async fn list_events(&self, filter: EventFilter) -> StoreResult<Vec<Event>> {
        Ok(Event::list(&self.pool, filter).await?)
    }

    async fn update_event(&self, id: Uuid, data: UpdateEvent) -> StoreResult<Option<Event>> {
        Ok(Event::update(&self.pool, id, data).await?)
    }

    async fn delete_event(&self, id: Uuid) -> StoreResult<bool> {
        Ok(Event::delete(&self.pool, id).await?)
    }
}

#[async_trait]
impl ContentStore for PgStore {
    async fn insert_content(&self, data: CreateContent, created_by: Uuid) -> StoreResult<Content> {
        Ok(Content::create(&self.pool, data, created_by).await?)
    }

    async fn content_by_id(&self, id: Uuid) -> StoreResult<Option<Content>> {
        Ok(Content::find_by_id(&self.pool, id).await?)
    }

    async fn list_published_content(&self, content_type: &str) -> StoreResult<Vec<Content>> {
        Ok(Content::list_published(&self.pool, content_type).await?)
    }

    async fn update_content(&self, id: Uuid, data: UpdateContent) -> StoreResult<Option<Content>> {
        Ok(Content::update(&self.pool, id, data).await?)
    }

    async fn delete_content(&self, id: Uuid) -> StoreResult<bool> {
        Ok(Content::delete(&self.pool, id).await?)
    }
}

#[async_trait]
impl UrgentNeedStore for PgStore {
    async fn insert_need(&self, data: CreateUrgentNeed, created_by: Uuid) -> StoreResult<UrgentNeed> {
        Ok(UrgentNeed::create(&self.pool, data, created_by).await?)
    }

    async fn need_by_id(&self, id: Uuid) -> StoreResult<Option<UrgentNeed>> {
        Ok(UrgentNeed::find_by_id(&self.pool, id).await?)
    }

    async fn list_needs(&self, active_only: bool) -> StoreResult<Vec<UrgentNeed>> {
        Ok(UrgentNeed::list(&self.pool, active_only).await?)
    }

    async fn update_need(&self, id: Uuid, data: UpdateUrgentNeed) -> StoreResult<Option<UrgentNeed>> {
        Ok(UrgentNeed::update(&self.pool, id, data).await?)
    }

    async fn add_donation(&self, id: Uuid, amount: f64) -> StoreResult<Option<UrgentNeed>> {
        Ok(UrgentNeed::add_donation(&self.pool, id, amount).await?)
    }

    async fn delete_need(&self, id: Uuid) -> StoreResult<bool> {
        Ok(UrgentNeed::delete(&self.pool, id).await?)
    }
}

#[async_trait]
impl GalleryStore for PgStore {
    async fn insert_gallery_item(
        &self,
        data: CreateGalleryItem,
        created_by: Uuid,
    ) -> StoreResult<GalleryItem> {
        Ok(GalleryItem::create(&self.pool, data, created_by).await?)
    }

    async fn gallery_item_by_id(&self, id: Uuid) -> StoreResult<Option<GalleryItem>> {
        Ok(GalleryItem::find_by_id(&self.pool, id).await?)
    }

    async fn list_published_gallery(&self) -> StoreResult<Vec<GalleryItem>> {
        Ok(GalleryItem::list_published(&self.pool).await?)
    }

    async fn update_gallery_item(
        &self,
        id: Uuid,
        data: UpdateGalleryItem,
    ) -> StoreResult<Option<GalleryItem>> {
        Ok(GalleryItem::update(&self.pool, id, data).await?)
    }

    async fn delete_gallery_item(&self, id: Uuid) -> StoreResult<bool> {
        Ok(GalleryItem::delete(&self.pool, id).await?)
    }
}

#[async_trait]
impl HoursStore for PgStore {
    async fn insert_hours(&self, data: NewHours) -> StoreResult<VolunteerHours> {
        Ok(VolunteerHours::create(&self.pool, data).await?)
    }

    async fn hours_by_id(&self, id: Uuid) -> StoreResult<Option<VolunteerHours>> {
        Ok(VolunteerHours::find_by_id(&self.pool, id).await?)
    }

    async fn list_hours(&self, filter: HoursFilter) -> StoreResult<Vec<VolunteerHours>> {
        Ok(VolunteerHours::list(&self.pool, filter).await?)
    }

    async fn update_hours(
        &self,
        id: Uuid,
        data: UpdateHours,
        pending_only: bool,
    ) -> StoreResult<Option<VolunteerHours>> {
        Ok(VolunteerHours::update(&self.pool, id, data, pending_only).await?)
    }

    async fn review_hours(
        &self,
        id: Uuid,
        review: ReviewHours,
        reviewed_by: Uuid,
    ) -> StoreResult<Option<VolunteerHours>> {
        Ok(VolunteerHours::review(&self.pool, id, review, reviewed_by).await?)
    }

    async fn hours_totals(&self, volunteer_id: Uuid) -> StoreResult<HoursTotals> {
        Ok(VolunteerHours::totals(&self.pool, volunteer_id).await?)
    }

    async fn delete_hours(&self, id: Uuid) -> StoreResult<bool> {
        Ok(VolunteerHours::delete(&self.pool, id).await?)
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(health_check(&self.pool).await?)
    }
}

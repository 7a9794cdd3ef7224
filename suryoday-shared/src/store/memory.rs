/// In-process store
///
/// Mirrors the Postgres semantics the rest of the crate relies on: unique
/// case-insensitive emails, conditional lifecycle updates, newest-first
/// listings. Each call holds one lock for its whole read-modify-write, so
/// concurrent callers see the same atomicity the SQL statements give.
///
/// Used by the test suites and handy for local demos without a database.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{
    ContentStore, EventStore, GalleryStore, HoursStore, Store, StoreError, StoreResult, TaskStore,
    UrgentNeedStore, UserStore, VolunteerStore,
};
use crate::models::{
    content::{Content, CreateContent, PublicationStatus, UpdateContent},
    event::{CreateEvent, Event, EventFilter, UpdateEvent},
    gallery::{CreateGalleryItem, GalleryItem, UpdateGalleryItem},
    task::{CreateTask, Task, TaskFilter, TaskStats, TaskStatus, UpdateTask},
    urgent_need::{CreateUrgentNeed, UpdateUrgentNeed, UrgentNeed},
    user::{CreateUser, UpdateUser, User},
    volunteer::{UpdateVolunteer, Volunteer, VolunteerApplication, VolunteerStats, VolunteerStatus},
    volunteer_hours::{
        HoursFilter, HoursStatus, HoursTotals, NewHours, ReviewHours, UpdateHours, VolunteerHours,
    },
};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    volunteers: Vec<Volunteer>,
    tasks: Vec<Task>,
    events: Vec<Event>,
    content: Vec<Content>,
    needs: Vec<UrgentNeed>,
    gallery: Vec<GalleryItem>,
    hours: Vec<VolunteerHours>,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
    fail_user_inserts: Arc<AtomicBool>,
    offline: Arc<AtomicBool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every account insert fail with a non-conflict database error
    pub fn fail_user_inserts(&self, fail: bool) {
        self.fail_user_inserts.store(fail, Ordering::SeqCst);
    }

    /// Makes [`Store::ping`] report the backend as unreachable
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }
}

fn same_email(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
}

/// Newest-first copy of rows that pass `keep`
fn newest_first<T: Clone>(rows: &[T], keep: impl Fn(&T) -> bool) -> Vec<T> {
    rows.iter().rev().filter(|row| keep(row)).cloned().collect()
}

fn remove_by<T>(rows: &mut Vec<T>, matches: impl Fn(&T) -> bool) -> bool {
    let before = rows.len();
    rows.retain(|row| !matches(row));
    rows.len() != before
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn insert_user(&self, data: CreateUser) -> StoreResult<User> {
        if self.fail_user_inserts.load(Ordering::SeqCst) {
            return Err(StoreError::Database("connection reset".into()));
        }

        let mut tables = self.tables.lock().await;
        if tables.users.iter().any(|u| same_email(&u.email, &data.email)) {
            return Err(StoreError::Conflict("users_email_key".into()));
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            name: data.name,
            email: data.email,
            password_hash: data.password_hash,
            role: data.role,
            status: data.status,
            volunteer_id: data.volunteer_id,
            created_by: data.created_by,
            last_login: None,
            created_at: now,
            updated_at: now,
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn user_by_id(&self, id: Uuid) -> StoreResult<Option<User>> {
        let tables = self.tables.lock().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let tables = self.tables.lock().await;
        Ok(tables.users.iter().find(|u| same_email(&u.email, email)).cloned())
    }

    async fn user_by_volunteer(&self, volunteer_id: Uuid) -> StoreResult<Option<User>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .users
            .iter()
            .find(|u| u.volunteer_id == Some(volunteer_id))
            .cloned())
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let tables = self.tables.lock().await;
        Ok(newest_first(&tables.users, |_| true))
    }

    async fn update_user(&self, id: Uuid, data: UpdateUser) -> StoreResult<Option<User>> {
        let mut tables = self.tables.lock().await;

        if let Some(email) = &data.email {
            if tables.users.iter().any(|u| u.id != id && same_email(&u.email, email)) {
                return Err(StoreError::Conflict("users_email_key".into()));
            }
        }

        let Some(user) = tables.users.iter_mut().find(|u| u.id == id) else {
            return Ok(None);
        };
        data.apply(user, Utc::now());
        Ok(Some(user.clone()))
    }

    async fn record_login(&self, id: Uuid) -> StoreResult<()> {
        let mut tables = self.tables.lock().await;
        if let Some(user) = tables.users.iter_mut().find(|u| u.id == id) {
            user.last_login = Some(Utc::now());
        }
        Ok(())
    }

    async fn delete_user(&self, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.lock().await;
        let removed = remove_by(&mut tables.users, |u| u.id == id);
        if removed {
            // ON DELETE CASCADE
            tables.tasks.retain(|t| t.assigned_to != id);
            tables.hours.retain(|h| h.volunteer_id != id);
        }
        Ok(removed)
    }
}

#[async_trait]
impl VolunteerStore for MemoryStore {
    async fn insert_volunteer(&self, data: VolunteerApplication) -> StoreResult<Volunteer> {
        let mut tables = self.tables.lock().await;
        if tables.volunteers.iter().any(|v| same_email(&v.email, &data.email)) {
            return Err(StoreError::Conflict("volunteers_email_key".into()));
        }

        let now = Utc::now();
        let volunteer = Volunteer {
            id: Uuid::new_v4(),
            name: data.name,
            email: data.email,
            phone: data.phone,
            age: data.age,
            skills: data.skills,
            availability: data.availability,
            experience: data.experience,
            motivation: data.motivation,
            emergency_contact: data.emergency_contact,
            status: VolunteerStatus::Pending,
            approved_by: None,
            approved_at: None,
            rejected_by: None,
            rejected_at: None,
            rejection_reason: None,
            created_at: now,
            updated_at: now,
        };
        tables.volunteers.push(volunteer.clone());
        Ok(volunteer)
    }

    async fn volunteer_by_id(&self, id: Uuid) -> StoreResult<Option<Volunteer>> {
        let tables = self.tables.lock().await;
        Ok(tables.volunteers.iter().find(|v| v.id == id).cloned())
    }

    async fn volunteer_by_email(&self, email: &str) -> StoreResult<Option<Volunteer>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .volunteers
            .iter()
            .find(|v| same_email(&v.email, email))
            .cloned())
    }

    async fn list_volunteers(&self, status: Option<VolunteerStatus>) -> StoreResult<Vec<Volunteer>> {
        let tables = self.tables.lock().await;
        Ok(newest_first(&tables.volunteers, |v| {
            status.map_or(true, |s| v.status == s)
        }))
    }

    async fn update_volunteer(&self, id: Uuid, data: UpdateVolunteer) -> StoreResult<Option<Volunteer>> {
        let mut tables = self.tables.lock().await;

        if let Some(email) = &data.email {
            if tables
                .volunteers
                .iter()
                .any(|v| v.id != id && same_email(&v.email, email))
            {
                return Err(StoreError::Conflict("volunteers_email_key".into()));
            }
        }

        let Some(volunteer) = tables.volunteers.iter_mut().find(|v| v.id == id) else {
            return Ok(None);
        };
        data.apply(volunteer, Utc::now());
        Ok(Some(volunteer.clone()))
    }

    async fn mark_volunteer_approved(&self, id: Uuid, by: Uuid) -> StoreResult<Option<Volunteer>> {
        let mut tables = self.tables.lock().await;
        let Some(volunteer) = tables.volunteers.iter_mut().find(|v| {
            v.id == id && matches!(v.status, VolunteerStatus::Pending | VolunteerStatus::Approved)
        }) else {
            return Ok(None);
        };

        // A repeat approval keeps the original stamp
        if volunteer.status == VolunteerStatus::Pending {
            let now = Utc::now();
            volunteer.status = VolunteerStatus::Approved;
            volunteer.approved_by = Some(by);
            volunteer.approved_at = Some(now);
            volunteer.updated_at = now;
        }
        Ok(Some(volunteer.clone()))
    }

    async fn mark_volunteer_rejected(
        &self,
        id: Uuid,
        by: Uuid,
        reason: &str,
    ) -> StoreResult<Option<Volunteer>> {
        let mut tables = self.tables.lock().await;
        let Some(volunteer) = tables
            .volunteers
            .iter_mut()
            .find(|v| v.id == id && v.status == VolunteerStatus::Pending)
        else {
            return Ok(None);
        };

        let now = Utc::now();
        volunteer.status = VolunteerStatus::Rejected;
        volunteer.rejected_by = Some(by);
        volunteer.rejection_reason = Some(reason.to_string());
        volunteer.rejected_at = Some(now);
        volunteer.updated_at = now;
        Ok(Some(volunteer.clone()))
    }

    async fn delete_volunteer(&self, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.lock().await;
        let removed = remove_by(&mut tables.volunteers, |v| v.id == id);
        if removed {
            // ON DELETE SET NULL
            for user in tables.users.iter_mut().filter(|u| u.volunteer_id == Some(id)) {
                user.volunteer_id = None;
            }
        }
        Ok(removed)
    }

    async fn volunteer_stats(&self) -> StoreResult<VolunteerStats> {
        let tables = self.tables.lock().await;
        Ok(VolunteerStats::tally(tables.volunteers.iter().map(|v| v.status)))
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn insert_task(&self, data: CreateTask, assigned_by: Uuid) -> StoreResult<Task> {
        let now = Utc::now();
        let task = Task {
            id: Uuid::new_v4(),
            title: data.title,
            description: data.description,
            assigned_to: data.assigned_to,
            assigned_by: Some(assigned_by),
            due_date: data.due_date,
            priority: data.priority,
            category: data.category,
            status: TaskStatus::Pending,
            notes: None,
            completed_at: None,
            created_at: now,
            updated_at: now,
        };
        self.tables.lock().await.tasks.push(task.clone());
        Ok(task)
    }

    async fn task_by_id(&self, id: Uuid) -> StoreResult<Option<Task>> {
        let tables = self.tables.lock().await;
        Ok(tables.tasks.iter().find(|t| t.id == id).cloned())
    }

    async fn list_tasks(&self, filter: TaskFilter) -> StoreResult<Vec<Task>> {
        let tables = self.tables.lock().await;
        Ok(newest_first(&tables.tasks, |t| filter.matches(t)))
    }

    async fn update_task(&self, id: Uuid, data: UpdateTask) -> StoreResult<Option<Task>> {
        let mut tables = self.tables.lock().await;
        let Some(task) = tables.tasks.iter_mut().find(|t| t.id == id) else {
            return Ok(None);
        };
        data.apply(task, Utc::now());
        Ok(Some(task.clone()))
    }

    async fn delete_task(&self, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.lock().await;
        Ok(remove_by(&mut tables.tasks, |t| t.id == id))
    }

    async fn task_stats(&self, assigned_to: Option<Uuid>) -> StoreResult<TaskStats> {
        let tables = self.tables.lock().await;
        let filter = TaskFilter { assigned_to, ..Default::default() };
        Ok(TaskStats::tally(tables.tasks.iter().filter(|t| filter.matches(t))))
    }
}

#[async_trait]
impl EventStore for MemoryStore {
    async fn insert_event(&self, data: CreateEvent, created_by: Uuid) -> StoreResult<Event> {
        let now = Utc::now();
        let event = Event {
            id: Uuid::new_v4(),
            title: data.title,
            description: data.description,
            event_date: data.event_date,
            location: data.location,
            image_url: data.image_url,
            category: data.category,
            max_volunteers: data.max_volunteers,
            status: data.status,
            created_by: Some(created_by),
            created_at: now,
            updated_at: now,
        };
        self.tables.lock().await.events.push(event.clone());
        Ok(event)
    }

    async fn event_by_id(&self, id: Uuid) -> StoreResult<Option<Event>> {
        let tables = self.tables.lock().await;
        Ok(tables.events.iter().find(|e| e.id == id).cloned())
    }

    async fn list_events(&self, filter: EventFilter) -> StoreResult<Vec<Event>> {
        let tables = self.tables.lock().await;
        let mut events: Vec<Event> = tables
            .events
            .iter()
            .filter(|e| filter.matches(e))
            .cloned()
            .collect();
        events.sort_by_key(|e| e.event_date);
        Ok(events)
    }

    async fn update_event(&self, id: Uuid, data: UpdateEvent) -> StoreResult<Option<Event>> {
        let mut tables = self.tables.lock().await;
        let Some(event) = tables.events.iter_mut().find(|e| e.id == id) else {
            return Ok(None);
        };
        data.apply(event, Utc::now());
        Ok(Some(event.clone()))
    }

    async fn delete_event(&self, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.lock().await;
        Ok(remove_by(&mut tables.events, |e| e.id == id))
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn insert_content(&self, data: CreateContent, created_by: Uuid) -> StoreResult<Content> {
        let now = Utc::now();
        let item = Content {
            id: Uuid::new_v4(),
            content_type: data.content_type,
            title: data.title,
            content: data.content,
            excerpt: data.excerpt,
            image_url: data.image_url,
            metadata: data.metadata,
            status: data.status,
            created_by: Some(created_by),
            created_at: now,
            updated_at: now,
        };
        self.tables.lock().await.content.push(item.clone());
        Ok(item)
    }

    async fn content_by_id(&self, id: Uuid) -> StoreResult<Option<Content>> {
        let tables = self.tables.lock().await;
        Ok(tables.content.iter().find(|c| c.id == id).cloned())
    }

    async fn list_published_content(&self, content_type: &str) -> StoreResult<Vec<Content>> {
        let tables = self.tables.lock().await;
        Ok(newest_first(&tables.content, |c| {
            c.content_type == content_type && c.status == PublicationStatus::Published
        }))
    }

    async fn update_content(&self, id: Uuid, data: UpdateContent) -> StoreResult<Option<Content>> {
        let mut tables = self.tables.lock().await;
        let Some(item) = tables.content.iter_mut().find(|c| c.id == id) else {
            return Ok(None);
        };
        data.apply(item, Utc::now());
        Ok(Some(item.clone()))
    }

    async fn delete_content(&self, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.lock().await;
        Ok(remove_by(&mut tables.content, |c| c.id == id))
    }
}

#[async_trait]
impl UrgentNeedStore for MemoryStore {
    async fn insert_need(&self, data: CreateUrgentNeed, created_by: Uuid) -> StoreResult<UrgentNeed> {
        let now = Utc::now();
        let need = UrgentNeed {
            id: Uuid::new_v4(),
            title: data.title,
            description: data.description,
            target_amount: data.target_amount,
            raised_amount: 0.0,
            category: data.category,
            end_date: data.end_date,
            is_urgent: true,
            is_active: true,
            created_by: Some(created_by),
            created_at: now,
            updated_at: now,
        };
        self.tables.lock().await.needs.push(need.clone());
        Ok(need)
    }

    async fn need_by_id(&self, id: Uuid) -> StoreResult<Option<UrgentNeed>> {
        let tables = self.tables.lock().await;
        Ok(tables.needs.iter().find(|n| n.id == id).cloned())
    }

    async fn list_needs(&self, active_only: bool) -> StoreResult<Vec<UrgentNeed>> {
        let tables = self.tables.lock().await;
        Ok(newest_first(&tables.needs, |n| !active_only || n.is_active))
    }

    async fn update_need(&self, id: Uuid, data: UpdateUrgentNeed) -> StoreResult<Option<UrgentNeed>> {
        let mut tables = self.tables.lock().await;
        let Some(need) = tables.needs.iter_mut().find(|n| n.id == id) else {
            return Ok(None);
        };
        data.apply(need, Utc::now());
        Ok(Some(need.clone()))
    }

    async fn add_donation(&self, id: Uuid, amount: f64) -> StoreResult<Option<UrgentNeed>> {
        let mut tables = self.tables.lock().await;
        let Some(need) = tables.needs.iter_mut().find(|n| n.id == id) else {
            return Ok(None);
        };
        need.raised_amount += amount;
        need.updated_at = Utc::now();
        Ok(Some(need.clone()))
    }

    async fn delete_need(&self, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.lock().await;
        Ok(remove_by(&mut tables.needs, |n| n.id == id))
    }
}

#[async_trait]
impl GalleryStore for MemoryStore {
    async fn insert_gallery_item(
        &self,
        data: CreateGalleryItem,
        created_by: Uuid,
    ) -> StoreResult<GalleryItem> {
        let now = Utc::now();
        let item = GalleryItem {
            id: Uuid::new_v4(),
            title: data.title,
            description: data.description,
            image_url: data.image_url,
            category: data.category,
            status: data.status,
            created_by: Some(created_by),
            created_at: now,
            updated_at: now,
        };
        self.tables.lock().await.gallery.push(item.clone());
        Ok(item)
    }

    async fn gallery_item_by_id(&self, id: Uuid) -> StoreResult<Option<GalleryItem>> {
        let tables = self.tables.lock().await;
        Ok(tables.gallery.iter().find(|g| g.id == id).cloned())
    }

    async fn list_published_gallery(&self) -> StoreResult<Vec<GalleryItem>> {
        let tables = self.tables.lock().await;
        Ok(newest_first(&tables.gallery, |g| {
            g.status == PublicationStatus::Published
        }))
    }

    async fn update_gallery_item(
        &self,
        id: Uuid,
        data: UpdateGalleryItem,
    ) -> StoreResult<Option<GalleryItem>> {
        let mut tables = self.tables.lock().await;
        let Some(item) = tables.gallery.iter_mut().find(|g| g.id == id) else {
            return Ok(None);
        };
        data.apply(item, Utc::now());
        Ok(Some(item.clone()))
    }

    async fn delete_gallery_item(&self, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.lock().await;
        Ok(remove_by(&mut tables.gallery, |g| g.id == id))
    }
}

#[async_trait]
impl HoursStore for MemoryStore {
    async fn insert_hours(&self, data: NewHours) -> StoreResult<VolunteerHours> {
        let now = Utc::now();
        let log = VolunteerHours {
            id: Uuid::new_v4(),
            volunteer_id: data.volunteer_id,
            date: data.entry.date,
            hours: data.entry.hours,
            activity: data.entry.activity,
            description: data.entry.description,
            status: data.status,
            admin_notes: String::new(),
            reviewed_by: None,
            reviewed_at: None,
            created_at: now,
            updated_at: now,
        };
        self.tables.lock().await.hours.push(log.clone());
        Ok(log)
    }

    async fn hours_by_id(&self, id: Uuid) -> StoreResult<Option<VolunteerHours>> {
        let tables = self.tables.lock().await;
        Ok(tables.hours.iter().find(|h| h.id == id).cloned())
    }

    async fn list_hours(&self, filter: HoursFilter) -> StoreResult<Vec<VolunteerHours>> {
        let tables = self.tables.lock().await;
        let mut logs = newest_first(&tables.hours, |h| filter.matches(h));
        logs.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(logs)
    }

    async fn update_hours(
        &self,
        id: Uuid,
        data: UpdateHours,
        pending_only: bool,
    ) -> StoreResult<Option<VolunteerHours>> {
        let mut tables = self.tables.lock().await;
        let Some(log) = tables
            .hours
            .iter_mut()
            .find(|h| h.id == id && (!pending_only || h.status == HoursStatus::Pending))
        else {
            return Ok(None);
        };
        data.apply(log, Utc::now());
        Ok(Some(log.clone()))
    }

    async fn review_hours(
        &self,
        id: Uuid,
        review: ReviewHours,
        reviewed_by: Uuid,
    ) -> StoreResult<Option<VolunteerHours>> {
        let mut tables = self.tables.lock().await;
        let Some(log) = tables.hours.iter_mut().find(|h| h.id == id) else {
            return Ok(None);
        };

        let now = Utc::now();
        log.status = review.status.into();
        log.admin_notes = review.admin_notes;
        log.reviewed_by = Some(reviewed_by);
        log.reviewed_at = Some(now);
        log.updated_at = now;
        Ok(Some(log.clone()))
    }

    async fn hours_totals(&self, volunteer_id: Uuid) -> StoreResult<HoursTotals> {
        let tables = self.tables.lock().await;
        Ok(HoursTotals::tally(
            tables.hours.iter().filter(|h| h.volunteer_id == volunteer_id),
        ))
    }

    async fn delete_hours(&self, id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.lock().await;
        Ok(remove_by(&mut tables.hours, |h| h.id == id))
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(StoreError::Database("store offline".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::{AccountStatus, Role};
    use crate::models::volunteer_hours::{HoursDecision, LogHours};
    use chrono::NaiveDate;

    fn new_user(email: &str) -> CreateUser {
        CreateUser {
            name: "Test".into(),
            email: email.into(),
            password_hash: "hash".into(),
            role: Role::Volunteer,
            status: AccountStatus::Active,
            volunteer_id: None,
            created_by: None,
        }
    }

    fn application(email: &str) -> VolunteerApplication {
        serde_json::from_value(serde_json::json!({
            "name": "A", "email": email, "phone": "1", "age": 30, "motivation": "care"
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_user_email_unique_case_insensitive() {
        let store = MemoryStore::new();
        store.insert_user(new_user("a@x.com")).await.unwrap();

        let err = store.insert_user(new_user("A@X.COM")).await.unwrap_err();
        assert!(err.is_conflict());
        assert!(store.user_by_email("A@x.com").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_injected_insert_failure_is_not_conflict() {
        let store = MemoryStore::new();
        store.fail_user_inserts(true);
        let err = store.insert_user(new_user("a@x.com")).await.unwrap_err();
        assert!(!err.is_conflict());
    }

    #[tokio::test]
    async fn test_update_user_email_conflict() {
        let store = MemoryStore::new();
        store.insert_user(new_user("a@x.com")).await.unwrap();
        let b = store.insert_user(new_user("b@x.com")).await.unwrap();

        let update = UpdateUser { email: Some("a@x.com".into()), ..Default::default() };
        assert!(store.update_user(b.id, update).await.unwrap_err().is_conflict());
    }

    #[tokio::test]
    async fn test_approve_and_reject_are_conditional() {
        let store = MemoryStore::new();
        let admin = Uuid::new_v4();
        let v = store.insert_volunteer(application("a@x.com")).await.unwrap();

        let approved = store.mark_volunteer_approved(v.id, admin).await.unwrap().unwrap();
        assert_eq!(approved.status, VolunteerStatus::Approved);
        assert_eq!(approved.approved_by, Some(admin));

        // approved again is fine, rejecting is not
        assert!(store.mark_volunteer_approved(v.id, admin).await.unwrap().is_some());
        assert!(store.mark_volunteer_rejected(v.id, admin, "late").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_volunteer_unlinks_account() {
        let store = MemoryStore::new();
        let v = store.insert_volunteer(application("a@x.com")).await.unwrap();
        let mut data = new_user("a@x.com");
        data.volunteer_id = Some(v.id);
        let user = store.insert_user(data).await.unwrap();

        assert!(store.delete_volunteer(v.id).await.unwrap());
        assert!(!store.delete_volunteer(v.id).await.unwrap());
        let user = store.user_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(user.volunteer_id, None);
    }

    #[tokio::test]
    async fn test_hours_pending_guard() {
        let store = MemoryStore::new();
        let owner = Uuid::new_v4();
        let log = store
            .insert_hours(NewHours {
                volunteer_id: owner,
                status: HoursStatus::Pending,
                entry: LogHours {
                    date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                    hours: 3.0,
                    activity: "cooking".into(),
                    description: String::new(),
                },
            })
            .await
            .unwrap();

        store
            .review_hours(
                log.id,
                ReviewHours { status: HoursDecision::Approved, admin_notes: String::new() },
                Uuid::new_v4(),
            )
            .await
            .unwrap();

        let edit = UpdateHours { hours: Some(5.0), ..Default::default() };
        assert!(store.update_hours(log.id, edit, true).await.unwrap().is_none());
        let unchanged = store.hours_by_id(log.id).await.unwrap().unwrap();
        assert_eq!(unchanged.hours, 3.0);
    }

    #[tokio::test]
    async fn test_donations_accumulate() {
        let store = MemoryStore::new();
        let need = store
            .insert_need(
                CreateUrgentNeed {
                    title: "Medicines".into(),
                    description: String::new(),
                    target_amount: 1000.0,
                    category: "health".into(),
                    end_date: None,
                },
                Uuid::new_v4(),
            )
            .await
            .unwrap();

        let (a, b) = tokio::join!(store.add_donation(need.id, 100.0), store.add_donation(need.id, 50.0));
        a.unwrap();
        b.unwrap();
        let need = store.need_by_id(need.id).await.unwrap().unwrap();
        assert_eq!(need.raised_amount, 150.0);
    }

    #[tokio::test]
    async fn test_ping_offline() {
        let store = MemoryStore::new();
        assert!(store.ping().await.is_ok());
        store.set_offline(true);
        assert!(store.ping().await.is_err());
    }
}

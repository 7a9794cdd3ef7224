/// Community event model
///
/// Only `published` events are visible on the public site.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE event_status AS ENUM ('draft', 'published', 'cancelled');
///
/// CREATE TABLE events (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     title VARCHAR(255) NOT NULL,
///     description TEXT NOT NULL DEFAULT '',
///     event_date TIMESTAMPTZ NOT NULL,
///     location VARCHAR(255) NOT NULL DEFAULT '',
///     image_url TEXT NOT NULL DEFAULT '',
///     category VARCHAR(100) NOT NULL DEFAULT 'general',
///     max_volunteers INTEGER,
///     status event_status NOT NULL DEFAULT 'published',
///     created_by UUID REFERENCES users(id) ON DELETE SET NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;
use validator::Validate;

use super::task::default_category;

const EVENT_COLUMNS: &str = "id, title, description, event_date, location, image_url, category, \
                             max_volunteers, status, created_by, created_at, updated_at";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "event_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    Draft,
    #[default]
    Published,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub event_date: DateTime<Utc>,
    pub location: String,
    pub image_url: String,
    pub category: String,
    pub max_volunteers: Option<i32>,
    pub status: EventStatus,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CreateEvent {
    #[validate(length(min = 1, max = 255, message = "title is required"))]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub event_date: DateTime<Utc>,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default = "default_category")]
    pub category: String,
    #[validate(range(min = 1, message = "max_volunteers must be positive"))]
    pub max_volunteers: Option<i32>,
    #[serde(default)]
    pub status: EventStatus,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdateEvent {
    #[validate(length(min = 1, max = 255, message = "title must not be empty"))]
    pub title: Option<String>,
    pub description: Option<String>,
    pub event_date: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub image_url: Option<String>,
    pub category: Option<String>,
    #[validate(range(min = 1, message = "max_volunteers must be positive"))]
    pub max_volunteers: Option<i32>,
    pub status: Option<EventStatus>,
}

impl UpdateEvent {
    pub fn apply(self, event: &mut Event, now: DateTime<Utc>) {
        if let Some(v) = self.title {
            event.title = v;
        }
        if let Some(v) = self.description {
            event.description = v;
        }
        if let Some(v) = self.event_date {
            event.event_date = v;
        }
        if let Some(v) = self.location {
            event.location = v;
        }
        if let Some(v) = self.image_url {
            event.image_url = v;
        }
        if let Some(v) = self.category {
            event.category = v;
        }
        if let Some(v) = self.max_volunteers {
            event.max_volunteers = Some(v);
        }
        if let Some(v) = self.status {
            event.status = v;
        }
        event.updated_at = now;
    }
}

/// Listing filter
#[derive(Debug, Clone, Copy, Default)]
pub struct EventFilter {
    /// Only `published` events
    pub published_only: bool,

    /// Only events on or after this instant
    pub starting_after: Option<DateTime<Utc>>,
}

impl EventFilter {
    pub fn matches(&self, event: &Event) -> bool {
        (!self.published_only || event.status == EventStatus::Published)
            && self.starting_after.map_or(true, |from| event.event_date >= from)
    }
}

impl Event {
    pub async fn create(
        pool: &PgPool,
        data: CreateEvent,
        created_by: Uuid,
    ) -> Result<Self, sqlx::Error> {
        let sql = format!(
            "INSERT INTO events (title, description, event_date, location, image_url, category, \
             max_volunteers, status, created_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING {EVENT_COLUMNS}"
        );

        sqlx::query_as::<_, Event>(&sql)
            .bind(data.title)
            .bind(data.description)
            .bind(data.event_date)
            .bind(data.location)
            .bind(data.image_url)
            .bind(data.category)
            .bind(data.max_volunteers)
            .bind(data.status)
            .bind(created_by)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let sql = format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = $1");
        sqlx::query_as::<_, Event>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Lists events in date order, soonest first
    pub async fn list(pool: &PgPool, filter: EventFilter) -> Result<Vec<Self>, sqlx::Error> {
        let mut query: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {EVENT_COLUMNS} FROM events WHERE TRUE"));
        if filter.published_only {
            query.push(" AND status = 'published'");
        }
        if let Some(from) = filter.starting_after {
            query.push(" AND event_date >= ").push_bind(from);
        }
        query.push(" ORDER BY event_date ASC");

        query.build_query_as::<Event>().fetch_all(pool).await
    }

    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateEvent,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query: QueryBuilder<Postgres> =
            QueryBuilder::new("UPDATE events SET updated_at = NOW()");

        if let Some(v) = data.title {
            query.push(", title = ").push_bind(v);
        }
        if let Some(v) = data.description {
            query.push(", description = ").push_bind(v);
        }
        if let Some(v) = data.event_date {
            query.push(", event_date = ").push_bind(v);
        }
        if let Some(v) = data.location {
            query.push(", location = ").push_bind(v);
        }
        if let Some(v) = data.image_url {
            query.push(", image_url = ").push_bind(v);
        }
        if let Some(v) = data.category {
            query.push(", category = ").push_bind(v);
        }
        if let Some(v) = data.max_volunteers {
            query.push(", max_volunteers = ").push_bind(v);
        }
        if let Some(v) = data.status {
            query.push(", status = ").push_bind(v);
        }

        query
            .push(" WHERE id = ")
            .push_bind(id)
            .push(format!(" RETURNING {EVENT_COLUMNS}"));

        query.build_query_as::<Event>().fetch_optional(pool).await
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn event_at(date: DateTime<Utc>, status: EventStatus) -> Event {
        Event {
            id: Uuid::new_v4(),
            title: "Health camp".into(),
            description: String::new(),
            event_date: date,
            location: String::new(),
            image_url: String::new(),
            category: "general".into(),
            max_volunteers: None,
            status,
            created_by: None,
            created_at: date,
            updated_at: date,
        }
    }

    #[test]
    fn test_public_upcoming_filter() {
        let now = Utc::now();
        let filter = EventFilter { published_only: true, starting_after: Some(now) };

        assert!(filter.matches(&event_at(now + Duration::days(1), EventStatus::Published)));
        assert!(!filter.matches(&event_at(now - Duration::days(1), EventStatus::Published)));
        assert!(!filter.matches(&event_at(now + Duration::days(1), EventStatus::Draft)));
    }

    #[test]
    fn test_create_event_defaults_to_published() {
        let input: CreateEvent = serde_json::from_value(serde_json::json!({
            "title": "Diwali celebration",
            "event_date": "2024-11-01T10:00:00Z"
        }))
        .unwrap();

        assert_eq!(input.status, EventStatus::Published);
        assert_eq!(input.category, "general");
        assert!(input.validate().is_ok());
    }
}

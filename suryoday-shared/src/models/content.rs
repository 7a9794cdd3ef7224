/// Editorial content blocks (stories, announcements, page sections)
///
/// Content is grouped by a free-form `type` such as `story` or `about`.
/// Public readers only ever see `published` rows.
///
/// # Schema
///
/// ```sql
/// CREATE TYPE publication_status AS ENUM ('draft', 'published', 'archived');
///
/// CREATE TABLE content (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     type VARCHAR(100) NOT NULL,
///     title VARCHAR(255) NOT NULL,
///     content TEXT NOT NULL DEFAULT '',
///     excerpt TEXT NOT NULL DEFAULT '',
///     image_url TEXT NOT NULL DEFAULT '',
///     metadata JSONB NOT NULL DEFAULT '{}',
///     status publication_status NOT NULL DEFAULT 'published',
///     created_by UUID REFERENCES users(id) ON DELETE SET NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;
use validator::Validate;

const CONTENT_COLUMNS: &str = "id, type, title, content, excerpt, image_url, metadata, status, \
                               created_by, created_at, updated_at";

/// Visibility of content and gallery items
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "publication_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PublicationStatus {
    Draft,
    #[default]
    Published,
    Archived,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Content {
    pub id: Uuid,

    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub content_type: String,

    pub title: String,
    pub content: String,
    pub excerpt: String,
    pub image_url: String,
    pub metadata: JsonValue,
    pub status: PublicationStatus,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CreateContent {
    #[serde(rename = "type")]
    #[validate(length(min = 1, max = 100, message = "type is required"))]
    pub content_type: String,

    #[validate(length(min = 1, max = 255, message = "title is required"))]
    pub title: String,

    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub excerpt: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default = "empty_metadata")]
    pub metadata: JsonValue,
    #[serde(default)]
    pub status: PublicationStatus,
}

fn empty_metadata() -> JsonValue {
    JsonValue::Object(Default::default())
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdateContent {
    #[validate(length(min = 1, max = 255, message = "title must not be empty"))]
    pub title: Option<String>,
    pub content: Option<String>,
    pub excerpt: Option<String>,
    pub image_url: Option<String>,
    pub metadata: Option<JsonValue>,
    pub status: Option<PublicationStatus>,
}

impl UpdateContent {
    pub fn apply(self, item: &mut Content, now: DateTime<Utc>) {
        if let Some(v) = self.title {
            item.title = v;
        }
        if let Some(v) = self.content {
            item.content = v;
        }
        if let Some(v) = self.excerpt {
            item.excerpt = v;
        }
        if let Some(v) = self.image_url {
            item.image_url = v;
        }
        if let Some(v) = self.metadata {
            item.metadata = v;
        }
        if let Some(v) = self.status {
            item.status = v;
        }
        item.updated_at = now;
    }
}

impl Content {
    pub async fn create(
        pool: &PgPool,
        data: CreateContent,
        created_by: Uuid,
    ) -> Result<Self, sqlx::Error> {
        let sql = format!(
            "INSERT INTO content (type, title, content, excerpt, image_url, metadata, status, created_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {CONTENT_COLUMNS}"
        );

        sqlx::query_as::<_, Content>(&sql)
            .bind(data.content_type)
            .bind(data.title)
            .bind(data.content)
            .bind(data.excerpt)
            .bind(data.image_url)
            .bind(data.metadata)
            .bind(data.status)
            .bind(created_by)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let sql = format!("SELECT {CONTENT_COLUMNS} FROM content WHERE id = $1");
        sqlx::query_as::<_, Content>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Published items of one type, newest first
    pub async fn list_published(
        pool: &PgPool,
        content_type: &str,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let sql = format!(
            "SELECT {CONTENT_COLUMNS} FROM content \
             WHERE type = $1 AND status = 'published' ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Content>(&sql)
            .bind(content_type)
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateContent,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query: QueryBuilder<Postgres> =
            QueryBuilder::new("UPDATE content SET updated_at = NOW()");

        if let Some(v) = data.title {
            query.push(", title = ").push_bind(v);
        }
        if let Some(v) = data.content {
            query.push(", content = ").push_bind(v);
        }
        if let Some(v) = data.excerpt {
            query.push(", excerpt = ").push_bind(v);
        }
        if let Some(v) = data.image_url {
            query.push(", image_url = ").push_bind(v);
        }
        if let Some(v) = data.metadata {
            query.push(", metadata = ").push_bind(v);
        }
        if let Some(v) = data.status {
            query.push(", status = ").push_bind(v);
        }

        query
            .push(" WHERE id = ")
            .push_bind(id)
            .push(format!(" RETURNING {CONTENT_COLUMNS}"));

        query.build_query_as::<Content>().fetch_optional(pool).await
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM content WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

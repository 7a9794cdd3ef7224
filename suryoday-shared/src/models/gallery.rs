/// Photo gallery items
///
/// # Schema
///
/// ```sql
/// CREATE TABLE gallery (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     title VARCHAR(255) NOT NULL DEFAULT '',
///     description TEXT NOT NULL DEFAULT '',
///     image_url TEXT NOT NULL,
///     category VARCHAR(100) NOT NULL DEFAULT 'general',
///     status publication_status NOT NULL DEFAULT 'published',
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

use super::content::PublicationStatus;
use super::task::default_category;

const GALLERY_COLUMNS: &str =
    "id, title, description, image_url, category, status, created_by, created_at, updated_at";

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct GalleryItem {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub image_url: String,
    pub category: String,
    pub status: PublicationStatus,
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CreateGalleryItem {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[validate(length(min = 1, message = "image_url is required"))]
    pub image_url: String,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub status: PublicationStatus,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct UpdateGalleryItem {
    pub title: Option<String>,
    pub description: Option<String>,
    #[validate(length(min = 1, message = "image_url must not be empty"))]
    pub image_url: Option<String>,
    pub category: Option<String>,
    pub status: Option<PublicationStatus>,
}

impl UpdateGalleryItem {
    pub fn apply(self, item: &mut GalleryItem, now: DateTime<Utc>) {
        if let Some(v) = self.title {
            item.title = v;
        }
        if let Some(v) = self.description {
            item.description = v;
        }
        if let Some(v) = self.image_url {
            item.image_url = v;
        }
        if let Some(v) = self.category {
            item.category = v;
        }
        if let Some(v) = self.status {
            item.status = v;
        }
        item.updated_at = now;
    }
}

impl GalleryItem {
    pub async fn create(
        pool: &PgPool,
        data: CreateGalleryItem,
        created_by: Uuid,
    ) -> Result<Self, sqlx::Error> {
        let sql = format!(
            "INSERT INTO gallery (title, description, image_url, category, status, created_by) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {GALLERY_COLUMNS}"
        );

        sqlx::query_as::<_, GalleryItem>(&sql)
            .bind(data.title)
            .bind(data.description)
            .bind(data.image_url)
            .bind(data.category)
            .bind(data.status)
            .bind(created_by)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let sql = format!("SELECT {GALLERY_COLUMNS} FROM gallery WHERE id = $1");
        sqlx::query_as::<_, GalleryItem>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_published(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        let sql = format!(
            "SELECT {GALLERY_COLUMNS} FROM gallery WHERE status = 'published' ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, GalleryItem>(&sql).fetch_all(pool).await
    }

    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateGalleryItem,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query: QueryBuilder<Postgres> =
            QueryBuilder::new("UPDATE gallery SET updated_at = NOW()");

        if let Some(v) = data.title {
            query.push(", title = ").push_bind(v);
        }
        if let Some(v) = data.description {
            query.push(", description = ").push_bind(v);
        }
        if let Some(v) = data.image_url {
            query.push(", image_url = ").push_bind(v);
        }
        if let Some(v) = data.category {
            query.push(", category = ").push_bind(v);
        }
        if let Some(v) = data.status {
            query.push(", status = ").push_bind(v);
        }

        query
            .push(" WHERE id = ")
            .push_bind(id)
            .push(format!(" RETURNING {GALLERY_COLUMNS}"));

        query.build_query_as::<GalleryItem>().fetch_optional(pool).await
    }

    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM gallery WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
